//! Board service: task lifecycle and the column mover.
//!
//! Every mutation here is one store transaction: the project lock is held
//! while the state is read, validated, rewritten, and the activity entries
//! are flushed. Validation always precedes the first mutation, so a failed
//! call commits nothing.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::activity::{ActivityDetails, ActivityEntry};
use crate::actor::Actor;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::ids;
use crate::model::{
    normalize_id_set, Priority, ProjectMeta, ProjectState, StatusColumn, Task,
};
use crate::position;
use crate::store::{ProjectEntry, Store};

/// The board engine: a store plus configuration.
#[derive(Debug, Clone)]
pub struct Board {
    store: Store,
    config: Config,
}

/// Fields for a new task. Status defaults to the project's first column.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub status_id: Option<String>,
    pub description: Option<String>,
    pub priority: Priority,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
}

/// Result of a move: the updated task, plus an advisory warning when the
/// task lands in a completion column while still blocked.
#[derive(Debug, Clone, Serialize)]
pub struct MoveOutcome {
    pub task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// A dependency edge seen from one task, with the peer's title attached.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyRef {
    pub edge_id: Uuid,
    pub task_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskDetails {
    pub task: Task,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<DependencyRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<DependencyRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnView {
    pub column: StatusColumn,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub project: ProjectMeta,
    pub columns: Vec<ColumnView>,
}

impl Board {
    pub fn new(store: Store, config: Config) -> Self {
        Self { store, config }
    }

    /// Open the board rooted at `root`, loading `.bord.toml` when present.
    pub fn open(root: std::path::PathBuf) -> Self {
        let config = Config::load_from_dir(&root);
        let store = Store::new(root, config.board.lock_timeout_ms);
        Self { store, config }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    // =========================================================================
    // Projects
    // =========================================================================

    pub fn create_project(&self, name: &str, actor: &Actor) -> Result<ProjectMeta> {
        self.store.create_project(name, &actor.id)
    }

    pub fn list_projects(&self) -> Result<Vec<ProjectEntry>> {
        self.store.list_projects()
    }

    pub fn resolve_project(&self, input: &str) -> Result<String> {
        self.store.resolve_project(input)
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Add a status column at the end of the project's column ordering.
    pub fn create_column(
        &self,
        project_id: &str,
        name: &str,
        is_completion: bool,
        actor: &Actor,
    ) -> Result<StatusColumn> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "column name cannot be empty".to_string(),
            ));
        }

        let mut recorder = self.store.activity_log(project_id);
        self.store.update_project(project_id, &mut recorder, |state, _| {
            if state.column_by_name(&name).is_some() {
                return Err(Error::InvalidArgument(format!(
                    "column already exists: {name}"
                )));
            }

            let position = state
                .columns
                .iter()
                .map(|column| column.position)
                .max()
                .map_or(0, |max| max + 1);
            let column = StatusColumn {
                id: ids::column_id(),
                name,
                position,
                is_completion,
            };
            state.columns.push(column.clone());
            debug!(project = %state.project.id, column = %column.id, role = %actor.role, "column created");
            Ok(column)
        })
    }

    /// Columns of a project, ordered.
    pub fn columns(&self, project_id: &str) -> Result<Vec<StatusColumn>> {
        let state = self.store.load_project(project_id)?;
        let mut columns = state.columns;
        columns.sort_by_key(|column| column.position);
        Ok(columns)
    }

    /// Resolve a column reference within a project: exact id, then name.
    pub fn resolve_column(&self, project_id: &str, input: &str) -> Result<String> {
        let state = self.store.load_project(project_id)?;
        resolve_column_in(&state, input)
    }

    // =========================================================================
    // Task lifecycle
    // =========================================================================

    /// Create a task appended at the end of its column.
    pub fn create_task(&self, project_id: &str, new: NewTask, actor: &Actor) -> Result<Task> {
        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::InvalidArgument(
                "task title cannot be empty".to_string(),
            ));
        }

        let mut recorder = self.store.activity_log(project_id);
        let prefix = self.config.board.id_prefix.clone();
        let min_len = self.config.board.id_min_len;

        self.store.update_project(project_id, &mut recorder, |state, entries| {
            let status_id = match &new.status_id {
                Some(reference) => resolve_column_in(state, reference)?,
                None => default_column(state)?,
            };

            let existing = state.tasks.iter().map(|task| task.id.clone()).collect();
            let now = Utc::now();
            let task = Task {
                id: ids::task_id(&prefix, min_len, &existing),
                project_id: state.project.id.clone(),
                status_id: status_id.clone(),
                position: state.next_position(&status_id),
                title,
                description: new.description.clone(),
                archived: false,
                priority: new.priority,
                assignees: normalize_id_set(&new.assignees),
                labels: normalize_id_set(&new.labels),
                due_date: new.due_date,
                start_date: new.start_date,
                created_at: now,
                updated_at: now,
                created_by: Some(actor.id.clone()),
                updated_by: Some(actor.id.clone()),
            };
            state.tasks.push(task.clone());

            entries.push(ActivityEntry::new(
                &task.id,
                &actor.id,
                ActivityDetails::TaskCreated { status_id },
            ));
            Ok(task)
        })
    }

    /// Move a task to `target_position` within `target_status_id`.
    ///
    /// The index is clamped to the destination length, so an index past the
    /// end appends instead of erroring; optimistic client state may race the
    /// board. Source and destination columns are renumbered in the same
    /// transaction. Dependencies never veto the move; landing in a
    /// completion column while blocked only attaches a warning.
    pub fn move_task(
        &self,
        project_id: &str,
        task_ref: &str,
        target_status: &str,
        target_position: usize,
        actor: &Actor,
    ) -> Result<MoveOutcome> {
        let mut recorder = self.store.activity_log(project_id);
        let warn_blocked = self.config.board.warn_blocked_completion;

        self.store.update_project(project_id, &mut recorder, |state, entries| {
            let task_id = resolve_task_in(state, task_ref)?;
            let target_id = resolve_column_in(state, target_status)?;
            let target_is_completion = state.column(&target_id)?.is_completion;

            let task = state.task(&task_id)?;
            if task.archived {
                return Err(Error::InvalidArgument(format!(
                    "task {task_id} is archived; unarchive it before moving"
                )));
            }
            let from_status = task.status_id.clone();

            state.task_mut(&task_id)?.status_id = target_id.clone();
            place_in_column(state, &task_id, &target_id, target_position)?;
            if from_status != target_id {
                reindex_column(state, &from_status)?;
            }

            let mover = state.task_mut(&task_id)?;
            mover.updated_at = Utc::now();
            mover.updated_by = Some(actor.id.clone());
            let task = mover.clone();

            if from_status != target_id {
                entries.push(ActivityEntry::new(
                    &task_id,
                    &actor.id,
                    ActivityDetails::StatusChanged {
                        from: from_status.clone(),
                        to: target_id.clone(),
                    },
                ));
            }

            let warning = if warn_blocked && target_is_completion {
                incomplete_blockers_warning(state, &task_id)?
            } else {
                None
            };

            debug!(
                project = %state.project.id,
                task = %task_id,
                from = %from_status,
                to = %target_id,
                "task moved"
            );
            Ok(MoveOutcome { task, warning })
        })
    }

    /// Archive a task and close the gap it leaves in its column.
    ///
    /// This is the single-task path; `bulk_update` with `archived = true`
    /// deliberately skips the renumbering (see that method).
    pub fn archive_task(&self, project_id: &str, task_ref: &str, actor: &Actor) -> Result<Task> {
        let mut recorder = self.store.activity_log(project_id);
        self.store.update_project(project_id, &mut recorder, |state, entries| {
            let task_id = resolve_task_in(state, task_ref)?;
            let task = state.task_mut(&task_id)?;
            if task.archived {
                return Err(Error::InvalidArgument(format!(
                    "task {task_id} is already archived"
                )));
            }
            let status_id = task.status_id.clone();
            task.archived = true;
            task.updated_at = Utc::now();
            task.updated_by = Some(actor.id.clone());
            let task = task.clone();

            reindex_column(state, &status_id)?;

            entries.push(ActivityEntry::new(
                &task_id,
                &actor.id,
                ActivityDetails::Archived,
            ));
            Ok(task)
        })
    }

    /// Unarchive a task, re-appending it at the end of its column.
    pub fn unarchive_task(&self, project_id: &str, task_ref: &str, actor: &Actor) -> Result<Task> {
        let mut recorder = self.store.activity_log(project_id);
        self.store.update_project(project_id, &mut recorder, |state, entries| {
            let task_id = resolve_task_in(state, task_ref)?;
            if !state.task(&task_id)?.archived {
                return Err(Error::InvalidArgument(format!(
                    "task {task_id} is not archived"
                )));
            }

            let status_id = state.task(&task_id)?.status_id.clone();
            let position = state.next_position(&status_id);
            let task = state.task_mut(&task_id)?;
            task.archived = false;
            task.position = position;
            task.updated_at = Utc::now();
            task.updated_by = Some(actor.id.clone());

            // Re-entering the live ordering also compacts any gaps a bulk
            // archive left behind.
            reindex_column(state, &status_id)?;
            let task = state.task(&task_id)?.clone();

            entries.push(ActivityEntry::new(
                &task_id,
                &actor.id,
                ActivityDetails::Unarchived,
            ));
            Ok(task)
        })
    }

    /// Delete a task and every dependency edge that references it.
    ///
    /// No position repair happens here; the gap closes on the next reindex
    /// that touches the column.
    pub fn delete_task(&self, project_id: &str, task_ref: &str, actor: &Actor) -> Result<Task> {
        let mut recorder = self.store.activity_log(project_id);
        self.store.update_project(project_id, &mut recorder, |state, entries| {
            let task_id = resolve_task_in(state, task_ref)?;
            let index = state
                .tasks
                .iter()
                .position(|task| task.id == task_id)
                .ok_or_else(|| Error::TaskNotFound(task_id.clone()))?;
            let task = state.tasks.remove(index);
            state
                .dependencies
                .retain(|edge| edge.blocked_task_id != task_id && edge.blocking_task_id != task_id);

            entries.push(ActivityEntry::new(
                &task_id,
                &actor.id,
                ActivityDetails::Deleted,
            ));
            Ok(task)
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn task_details(&self, project_id: &str, task_ref: &str) -> Result<TaskDetails> {
        let state = self.store.load_project(project_id)?;
        let task_id = resolve_task_in(&state, task_ref)?;
        let task = state.task(&task_id)?.clone();

        let blocked_by = state
            .blockers_of(&task_id)
            .into_iter()
            .map(|edge| dependency_ref(&state, edge.id, &edge.blocking_task_id))
            .collect::<Result<Vec<_>>>()?;
        let blocks = state
            .blocking(&task_id)
            .into_iter()
            .map(|edge| dependency_ref(&state, edge.id, &edge.blocked_task_id))
            .collect::<Result<Vec<_>>>()?;

        Ok(TaskDetails {
            task,
            blocked_by,
            blocks,
        })
    }

    /// The whole board: columns in order, tasks in position order.
    pub fn board_view(&self, project_id: &str) -> Result<BoardView> {
        let state = self.store.load_project(project_id)?;
        let mut columns = state.columns.clone();
        columns.sort_by_key(|column| column.position);

        let views = columns
            .into_iter()
            .map(|column| {
                let tasks = state
                    .column_tasks(&column.id)
                    .into_iter()
                    .cloned()
                    .collect();
                ColumnView { column, tasks }
            })
            .collect();

        Ok(BoardView {
            project: state.project.clone(),
            columns: views,
        })
    }

    pub fn resolve_task(&self, project_id: &str, input: &str) -> Result<String> {
        let state = self.store.load_project(project_id)?;
        resolve_task_in(&state, input)
    }
}

// =============================================================================
// Column mover internals
// =============================================================================

/// Renumber one column to `0..n-1`, writing only changed rows, and verify
/// the result.
pub(crate) fn reindex_column(state: &mut ProjectState, status_id: &str) -> Result<()> {
    let updates = position::reindex(&state.column_tasks(status_id));
    for update in &updates {
        state.task_mut(&update.task_id)?.position = update.position;
    }

    let positions: Vec<u32> = state
        .column_tasks(status_id)
        .iter()
        .map(|task| task.position)
        .collect();
    position::verify_contiguous(status_id, &positions)
}

/// Place `task_id` at the clamped `index` of `status_id` and renumber the
/// column around it. The task's `status_id` must already be set.
fn place_in_column(
    state: &mut ProjectState,
    task_id: &str,
    status_id: &str,
    index: usize,
) -> Result<()> {
    let updates = {
        let mut ordered: Vec<&Task> = state
            .column_tasks(status_id)
            .into_iter()
            .filter(|task| task.id != task_id)
            .collect();
        let mover = state.task(task_id)?;
        let clamped = index.min(ordered.len());
        ordered.insert(clamped, mover);
        position::reindex(&ordered)
    };

    for update in &updates {
        state.task_mut(&update.task_id)?.position = update.position;
    }

    let positions: Vec<u32> = state
        .column_tasks(status_id)
        .iter()
        .map(|task| task.position)
        .collect();
    position::verify_contiguous(status_id, &positions)
}

/// Warning text when a task enters a completion column while edges from
/// tasks outside completion columns still point at it.
fn incomplete_blockers_warning(state: &ProjectState, task_id: &str) -> Result<Option<String>> {
    let mut titles = Vec::new();
    for edge in state.blockers_of(task_id) {
        let blocking = state.task(&edge.blocking_task_id)?;
        let column = state.column(&blocking.status_id)?;
        if !column.is_completion {
            titles.push(format!("\"{}\"", blocking.title));
        }
    }
    if titles.is_empty() {
        return Ok(None);
    }
    titles.sort();
    Ok(Some(format!(
        "task is still blocked by incomplete: {}",
        titles.join(", ")
    )))
}

fn default_column(state: &ProjectState) -> Result<String> {
    state
        .columns
        .iter()
        .min_by_key(|column| column.position)
        .map(|column| column.id.clone())
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "project {} has no status columns",
                state.project.id
            ))
        })
}

fn resolve_column_in(state: &ProjectState, input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(
            "column reference cannot be empty".to_string(),
        ));
    }
    if let Ok(column) = state.column(trimmed) {
        return Ok(column.id.clone());
    }
    if let Some(column) = state.column_by_name(trimmed) {
        return Ok(column.id.clone());
    }
    Err(Error::ColumnNotFound(trimmed.to_string()))
}

/// Resolve a task reference: exact id, then unique id prefix.
pub(crate) fn resolve_task_in(state: &ProjectState, input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(
            "task reference cannot be empty".to_string(),
        ));
    }

    if state.tasks.iter().any(|task| task.id == trimmed) {
        return Ok(trimmed.to_string());
    }

    let mut matches: Vec<&str> = state
        .tasks
        .iter()
        .filter(|task| task.id.starts_with(trimmed))
        .map(|task| task.id.as_str())
        .collect();
    matches.sort();
    matches.dedup();

    match matches.as_slice() {
        [] => Err(Error::TaskNotFound(trimmed.to_string())),
        [only] => Ok((*only).to_string()),
        many => Err(Error::InvalidArgument(format!(
            "ambiguous task id '{}': {}",
            trimmed,
            many.join(", ")
        ))),
    }
}

fn dependency_ref(state: &ProjectState, edge_id: Uuid, task_id: &str) -> Result<DependencyRef> {
    let task = state.task(task_id)?;
    Ok(DependencyRef {
        edge_id,
        task_id: task.id.clone(),
        title: task.title.clone(),
    })
}
