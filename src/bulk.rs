//! Bulk mutator: one patch applied to many tasks in a single transaction.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::activity::{ActivityDetails, ActivityEntry};
use crate::actor::Actor;
use crate::board::{reindex_column, Board};
use crate::error::{Error, Result};
use crate::model::{normalize_id_set, Priority};

/// A partial update; every `Some` field is applied to every named task.
#[derive(Debug, Clone, Default)]
pub struct BulkPatch {
    pub status_id: Option<String>,
    pub priority: Option<Priority>,
    /// Full replacement; an empty set clears.
    pub assignees: Option<Vec<String>>,
    /// Full replacement; an empty set clears.
    pub labels: Option<Vec<String>>,
    pub archived: Option<bool>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
}

impl BulkPatch {
    pub fn is_empty(&self) -> bool {
        self.status_id.is_none()
            && self.priority.is_none()
            && self.assignees.is_none()
            && self.labels.is_none()
            && self.archived.is_none()
            && self.due_date.is_none()
            && self.start_date.is_none()
    }

    /// Names of the fields this patch sets, for the activity log.
    pub fn field_names(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.status_id.is_some() {
            fields.push("status".to_string());
        }
        if self.priority.is_some() {
            fields.push("priority".to_string());
        }
        if self.assignees.is_some() {
            fields.push("assignees".to_string());
        }
        if self.labels.is_some() {
            fields.push("labels".to_string());
        }
        if self.archived.is_some() {
            fields.push("archived".to_string());
        }
        if self.due_date.is_some() {
            fields.push("due_date".to_string());
        }
        if self.start_date.is_some() {
            fields.push("start_date".to_string());
        }
        fields
    }
}

impl Board {
    /// Apply `patch` to every task in `task_ids`, all-or-nothing.
    ///
    /// Every id must name a task of `project_id`; one mismatch rejects the
    /// whole call before anything is written. Returns the number of tasks
    /// updated.
    ///
    /// A status set moves each non-archived task to the end of the target
    /// column (in id-list order) and renumbers every column it touched.
    /// Setting `archived = true` is a flag flip only: unlike the single-task
    /// archive path it leaves the position gaps in place, matching the
    /// historical behavior of this operation; the next reindex that touches
    /// an affected column closes them. Setting `archived = false` re-appends
    /// each task at the end of its column so live positions stay unique.
    pub fn bulk_update(
        &self,
        project_id: &str,
        task_ids: &[String],
        patch: BulkPatch,
        actor: &Actor,
    ) -> Result<usize> {
        if patch.is_empty() {
            return Err(Error::InvalidArgument(
                "bulk update patch is empty".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        let mut ids: Vec<String> = task_ids.iter().map(|id| id.trim().to_string()).collect();
        ids.retain(|id| !id.is_empty() && seen.insert(id.clone()));
        if ids.is_empty() {
            return Err(Error::InvalidArgument(
                "bulk update needs at least one task id".to_string(),
            ));
        }

        let fields = patch.field_names();
        let mut recorder = self.store().activity_log(project_id);
        self.store().update_project(project_id, &mut recorder, |state, entries| {
            // Validate the whole id set before the first write.
            for id in &ids {
                state.task(id)?;
            }
            let target_status = match &patch.status_id {
                Some(reference) => Some(state.column(reference)?.id.clone()),
                None => None,
            };

            let now = Utc::now();
            let mut touched_columns: Vec<String> = Vec::new();

            for id in &ids {
                if let Some(target) = &target_status {
                    let task = state.task(id)?;
                    if &task.status_id != target {
                        let from = task.status_id.clone();
                        let position = state.next_position(target);
                        let task = state.task_mut(id)?;
                        task.status_id = target.clone();
                        if !task.archived {
                            task.position = position;
                            push_unique(&mut touched_columns, from);
                            push_unique(&mut touched_columns, target.clone());
                        }
                    }
                }

                let task = state.task_mut(id)?;
                if let Some(priority) = patch.priority {
                    task.priority = priority;
                }
                if let Some(assignees) = &patch.assignees {
                    task.assignees = normalize_id_set(assignees);
                }
                if let Some(labels) = &patch.labels {
                    task.labels = normalize_id_set(labels);
                }
                if let Some(due_date) = patch.due_date {
                    task.due_date = Some(due_date);
                }
                if let Some(start_date) = patch.start_date {
                    task.start_date = Some(start_date);
                }
                if let Some(archived) = patch.archived {
                    if archived != task.archived {
                        task.archived = archived;
                        if !archived {
                            // Re-entering the live ordering needs a fresh
                            // position; a flag flip alone could collide.
                            let status_id = task.status_id.clone();
                            let position = state.next_position(&status_id);
                            state.task_mut(id)?.position = position;
                        }
                    }
                }

                let task = state.task_mut(id)?;
                task.updated_at = now;
                task.updated_by = Some(actor.id.clone());

                entries.push(ActivityEntry::new(
                    id,
                    &actor.id,
                    ActivityDetails::BulkUpdated {
                        fields: fields.clone(),
                    },
                ));
            }

            for column in &touched_columns {
                reindex_column(state, column)?;
            }

            debug!(
                project = %state.project.id,
                tasks = ids.len(),
                fields = ?fields,
                "bulk update applied"
            );
            Ok(ids.len())
        })
    }
}

fn push_unique(columns: &mut Vec<String>, column: String) {
    if !columns.contains(&column) {
        columns.push(column);
    }
}
