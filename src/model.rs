//! Board entities: projects, status columns, tasks, dependency edges.
//!
//! All state for one project lives in a single `ProjectState` document,
//! replaced atomically on every transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

pub const BOARD_SCHEMA_VERSION: &str = "bord.board.v1";

/// Task priority, lowest to highest.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Parse a priority name, case-insensitively.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "none" => Ok(Priority::None),
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(Error::InvalidArgument(format!(
                "unknown priority '{trimmed}' (expected none|low|medium|high|urgent)"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::None => "none",
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// A named ordering bucket holding an ordered subset of a project's tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusColumn {
    pub id: String,
    pub name: String,
    /// Order among the project's columns.
    pub position: u32,
    /// Soft signal used for the blocked-task warning on moves; never a gate.
    #[serde(default)]
    pub is_completion: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub status_id: String,
    /// Display order within `(project, status)`; contiguous from 0 for
    /// non-archived tasks.
    pub position: u32,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// Directed edge: `blocking` must complete before `blocked` is unblocked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDependency {
    pub id: Uuid,
    pub blocked_task_id: String,
    pub blocking_task_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// The whole persisted state of one project's board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectState {
    pub schema_version: String,
    pub project: ProjectMeta,
    #[serde(default)]
    pub columns: Vec<StatusColumn>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub dependencies: Vec<TaskDependency>,
}

impl ProjectState {
    pub fn new(project: ProjectMeta) -> Self {
        Self {
            schema_version: BOARD_SCHEMA_VERSION.to_string(),
            project,
            columns: Vec::new(),
            tasks: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn task(&self, task_id: &str) -> Result<&Task> {
        self.tasks
            .iter()
            .find(|task| task.id == task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    pub fn task_mut(&mut self, task_id: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    pub fn column(&self, status_id: &str) -> Result<&StatusColumn> {
        self.columns
            .iter()
            .find(|column| column.id == status_id)
            .ok_or_else(|| Error::ColumnNotFound(status_id.to_string()))
    }

    pub fn column_by_name(&self, name: &str) -> Option<&StatusColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Non-archived tasks of one column, ordered by position (id as a
    /// deterministic tiebreak for states that carry duplicates from a
    /// bulk flag flip).
    pub fn column_tasks(&self, status_id: &str) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| !task.archived && task.status_id == status_id)
            .collect();
        tasks.sort_by(|left, right| {
            left.position
                .cmp(&right.position)
                .then_with(|| left.id.cmp(&right.id))
        });
        tasks
    }

    /// Append position for a new or unarchived task: one past the highest
    /// occupied position, 0 for an empty column. Gaps left by bulk archive
    /// or deletion make this larger than the live count; that is fine, the
    /// next reindex closes them.
    pub fn next_position(&self, status_id: &str) -> u32 {
        self.tasks
            .iter()
            .filter(|task| !task.archived && task.status_id == status_id)
            .map(|task| task.position)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Edges whose blocked endpoint is `task_id` (what this task waits on).
    pub fn blockers_of(&self, task_id: &str) -> Vec<&TaskDependency> {
        self.dependencies
            .iter()
            .filter(|edge| edge.blocked_task_id == task_id)
            .collect()
    }

    /// Edges whose blocking endpoint is `task_id` (what waits on this task).
    pub fn blocking(&self, task_id: &str) -> Vec<&TaskDependency> {
        self.dependencies
            .iter()
            .filter(|edge| edge.blocking_task_id == task_id)
            .collect()
    }
}

/// Normalize a set-replacement list: trim, drop empties, sort, dedupe.
pub fn normalize_id_set(values: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = values
        .iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    normalized
}


#[cfg(test)]
mod tests {
    use super::testutil::sample_task;
    use super::*;

    fn sample_state() -> ProjectState {
        ProjectState::new(ProjectMeta {
            id: "prj-1".to_string(),
            name: "demo".to_string(),
            created_at: Utc::now(),
            created_by: None,
        })
    }

    #[test]
    fn column_tasks_ordered_and_excludes_archived() {
        let mut state = sample_state();
        state.tasks.push(sample_task("t-b", "col-1", 1));
        state.tasks.push(sample_task("t-a", "col-1", 0));
        let mut archived = sample_task("t-c", "col-1", 2);
        archived.archived = true;
        state.tasks.push(archived);
        state.tasks.push(sample_task("t-d", "col-2", 0));

        let ids: Vec<&str> = state
            .column_tasks("col-1")
            .iter()
            .map(|task| task.id.as_str())
            .collect();
        assert_eq!(ids, vec!["t-a", "t-b"]);
    }

    #[test]
    fn next_position_skips_archived_and_respects_gaps() {
        let mut state = sample_state();
        assert_eq!(state.next_position("col-1"), 0);

        state.tasks.push(sample_task("t-a", "col-1", 0));
        state.tasks.push(sample_task("t-b", "col-1", 4));
        let mut archived = sample_task("t-c", "col-1", 9);
        archived.archived = true;
        state.tasks.push(archived);

        assert_eq!(state.next_position("col-1"), 5);
    }

    #[test]
    fn priority_parse_is_case_insensitive() {
        assert_eq!(Priority::parse("URGENT").unwrap(), Priority::Urgent);
        assert_eq!(Priority::parse(" low ").unwrap(), Priority::Low);
        assert!(Priority::parse("p1").is_err());
    }

    #[test]
    fn normalize_id_set_sorts_and_dedupes() {
        let raw = vec![
            "bob".to_string(),
            " alice ".to_string(),
            "bob".to_string(),
            "".to_string(),
        ];
        assert_eq!(
            normalize_id_set(&raw),
            vec!["alice".to_string(), "bob".to_string()]
        );
    }
}
