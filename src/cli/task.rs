//! bord task command implementations.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;

use crate::actor;
use crate::board::{Board, NewTask};
use crate::bulk::BulkPatch;
use crate::error::{Error, Result};
use crate::model::Priority;
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task at the end of a column
    New {
        /// Project id or name
        project: String,

        /// Task title
        title: String,

        /// Target column (defaults to the first column)
        #[arg(long)]
        status: Option<String>,

        /// Priority: none, low, medium, high, urgent
        #[arg(long)]
        priority: Option<String>,

        /// Longer description
        #[arg(long)]
        description: Option<String>,

        /// Assignee user id (repeatable)
        #[arg(long = "assignee")]
        assignees: Vec<String>,

        /// Label id (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,

        /// Start date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        start: Option<String>,
    },

    /// Move a task within or across columns
    Move {
        /// Project id or name
        project: String,

        /// Task id (or unique prefix)
        id: String,

        /// Target column id or name
        #[arg(long)]
        to: String,

        /// Target index in the column; past-the-end appends (default)
        #[arg(long)]
        at: Option<usize>,
    },

    /// Archive a task and close the gap it leaves
    Archive {
        /// Project id or name
        project: String,

        /// Task id (or unique prefix)
        id: String,
    },

    /// Unarchive a task at the end of its column
    Unarchive {
        /// Project id or name
        project: String,

        /// Task id (or unique prefix)
        id: String,
    },

    /// Delete a task and its dependency edges
    Delete {
        /// Project id or name
        project: String,

        /// Task id (or unique prefix)
        id: String,
    },

    /// Show one task with its dependencies
    Show {
        /// Project id or name
        project: String,

        /// Task id (or unique prefix)
        id: String,
    },

    /// List a project's board, column by column
    List {
        /// Project id or name
        project: String,

        /// Only this column
        #[arg(long)]
        column: Option<String>,
    },

    /// Apply one change to several tasks at once
    Bulk {
        /// Project id or name
        project: String,

        /// Task ids
        #[arg(required = true)]
        ids: Vec<String>,

        /// Set the status column
        #[arg(long)]
        status: Option<String>,

        /// Set the priority
        #[arg(long)]
        priority: Option<String>,

        /// Replace assignees (comma separated; empty clears)
        #[arg(long)]
        assignees: Option<String>,

        /// Replace labels (comma separated; empty clears)
        #[arg(long)]
        labels: Option<String>,

        /// Archive the tasks (positions are left as-is; see docs)
        #[arg(long, conflicts_with = "unarchive")]
        archive: bool,

        /// Unarchive the tasks
        #[arg(long)]
        unarchive: bool,

        /// Set the due date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        due: Option<String>,

        /// Set the start date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        start: Option<String>,
    },
}

pub fn run(
    command: TaskCommands,
    data_dir: Option<PathBuf>,
    cli_actor: Option<&str>,
    cli_role: Option<&str>,
    options: OutputOptions,
) -> Result<()> {
    let root = super::discover_root(data_dir)?;
    let board = Board::open(root.clone());

    match command {
        TaskCommands::New {
            project,
            title,
            status,
            priority,
            description,
            assignees,
            labels,
            due,
            start,
        } => {
            let actor = actor::resolve_actor(Some(&root), cli_actor, cli_role)?;
            let project_id = board.resolve_project(&project)?;
            let new = NewTask {
                title,
                status_id: status,
                description,
                priority: match priority.as_deref() {
                    Some(raw) => Priority::parse(raw)?,
                    None => Priority::None,
                },
                assignees,
                labels,
                due_date: parse_date(due.as_deref())?,
                start_date: parse_date(start.as_deref())?,
            };
            let task = board.create_task(&project_id, new, &actor)?;

            let mut human = HumanOutput::new(format!("Created task {}", task.id));
            human.push_summary("title", &task.title);
            human.push_summary("column", &task.status_id);
            human.push_summary("position", task.position.to_string());
            emit_success(options, "task new", &task, Some(&human))
        }
        TaskCommands::Move {
            project,
            id,
            to,
            at,
        } => {
            let actor = actor::resolve_actor(Some(&root), cli_actor, cli_role)?;
            let project_id = board.resolve_project(&project)?;
            let index = at.unwrap_or(usize::MAX);
            let outcome = board.move_task(&project_id, &id, &to, index, &actor)?;

            let mut human = HumanOutput::new(format!("Moved task {}", outcome.task.id));
            human.push_summary("column", &outcome.task.status_id);
            human.push_summary("position", outcome.task.position.to_string());
            if let Some(warning) = &outcome.warning {
                human.push_warning(warning.clone());
            }
            emit_success(options, "task move", &outcome, Some(&human))
        }
        TaskCommands::Archive { project, id } => {
            let actor = actor::resolve_actor(Some(&root), cli_actor, cli_role)?;
            let project_id = board.resolve_project(&project)?;
            let task = board.archive_task(&project_id, &id, &actor)?;

            let human = HumanOutput::new(format!("Archived task {}", task.id));
            emit_success(options, "task archive", &task, Some(&human))
        }
        TaskCommands::Unarchive { project, id } => {
            let actor = actor::resolve_actor(Some(&root), cli_actor, cli_role)?;
            let project_id = board.resolve_project(&project)?;
            let task = board.unarchive_task(&project_id, &id, &actor)?;

            let mut human = HumanOutput::new(format!("Unarchived task {}", task.id));
            human.push_summary("column", &task.status_id);
            human.push_summary("position", task.position.to_string());
            emit_success(options, "task unarchive", &task, Some(&human))
        }
        TaskCommands::Delete { project, id } => {
            let actor = actor::resolve_actor(Some(&root), cli_actor, cli_role)?;
            let project_id = board.resolve_project(&project)?;
            let task = board.delete_task(&project_id, &id, &actor)?;

            let human = HumanOutput::new(format!("Deleted task {}", task.id));
            emit_success(options, "task delete", &task, Some(&human))
        }
        TaskCommands::Show { project, id } => {
            let project_id = board.resolve_project(&project)?;
            let details = board.task_details(&project_id, &id)?;

            let mut human = HumanOutput::new(format!(
                "{}  {}",
                details.task.id, details.task.title
            ));
            human.push_summary("column", &details.task.status_id);
            human.push_summary("position", details.task.position.to_string());
            human.push_summary("priority", details.task.priority.as_str());
            if details.task.archived {
                human.push_summary("archived", "yes");
            }
            for blocker in &details.blocked_by {
                human.push_detail(format!(
                    "blocked by {}  {}",
                    blocker.task_id, blocker.title
                ));
            }
            for blocked in &details.blocks {
                human.push_detail(format!("blocks {}  {}", blocked.task_id, blocked.title));
            }
            emit_success(options, "task show", &details, Some(&human))
        }
        TaskCommands::List { project, column } => {
            let project_id = board.resolve_project(&project)?;
            let mut view = board.board_view(&project_id)?;
            if let Some(reference) = column {
                let column_id = board.resolve_column(&project_id, &reference)?;
                view.columns.retain(|entry| entry.column.id == column_id);
            }

            let mut human = HumanOutput::new(format!("Board for {}", view.project.name));
            for entry in &view.columns {
                human.push_detail(format!(
                    "{} ({} task(s))",
                    entry.column.name,
                    entry.tasks.len()
                ));
                for task in &entry.tasks {
                    human.push_detail(format!(
                        "  {}  {}  {}",
                        task.position, task.id, task.title
                    ));
                }
            }
            emit_success(options, "task list", &view, Some(&human))
        }
        TaskCommands::Bulk {
            project,
            ids,
            status,
            priority,
            assignees,
            labels,
            archive,
            unarchive,
            due,
            start,
        } => {
            let actor = actor::resolve_actor(Some(&root), cli_actor, cli_role)?;
            let project_id = board.resolve_project(&project)?;

            let status_id = match status.as_deref() {
                Some(reference) => Some(board.resolve_column(&project_id, reference)?),
                None => None,
            };
            let patch = BulkPatch {
                status_id,
                priority: match priority.as_deref() {
                    Some(raw) => Some(Priority::parse(raw)?),
                    None => None,
                },
                assignees: assignees.as_deref().map(parse_id_list),
                labels: labels.as_deref().map(parse_id_list),
                archived: if archive {
                    Some(true)
                } else if unarchive {
                    Some(false)
                } else {
                    None
                },
                due_date: parse_date(due.as_deref())?,
                start_date: parse_date(start.as_deref())?,
            };

            let count = board.bulk_update(&project_id, &ids, patch, &actor)?;

            #[derive(serde::Serialize)]
            struct BulkReport {
                updated: usize,
            }

            let human = HumanOutput::new(format!("Updated {count} task(s)"));
            emit_success(
                options,
                "task bulk",
                &BulkReport { updated: count },
                Some(&human),
            )
        }
    }
}

/// Parse `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
fn parse_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(timestamp.with_timezone(&Utc)));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        Error::InvalidArgument(format!(
            "invalid date '{raw}' (expected YYYY-MM-DD or RFC 3339)"
        ))
    })?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
        Error::InvalidArgument(format!("invalid date '{raw}'"))
    })?;
    Ok(Some(DateTime::from_naive_utc_and_offset(midnight, Utc)))
}

fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
