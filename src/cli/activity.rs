//! bord activity command implementation.
//!
//! The engine only appends to the activity log; reading it back for display
//! happens here, outside the core.

use std::path::PathBuf;

use crate::activity::ActivityDetails;
use crate::board::Board;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub fn run(
    project: String,
    task: Option<String>,
    limit: Option<usize>,
    data_dir: Option<PathBuf>,
    options: OutputOptions,
) -> Result<()> {
    let root = super::discover_root(data_dir)?;
    let board = Board::open(root);
    let project_id = board.resolve_project(&project)?;

    let mut entries = board.store().activity_log(&project_id).read_all()?;
    if let Some(reference) = task {
        let task_id = board.resolve_task(&project_id, &reference)?;
        entries.retain(|entry| entry.task_id == task_id);
    }
    if let Some(limit) = limit {
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
    }

    let mut human = HumanOutput::new(format!("{} activity entr(ies)", entries.len()));
    for entry in &entries {
        human.push_detail(format!(
            "{}  {}  {}  {}",
            entry.created_at.to_rfc3339(),
            entry.task_id,
            entry.actor_id,
            describe(&entry.details)
        ));
    }
    emit_success(options, "activity", &entries, Some(&human))
}

fn describe(details: &ActivityDetails) -> String {
    match details {
        ActivityDetails::TaskCreated { status_id } => format!("created in {status_id}"),
        ActivityDetails::StatusChanged { from, to } => format!("moved {from} -> {to}"),
        ActivityDetails::Archived => "archived".to_string(),
        ActivityDetails::Unarchived => "unarchived".to_string(),
        ActivityDetails::Deleted => "deleted".to_string(),
        ActivityDetails::BulkUpdated { fields } => {
            format!("bulk updated ({})", fields.join(", "))
        }
        ActivityDetails::DependencyAdded { blocking_title, .. } => {
            format!("blocked by \"{blocking_title}\"")
        }
        ActivityDetails::DependencyRemoved { blocking_title, .. } => {
            format!("no longer blocked by \"{blocking_title}\"")
        }
    }
}
