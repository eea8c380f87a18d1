//! Position index: contiguous zero-based ordering within a status column.

use crate::error::{Error, Result};
use crate::model::Task;

/// A position write produced by [`reindex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionUpdate {
    pub task_id: String,
    pub position: u32,
}

/// Renumber `ordered` to `0..n-1`, preserving the given order.
///
/// Returns updates only for tasks whose stored position differs, so the
/// caller writes the minimum number of rows.
pub fn reindex(ordered: &[&Task]) -> Vec<PositionUpdate> {
    ordered
        .iter()
        .enumerate()
        .filter(|(index, task)| task.position != *index as u32)
        .map(|(index, task)| PositionUpdate {
            task_id: task.id.clone(),
            position: index as u32,
        })
        .collect()
}

/// Check that `positions` is exactly `{0, 1, ..., n-1}`.
///
/// Called after every write-path reindex; a failure means a logic defect in
/// the caller, so it aborts the transaction rather than self-healing.
pub fn verify_contiguous(status_id: &str, positions: &[u32]) -> Result<()> {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    for (index, position) in sorted.iter().enumerate() {
        if *position != index as u32 {
            return Err(Error::Invariant(format!(
                "positions in column {status_id} are not contiguous: expected {index}, found {position}"
            )));
        }
    }
    Ok(())
}
