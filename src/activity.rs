//! Activity log collaborator.
//!
//! The engine appends semantic events through the [`ActivityRecorder`] trait
//! as part of each transaction; it does not own the log's read side. Entries
//! are emitted as JSON lines, one per record, with the details typed per
//! action kind.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const ACTIVITY_SCHEMA_VERSION: &str = "bord.activity.v1";

/// Typed payload per action kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", content = "details", rename_all = "snake_case")]
pub enum ActivityDetails {
    TaskCreated {
        status_id: String,
    },
    StatusChanged {
        from: String,
        to: String,
    },
    Archived,
    Unarchived,
    Deleted,
    BulkUpdated {
        fields: Vec<String>,
    },
    /// Blocking titles are captured at write time so the log stays readable
    /// after a rename or deletion.
    DependencyAdded {
        blocking_id: String,
        blocking_title: String,
    },
    DependencyRemoved {
        blocking_id: String,
        blocking_title: String,
    },
}

/// One appended activity record, keyed by task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub schema_version: String,
    pub task_id: String,
    pub actor_id: String,
    #[serde(flatten)]
    pub details: ActivityDetails,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        task_id: impl Into<String>,
        actor_id: impl Into<String>,
        details: ActivityDetails,
    ) -> Self {
        Self {
            schema_version: ACTIVITY_SCHEMA_VERSION.to_string(),
            task_id: task_id.into(),
            actor_id: actor_id.into(),
            details,
            created_at: Utc::now(),
        }
    }
}

/// Append-only sink the engine writes activity through.
pub trait ActivityRecorder {
    fn append(&mut self, entry: &ActivityEntry) -> Result<()>;
}

/// JSONL-backed recorder, one file per project.
#[derive(Debug, Clone)]
pub struct JsonlActivityLog {
    path: PathBuf,
}

impl JsonlActivityLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read every entry, oldest first. Not part of the recorder contract;
    /// used by the CLI for display.
    pub fn read_all(&self) -> Result<Vec<ActivityEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }
        Ok(entries)
    }
}

impl ActivityRecorder for JsonlActivityLog {
    fn append(&mut self, entry: &ActivityEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(entry)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", json)?;
        file.sync_all()?;
        Ok(())
    }
}

/// In-memory recorder for tests.
#[derive(Debug, Default)]
pub struct MemoryActivityLog {
    pub entries: Vec<ActivityEntry>,
}

impl ActivityRecorder for MemoryActivityLog {
    fn append(&mut self, entry: &ActivityEntry) -> Result<()> {
        self.entries.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn jsonl_roundtrip_preserves_typed_details() {
        let dir = TempDir::new().unwrap();
        let mut log = JsonlActivityLog::new(dir.path().join("activity.jsonl"));

        log.append(&ActivityEntry::new(
            "t-a",
            "alice",
            ActivityDetails::StatusChanged {
                from: "col-1".to_string(),
                to: "col-2".to_string(),
            },
        ))
        .unwrap();
        log.append(&ActivityEntry::new(
            "t-a",
            "alice",
            ActivityDetails::DependencyAdded {
                blocking_id: "t-b".to_string(),
                blocking_title: "Ship schema".to_string(),
            },
        ))
        .unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].details,
            ActivityDetails::StatusChanged {
                from: "col-1".to_string(),
                to: "col-2".to_string(),
            }
        );
        assert_eq!(entries[1].actor_id, "alice");
    }

    #[test]
    fn action_tag_is_snake_case() {
        let entry = ActivityEntry::new("t-a", "alice", ActivityDetails::Archived);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"action\":\"archived\""));
        assert!(!json.contains("\"details\""));
    }

    #[test]
    fn read_all_of_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = JsonlActivityLog::new(dir.path().join("missing.jsonl"));
        assert!(log.read_all().unwrap().is_empty());
    }
}
