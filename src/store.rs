//! Storage layer for bord.
//!
//! One board root holds a project registry and one directory per project:
//!
//! ```text
//! <root>/
//!   .bord.toml                  # Optional configuration
//!   projects.json               # Registry of projects (locked updates)
//!   projects/
//!     <project-id>/
//!       board.json              # Columns, tasks, dependency edges
//!       board.json.lock         # flock guard for transactions
//!       activity.jsonl          # Append-only activity log
//! ```
//!
//! `board.json` is only ever replaced atomically while holding the project's
//! lock, so every mutation is a transaction: concurrent readers observe the
//! pre- or post-state, never a torn document, and concurrent writers are
//! serialized per project.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::activity::{ActivityEntry, ActivityRecorder, JsonlActivityLog};
use crate::error::{Error, Result};
use crate::ids;
use crate::lock::{self, FileLock};
use crate::model::{ProjectMeta, ProjectState};

const PROJECTS_DIR: &str = "projects";
const REGISTRY_FILE: &str = "projects.json";
const BOARD_FILE: &str = "board.json";
const ACTIVITY_FILE: &str = "activity.jsonl";

/// Storage manager for one board root.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
    lock_timeout_ms: u64,
}

impl Store {
    pub fn new(root: PathBuf, lock_timeout_ms: u64) -> Self {
        Self {
            root,
            lock_timeout_ms,
        }
    }

    // =========================================================================
    // Path accessors
    // =========================================================================

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join(PROJECTS_DIR)
    }

    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.projects_dir().join(project_id)
    }

    pub fn board_file(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join(BOARD_FILE)
    }

    pub fn activity_file(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join(ACTIVITY_FILE)
    }

    pub fn registry_file(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Create the board directory structure and an empty registry.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.projects_dir())?;
        let registry_file = self.registry_file();
        if !registry_file.exists() {
            self.write_json(&registry_file, &ProjectRegistry::default())?;
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.registry_file().exists()
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized(self.root.clone()))
        }
    }

    // =========================================================================
    // File I/O helpers
    // =========================================================================

    fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        lock::write_atomic(path, json.as_bytes())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    // =========================================================================
    // Project registry
    // =========================================================================

    /// Register a new project and write its empty board document.
    pub fn create_project(&self, name: &str, actor_id: &str) -> Result<ProjectMeta> {
        self.ensure_initialized()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "project name cannot be empty".to_string(),
            ));
        }

        let meta = ProjectMeta {
            id: ids::project_id(),
            name: name.to_string(),
            created_at: Utc::now(),
            created_by: Some(actor_id.to_string()),
        };

        self.update_registry(|registry| {
            if registry.projects.iter().any(|entry| entry.name == meta.name) {
                return Err(Error::InvalidArgument(format!(
                    "project already exists: {}",
                    meta.name
                )));
            }
            registry.projects.push(ProjectEntry {
                id: meta.id.clone(),
                name: meta.name.clone(),
                created_at: meta.created_at,
            });
            Ok(())
        })?;

        let state = ProjectState::new(meta.clone());
        self.write_json(&self.board_file(&meta.id), &state)?;
        debug!(project = %meta.id, name = %meta.name, "project created");
        Ok(meta)
    }

    pub fn list_projects(&self) -> Result<Vec<ProjectEntry>> {
        self.ensure_initialized()?;
        let registry: ProjectRegistry = self.read_json(&self.registry_file())?;
        Ok(registry.projects)
    }

    /// Resolve a project reference: exact id first, then unique name.
    pub fn resolve_project(&self, input: &str) -> Result<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument(
                "project reference cannot be empty".to_string(),
            ));
        }

        let projects = self.list_projects()?;
        if let Some(entry) = projects.iter().find(|entry| entry.id == trimmed) {
            return Ok(entry.id.clone());
        }

        let by_name: Vec<&ProjectEntry> = projects
            .iter()
            .filter(|entry| entry.name == trimmed)
            .collect();
        match by_name.as_slice() {
            [] => Err(Error::ProjectNotFound(trimmed.to_string())),
            [entry] => Ok(entry.id.clone()),
            many => Err(Error::InvalidArgument(format!(
                "ambiguous project name '{}': {}",
                trimmed,
                many.iter()
                    .map(|entry| entry.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    fn update_registry<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut ProjectRegistry) -> Result<T>,
    {
        let path = self.registry_file();
        let _lock = FileLock::acquire(lock::lock_path(&path), self.lock_timeout_ms)?;

        let mut registry = if path.exists() {
            self.read_json(&path)?
        } else {
            ProjectRegistry::default()
        };

        let result = f(&mut registry)?;
        self.write_json(&path, &registry)?;
        Ok(result)
    }

    // =========================================================================
    // Project state transactions
    // =========================================================================

    /// Read a project's board document.
    ///
    /// No lock: the atomic replace in [`Store::update_project`] keeps plain
    /// reads consistent.
    pub fn load_project(&self, project_id: &str) -> Result<ProjectState> {
        let path = self.board_file(project_id);
        if !path.exists() {
            return Err(Error::ProjectNotFound(project_id.to_string()));
        }
        self.read_json(&path)
    }

    /// Run one transaction against a project's board.
    ///
    /// Takes the project lock, loads the state, applies `f`, atomically
    /// replaces the document, then flushes the activity entries `f` staged to
    /// the recorder while the lock is still held. An error from `f` leaves
    /// the document untouched.
    pub fn update_project<T, F>(
        &self,
        project_id: &str,
        recorder: &mut dyn ActivityRecorder,
        f: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut ProjectState, &mut Vec<ActivityEntry>) -> Result<T>,
    {
        let path = self.board_file(project_id);
        if !path.exists() {
            return Err(Error::ProjectNotFound(project_id.to_string()));
        }

        let _lock = FileLock::acquire(lock::lock_path(&path), self.lock_timeout_ms)?;

        let mut state: ProjectState = self.read_json(&path)?;
        let mut entries: Vec<ActivityEntry> = Vec::new();
        let result = f(&mut state, &mut entries)?;

        self.write_json(&path, &state)?;
        debug!(project = %project_id, activity = entries.len(), "transaction committed");

        for entry in &entries {
            recorder.append(entry)?;
        }

        Ok(result)
    }

    /// Default activity recorder for a project.
    pub fn activity_log(&self, project_id: &str) -> JsonlActivityLog {
        JsonlActivityLog::new(self.activity_file(project_id))
    }
}

/// Registry of all projects under a board root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRegistry {
    pub projects: Vec<ProjectEntry>,
}

/// Entry for a single project in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::MemoryActivityLog;
    use crate::model::testutil::sample_task;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> Store {
        let store = Store::new(dir.path().to_path_buf(), 1000);
        store.init().unwrap();
        store
    }

    #[test]
    fn init_creates_registry_and_dirs() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().to_path_buf(), 1000);
        assert!(!store.is_initialized());

        store.init().unwrap();
        assert!(store.is_initialized());
        assert!(store.projects_dir().exists());
        assert!(store.registry_file().exists());
    }

    #[test]
    fn create_project_registers_and_writes_board() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let meta = store.create_project("alpha", "alice").unwrap();
        assert!(store.board_file(&meta.id).exists());

        let listed = store.list_projects().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "alpha");

        let state = store.load_project(&meta.id).unwrap();
        assert_eq!(state.project.id, meta.id);
        assert!(state.tasks.is_empty());
    }

    #[test]
    fn duplicate_project_name_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.create_project("alpha", "alice").unwrap();
        let err = store.create_project("alpha", "bob").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(store.list_projects().unwrap().len(), 1);
    }

    #[test]
    fn resolve_project_by_id_and_name() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let meta = store.create_project("alpha", "alice").unwrap();
        assert_eq!(store.resolve_project(&meta.id).unwrap(), meta.id);
        assert_eq!(store.resolve_project("alpha").unwrap(), meta.id);
        assert!(matches!(
            store.resolve_project("missing"),
            Err(Error::ProjectNotFound(_))
        ));
    }

    #[test]
    fn failed_transaction_leaves_board_untouched() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let meta = store.create_project("alpha", "alice").unwrap();

        let before = fs::read_to_string(store.board_file(&meta.id)).unwrap();
        let mut recorder = MemoryActivityLog::default();

        let result: Result<()> = store.update_project(&meta.id, &mut recorder, |state, _| {
            // Mutate first, then fail: nothing may be committed.
            state.tasks.push(sample_task("t-a", "col-1", 0));
            Err(Error::Invariant("forced failure".to_string()))
        });
        assert!(matches!(result, Err(Error::Invariant(_))));

        let after = fs::read_to_string(store.board_file(&meta.id)).unwrap();
        assert_eq!(before, after);
        assert!(recorder.entries.is_empty());
    }

    #[test]
    fn committed_transaction_flushes_activity() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let meta = store.create_project("alpha", "alice").unwrap();

        let mut recorder = MemoryActivityLog::default();
        store
            .update_project(&meta.id, &mut recorder, |state, entries| {
                state.tasks.push(sample_task("t-a", "col-1", 0));
                entries.push(ActivityEntry::new(
                    "t-a",
                    "alice",
                    crate::activity::ActivityDetails::TaskCreated {
                        status_id: "col-1".to_string(),
                    },
                ));
                Ok(())
            })
            .unwrap();

        assert_eq!(recorder.entries.len(), 1);
        assert_eq!(store.load_project(&meta.id).unwrap().tasks.len(), 1);
    }

    #[test]
    fn unknown_project_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut recorder = MemoryActivityLog::default();

        let result: Result<()> =
            store.update_project("prj-missing", &mut recorder, |_, _| Ok(()));
        assert!(matches!(result, Err(Error::ProjectNotFound(_))));
    }
}
