//! Error types for bord
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (missing entity, invalid input)
//! - 3: Conflict (duplicate dependency edge)
//! - 4: Operation failed (io, lock contention, broken invariant)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the bord CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const CONFLICT: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for bord operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Status column not found: {0}")]
    ColumnNotFound(String),

    #[error("Dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dependency of {blocked} on {blocking} would create a cycle")]
    DependencyCycle { blocked: String, blocking: String },

    // Conflicts (exit code 3)
    #[error("Dependency of {blocked} on {blocking} already exists")]
    DuplicateDependency { blocked: String, blocking: String },

    // Operation failures (exit code 4)
    #[error("Board not initialized at {0} (run `bord init`)")]
    NotInitialized(PathBuf),

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::ProjectNotFound(_)
            | Error::TaskNotFound(_)
            | Error::ColumnNotFound(_)
            | Error::DependencyNotFound(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::DependencyCycle { .. } => exit_codes::USER_ERROR,

            // Conflicts
            Error::DuplicateDependency { .. } => exit_codes::CONFLICT,

            // Operation failures
            Error::NotInitialized(_)
            | Error::Invariant(_)
            | Error::LockFailed(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error envelopes, where the variant carries
    /// more than its message.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::DependencyCycle { blocked, blocking }
            | Error::DuplicateDependency { blocked, blocking } => Some(serde_json::json!({
                "blocked_task_id": blocked,
                "blocking_task_id": blocking,
            })),
            _ => None,
        }
    }
}

/// Result type alias for bord operations
pub type Result<T> = std::result::Result<T, Error>;
