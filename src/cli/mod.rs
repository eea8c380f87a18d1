//! Command-line interface for bord
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::error::Result;

mod activity;
mod column;
mod dep;
mod init;
mod project;
mod task;

/// Directory holding a board next to the work it tracks.
pub const LOCAL_DIR: &str = ".bord";

/// bord - task boards with ordered columns and dependency tracking
///
/// Maintains gap-free task ordering per status column and an acyclic
/// "blocks" graph per project, with an activity log of every change.
#[derive(Parser, Debug)]
#[command(name = "bord")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Board data directory (defaults to the nearest .bord, then the
    /// user-level board)
    #[arg(long, global = true, env = "BORD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Actor identity recorded on mutations
    #[arg(long, global = true, env = "BORD_ACTOR")]
    pub actor: Option<String>,

    /// Caller role as decided by the permission layer: admin, member, viewer
    #[arg(long, global = true, env = "BORD_ROLE")]
    pub role: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a board in the current directory
    Init,

    /// Project management
    #[command(subcommand)]
    Project(project::ProjectCommands),

    /// Status column management
    #[command(subcommand)]
    Column(column::ColumnCommands),

    /// Task management
    #[command(subcommand)]
    Task(task::TaskCommands),

    /// Dependency management
    #[command(subcommand)]
    Dep(dep::DepCommands),

    /// Show the activity log of a project
    Activity {
        /// Project id or name
        project: String,

        /// Only entries for this task
        #[arg(long)]
        task: Option<String>,

        /// Show at most this many entries, newest last
        #[arg(long)]
        limit: Option<usize>,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let options = crate::output::OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Init => init::run(self.data_dir, options),
            Commands::Project(command) => project::run(
                command,
                self.data_dir,
                self.actor.as_deref(),
                self.role.as_deref(),
                options,
            ),
            Commands::Column(command) => column::run(
                command,
                self.data_dir,
                self.actor.as_deref(),
                self.role.as_deref(),
                options,
            ),
            Commands::Task(command) => task::run(
                command,
                self.data_dir,
                self.actor.as_deref(),
                self.role.as_deref(),
                options,
            ),
            Commands::Dep(command) => dep::run(
                command,
                self.data_dir,
                self.actor.as_deref(),
                self.role.as_deref(),
                options,
            ),
            Commands::Activity {
                project,
                task,
                limit,
            } => activity::run(project, task, limit, self.data_dir, options),
        }
    }
}

/// Locate the board root: explicit flag, nearest `.bord` walking up from the
/// current directory, then the user-level board directory.
pub fn discover_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }

    let cwd = std::env::current_dir()?;
    for ancestor in cwd.ancestors() {
        let candidate = ancestor.join(LOCAL_DIR);
        if candidate.join("projects.json").exists() {
            return Ok(candidate);
        }
    }

    if let Some(dirs) = ProjectDirs::from("dev", "bord", "bord") {
        return Ok(dirs.data_dir().to_path_buf());
    }

    Ok(cwd.join(LOCAL_DIR))
}

/// Root for `init`: explicit flag or `./.bord`.
pub fn init_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    Ok(std::env::current_dir()?.join(LOCAL_DIR))
}
