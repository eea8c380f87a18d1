//! bord project command implementations.

use std::path::PathBuf;

use clap::Subcommand;

use crate::actor;
use crate::board::Board;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    New {
        /// Project name (unique per board)
        name: String,
    },

    /// List projects
    List,
}

pub fn run(
    command: ProjectCommands,
    data_dir: Option<PathBuf>,
    cli_actor: Option<&str>,
    cli_role: Option<&str>,
    options: OutputOptions,
) -> Result<()> {
    let root = super::discover_root(data_dir)?;
    let board = Board::open(root.clone());

    match command {
        ProjectCommands::New { name } => {
            let actor = actor::resolve_actor(Some(&root), cli_actor, cli_role)?;
            let meta = board.create_project(&name, &actor)?;

            let mut human = HumanOutput::new(format!("Created project {}", meta.id));
            human.push_summary("name", &meta.name);
            human.push_detail("next: bord column new <project> <name>");
            emit_success(options, "project new", &meta, Some(&human))
        }
        ProjectCommands::List => {
            let projects = board.list_projects()?;

            let mut human = HumanOutput::new(format!("{} project(s)", projects.len()));
            for entry in &projects {
                human.push_detail(format!("{}  {}", entry.id, entry.name));
            }
            emit_success(options, "project list", &projects, Some(&human))
        }
    }
}
