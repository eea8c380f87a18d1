//! bord column command implementations.

use std::path::PathBuf;

use clap::Subcommand;

use crate::actor;
use crate::board::Board;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(Subcommand, Debug)]
pub enum ColumnCommands {
    /// Add a status column at the end of a project's board
    New {
        /// Project id or name
        project: String,

        /// Column name (unique per project)
        name: String,

        /// Mark as a completion column (blocked tasks moved here warn)
        #[arg(long)]
        completion: bool,
    },

    /// List a project's columns in order
    List {
        /// Project id or name
        project: String,
    },
}

pub fn run(
    command: ColumnCommands,
    data_dir: Option<PathBuf>,
    cli_actor: Option<&str>,
    cli_role: Option<&str>,
    options: OutputOptions,
) -> Result<()> {
    let root = super::discover_root(data_dir)?;
    let board = Board::open(root.clone());

    match command {
        ColumnCommands::New {
            project,
            name,
            completion,
        } => {
            let actor = actor::resolve_actor(Some(&root), cli_actor, cli_role)?;
            let project_id = board.resolve_project(&project)?;
            let column = board.create_column(&project_id, &name, completion, &actor)?;

            let mut human = HumanOutput::new(format!("Created column {}", column.id));
            human.push_summary("name", &column.name);
            human.push_summary("position", column.position.to_string());
            if column.is_completion {
                human.push_summary("completion", "yes");
            }
            emit_success(options, "column new", &column, Some(&human))
        }
        ColumnCommands::List { project } => {
            let project_id = board.resolve_project(&project)?;
            let columns = board.columns(&project_id)?;

            let mut human = HumanOutput::new(format!("{} column(s)", columns.len()));
            for column in &columns {
                let marker = if column.is_completion { " (completion)" } else { "" };
                human.push_detail(format!(
                    "{}  {}  {}{}",
                    column.position, column.id, column.name, marker
                ));
            }
            emit_success(options, "column list", &columns, Some(&human))
        }
    }
}
