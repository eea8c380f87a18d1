//! bord dep command implementations.

use std::path::PathBuf;

use clap::Subcommand;
use uuid::Uuid;

use crate::actor;
use crate::board::Board;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(Subcommand, Debug)]
pub enum DepCommands {
    /// Record that a task is blocked by another
    Add {
        /// Project id or name
        project: String,

        /// The task that is blocked
        blocked: String,

        /// The task that blocks it
        blocking: String,
    },

    /// Remove a dependency edge
    Rm {
        /// Project id or name
        project: String,

        /// The blocked task the edge belongs to
        blocked: String,

        /// Edge id (from `bord dep list`)
        edge: String,
    },

    /// List a project's dependency edges
    List {
        /// Project id or name
        project: String,
    },
}

pub fn run(
    command: DepCommands,
    data_dir: Option<PathBuf>,
    cli_actor: Option<&str>,
    cli_role: Option<&str>,
    options: OutputOptions,
) -> Result<()> {
    let root = super::discover_root(data_dir)?;
    let board = Board::open(root.clone());

    match command {
        DepCommands::Add {
            project,
            blocked,
            blocking,
        } => {
            let actor = actor::resolve_actor(Some(&root), cli_actor, cli_role)?;
            let project_id = board.resolve_project(&project)?;
            let edge = board.add_dependency(&project_id, &blocked, &blocking, &actor)?;

            let mut human = HumanOutput::new(format!(
                "Task {} is now blocked by {}",
                edge.blocked_task_id, edge.blocking_task_id
            ));
            human.push_summary("edge", edge.id.to_string());
            emit_success(options, "dep add", &edge, Some(&human))
        }
        DepCommands::Rm {
            project,
            blocked,
            edge,
        } => {
            let actor = actor::resolve_actor(Some(&root), cli_actor, cli_role)?;
            let project_id = board.resolve_project(&project)?;
            let edge_id = Uuid::parse_str(edge.trim()).map_err(|_| {
                Error::InvalidArgument(format!("invalid edge id '{edge}'"))
            })?;
            let blocking_id = board.remove_dependency(&project_id, &blocked, edge_id, &actor)?;

            #[derive(serde::Serialize)]
            struct RemoveReport {
                edge_id: Uuid,
                blocking_task_id: String,
            }

            let human = HumanOutput::new(format!("Removed dependency on {blocking_id}"));
            emit_success(
                options,
                "dep rm",
                &RemoveReport {
                    edge_id,
                    blocking_task_id: blocking_id,
                },
                Some(&human),
            )
        }
        DepCommands::List { project } => {
            let project_id = board.resolve_project(&project)?;
            let edges = board.dependencies(&project_id)?;

            let mut human = HumanOutput::new(format!("{} dependency edge(s)", edges.len()));
            for edge in &edges {
                human.push_detail(format!(
                    "{}  \"{}\" blocked by \"{}\"",
                    edge.id, edge.blocked_title, edge.blocking_title
                ));
            }
            emit_success(options, "dep list", &edges, Some(&human))
        }
    }
}
