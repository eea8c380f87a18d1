//! bord init command implementation
//!
//! Creates the board data directory, an empty project registry, and a
//! default configuration file.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::store::Store;

#[derive(serde::Serialize)]
struct InitReport {
    root: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    registry: bool,
    config: bool,
}

pub fn run(data_dir: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let root = super::init_root(data_dir)?;

    let config = Config::load_from_dir(&root);
    let store = Store::new(root.clone(), config.board.lock_timeout_ms);

    let created_registry = !store.is_initialized();
    store.init()?;

    let config_path = Config::path_in(&root);
    let created_config = !config_path.exists();
    if created_config {
        config.save(&config_path)?;
    }

    let report = InitReport {
        root: root.clone(),
        created: InitCreated {
            registry: created_registry,
            config: created_config,
        },
    };

    let mut human = HumanOutput::new(format!("Board ready at {}", root.display()));
    human.push_summary(
        "registry",
        if created_registry { "created" } else { "exists" },
    );
    human.push_summary("config", if created_config { "created" } else { "exists" });
    human.push_detail("next: bord project new <name>");

    emit_success(options, "init", &report, Some(&human))
}
