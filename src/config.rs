//! Configuration loading and management
//!
//! Handles parsing of `.bord.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = ".bord.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Actor configuration
    #[serde(default)]
    pub actor: ActorConfig,

    /// Board configuration
    #[serde(default)]
    pub board: BoardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            actor: ActorConfig::default(),
            board: BoardConfig::default(),
        }
    }
}

/// Actor-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Default actor id when none is supplied
    #[serde(default = "default_actor")]
    pub default: String,
}

fn default_actor() -> String {
    "unknown".to_string()
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            default: default_actor(),
        }
    }
}

/// Board-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Task id prefix
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// Minimum task id suffix length
    #[serde(default = "default_id_min_len")]
    pub id_min_len: usize,

    /// Lock acquisition timeout in milliseconds
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Warn when a task moved into a completion column is still blocked
    #[serde(default = "default_true")]
    pub warn_blocked_completion: bool,
}

fn default_id_prefix() -> String {
    "bd".to_string()
}

fn default_id_min_len() -> usize {
    4
}

fn default_lock_timeout_ms() -> u64 {
    crate::lock::DEFAULT_LOCK_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            id_prefix: default_id_prefix(),
            id_min_len: default_id_min_len(),
            lock_timeout_ms: default_lock_timeout_ms(),
            warn_blocked_completion: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from a `.bord.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a board root, or return defaults
    pub fn load_from_dir(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path of the config file under a board root
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    fn validate(&self) -> Result<()> {
        self.board.validate()
    }
}

impl BoardConfig {
    fn validate(&self) -> Result<()> {
        let prefix = self.id_prefix.trim();
        if prefix.is_empty() {
            return Err(Error::InvalidConfig(
                "board.id_prefix cannot be empty".to_string(),
            ));
        }
        if !prefix.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(Error::InvalidConfig(
                "board.id_prefix must be alphanumeric".to_string(),
            ));
        }
        if self.id_min_len < 3 {
            return Err(Error::InvalidConfig(
                "board.id_min_len must be >= 3".to_string(),
            ));
        }
        if self.id_min_len > 16 {
            return Err(Error::InvalidConfig(
                "board.id_min_len must be <= 16".to_string(),
            ));
        }
        if self.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "board.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
