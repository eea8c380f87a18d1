//! Actor identity.
//!
//! The permission layer in front of this engine resolves who is acting and
//! with which role; the engine trusts the pair and only records it.
//!
//! Resolution order:
//! 1) CLI --actor / --role (explicit)
//! 2) BORD_ACTOR / BORD_ROLE environment variables
//! 3) Config default (actor.default); role falls back to member

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};

/// Caller role, as decided by the permission collaborator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Member,
    Viewer,
}

impl Role {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            "viewer" => Ok(Role::Viewer),
            _ => Err(Error::InvalidArgument(format!(
                "unknown role '{trimmed}' (expected admin|member|viewer)"
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Member => "member",
            Role::Viewer => "viewer",
        };
        f.write_str(name)
    }
}

/// The acting identity attached to every mutation.
#[derive(Debug, Clone, Serialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

/// Resolve the current actor from CLI flags, environment, and config.
pub fn resolve_actor(
    root: Option<&Path>,
    cli_actor: Option<&str>,
    cli_role: Option<&str>,
) -> Result<Actor> {
    let id = resolve_actor_id(root, cli_actor);
    let role = resolve_role(cli_role)?;
    Ok(Actor { id, role })
}

fn resolve_actor_id(root: Option<&Path>, cli_actor: Option<&str>) -> String {
    if let Some(actor) = non_empty(cli_actor) {
        return actor.to_string();
    }

    if let Ok(env_actor) = std::env::var("BORD_ACTOR") {
        if let Some(actor) = non_empty(Some(env_actor.as_str())) {
            return actor.to_string();
        }
    }

    if let Some(root) = root {
        return Config::load_from_dir(root).actor.default;
    }

    "unknown".to_string()
}

fn resolve_role(cli_role: Option<&str>) -> Result<Role> {
    if let Some(role) = non_empty(cli_role) {
        return Role::parse(role);
    }

    if let Ok(env_role) = std::env::var("BORD_ROLE") {
        if let Some(role) = non_empty(Some(env_role.as_str())) {
            return Role::parse(role);
        }
    }

    Ok(Role::default())
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
