//! Dependency graph: directed "blocks" edges with cycle rejection.
//!
//! An edge `(blocked, blocking)` means the blocking task must complete
//! before the blocked one is considered unblocked. Edges are scoped to one
//! project and the per-project graph stays acyclic: an insert that would
//! close a cycle is rejected before anything is written.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::activity::{ActivityDetails, ActivityEntry};
use crate::actor::Actor;
use crate::board::{resolve_task_in, Board};
use crate::error::{Error, Result};
use crate::model::{ProjectState, TaskDependency};

/// A dependency edge with both endpoint titles, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyView {
    pub id: Uuid,
    pub blocked_task_id: String,
    pub blocked_title: String,
    pub blocking_task_id: String,
    pub blocking_title: String,
}

impl Board {
    /// Add the edge "`blocked` is blocked by `blocking`".
    ///
    /// Validation runs cheapest-first: self-dependency, existence, duplicate,
    /// then the cycle check. Either both writes (edge plus activity entry)
    /// happen or neither does.
    pub fn add_dependency(
        &self,
        project_id: &str,
        blocked_ref: &str,
        blocking_ref: &str,
        actor: &Actor,
    ) -> Result<TaskDependency> {
        if blocked_ref.trim() == blocking_ref.trim() {
            return Err(Error::InvalidArgument(format!(
                "task {} cannot depend on itself",
                blocked_ref.trim()
            )));
        }

        let mut recorder = self.store().activity_log(project_id);
        self.store().update_project(project_id, &mut recorder, |state, entries| {
            let blocked_id = resolve_task_in(state, blocked_ref)?;
            let blocking_id = resolve_task_in(state, blocking_ref)?;

            // Two different references can still land on one task.
            if blocked_id == blocking_id {
                return Err(Error::InvalidArgument(format!(
                    "task {blocked_id} cannot depend on itself"
                )));
            }

            // Both endpoints exist in this project's document; that is the
            // same-project check.
            let blocking_title = state.task(&blocking_id)?.title.clone();
            state.task(&blocked_id)?;

            if state.dependencies.iter().any(|edge| {
                edge.blocked_task_id == blocked_id && edge.blocking_task_id == blocking_id
            }) {
                return Err(Error::DuplicateDependency {
                    blocked: blocked_id,
                    blocking: blocking_id,
                });
            }

            if would_create_cycle(state, &blocked_id, &blocking_id) {
                return Err(Error::DependencyCycle {
                    blocked: blocked_id,
                    blocking: blocking_id,
                });
            }

            let edge = TaskDependency {
                id: Uuid::new_v4(),
                blocked_task_id: blocked_id.clone(),
                blocking_task_id: blocking_id.clone(),
                created_at: Utc::now(),
                created_by: Some(actor.id.clone()),
            };
            state.dependencies.push(edge.clone());

            entries.push(ActivityEntry::new(
                &blocked_id,
                &actor.id,
                ActivityDetails::DependencyAdded {
                    blocking_id: blocking_id.clone(),
                    blocking_title,
                },
            ));
            debug!(
                project = %state.project.id,
                blocked = %blocked_id,
                blocking = %blocking_id,
                "dependency added"
            );
            Ok(edge)
        })
    }

    /// Remove an edge by id. The edge must belong to the task named as
    /// `blocked_ref`; this guards against deletion requests aimed at the
    /// wrong task. Returns the blocking task id.
    pub fn remove_dependency(
        &self,
        project_id: &str,
        blocked_ref: &str,
        edge_id: Uuid,
        actor: &Actor,
    ) -> Result<String> {
        let mut recorder = self.store().activity_log(project_id);
        self.store().update_project(project_id, &mut recorder, |state, entries| {
            let blocked_id = resolve_task_in(state, blocked_ref)?;

            let index = state
                .dependencies
                .iter()
                .position(|edge| edge.id == edge_id)
                .ok_or_else(|| Error::DependencyNotFound(edge_id.to_string()))?;
            if state.dependencies[index].blocked_task_id != blocked_id {
                return Err(Error::InvalidArgument(format!(
                    "dependency {edge_id} does not belong to task {blocked_id}"
                )));
            }

            let edge = state.dependencies.remove(index);
            let blocking_title = state
                .task(&edge.blocking_task_id)
                .map(|task| task.title.clone())
                .unwrap_or_default();

            entries.push(ActivityEntry::new(
                &blocked_id,
                &actor.id,
                ActivityDetails::DependencyRemoved {
                    blocking_id: edge.blocking_task_id.clone(),
                    blocking_title,
                },
            ));
            Ok(edge.blocking_task_id)
        })
    }

    /// Every edge of a project, with titles for display.
    pub fn dependencies(&self, project_id: &str) -> Result<Vec<DependencyView>> {
        let state = self.store().load_project(project_id)?;
        let mut views = Vec::with_capacity(state.dependencies.len());
        for edge in &state.dependencies {
            views.push(DependencyView {
                id: edge.id,
                blocked_task_id: edge.blocked_task_id.clone(),
                blocked_title: state.task(&edge.blocked_task_id)?.title.clone(),
                blocking_task_id: edge.blocking_task_id.clone(),
                blocking_title: state.task(&edge.blocking_task_id)?.title.clone(),
            });
        }
        Ok(views)
    }
}

/// Would inserting "`blocked` is blocked by `blocking`" close a cycle?
///
/// Adjacency follows the existing edges in the "what does X depend on"
/// direction. Starting a breadth-first search from the proposed blocking
/// task, reaching the blocked task means the blocking side can already
/// transitively reach it, so the new edge would complete a loop.
pub(crate) fn would_create_cycle(state: &ProjectState, blocked: &str, blocking: &str) -> bool {
    let mut depends_on: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &state.dependencies {
        depends_on
            .entry(edge.blocked_task_id.as_str())
            .or_default()
            .push(edge.blocking_task_id.as_str());
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(blocking);

    while let Some(current) = queue.pop_front() {
        if current == blocked {
            return true;
        }
        if !visited.insert(current) {
            continue;
        }
        if let Some(next) = depends_on.get(current) {
            for candidate in next {
                if !visited.contains(candidate) {
                    queue.push_back(candidate);
                }
            }
        }
    }

    false
}
