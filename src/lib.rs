//! bord - Task Board Ordering and Dependency Engine
//!
//! This library keeps shared project boards consistent under concurrent
//! writers: task positions within each status column stay contiguous, and
//! the "blocks" graph between tasks stays acyclic.
//!
//! # Core Concepts
//!
//! - **Position index**: non-archived tasks in a column always occupy
//!   positions `0..n-1`; every mutation renumbers only the rows it disturbs
//! - **Column mover**: same- and cross-column moves with a clamped insertion
//!   index, committed as one transaction
//! - **Dependency graph**: directed "blocked by" edges, cycle-checked on
//!   every insert
//! - **Bulk mutator**: one patch over many tasks, all-or-nothing
//! - **Activity log**: append-only record of every semantic change, written
//!   inside the same transaction scope
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `.bord.toml`
//! - `error`: error types and result aliases
//! - `model`: board entities and the per-project state document
//! - `position`: contiguous position reindexing
//! - `board`: the board service (tasks, columns, moves)
//! - `deps`: dependency edges and cycle detection
//! - `bulk`: bulk updates
//! - `activity`: activity recorder collaborator and JSONL sink
//! - `actor`: actor identity resolution
//! - `store`: locked, atomic on-disk storage
//! - `lock`: file locking and atomic write primitives

pub mod activity;
pub mod actor;
pub mod board;
pub mod bulk;
pub mod cli;
pub mod config;
pub mod deps;
pub mod error;
pub mod ids;
pub mod lock;
pub mod model;
pub mod output;
pub mod position;
pub mod store;

pub use board::{Board, BoardView, ColumnView, DependencyRef, MoveOutcome, NewTask, TaskDetails};
pub use bulk::BulkPatch;
pub use deps::DependencyView;
pub use error::{Error, Result};
