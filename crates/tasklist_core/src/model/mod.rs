//! Task domain model.
//!
//! # Responsibility
//! - Define the data structures shared by store, view, stats and persistence.
//!
//! # Invariants
//! - Every task is identified by a store-unique `TaskId`.
//! - Deletion is a hard remove; there are no tombstones.

pub mod preference;
pub mod task;
