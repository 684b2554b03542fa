//! Derived display views over the task collection.
//!
//! # Responsibility
//! - Turn the stored collection into a filtered, searched, sorted list.
//! - Compute summary counts for the host's stats panel.
//!
//! # Invariants
//! - Nothing here mutates tasks or touches storage.
//! - Results are recomputed from scratch on every call.

pub mod pipeline;
pub mod stats;
