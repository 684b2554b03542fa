//! Persistence of core state over key-value storage.
//!
//! # Responsibility
//! - Map domain values to the stored key layout (`tasks`, `theme`).
//! - Keep encoding details out of the store service.
//!
//! # Invariants
//! - Reads recover to defaults instead of failing.
//! - Writes surface `RepoError` to the caller.

pub mod preference_repo;
pub mod task_repo;
