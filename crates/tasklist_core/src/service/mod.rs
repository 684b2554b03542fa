//! Core use-case services.
//!
//! # Responsibility
//! - Turn host commands into validated collection changes.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod task_store;
