//! Key-value storage backends.
//!
//! # Responsibility
//! - Define the string key-value contract persistence is written against.
//! - Provide in-memory and SQLite implementations of that contract.
//!
//! # Invariants
//! - `set` replaces the whole value for a key in one atomic write.
//! - Backends never interpret stored values.

pub mod kv;
pub mod sqlite_kv;
