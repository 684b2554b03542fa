//! Core state engine for TaskList.
//! This crate is the single source of truth for task invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;
pub mod view;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::preference::ThemePreference;
pub use model::task::{
    format_due_date, parse_due_date, Category, Priority, Task, TaskId, TaskValidationError,
    KNOWN_CATEGORIES,
};
pub use repo::preference_repo::PreferenceRepository;
pub use repo::task_repo::{RepoError, RepoResult, TaskRepository};
pub use service::task_store::{NewTask, StoreResult, TaskPatch, TaskStore, TaskStoreError};
pub use storage::kv::{KeyValueStore, MemoryKeyValueStore, StorageError, StorageResult};
pub use storage::sqlite_kv::SqliteKeyValueStore;
pub use view::pipeline::{derive, FilterMode, SortKey, ViewQuery};
pub use view::stats::{compute, TaskStats};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
