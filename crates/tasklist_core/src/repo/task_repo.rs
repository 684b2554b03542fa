//! Task collection persistence over a key-value backend.
//!
//! # Responsibility
//! - Serialize the full ordered collection as one JSON blob.
//! - Recover from absent or corrupt blobs by starting empty.
//!
//! # Invariants
//! - `save` writes the whole collection under [`TASKS_KEY`] in one `set`.
//! - `load` never fails; read problems are logged and yield no tasks.
//! - Collection order survives a save/load round-trip.

use crate::model::task::Task;
use crate::storage::kv::{KeyValueStore, StorageError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key holding the JSON array of tasks.
pub const TASKS_KEY: &str = "tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Write-path failure for persisted state.
#[derive(Debug)]
pub enum RepoError {
    Storage(StorageError),
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode tasks: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Loads and saves the task collection.
pub struct TaskRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> TaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Overwrites the persisted collection with `tasks`.
    pub fn save(&self, tasks: &[Task]) -> RepoResult<()> {
        let blob = serde_json::to_string(tasks)?;
        self.store.set(TASKS_KEY, &blob)?;
        Ok(())
    }

    /// Reads the persisted collection.
    ///
    /// Absent key, unreadable backend and unparseable content all return an
    /// empty collection.
    pub fn load(&self) -> Vec<Task> {
        let blob = match self.store.get(TASKS_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!("event=tasks_load module=repo status=ok reason=absent count=0");
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    "event=tasks_load module=repo status=recovered reason=read_failed error={}",
                    err
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Task>>(&blob) {
            Ok(tasks) => {
                info!(
                    "event=tasks_load module=repo status=ok count={}",
                    tasks.len()
                );
                tasks
            }
            Err(err) => {
                // serde_json errors carry only position info, never content.
                warn!(
                    "event=tasks_load module=repo status=recovered reason=unparseable blob_len={} error={}",
                    blob.len(),
                    err
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskRepository, TASKS_KEY};
    use crate::model::task::{Category, Priority, Task};
    use crate::storage::kv::{KeyValueStore, MemoryKeyValueStore};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn sample_tasks() -> Vec<Task> {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 2, 8, 30, 0).unwrap();
        vec![
            Task::new(2, "second", Priority::High, created_at)
                .unwrap()
                .with_category(Category::parse("work"))
                .with_due_date(NaiveDate::from_ymd_opt(2024, 1, 5)),
            Task::new(1, "first", Priority::Low, created_at).unwrap(),
        ]
    }

    #[test]
    fn save_then_load_preserves_order_and_fields() {
        let kv = MemoryKeyValueStore::new();
        let repo = TaskRepository::new(&kv);
        let tasks = sample_tasks();

        repo.save(&tasks).unwrap();
        assert_eq!(repo.load(), tasks);
    }

    #[test]
    fn load_absent_key_returns_empty() {
        let kv = MemoryKeyValueStore::new();
        assert!(TaskRepository::new(&kv).load().is_empty());
    }

    #[test]
    fn load_corrupt_blob_returns_empty() {
        let kv = MemoryKeyValueStore::new();
        kv.set(TASKS_KEY, "{not json").unwrap();
        assert!(TaskRepository::new(&kv).load().is_empty());
    }

    #[test]
    fn load_rejects_blob_containing_blank_text() {
        let kv = MemoryKeyValueStore::new();
        kv.set(
            TASKS_KEY,
            r#"[{"id":1,"text":"  ","completed":false,"priority":"medium","category":null,"dueDate":null,"createdAt":"2024-01-01T00:00:00.000Z"}]"#,
        )
        .unwrap();
        assert!(TaskRepository::new(&kv).load().is_empty());
    }
}
