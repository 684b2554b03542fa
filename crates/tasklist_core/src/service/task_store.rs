//! Task store: the single owner of the in-memory task collection.
//!
//! # Responsibility
//! - Apply create/update/toggle/delete commands to the collection.
//! - Persist the full collection after every state change.
//! - Hand read-only snapshots to view derivation and stats.
//!
//! # Invariants
//! - New tasks are prepended; stored order is most-recent-first.
//! - Ids are unique and strictly increasing for the lifetime of the store,
//!   including over ids loaded at open. Once the id above the largest one is
//!   out of range, the lowest unused positive id is handed out instead.
//! - A failed command leaves the collection untouched and writes nothing.
//! - A successful state change writes exactly once.
//! - A failed write never rolls back memory; it is logged and kept in
//!   `last_save_error` until the next successful write.

use crate::clock::{Clock, SystemClock};
use crate::model::task::{normalize_text, Category, Priority, Task, TaskId, TaskValidationError};
use crate::repo::task_repo::{RepoError, TaskRepository};
use crate::storage::kv::KeyValueStore;
use crate::view::pipeline::{self, ViewQuery};
use crate::view::stats::{self, TaskStats};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, TaskStoreError>;

/// Command rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStoreError {
    /// Input failed field validation (blank text).
    Validation(TaskValidationError),
    /// No task carries this id.
    NotFound(TaskId),
}

impl Display for TaskStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl Error for TaskStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<TaskValidationError> for TaskStoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Input for [`TaskStore::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
    pub priority: Priority,
    pub category: Option<Category>,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    /// Medium priority, no category, no due date.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Partial field set for [`TaskStore::update`].
///
/// `None` leaves a field as is. For the optional fields `Some(None)` clears
/// the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub priority: Option<Priority>,
    pub category: Option<Option<Category>>,
    pub due_date: Option<Option<NaiveDate>>,
}

/// Owned task collection with injected storage and clock.
pub struct TaskStore<S: KeyValueStore, C: Clock = SystemClock> {
    repo: TaskRepository<S>,
    clock: C,
    tasks: Vec<Task>,
    last_id: TaskId,
    last_save_error: Option<RepoError>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Opens a store on the wall clock.
    pub fn open(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> TaskStore<S, C> {
    /// Opens a store, loading whatever collection `storage` holds.
    ///
    /// Missing or corrupt data yields an empty store.
    pub fn with_clock(storage: S, clock: C) -> Self {
        let repo = TaskRepository::new(storage);
        let tasks = repo.load();
        let last_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        Self {
            repo,
            clock,
            tasks,
            last_id,
            last_save_error: None,
        }
    }

    /// Creates a task from trimmed input and prepends it.
    ///
    /// # Errors
    /// - `Validation(EmptyText)` when text is blank; nothing is stored.
    pub fn create(&mut self, input: NewTask) -> StoreResult<Task> {
        let text = match normalize_text(&input.text) {
            Ok(text) => text,
            Err(err) => {
                info!("event=task_create module=store status=rejected reason=empty_text");
                return Err(err.into());
            }
        };

        let created_at = self.clock.now();
        let id = self.next_id(created_at.timestamp_millis());
        let task = Task {
            id,
            text,
            completed: false,
            priority: input.priority,
            category: input.category,
            due_date: input.due_date,
            created_at,
        };

        self.tasks.insert(0, task.clone());
        info!(
            "event=task_create module=store status=ok task_id={} priority={} has_category={} has_due_date={}",
            id,
            task.priority.as_str(),
            task.category.is_some(),
            task.due_date.is_some()
        );
        self.persist();
        Ok(task)
    }

    /// Applies `patch` to the task with `id` and persists, even when the
    /// patch leaves every field as it was.
    ///
    /// # Errors
    /// - `NotFound` when `id` is unknown.
    /// - `Validation(EmptyText)` when the patched text is blank.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) -> StoreResult<Task> {
        let text = patch.text.as_deref().map(normalize_text).transpose();
        let index = self.index_of(id, "task_update")?;
        let text = text.map_err(|err| {
            info!(
                "event=task_update module=store status=rejected reason=empty_text task_id={}",
                id
            );
            TaskStoreError::from(err)
        })?;

        let task = &mut self.tasks[index];
        let before = task.clone();
        if let Some(text) = text {
            task.text = text;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }

        let updated = task.clone();
        info!(
            "event=task_update module=store status=ok task_id={} changed={}",
            id,
            updated != before
        );
        self.persist();
        Ok(updated)
    }

    /// Flips the completion flag.
    pub fn toggle_completed(&mut self, id: TaskId) -> StoreResult<Task> {
        let index = self.index_of(id, "task_toggle_completed")?;
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        let toggled = task.clone();

        info!(
            "event=task_toggle_completed module=store status=ok task_id={} completed={}",
            id, toggled.completed
        );
        self.persist();
        Ok(toggled)
    }

    /// Switches between `high` and `medium` priority.
    ///
    /// A `low` task becomes `high`; toggling it back yields `medium`.
    pub fn toggle_important(&mut self, id: TaskId) -> StoreResult<Task> {
        let index = self.index_of(id, "task_toggle_important")?;
        let task = &mut self.tasks[index];
        task.priority = match task.priority {
            Priority::High => Priority::Medium,
            Priority::Medium | Priority::Low => Priority::High,
        };
        let toggled = task.clone();

        info!(
            "event=task_toggle_important module=store status=ok task_id={} priority={}",
            id,
            toggled.priority.as_str()
        );
        self.persist();
        Ok(toggled)
    }

    /// Removes the task with `id`. Returns whether anything was removed.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        if self.tasks.len() == before {
            debug!(
                "event=task_delete module=store status=noop reason=not_found task_id={}",
                id
            );
            return false;
        }

        info!("event=task_delete module=store status=ok task_id={}", id);
        self.persist();
        true
    }

    /// Collection in stored (most-recent-first) order.
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Calendar date used for `today` filtering and overdue counts.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Display list for `query` as of today.
    pub fn derive(&self, query: &ViewQuery) -> Vec<&Task> {
        pipeline::derive(&self.tasks, query, self.today())
    }

    /// Summary counts as of today.
    pub fn stats(&self) -> TaskStats {
        stats::compute(&self.tasks, self.today())
    }

    /// Error from the most recent write, if it failed.
    pub fn last_save_error(&self) -> Option<&RepoError> {
        self.last_save_error.as_ref()
    }

    fn next_id(&mut self, candidate: TaskId) -> TaskId {
        let Some(floor) = self.last_id.checked_add(1) else {
            let id = self.lowest_unused_id();
            warn!(
                "event=task_id_exhausted module=store status=fallback task_id={}",
                id
            );
            return id;
        };
        let id = candidate.max(floor);
        self.last_id = id;
        id
    }

    fn lowest_unused_id(&self) -> TaskId {
        let used: HashSet<TaskId> = self.tasks.iter().map(|task| task.id).collect();
        (1..=TaskId::MAX)
            .find(|id| !used.contains(id))
            .unwrap_or(TaskId::MIN)
    }

    fn index_of(&self, id: TaskId, event: &str) -> StoreResult<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| {
                debug!(
                    "event={} module=store status=noop reason=not_found task_id={}",
                    event, id
                );
                TaskStoreError::NotFound(id)
            })
    }

    fn persist(&mut self) {
        match self.repo.save(&self.tasks) {
            Ok(()) => {
                self.last_save_error = None;
            }
            Err(err) => {
                error!(
                    "event=tasks_save module=store status=error count={} error={}",
                    self.tasks.len(),
                    err
                );
                self.last_save_error = Some(err);
            }
        }
    }
}
