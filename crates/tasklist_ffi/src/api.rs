//! FFI command API for Flutter-facing calls.
//!
//! # Responsibility
//! - Map host UI commands onto `TaskStore` operations.
//! - Convert core values and errors into flat, string-friendly envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each command opens the store, applies one operation and drops it.
//! - Commands in one process run one at a time so whole-blob writes never
//!   interleave.

use chrono::SecondsFormat;
use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};
use tasklist_core::db::open_db;
use tasklist_core::{
    core_version as core_version_inner, format_due_date, init_logging as init_logging_inner,
    parse_due_date, ping as ping_inner, Category, CoreConfig, FilterMode, NewTask,
    PreferenceRepository, Priority, SortKey, SqliteKeyValueStore, Task, TaskPatch, TaskStore,
    TaskStoreError, ThemePreference, ViewQuery,
};

static STORE_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

type FfiStore<'conn> = TaskStore<SqliteKeyValueStore<'conn>>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Flat task projection handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    /// `low|medium|high`.
    pub priority: String,
    pub category: Option<String>,
    /// Badge accent color, set together with `category`.
    pub category_color: Option<String>,
    /// `YYYY-MM-DD`.
    pub due_date: Option<String>,
    /// Short display form, e.g. `Jan 5, 2024`.
    pub due_date_label: Option<String>,
    /// RFC 3339 UTC timestamp.
    pub created_at: String,
    pub is_overdue: bool,
}

/// Result envelope for single-task commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the command took effect and was saved.
    pub ok: bool,
    /// Task state after the command; `None` on failure and after delete.
    pub task: Option<TaskItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task: Option<TaskItem>) -> Self {
        Self {
            ok: true,
            task,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            message: message.into(),
        }
    }
}

/// Result envelope for the derived list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Display-ordered tasks; empty shows the host's empty state.
    pub items: Vec<TaskItem>,
    pub message: String,
}

/// Summary counts for the stats panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStatsResponse {
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    pub overdue: u32,
}

/// Creates a task from the add-task form.
///
/// `priority` blank means `medium`; blank `category` or `due_date` means none.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Blank text is rejected with `ok=false`; nothing is stored.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    text: String,
    priority: String,
    category: Option<String>,
    due_date: Option<String>,
) -> TaskActionResponse {
    let input = match build_new_task(text, &priority, category, due_date) {
        Ok(input) => input,
        Err(message) => return TaskActionResponse::failure(format!("task_create failed: {message}")),
    };

    run_task_command("task_create", "Task created.", |store| store.create(input))
}

/// Applies an edit-form submission.
///
/// `None` leaves a field unchanged; `Some("")` clears `category` or
/// `due_date`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(
    id: i64,
    text: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    due_date: Option<String>,
) -> TaskActionResponse {
    let patch = match build_patch(text, priority, category, due_date) {
        Ok(patch) => patch,
        Err(message) => return TaskActionResponse::failure(format!("task_update failed: {message}")),
    };

    run_task_command("task_update", "Task updated.", |store| store.update(id, patch))
}

/// Flips the completion checkbox.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle_completed(id: i64) -> TaskActionResponse {
    run_task_command("task_toggle_completed", "Task toggled.", |store| {
        store.toggle_completed(id)
    })
}

/// Handles the "mark as important" button.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle_important(id: i64) -> TaskActionResponse {
    run_task_command("task_toggle_important", "Task priority toggled.", |store| {
        store.toggle_important(id)
    })
}

/// Deletes a task. Unknown ids succeed as no-ops.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: i64) -> TaskActionResponse {
    let outcome = with_task_store(|store| {
        let removed = store.delete(id);
        let save_error = store.last_save_error().map(ToString::to_string);
        (removed, save_error)
    });

    match outcome {
        Ok((_, Some(save_error))) => {
            TaskActionResponse::failure(format!("task_delete failed: {save_error}"))
        }
        Ok((true, None)) => TaskActionResponse::success("Task deleted.", None),
        Ok((false, None)) => TaskActionResponse::success("Task already removed.", None),
        Err(err) => TaskActionResponse::failure(format!("task_delete failed: {err}")),
    }
}

/// Loads one task to prefill the edit form.
#[flutter_rust_bridge::frb(sync)]
pub fn task_get(id: i64) -> TaskActionResponse {
    let outcome = with_task_store(|store| {
        let today = store.today();
        store.get(id).map(|task| to_task_item(task, today))
    });

    match outcome {
        Ok(Some(item)) => TaskActionResponse::success("Task loaded.", Some(item)),
        Ok(None) => TaskActionResponse::failure("Task not found."),
        Err(err) => TaskActionResponse::failure(format!("task_get failed: {err}")),
    }
}

/// Derives the visible list for the current sidebar, search box and sort
/// selection.
///
/// Unknown `filter` / `sort` labels fall back to `all` / `date-added`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list(
    filter: String,
    category: Option<String>,
    search: String,
    sort: String,
) -> TaskListResponse {
    let query = ViewQuery {
        filter: FilterMode::parse(&filter),
        category: category.as_deref().and_then(Category::parse),
        search,
        sort: SortKey::parse(&sort),
    };

    let outcome = with_task_store(|store| {
        let today = store.today();
        store
            .derive(&query)
            .into_iter()
            .map(|task| to_task_item(task, today))
            .collect::<Vec<_>>()
    });

    match outcome {
        Ok(items) => {
            let message = if items.is_empty() {
                "No tasks found. Add a new task to get started!".to_string()
            } else {
                format!("Showing {} task(s).", items.len())
            };
            TaskListResponse { items, message }
        }
        Err(err) => TaskListResponse {
            items: Vec::new(),
            message: format!("task_list failed: {err}"),
        },
    }
}

/// Summary counts over all tasks, ignoring view filters.
///
/// Returns zeros when the store cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn task_stats() -> TaskStatsResponse {
    match with_task_store(|store| store.stats()) {
        Ok(stats) => TaskStatsResponse {
            total: saturate(stats.total),
            completed: saturate(stats.completed),
            pending: saturate(stats.pending),
            overdue: saturate(stats.overdue),
        },
        Err(err) => {
            warn!("event=task_stats module=ffi status=error error={}", err);
            TaskStatsResponse::default()
        }
    }
}

/// Returns the saved theme (`dark|light`), or `None` so the host can follow
/// the platform preference.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_get() -> Option<String> {
    with_connection(|conn| {
        PreferenceRepository::new(SqliteKeyValueStore::new(conn))
            .load_theme()
            .map(|theme| theme.as_str().to_string())
    })
    .unwrap_or_else(|err| {
        warn!("event=theme_get module=ffi status=error error={}", err);
        None
    })
}

/// Saves the theme toggle state. Returns empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_set(is_dark: bool) -> String {
    let theme = ThemePreference::from_dark_flag(is_dark);
    let outcome = with_connection(|conn| {
        PreferenceRepository::new(SqliteKeyValueStore::new(conn))
            .save_theme(theme)
            .map_err(|err| err.to_string())
    });

    match outcome.and_then(|saved| saved) {
        Ok(()) => String::new(),
        Err(err) => format!("theme_set failed: {err}"),
    }
}

fn build_new_task(
    text: String,
    priority: &str,
    category: Option<String>,
    due_date: Option<String>,
) -> Result<NewTask, String> {
    Ok(NewTask {
        text,
        priority: parse_priority(priority)?,
        category: category.as_deref().and_then(Category::parse),
        due_date: match due_date {
            Some(value) => parse_due_date(&value).map_err(|err| err.to_string())?,
            None => None,
        },
    })
}

fn build_patch(
    text: Option<String>,
    priority: Option<String>,
    category: Option<String>,
    due_date: Option<String>,
) -> Result<TaskPatch, String> {
    Ok(TaskPatch {
        text,
        priority: priority.as_deref().map(parse_priority).transpose()?,
        category: category.as_deref().map(Category::parse),
        due_date: due_date
            .as_deref()
            .map(parse_due_date)
            .transpose()
            .map_err(|err| err.to_string())?,
    })
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value)
        .ok_or_else(|| format!("unsupported priority `{value}`; expected low|medium|high"))
}

fn run_task_command(
    command: &str,
    success_message: &str,
    f: impl FnOnce(&mut FfiStore<'_>) -> Result<Task, TaskStoreError>,
) -> TaskActionResponse {
    let outcome = with_task_store(|store| {
        let today = store.today();
        let result = f(&mut *store).map(|task| to_task_item(&task, today));
        let save_error = store.last_save_error().map(ToString::to_string);
        (result, save_error)
    });

    match outcome {
        Ok((Ok(_), Some(save_error))) => {
            TaskActionResponse::failure(format!("{command} failed: {save_error}"))
        }
        Ok((Ok(item), None)) => TaskActionResponse::success(success_message, Some(item)),
        Ok((Err(TaskStoreError::NotFound(_)), _)) => TaskActionResponse::failure("Task not found."),
        Ok((Err(err), _)) => TaskActionResponse::failure(format!("{command} failed: {err}")),
        Err(err) => TaskActionResponse::failure(format!("{command} failed: {err}")),
    }
}

fn resolve_store_path() -> PathBuf {
    STORE_PATH
        .get_or_init(|| match CoreConfig::from_env() {
            Ok(config) => config.store_path,
            Err(err) => {
                warn!("event=config_load module=ffi status=recovered error={}", err);
                CoreConfig::default().store_path
            }
        })
        .clone()
}

fn with_connection<T>(f: impl FnOnce(&Connection) -> T) -> Result<T, String> {
    let _guard = STORE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let conn = open_db(resolve_store_path()).map_err(|err| format!("store open failed: {err}"))?;
    Ok(f(&conn))
}

fn with_task_store<T>(f: impl FnOnce(&mut FfiStore<'_>) -> T) -> Result<T, String> {
    with_connection(|conn| {
        let mut store = TaskStore::open(SqliteKeyValueStore::new(conn));
        f(&mut store)
    })
}

fn to_task_item(task: &Task, today: chrono::NaiveDate) -> TaskItem {
    TaskItem {
        id: task.id,
        text: task.text.clone(),
        completed: task.completed,
        priority: task.priority.as_str().to_string(),
        category: task.category.as_ref().map(|c| c.as_str().to_string()),
        category_color: task.category.as_ref().map(|c| c.color().to_string()),
        due_date: task.due_date.map(|date| date.to_string()),
        due_date_label: task.due_date.map(format_due_date),
        created_at: task.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        is_overdue: task.is_overdue(today),
    }
}

fn saturate(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
