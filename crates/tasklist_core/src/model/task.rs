//! Task domain model.
//!
//! # Responsibility
//! - Define the single persisted record and its enumerated fields.
//! - Own the text and date validation applied on every entry path.
//!
//! # Invariants
//! - `id` and `created_at` never change after construction.
//! - `text` is trimmed and never empty, including after deserialization.
//! - `due_date` has day granularity; no time component is stored.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-unique task identifier, derived from creation time in epoch millis.
pub type TaskId = i64;

/// Wire format of `due_date` values.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Tags offered by the host's category picker.
pub const KNOWN_CATEGORIES: [&str; 4] = ["work", "personal", "shopping", "health"];

const FALLBACK_CATEGORY_COLOR: &str = "#6c5ce7";

/// Task urgency, ordered for display by [`Priority::rank`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort rank: `high` first, `low` last.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parses a host-provided label; blank input yields the default.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Free-form category tag, stored trimmed and lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Normalizes a tag. Returns `None` for blank input, which means
    /// "no category".
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_known(&self) -> bool {
        KNOWN_CATEGORIES.contains(&self.0.as_str())
    }

    /// Accent color the host uses for the category badge.
    pub fn color(&self) -> &'static str {
        match self.0.as_str() {
            "work" => "#ff6b6b",
            "personal" => "#48dbfb",
            "shopping" => "#1dd1a1",
            "health" => "#feca57",
            _ => FALLBACK_CATEGORY_COLOR,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation errors for task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty after trimming.
    EmptyText,
    /// Due date is not a `YYYY-MM-DD` calendar date.
    InvalidDueDate(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be blank"),
            Self::InvalidDueDate(value) => {
                write!(f, "due date `{value}` is not a YYYY-MM-DD calendar date")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// One tracked task.
///
/// Serialized with camelCase keys (`dueDate`, `createdAt`); absent optional
/// fields are written as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskWire")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub category: Option<Category>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds a pending task from raw user text.
    ///
    /// # Errors
    /// - `TaskValidationError::EmptyText` when `text` is blank after trim.
    pub fn new(
        id: TaskId,
        text: &str,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        Ok(Self {
            id,
            text: normalize_text(text)?,
            completed: false,
            priority,
            category: None,
            due_date: None,
            created_at,
        })
    }

    /// Builder-style setter for the optional category.
    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    /// Builder-style setter for the optional due date.
    pub fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    /// True when the task is still open and its due date lies before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    /// True when the task is due exactly on `today`.
    pub fn is_due_on(&self, today: NaiveDate) -> bool {
        self.due_date == Some(today)
    }

    pub fn is_important(&self) -> bool {
        self.priority == Priority::High
    }
}

/// Trims task text and rejects blank input.
pub fn normalize_text(text: &str) -> Result<String, TaskValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}

/// Parses a `YYYY-MM-DD` due date. Blank input means "no due date".
pub fn parse_due_date(value: &str) -> Result<Option<NaiveDate>, TaskValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT)
        .map(Some)
        .map_err(|_| TaskValidationError::InvalidDueDate(trimmed.to_string()))
}

/// Short display form of a due date, e.g. `Jan 5, 2024`.
pub fn format_due_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Permissive read shape; validated into [`Task`] on deserialize.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskWire {
    id: TaskId,
    text: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<TaskWire> for Task {
    type Error = TaskValidationError;

    fn try_from(wire: TaskWire) -> Result<Self, Self::Error> {
        let due_date = match wire.due_date.as_deref() {
            Some(value) => parse_due_date(value)?,
            None => None,
        };
        Ok(Self {
            id: wire.id,
            text: normalize_text(&wire.text)?,
            completed: wire.completed,
            priority: wire.priority,
            category: wire.category.as_deref().and_then(Category::parse),
            due_date,
            created_at: wire.created_at,
        })
    }
}
