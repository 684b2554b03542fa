//! Filter → search → sort derivation.
//!
//! # Invariants
//! - Stages run in fixed order; each consumes the previous stage's output.
//! - Sorting is stable, so equal keys keep their filtered order.

use crate::model::task::{Category, Task};
use chrono::NaiveDate;
use feruca::Collator;
use std::cmp::Ordering;

/// Sidebar filter selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    All,
    /// Due exactly today.
    Today,
    /// Priority `high`.
    Important,
    Completed,
}

impl FilterMode {
    /// Parses a host label. Unknown labels fall back to [`FilterMode::All`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "today" => Self::Today,
            "important" => Self::Important,
            "completed" => Self::Completed,
            _ => Self::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Important => "important",
            Self::Completed => "completed",
        }
    }

    fn keeps(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Today => task.is_due_on(today),
            Self::Important => task.is_important(),
            Self::Completed => task.completed,
        }
    }
}

/// Display ordering selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Earliest due date first, undated last.
    DueDate,
    /// `high`, then `medium`, then `low`.
    Priority,
    /// Unicode collation of text (CLDR root order).
    Alphabetical,
    /// Newest first.
    #[default]
    DateAdded,
}

impl SortKey {
    /// Parses a host label. Unknown labels fall back to
    /// [`SortKey::DateAdded`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "due-date" => Self::DueDate,
            "priority" => Self::Priority,
            "alphabetical" => Self::Alphabetical,
            _ => Self::DateAdded,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DueDate => "due-date",
            Self::Priority => "priority",
            Self::Alphabetical => "alphabetical",
            Self::DateAdded => "date-added",
        }
    }

    fn compare(self, a: &Task, b: &Task, collator: &mut Collator) -> Ordering {
        match self {
            Self::DueDate => match (a.due_date, b.due_date) {
                (Some(left), Some(right)) => left.cmp(&right),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Priority => a.priority.rank().cmp(&b.priority.rank()),
            Self::Alphabetical => collator
                .collate(a.text.as_str(), b.text.as_str())
                .then_with(|| a.text.cmp(&b.text)),
            Self::DateAdded => b.created_at.cmp(&a.created_at),
        }
    }
}

/// Complete view selection coming from the host UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub filter: FilterMode,
    /// Applied together with `filter` when set.
    pub category: Option<Category>,
    /// Case-insensitive substring; empty disables search.
    pub search: String,
    pub sort: SortKey,
}

/// Derives the display list for `query`.
///
/// `today` is the calendar date used by [`FilterMode::Today`].
pub fn derive<'a>(tasks: &'a [Task], query: &ViewQuery, today: NaiveDate) -> Vec<&'a Task> {
    let filtered = filter_tasks(tasks.iter(), query.filter, query.category.as_ref(), today);
    let mut searched = search_tasks(filtered, &query.search);
    sort_tasks(&mut searched, query.sort);
    searched
}

/// Filter stage: mode plus optional category.
pub fn filter_tasks<'a>(
    tasks: impl Iterator<Item = &'a Task>,
    mode: FilterMode,
    category: Option<&Category>,
    today: NaiveDate,
) -> Vec<&'a Task> {
    tasks
        .filter(|task| mode.keeps(task, today))
        .filter(|task| category.map_or(true, |wanted| task.category.as_ref() == Some(wanted)))
        .collect()
}

/// Search stage over text and category.
pub fn search_tasks<'a>(tasks: Vec<&'a Task>, query: &str) -> Vec<&'a Task> {
    if query.is_empty() {
        return tasks;
    }

    let needle = query.to_lowercase();
    tasks
        .into_iter()
        .filter(|task| {
            task.text.to_lowercase().contains(&needle)
                || task
                    .category
                    .as_ref()
                    .is_some_and(|category| category.as_str().contains(&needle))
        })
        .collect()
}

/// Sort stage. Stable for equal keys.
pub fn sort_tasks(tasks: &mut [&Task], key: SortKey) {
    let mut collator = Collator::default();
    tasks.sort_by(|a, b| key.compare(a, b, &mut collator));
}

#[cfg(test)]
mod tests {
    use super::{derive, FilterMode, SortKey, ViewQuery};
    use crate::model::task::{Category, Priority, Task};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn task(id: i64, text: &str, priority: Priority) -> Task {
        let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + Duration::minutes(id);
        Task::new(id, text, priority, created_at).unwrap()
    }

    fn ids(tasks: &[&Task]) -> Vec<i64> {
        tasks.iter().map(|task| task.id).collect()
    }

    #[test]
    fn priority_sort_orders_high_medium_low() {
        let tasks = vec![
            task(1, "a", Priority::Low),
            task(2, "b", Priority::High),
            task(3, "c", Priority::Medium),
        ];
        let query = ViewQuery {
            sort: SortKey::Priority,
            ..ViewQuery::default()
        };
        assert_eq!(ids(&derive(&tasks, &query, today())), vec![2, 3, 1]);
    }

    #[test]
    fn due_date_sort_puts_undated_last_in_original_order() {
        let tasks = vec![
            task(1, "undated one", Priority::Medium),
            task(2, "dated", Priority::Medium).with_due_date(NaiveDate::from_ymd_opt(2024, 1, 1)),
            task(3, "undated two", Priority::Medium),
        ];
        let query = ViewQuery {
            sort: SortKey::DueDate,
            ..ViewQuery::default()
        };
        assert_eq!(ids(&derive(&tasks, &query, today())), vec![2, 1, 3]);
    }

    #[test]
    fn date_added_sort_is_newest_first() {
        let tasks = vec![
            task(1, "old", Priority::Medium),
            task(3, "new", Priority::Medium),
            task(2, "mid", Priority::Medium),
        ];
        assert_eq!(
            ids(&derive(&tasks, &ViewQuery::default(), today())),
            vec![3, 2, 1]
        );
    }

    #[test]
    fn alphabetical_sort_ignores_case() {
        let tasks = vec![
            task(1, "banana", Priority::Medium),
            task(2, "Apple", Priority::Medium),
            task(3, "cherry", Priority::Medium),
        ];
        let query = ViewQuery {
            sort: SortKey::Alphabetical,
            ..ViewQuery::default()
        };
        assert_eq!(ids(&derive(&tasks, &query, today())), vec![2, 1, 3]);

        let tied = vec![
            task(1, "Apple", Priority::Medium),
            task(2, "apple", Priority::Medium),
        ];
        assert_eq!(ids(&derive(&tied, &query, today())), vec![2, 1]);
    }

    #[test]
    fn alphabetical_sort_places_accented_text_by_base_letter() {
        let tasks = vec![
            task(1, "zebra", Priority::Medium),
            task(2, "éclair", Priority::Medium),
            task(3, "apple", Priority::Medium),
            task(4, "Étude", Priority::Medium),
            task(5, "eclipse", Priority::Medium),
        ];
        let query = ViewQuery {
            sort: SortKey::Alphabetical,
            ..ViewQuery::default()
        };
        let texts: Vec<&str> = derive(&tasks, &query, today())
            .into_iter()
            .map(|task| task.text.as_str())
            .collect();
        assert_eq!(texts, vec!["apple", "éclair", "eclipse", "Étude", "zebra"]);
    }

    #[test]
    fn filters_by_mode_and_category_together() {
        let mut done = task(1, "done work", Priority::Medium).with_category(Category::parse("work"));
        done.completed = true;
        let mut done_home = task(2, "done home", Priority::Medium);
        done_home.completed = true;
        let open_work = task(3, "open work", Priority::High).with_category(Category::parse("work"));
        let tasks = vec![done, done_home, open_work];

        let completed = ViewQuery {
            filter: FilterMode::Completed,
            ..ViewQuery::default()
        };
        let view = derive(&tasks, &completed, today());
        assert!(view.iter().all(|task| task.completed));
        assert_eq!(view.len(), 2);

        let completed_work = ViewQuery {
            category: Category::parse("work"),
            ..completed
        };
        assert_eq!(ids(&derive(&tasks, &completed_work, today())), vec![1]);

        let important = ViewQuery {
            filter: FilterMode::Important,
            ..ViewQuery::default()
        };
        assert_eq!(ids(&derive(&tasks, &important, today())), vec![3]);
    }

    #[test]
    fn today_filter_matches_exact_due_date() {
        let tasks = vec![
            task(1, "today", Priority::Medium).with_due_date(Some(today())),
            task(2, "tomorrow", Priority::Medium).with_due_date(today().succ_opt()),
            task(3, "undated", Priority::Medium),
        ];
        let query = ViewQuery {
            filter: FilterMode::Today,
            ..ViewQuery::default()
        };
        assert_eq!(ids(&derive(&tasks, &query, today())), vec![1]);
    }

    #[test]
    fn search_matches_text_or_category_case_insensitively() {
        let tasks = vec![
            task(1, "Buy MILK", Priority::Medium),
            task(2, "call mom", Priority::Medium).with_category(Category::parse("Personal")),
            task(3, "gym", Priority::Medium).with_category(Category::parse("health")),
        ];
        let by_text = ViewQuery {
            search: "milk".to_string(),
            ..ViewQuery::default()
        };
        assert_eq!(ids(&derive(&tasks, &by_text, today())), vec![1]);

        let by_category = ViewQuery {
            search: "PERSON".to_string(),
            ..ViewQuery::default()
        };
        assert_eq!(ids(&derive(&tasks, &by_category, today())), vec![2]);
    }

    #[test]
    fn search_never_reintroduces_filtered_tasks() {
        let mut done = task(1, "milk", Priority::Medium);
        done.completed = true;
        let open = task(2, "milk too", Priority::Medium);
        let tasks = vec![done, open];
        let query = ViewQuery {
            filter: FilterMode::Completed,
            search: "milk".to_string(),
            ..ViewQuery::default()
        };
        assert_eq!(ids(&derive(&tasks, &query, today())), vec![1]);
    }

    #[test]
    fn unknown_labels_fall_back_to_defaults() {
        assert_eq!(FilterMode::parse("someday"), FilterMode::All);
        assert_eq!(SortKey::parse(""), SortKey::DateAdded);
        assert_eq!(SortKey::parse("due-date"), SortKey::DueDate);
        assert_eq!(FilterMode::parse(FilterMode::Important.as_str()), FilterMode::Important);
    }
}
