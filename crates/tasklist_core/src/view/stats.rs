//! Summary counts for the stats panel.

use crate::model::task::Task;
use chrono::NaiveDate;

/// Aggregate counts over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    /// Always `total - completed`.
    pub pending: usize,
    /// Open tasks whose due date is before `today`.
    pub overdue: usize,
}

/// Computes stats from scratch; ignores any active view filters.
pub fn compute(tasks: &[Task], today: NaiveDate) -> TaskStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    let overdue = tasks.iter().filter(|task| task.is_overdue(today)).count();

    TaskStats {
        total,
        completed,
        pending: total - completed,
        overdue,
    }
}

#[cfg(test)]
mod tests {
    use super::{compute, TaskStats};
    use crate::model::task::{Priority, Task};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn empty_collection_is_all_zero() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(compute(&[], today), TaskStats::default());
    }

    #[test]
    fn counts_completed_pending_and_overdue() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let past = NaiveDate::from_ymd_opt(2024, 6, 14);

        let overdue = Task::new(1, "late", Priority::Medium, created_at)
            .unwrap()
            .with_due_date(past);
        let mut done_late = Task::new(2, "done late", Priority::Medium, created_at)
            .unwrap()
            .with_due_date(past);
        done_late.completed = true;
        let due_today = Task::new(3, "today", Priority::Medium, created_at)
            .unwrap()
            .with_due_date(Some(today));
        let undated = Task::new(4, "whenever", Priority::Low, created_at).unwrap();

        let stats = compute(&[overdue, done_late, due_today, undated], today);
        assert_eq!(
            stats,
            TaskStats {
                total: 4,
                completed: 1,
                pending: 3,
                overdue: 1,
            }
        );
    }
}
