//! Pure presentation logic over a fetched task list: the counts and
//! productivity figure the sidebar shows, the dashboard filters, and the
//! sorts used by the pending/completed pages. No I/O; the reference date for
//! date-based filters is passed in by the caller.

use crate::models::{Task, TaskPriority};
use chrono::{Duration, NaiveDate};

/// Client-side filters. `Today` and `ThisWeek` compare the task's due date
/// against the supplied reference date; tasks without a due date never match
/// either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    Today,
    ThisWeek,
    Priority(TaskPriority),
}

/// Client-side sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSort {
    Newest,
    Oldest,
    Priority,
}

/// Counts derived from one task list.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn tally(tasks: &[Task]) -> Self {
        let mut counts = TaskCounts {
            total: tasks.len(),
            ..TaskCounts::default()
        };
        for task in tasks {
            match task.priority {
                TaskPriority::Low => counts.low += 1,
                TaskPriority::Medium => counts.medium += 1,
                TaskPriority::High => counts.high += 1,
            }
            if task.completed {
                counts.completed += 1;
            }
        }
        counts
    }

    pub fn pending(&self) -> usize {
        self.total - self.completed
    }

    /// Completed share as a whole percentage; an empty list is 0%, not a
    /// division by zero.
    pub fn productivity(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Applies one filter, preserving the incoming order.
pub fn apply_filter<'a>(tasks: &'a [Task], filter: TaskFilter, today: NaiveDate) -> Vec<&'a Task> {
    let week_end = today + Duration::days(7);
    tasks
        .iter()
        .filter(|task| match filter {
            TaskFilter::All => true,
            TaskFilter::Today => task.due_date == Some(today),
            TaskFilter::ThisWeek => task
                .due_date
                .map(|due| due >= today && due <= week_end)
                .unwrap_or(false),
            TaskFilter::Priority(priority) => task.priority == priority,
        })
        .collect()
}

/// Sorts in place. The priority sort is descending by rank (High first) and
/// stable, so equal-priority tasks keep their fetched order.
pub fn apply_sort(tasks: &mut [&Task], sort: TaskSort) {
    match sort {
        TaskSort::Newest => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        TaskSort::Oldest => tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        TaskSort::Priority => tasks.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank())),
    }
}

/// Tasks still open, for the pending page.
pub fn pending(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|task| !task.completed).collect()
}

/// Tasks already done, for the completed page.
pub fn completed(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|task| task.completed).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn task(
        title: &str,
        priority: TaskPriority,
        completed: bool,
        due_offset: Option<i64>,
        created_minute: u32,
    ) -> Task {
        let today = reference_date();
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            priority,
            due_date: due_offset.map(|days| today + Duration::days(days)),
            completed,
            created_at: Utc
                .with_ymd_and_hms(2026, 8, 1, 12, created_minute, 0)
                .unwrap(),
            owner_id: 1,
        }
    }

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    #[test]
    fn test_counts_and_productivity() {
        let tasks = vec![
            task("a", TaskPriority::Low, true, None, 0),
            task("b", TaskPriority::High, false, None, 1),
        ];
        let counts = TaskCounts::tally(&tasks);
        assert_eq!(counts.total, 2);
        assert_eq!(counts.low, 1);
        assert_eq!(counts.medium, 0);
        assert_eq!(counts.high, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.pending(), 1);
        assert_eq!(counts.productivity(), 50);
    }

    #[test]
    fn test_productivity_of_empty_list_is_zero() {
        assert_eq!(TaskCounts::tally(&[]).productivity(), 0);
    }

    #[test]
    fn test_productivity_rounds_to_whole_percent() {
        let tasks = vec![
            task("a", TaskPriority::Low, true, None, 0),
            task("b", TaskPriority::Low, false, None, 1),
            task("c", TaskPriority::Low, false, None, 2),
        ];
        // 1 of 3 -> 33%.
        assert_eq!(TaskCounts::tally(&tasks).productivity(), 33);
    }

    #[test]
    fn test_today_filter_matches_exact_due_date() {
        let tasks = vec![
            task("due today", TaskPriority::Low, false, Some(0), 0),
            task("due tomorrow", TaskPriority::Low, false, Some(1), 1),
            task("no due date", TaskPriority::Low, false, None, 2),
        ];
        let filtered = apply_filter(&tasks, TaskFilter::Today, reference_date());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "due today");
    }

    #[test]
    fn test_week_filter_window() {
        let tasks = vec![
            task("today", TaskPriority::Low, false, Some(0), 0),
            task("sixth day", TaskPriority::Low, false, Some(6), 1),
            task("seventh day", TaskPriority::Low, false, Some(7), 2),
            task("eighth day", TaskPriority::Low, false, Some(8), 3),
            task("yesterday", TaskPriority::Low, false, Some(-1), 4),
        ];
        let filtered = apply_filter(&tasks, TaskFilter::ThisWeek, reference_date());
        let titles: Vec<_> = filtered.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["today", "sixth day", "seventh day"]);
    }

    #[test]
    fn test_priority_filter() {
        let tasks = vec![
            task("low", TaskPriority::Low, false, None, 0),
            task("high", TaskPriority::High, false, None, 1),
        ];
        let filtered = apply_filter(
            &tasks,
            TaskFilter::Priority(TaskPriority::High),
            reference_date(),
        );
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "high");
    }

    #[test]
    fn test_newest_and_oldest_sorts() {
        let tasks = vec![
            task("first", TaskPriority::Low, false, None, 0),
            task("second", TaskPriority::Low, false, None, 1),
            task("third", TaskPriority::Low, false, None, 2),
        ];
        let mut refs: Vec<&Task> = tasks.iter().collect();

        apply_sort(&mut refs, TaskSort::Newest);
        let titles: Vec<_> = refs.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        apply_sort(&mut refs, TaskSort::Oldest);
        let titles: Vec<_> = refs.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_priority_sort_is_stable_within_rank() {
        let tasks = vec![
            task("low early", TaskPriority::Low, false, None, 0),
            task("high", TaskPriority::High, false, None, 1),
            task("low late", TaskPriority::Low, false, None, 2),
            task("medium", TaskPriority::Medium, false, None, 3),
        ];
        let mut refs: Vec<&Task> = tasks.iter().collect();
        apply_sort(&mut refs, TaskSort::Priority);
        let titles: Vec<_> = refs.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "medium", "low early", "low late"]);
    }

    #[test]
    fn test_pending_and_completed_partitions() {
        let tasks = vec![
            task("open", TaskPriority::Low, false, None, 0),
            task("done", TaskPriority::Low, true, None, 1),
        ];
        let open: Vec<_> = pending(&tasks).iter().map(|t| t.title.as_str()).collect();
        let done: Vec<_> = completed(&tasks).iter().map(|t| t.title.as_str()).collect();
        assert_eq!(open, vec!["open"]);
        assert_eq!(done, vec!["done"]);
    }
}
