use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::model::{Priority, Task};

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    /// Rounded percentage, 0 when there are no tasks.
    pub completion_rate: u32,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        let completion_rate = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };
        Self {
            total,
            completed,
            in_progress: total - completed,
            completion_rate,
        }
    }
}

/// Tasks for today's list: due today or undated, open before done,
/// then high to low priority.
pub fn daily_tasks(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    let mut daily: Vec<&Task> = tasks
        .iter()
        .filter(|t| match t.due_day() {
            Some(day) => day == today,
            None => t.due_date.as_deref().map_or(true, |d| d.trim().is_empty()),
        })
        .collect();
    daily.sort_by_key(|t| (t.completed, priority_rank(t.priority())));
    daily
}

fn priority_rank(priority: Option<Priority>) -> u8 {
    match priority {
        Some(Priority::High) => 0,
        Some(Priority::Medium) => 1,
        Some(Priority::Low) => 2,
        None => 3,
    }
}

/// Open task whose due instant has passed. Date-only tasks are overdue once
/// their day is over.
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    if task.completed {
        return false;
    }
    if let Some(due) = task.due_at() {
        return due < now;
    }
    task.due_day()
        .is_some_and(|day| day < crate::clock::local_date(now))
}
