use chrono::NaiveDate;

use super::habit::{self, Habit};
use super::task::{Priority, Task, TaskStatus};

/// How many days the completion chart looks back, today included.
const COMPLETION_WINDOW_DAYS: i64 = 14;

pub fn tasks_by_status<'a>(tasks: &'a [Task], status: TaskStatus) -> Vec<&'a Task> {
    tasks.iter().filter(|t| t.status == status).collect()
}

pub fn tasks_by_priority<'a>(tasks: &'a [Task], priority: Priority) -> Vec<&'a Task> {
    tasks.iter().filter(|t| t.priority == priority).collect()
}

/// Tasks whose due date falls inside `[from, to]`, both ends inclusive.
pub fn tasks_in_range<'a>(tasks: &'a [Task], from: NaiveDate, to: NaiveDate) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.due_date.is_some_and(|due| from <= due && due <= to))
        .collect()
}

/// Dashboard numbers, all recomputed from the collections on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsSummary {
    pub completed_tasks: usize,
    /// Percentage of all tasks that are done, rounded.
    pub completion_rate: u8,
    /// Not-done tasks whose due date has passed.
    pub missed_deadlines: usize,
    pub status_counts: Vec<(TaskStatus, usize)>,
    pub priority_counts: Vec<(Priority, usize)>,
    /// Completions per day over the trailing two weeks, oldest first.
    pub daily_completions: Vec<(NaiveDate, usize)>,
    pub habit_streaks: Vec<(String, u32)>,
}

pub fn summarize(tasks: &[Task], habits: &[Habit], today: NaiveDate) -> AnalyticsSummary {
    let completed_tasks = tasks.iter().filter(|t| t.status.is_done()).count();
    let completion_rate = if tasks.is_empty() {
        0
    } else {
        (completed_tasks as f64 / tasks.len() as f64 * 100.0).round() as u8
    };
    let missed_deadlines = tasks.iter().filter(|t| t.is_overdue(today)).count();

    let status_counts = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ]
    .into_iter()
    .map(|status| (status, tasks_by_status(tasks, status).len()))
    .collect();

    let priority_counts = [
        Priority::Urgent,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ]
    .into_iter()
    .map(|priority| (priority, tasks_by_priority(tasks, priority).len()))
    .collect();

    let daily_completions = (0..COMPLETION_WINDOW_DAYS)
        .rev()
        .map(|back| {
            let day = today - chrono::Duration::days(back);
            let count = tasks.iter().filter(|t| t.completed_on(day)).count();
            (day, count)
        })
        .collect();

    let habit_streaks = habits
        .iter()
        .map(|h| (h.name.clone(), habit::streak(&h.completed_dates, today)))
        .collect();

    AnalyticsSummary {
        completed_tasks,
        completion_rate,
        missed_deadlines,
        status_counts,
        priority_counts,
        daily_completions,
        habit_streaks,
    }
}
