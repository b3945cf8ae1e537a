use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::goal::Goal;
use super::task::Task;

/// A one-shot reminder the user set for a specific time, optionally linked
/// to the task or event it is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub at: NaiveDateTime,
    pub task_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub dismissed: bool,
}

impl Reminder {
    pub fn new(title: impl Into<String>, message: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            message: message.into(),
            at,
            task_id: None,
            event_id: None,
            dismissed: false,
        }
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        !self.dismissed && self.at <= now
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Reminder,
    TaskDue,
    GoalTarget,
}

/// Something the scanner decided the user should hear about right now.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub kind: AlertKind,
    /// Set for reminder alerts so the caller can dismiss the source.
    pub reminder_id: Option<Uuid>,
}

/// Periodic due-date scanner. Tracks which task and goal alerts it has
/// already raised so each fires at most once per day; reminders instead
/// repeat until dismissed.
#[derive(Debug, Default)]
pub struct ReminderScanner {
    seen: HashSet<String>,
}

impl ReminderScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan(
        &mut self,
        reminders: &[Reminder],
        tasks: &[Task],
        goals: &[Goal],
        now: NaiveDateTime,
    ) -> Vec<Alert> {
        let today = now.date();
        let mut alerts = Vec::new();

        for reminder in reminders.iter().filter(|r| r.is_due(now)) {
            alerts.push(Alert {
                title: reminder.title.clone(),
                message: reminder.message.clone(),
                kind: AlertKind::Reminder,
                reminder_id: Some(reminder.id),
            });
        }

        for task in tasks
            .iter()
            .filter(|t| !t.status.is_done() && t.is_due_on(today))
        {
            if self.mark(task_key(task.id, today)) {
                alerts.push(Alert {
                    title: "Task Due Today".to_string(),
                    message: task.title.clone(),
                    kind: AlertKind::TaskDue,
                    reminder_id: None,
                });
            }
        }

        for goal in goals
            .iter()
            .filter(|g| !g.achieved && g.target_date == Some(today))
        {
            if self.mark(goal_key(goal.id, today)) {
                alerts.push(Alert {
                    title: "Goal Target Date Today".to_string(),
                    message: format!("{} ({}% complete)", goal.title, goal.progress),
                    kind: AlertKind::GoalTarget,
                    reminder_id: None,
                });
            }
        }

        alerts
    }

    /// Returns true the first time a key is seen.
    fn mark(&mut self, key: String) -> bool {
        self.seen.insert(key)
    }
}

fn task_key(id: Uuid, date: NaiveDate) -> String {
    format!("task-due-{id}-{date}")
}

fn goal_key(id: Uuid, date: NaiveDate) -> String {
    format!("goal-due-{id}-{date}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon(date: NaiveDate) -> NaiveDateTime {
        date.and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn reminder_fires_when_due() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let reminder = Reminder::new("Stretch", "Stand up and stretch", noon(date));
        let mut scanner = ReminderScanner::new();

        let early = scanner.scan(&[reminder.clone()], &[], &[], date.and_hms_opt(11, 0, 0).unwrap());
        assert!(early.is_empty());

        let due = scanner.scan(&[reminder], &[], &[], noon(date));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].kind, AlertKind::Reminder);
        assert!(due[0].reminder_id.is_some());
    }

    #[test]
    fn dismissed_reminders_stay_quiet() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut reminder = Reminder::new("Stretch", "Stand up and stretch", noon(date));
        reminder.dismissed = true;
        let mut scanner = ReminderScanner::new();

        let alerts = scanner.scan(&[reminder], &[], &[], noon(date));
        assert!(alerts.is_empty());
    }

    #[test]
    fn task_due_alert_fires_once_per_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut task = Task::new("File taxes");
        task.due_date = Some(date);
        let mut scanner = ReminderScanner::new();

        let first = scanner.scan(&[], &[task.clone()], &[], noon(date));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, AlertKind::TaskDue);

        let second = scanner.scan(&[], &[task], &[], noon(date));
        assert!(second.is_empty());
    }

    #[test]
    fn finished_tasks_do_not_alert() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut task = Task::new("File taxes");
        task.due_date = Some(date);
        task.status = crate::core::task::TaskStatus::Done;
        let mut scanner = ReminderScanner::new();

        let alerts = scanner.scan(&[], &[task], &[], noon(date));
        assert!(alerts.is_empty());
    }

    #[test]
    fn goal_alert_skips_achieved_goals() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut goal = Goal::new("Run a marathon");
        goal.target_date = Some(date);
        goal.achieved = true;
        let mut scanner = ReminderScanner::new();

        let alerts = scanner.scan(&[], &[], &[goal.clone()], noon(date));
        assert!(alerts.is_empty());

        goal.achieved = false;
        let alerts = scanner.scan(&[], &[], &[goal], noon(date));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::GoalTarget);
    }
}
