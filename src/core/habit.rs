use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub const DEFAULT_HABIT_COLOR: &str = "#6366f1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub frequency: Frequency,
    pub target_count: u32,
    pub color: String,
    pub completed_dates: BTreeSet<NaiveDate>,
    /// Cached value of `streak(completed_dates, today)`; recomputed on every
    /// toggle and on load.
    pub streak: u32,
    pub created_at: NaiveDateTime,
}

impl Habit {
    pub fn new(name: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            frequency,
            target_count: 1,
            color: DEFAULT_HABIT_COLOR.to_string(),
            completed_dates: BTreeSet::new(),
            streak: 0,
            created_at: chrono::Local::now().naive_local(),
        }
    }

    /// Flip completion for one date and refresh the cached streak.
    pub fn toggle(&mut self, date: NaiveDate, today: NaiveDate) {
        if !self.completed_dates.remove(&date) {
            self.completed_dates.insert(date);
        }
        self.recalculate_streak(today);
    }

    pub fn recalculate_streak(&mut self, today: NaiveDate) {
        self.streak = streak(&self.completed_dates, today);
    }

    pub fn completed_on(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&date)
    }
}

/// Length of the consecutive-day run ending today; 0 when today is missing.
pub fn streak(completed: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    if !completed.contains(&today) {
        return 0;
    }
    let mut run = 1;
    let mut cursor = today;
    while let Some(prev) = cursor.pred_opt() {
        if !completed.contains(&prev) {
            break;
        }
        run += 1;
        cursor = prev;
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days_back(today: NaiveDate, offsets: &[i64]) -> BTreeSet<NaiveDate> {
        offsets
            .iter()
            .map(|n| today - chrono::Duration::days(*n))
            .collect()
    }

    #[test]
    fn streak_counts_consecutive_run() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let dates = days_back(today, &[0, 1, 2]);
        assert_eq!(streak(&dates, today), 3);
    }

    #[test]
    fn streak_stops_at_gap() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let dates = days_back(today, &[0, 2]);
        assert_eq!(streak(&dates, today), 1);
    }

    #[test]
    fn streak_zero_when_today_missing() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let dates = days_back(today, &[1]);
        assert_eq!(streak(&dates, today), 0);
    }

    #[test]
    fn streak_zero_on_empty_set() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        assert_eq!(streak(&BTreeSet::new(), today), 0);
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let mut habit = Habit::new("Meditate", Frequency::Daily);
        habit.completed_dates = days_back(today, &[1, 2]);
        habit.recalculate_streak(today);
        let before = habit.clone();

        habit.toggle(today, today);
        assert_eq!(habit.streak, 3);
        habit.toggle(today, today);

        assert_eq!(habit.completed_dates, before.completed_dates);
        assert_eq!(habit.streak, before.streak);
    }
}
