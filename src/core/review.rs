use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reflection on one Sunday-to-Saturday week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReview {
    pub id: Uuid,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub completed_goals: Vec<Uuid>,
    pub insights: Vec<String>,
    pub next_week_focus: Vec<String>,
    /// 1 (rough week) to 5 (great week).
    pub rating: u8,
    pub notes: String,
    pub created_at: NaiveDateTime,
}

impl WeeklyReview {
    pub fn new(week_start: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            week_start,
            week_end: week_start + chrono::Duration::days(6),
            completed_goals: Vec::new(),
            insights: Vec::new(),
            next_week_focus: Vec::new(),
            rating: 3,
            notes: String::new(),
            created_at: Local::now().naive_local(),
        }
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.week_start <= date && date <= self.week_end
    }
}

/// Sunday-to-Saturday bounds of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let back = date.weekday().num_days_from_sunday() as i64;
    let start = date - chrono::Duration::days(back);
    (start, start + chrono::Duration::days(6))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_bounds_start_on_sunday() {
        // 2024-03-13 is a Wednesday.
        let wed = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let (start, end) = week_bounds(wed);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    }

    #[test]
    fn week_bounds_of_a_sunday_are_that_week() {
        let sun = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let (start, end) = week_bounds(sun);
        assert_eq!(start, sun);
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    }

    #[test]
    fn new_review_spans_seven_days() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let review = WeeklyReview::new(start);
        assert_eq!(review.week_end, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert_eq!(review.rating, 3);
        assert!(review.covers(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()));
        assert!(!review.covers(NaiveDate::from_ymd_opt(2024, 3, 17).unwrap()));
    }
}
