use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_EVENT_COLOR: &str = "#6366f1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    /// Date of the next occurrence after `date`, or `None` for one-off events.
    pub fn advance(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::None => None,
            Self::Daily => Some(date + chrono::Duration::days(1)),
            Self::Weekly => Some(date + chrono::Duration::weeks(1)),
            Self::Monthly => Some(add_months(date, 1)),
            Self::Yearly => Some(add_months(date, 12)),
        }
    }
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total_months = date.month0() + months;
    let new_year = date.year() + (total_months / 12) as i32;
    let new_month = (total_months % 12) + 1;
    // Clamp day to valid range for the new month
    let max_day = days_in_month(new_year, new_month);
    let new_day = date.day().min(max_day);
    NaiveDate::from_ymd_opt(new_year, new_month, new_day).unwrap_or(date)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(
        if month == 12 { year + 1 } else { year },
        if month == 12 { 1 } else { month + 1 },
        1,
    )
    .unwrap()
    .pred_opt()
    .unwrap()
    .day()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
    pub color: String,
    pub recurring: Recurrence,
    /// Reminder lead time in minutes before the start.
    pub reminder: Option<i64>,
}

impl Event {
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let mut event = Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            start,
            end,
            all_day: false,
            color: DEFAULT_EVENT_COLOR.to_string(),
            recurring: Recurrence::None,
            reminder: None,
        };
        event.normalize();
        event
    }

    /// An event must not end before it starts; the end is clamped up.
    pub fn normalize(&mut self) {
        if self.end < self.start {
            self.end = self.start;
        }
    }

    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.start.date() == date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn end_clamped_to_start() {
        let event = Event::new("Standup", dt(2026, 4, 1, 10, 0), dt(2026, 4, 1, 9, 0));
        assert_eq!(event.end, event.start);
    }

    #[test]
    fn advance_daily_and_weekly() {
        let date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        assert_eq!(
            Recurrence::Daily.advance(date),
            NaiveDate::from_ymd_opt(2026, 4, 2)
        );
        assert_eq!(
            Recurrence::Weekly.advance(date),
            NaiveDate::from_ymd_opt(2026, 4, 8)
        );
        assert_eq!(Recurrence::None.advance(date), None);
    }

    #[test]
    fn advance_monthly_clamps_to_month_end() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert_eq!(
            Recurrence::Monthly.advance(date),
            NaiveDate::from_ymd_opt(2026, 2, 28)
        );
    }

    #[test]
    fn occurs_on_start_date() {
        let event = Event::new("Review", dt(2026, 4, 3, 14, 0), dt(2026, 4, 3, 15, 0));
        assert!(event.occurs_on(NaiveDate::from_ymd_opt(2026, 4, 3).unwrap()));
        assert!(!event.occurs_on(NaiveDate::from_ymd_opt(2026, 4, 4).unwrap()));
    }
}
