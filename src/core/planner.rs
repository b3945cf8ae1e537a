use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// First hour shown on the planner grid.
pub const WINDOW_START_HOUR: u32 = 6;
/// One past the last hour shown on the planner grid.
pub const WINDOW_END_HOUR: u32 = 22;

/// A block of time on the day planner, optionally linked to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerItem {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub completed: bool,
    pub task_id: Option<Uuid>,
}

impl PlannerItem {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            start,
            end,
            completed: false,
            task_id: None,
        }
    }

    /// Clamp the block to the visible planner window. Returns false when
    /// nothing of the block survives inside the window.
    pub fn clamp_to_window(&mut self) -> bool {
        let window_start = NaiveTime::from_hms_opt(WINDOW_START_HOUR, 0, 0).unwrap();
        let window_end = NaiveTime::from_hms_opt(WINDOW_END_HOUR, 0, 0).unwrap();
        self.start = self.start.clamp(window_start, window_end);
        self.end = self.end.clamp(window_start, window_end);
        self.start < self.end
    }

    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.date == date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    #[test]
    fn block_inside_window_is_untouched() {
        let mut item = PlannerItem::new(day(), t(9, 0), t(11, 30));
        assert!(item.clamp_to_window());
        assert_eq!(item.start, t(9, 0));
        assert_eq!(item.end, t(11, 30));
    }

    #[test]
    fn early_start_is_raised_to_window_open() {
        let mut item = PlannerItem::new(day(), t(5, 0), t(7, 0));
        assert!(item.clamp_to_window());
        assert_eq!(item.start, t(6, 0));
        assert_eq!(item.end, t(7, 0));
    }

    #[test]
    fn late_end_is_lowered_to_window_close() {
        let mut item = PlannerItem::new(day(), t(21, 0), t(23, 0));
        assert!(item.clamp_to_window());
        assert_eq!(item.end, t(22, 0));
    }

    #[test]
    fn block_outside_window_collapses() {
        let mut item = PlannerItem::new(day(), t(23, 0), t(23, 30));
        assert!(!item.clamp_to_window());
    }
}
