use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub completed_at: Option<NaiveDateTime>,
}

impl Milestone {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            completed: false,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub target_date: Option<NaiveDate>,
    pub milestones: Vec<Milestone>,
    /// Cached milestone completion percentage; kept in step by the store.
    pub progress: u8,
    pub achieved: bool,
    pub created_at: NaiveDateTime,
}

impl Goal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: String::new(),
            target_date: None,
            milestones: Vec::new(),
            progress: 0,
            achieved: false,
            created_at: chrono::Local::now().naive_local(),
        }
    }

    /// progress = round(100 * done / total), 0 without milestones;
    /// achieved exactly when progress reaches 100.
    pub fn recalculate_progress(&mut self) {
        let total = self.milestones.len();
        self.progress = if total == 0 {
            0
        } else {
            let done = self.milestones.iter().filter(|m| m.completed).count();
            ((done as f64 / total as f64) * 100.0).round() as u8
        };
        self.achieved = self.progress == 100;
    }

    /// Flip one milestone, stamp its completion time, refresh the caches.
    /// Unknown milestone ids leave the goal untouched.
    pub fn toggle_milestone(&mut self, milestone_id: Uuid, now: NaiveDateTime) {
        let Some(milestone) = self.milestones.iter_mut().find(|m| m.id == milestone_id) else {
            return;
        };
        milestone.completed = !milestone.completed;
        milestone.completed_at = milestone.completed.then_some(now);
        self.recalculate_progress();
    }
}
