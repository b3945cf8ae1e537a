use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_NOTE_COLOR: &str = "#6366f1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub color: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Note {
    pub fn new(title: impl Into<String>) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: String::new(),
            color: DEFAULT_NOTE_COLOR.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance the edit stamp; it never moves backwards.
    pub fn touch(&mut self, now: NaiveDateTime) {
        self.updated_at = self.updated_at.max(now);
    }
}
