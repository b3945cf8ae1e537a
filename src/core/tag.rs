use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// The tags every fresh workspace starts with.
pub fn default_tags() -> Vec<Tag> {
    vec![
        Tag::new("Work", "#3B82F6"),
        Tag::new("Personal", "#10B981"),
        Tag::new("Health", "#EF4444"),
        Tag::new("Learning", "#8B5CF6"),
        Tag::new("Finance", "#F59E0B"),
    ]
}
