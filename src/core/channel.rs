use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub author: String,
    pub created_at: NaiveDateTime,
}

impl ChatMessage {
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            author: author.into(),
            created_at: chrono::Local::now().naive_local(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub color: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: NaiveDateTime,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            color: "#3B82F6".to_string(),
            messages: Vec::new(),
            created_at: chrono::Local::now().naive_local(),
        }
    }

    fn seeded(name: &str, description: &str, color: &str) -> Self {
        let mut channel = Self::new(name);
        channel.description = description.to_string();
        channel.color = color.to_string();
        channel
    }
}

/// The channels every fresh workspace starts with.
pub fn default_channels() -> Vec<Channel> {
    vec![
        Channel::seeded("General", "General discussions", "#3B82F6"),
        Channel::seeded("Projects", "Project updates", "#10B981"),
        Channel::seeded("Ideas", "Share your ideas", "#8B5CF6"),
    ]
}
