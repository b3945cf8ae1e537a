//! Row shapes for the remote table store, one per synced table. This is the
//! single place where in-memory entities and snake_case columns meet: every
//! entity field must appear in its record, or it silently vanishes on the
//! next round-trip.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::channel::{Channel, ChatMessage};
use crate::core::event::{Event, Recurrence};
use crate::core::goal::{Goal, Milestone};
use crate::core::habit::{Frequency, Habit};
use crate::core::note::Note;
use crate::core::project::Project;
use crate::core::review::WeeklyReview;
use crate::core::task::{Priority, Task, TaskStatus};

/// Timestamps travel as ISO-8601 strings. The remote store may hand back a
/// UTC offset or a `Z` suffix; we accept both plus the plain naive form.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(at) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(at.naive_utc());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

fn parse_timestamp_or_now(s: &str) -> NaiveDateTime {
    parse_timestamp(s).unwrap_or_else(|| {
        log::debug!("unreadable timestamp {s:?}, substituting now");
        Local::now().naive_local()
    })
}

fn timestamp_string(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub tags: Vec<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub project_id: Option<Uuid>,
    pub completed_at: Option<String>,
    pub color: String,
    pub created_at: String,
}

impl TaskRecord {
    pub const TABLE: &'static str = "tasks";

    pub fn from_entity(owner: Uuid, task: &Task) -> Self {
        Self {
            id: task.id,
            user_id: owner,
            title: task.title.clone(),
            description: Some(task.description.clone()),
            status: task.status,
            priority: task.priority,
            tags: task.tags.clone(),
            due_date: task.due_date,
            start_date: task.start_date,
            end_date: task.end_date,
            project_id: task.project_id,
            completed_at: task.completed_at.map(timestamp_string),
            color: task.color.clone(),
            created_at: timestamp_string(task.created_at),
        }
    }

    pub fn into_entity(self) -> Task {
        Task {
            id: self.id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            status: self.status,
            priority: self.priority,
            tags: self.tags,
            due_date: self.due_date,
            start_date: self.start_date,
            end_date: self.end_date,
            project_id: self.project_id,
            completed_at: self.completed_at.as_deref().and_then(parse_timestamp),
            color: self.color,
            created_at: parse_timestamp_or_now(&self.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub all_day: bool,
    pub color: String,
    pub recurring: Recurrence,
    pub reminder: Option<i64>,
}

impl EventRecord {
    pub const TABLE: &'static str = "events";

    pub fn from_entity(owner: Uuid, event: &Event) -> Self {
        Self {
            id: event.id,
            user_id: owner,
            title: event.title.clone(),
            description: Some(event.description.clone()),
            start_date: timestamp_string(event.start),
            end_date: timestamp_string(event.end),
            all_day: event.all_day,
            color: event.color.clone(),
            recurring: event.recurring,
            reminder: event.reminder,
        }
    }

    pub fn into_entity(self) -> Event {
        let start = parse_timestamp_or_now(&self.start_date);
        let mut event = Event {
            id: self.id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            start,
            end: parse_timestamp(&self.end_date).unwrap_or(start),
            all_day: self.all_day,
            color: self.color,
            recurring: self.recurring,
            reminder: self.reminder,
        };
        event.normalize();
        event
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: u8,
    pub created_at: String,
}

impl ProjectRecord {
    pub const TABLE: &'static str = "projects";

    pub fn from_entity(owner: Uuid, project: &Project) -> Self {
        Self {
            id: project.id,
            user_id: owner,
            name: project.name.clone(),
            description: Some(project.description.clone()),
            color: project.color.clone(),
            start_date: project.start_date,
            end_date: project.end_date,
            progress: project.progress,
            created_at: timestamp_string(project.created_at),
        }
    }

    pub fn into_entity(self) -> Project {
        Project {
            id: self.id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            color: self.color,
            start_date: self.start_date,
            end_date: self.end_date,
            progress: self.progress,
            created_at: parse_timestamp_or_now(&self.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub target_count: u32,
    pub color: String,
    pub completed_dates: Vec<NaiveDate>,
    pub streak: u32,
    pub created_at: String,
}

impl HabitRecord {
    pub const TABLE: &'static str = "habits";

    pub fn from_entity(owner: Uuid, habit: &Habit) -> Self {
        Self {
            id: habit.id,
            user_id: owner,
            name: habit.name.clone(),
            description: Some(habit.description.clone()),
            frequency: habit.frequency,
            target_count: habit.target_count,
            color: habit.color.clone(),
            completed_dates: habit.completed_dates.iter().copied().collect(),
            streak: habit.streak,
            created_at: timestamp_string(habit.created_at),
        }
    }

    pub fn into_entity(self) -> Habit {
        Habit {
            id: self.id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            frequency: self.frequency,
            target_count: self.target_count,
            color: self.color,
            completed_dates: self.completed_dates.into_iter().collect(),
            streak: self.streak,
            created_at: parse_timestamp_or_now(&self.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub progress: u8,
    pub achieved: bool,
    pub created_at: String,
}

impl GoalRecord {
    pub const TABLE: &'static str = "goals";

    pub fn from_entity(owner: Uuid, goal: &Goal) -> Self {
        Self {
            id: goal.id,
            user_id: owner,
            title: goal.title.clone(),
            description: Some(goal.description.clone()),
            target_date: goal.target_date,
            progress: goal.progress,
            achieved: goal.achieved,
            created_at: timestamp_string(goal.created_at),
        }
    }

    /// Milestones live in their own table; the bridge reattaches them.
    pub fn into_entity(self) -> Goal {
        Goal {
            id: self.id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            target_date: self.target_date,
            milestones: Vec::new(),
            progress: self.progress,
            achieved: self.achieved,
            created_at: parse_timestamp_or_now(&self.created_at),
        }
    }
}

/// Keyed by goal, not by owner — ownership follows the parent goal row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneRecord {
    pub id: Uuid,
    pub goal_id: Uuid,
    pub title: String,
    pub completed: bool,
    pub completed_at: Option<String>,
}

impl MilestoneRecord {
    pub const TABLE: &'static str = "milestones";

    pub fn from_entity(goal_id: Uuid, milestone: &Milestone) -> Self {
        Self {
            id: milestone.id,
            goal_id,
            title: milestone.title.clone(),
            completed: milestone.completed,
            completed_at: milestone.completed_at.map(timestamp_string),
        }
    }

    pub fn into_entity(self) -> Milestone {
        Milestone {
            id: self.id,
            title: self.title,
            completed: self.completed,
            completed_at: self.completed_at.as_deref().and_then(parse_timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
}

impl NoteRecord {
    pub const TABLE: &'static str = "notes";

    pub fn from_entity(owner: Uuid, note: &Note) -> Self {
        Self {
            id: note.id,
            user_id: owner,
            title: note.title.clone(),
            content: Some(note.content.clone()),
            color: note.color.clone(),
            created_at: timestamp_string(note.created_at),
            updated_at: timestamp_string(note.updated_at),
        }
    }

    pub fn into_entity(self) -> Note {
        Note {
            id: self.id,
            title: self.title,
            content: self.content.unwrap_or_default(),
            color: self.color,
            created_at: parse_timestamp_or_now(&self.created_at),
            updated_at: parse_timestamp_or_now(&self.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub created_at: String,
}

impl ChannelRecord {
    pub const TABLE: &'static str = "channels";

    pub fn from_entity(owner: Uuid, channel: &Channel) -> Self {
        Self {
            id: channel.id,
            user_id: owner,
            name: channel.name.clone(),
            description: Some(channel.description.clone()),
            color: channel.color.clone(),
            created_at: timestamp_string(channel.created_at),
        }
    }

    /// Messages live in their own table; the bridge reattaches them.
    pub fn into_entity(self) -> Channel {
        Channel {
            id: self.id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            color: self.color,
            messages: Vec::new(),
            created_at: parse_timestamp_or_now(&self.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub author: String,
    pub created_at: String,
}

impl MessageRecord {
    pub const TABLE: &'static str = "messages";

    pub fn from_entity(owner: Uuid, channel_id: Uuid, message: &ChatMessage) -> Self {
        Self {
            id: message.id,
            channel_id,
            user_id: owner,
            content: message.content.clone(),
            author: message.author.clone(),
            created_at: timestamp_string(message.created_at),
        }
    }

    pub fn into_entity(self) -> ChatMessage {
        ChatMessage {
            id: self.id,
            content: self.content,
            author: self.author,
            created_at: parse_timestamp_or_now(&self.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub completed_goals: Vec<Uuid>,
    pub insights: Vec<String>,
    pub next_week_focus: Vec<String>,
    pub rating: u8,
    pub notes: Option<String>,
    pub created_at: String,
}

impl ReviewRecord {
    pub const TABLE: &'static str = "weekly_reviews";

    pub fn from_entity(owner: Uuid, review: &WeeklyReview) -> Self {
        Self {
            id: review.id,
            user_id: owner,
            week_start: review.week_start,
            week_end: review.week_end,
            completed_goals: review.completed_goals.clone(),
            insights: review.insights.clone(),
            next_week_focus: review.next_week_focus.clone(),
            rating: review.rating,
            notes: Some(review.notes.clone()),
            created_at: timestamp_string(review.created_at),
        }
    }

    pub fn into_entity(self) -> WeeklyReview {
        WeeklyReview {
            id: self.id,
            week_start: self.week_start,
            week_end: self.week_end,
            completed_goals: self.completed_goals,
            insights: self.insights,
            next_week_focus: self.next_week_focus,
            rating: self.rating,
            notes: self.notes.unwrap_or_default(),
            created_at: parse_timestamp_or_now(&self.created_at),
        }
    }
}
