use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Deserialize;

use crate::core::goal::Goal;
use crate::core::habit::{Frequency, Habit};
use crate::core::project::Project;
use crate::core::task::{Priority, Task};
use crate::store::Snapshot;

const KEYRING_SERVER: &str = "assistant-api";

const SYSTEM_PROMPT: &str = "You are Flowstate AI, a friendly productivity assistant inside a task \
management app. You help users plan their day, build habits, set goals and manage tasks and \
projects. You can see the user's current productivity data; use it to give specific, actionable \
advice. Keep responses under 300 words and format them with markdown.\n\n\
IMPORTANT - creating items: when the user asks you to CREATE, ADD, MAKE or SCHEDULE something, \
include the matching fenced block in your reply (one block per item, do not ask for \
confirmation):\n\n\
```json:task\n{\"title\": \"The task title\", \"priority\": \"medium\", \"dueDate\": null}\n```\n\
Priority is one of \"low\", \"medium\", \"high\", \"urgent\"; dates are \"YYYY-MM-DD\" or null. \
A task may also carry \"startDate\" and \"endDate\" to appear on the timeline.\n\n\
```json:project\n{\"name\": \"Project name\", \"description\": \"...\", \"startDate\": \
\"2025-01-20\", \"endDate\": \"2025-02-15\", \"color\": \"#6366f1\"}\n```\n\n\
```json:habit\n{\"name\": \"The habit name\", \"frequency\": \"daily\", \"description\": \"...\"}\n```\n\
Frequency is one of \"daily\", \"weekly\", \"monthly\".\n\n\
```json:goal\n{\"title\": \"The goal title\", \"description\": \"...\", \"targetDate\": null}\n```\n\n\
When the user lists several items, emit one block per item. Always add a short confirmation \
sentence alongside the blocks, like \"Done! I've created that for you.\"";

/// One turn of the running conversation handed to the model.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// The productivity summary prepended to every conversation so the model
/// answers against the user's real data.
pub fn build_context_message(snapshot: &Snapshot, now: NaiveDateTime) -> String {
    let today = now.date();

    let completed_today = snapshot
        .tasks
        .iter()
        .filter(|t| t.completed_on(today))
        .count();
    let pending = snapshot
        .tasks
        .iter()
        .filter(|t| !t.status.is_done())
        .count();
    let urgent = snapshot
        .tasks
        .iter()
        .filter(|t| t.priority == Priority::Urgent && !t.status.is_done())
        .count();

    let urgent_tasks: Vec<String> = snapshot
        .tasks
        .iter()
        .filter(|t| t.priority == Priority::Urgent && !t.status.is_done())
        .map(|t| t.title.clone())
        .take(5)
        .collect();

    let scheduled_tasks: Vec<String> = snapshot
        .tasks
        .iter()
        .filter(|t| t.is_scheduled())
        .filter_map(|t| {
            let (start, end) = (t.start_date?, t.end_date?);
            Some(format!("{} ({} - {})", t.title, start, end))
        })
        .take(5)
        .collect();

    let projects: Vec<String> = snapshot
        .projects
        .iter()
        .map(|p| match (p.start_date, p.end_date) {
            (Some(start), Some(end)) => {
                format!("{} ({} - {}, {}% complete)", p.name, start, end, p.progress)
            }
            _ => format!("{} ({}% complete)", p.name, p.progress),
        })
        .take(5)
        .collect();

    let today_events: Vec<String> = snapshot
        .events
        .iter()
        .filter(|e| e.occurs_on(today))
        .map(|e| format!("{} ({})", e.title, e.start.format("%H:%M")))
        .take(5)
        .collect();

    let habits: Vec<String> = snapshot
        .habits
        .iter()
        .map(|h| format!("{} ({} day streak)", h.name, h.streak))
        .take(5)
        .collect();

    let goals: Vec<String> = snapshot
        .goals
        .iter()
        .filter(|g| !g.achieved)
        .map(|g| format!("{} ({}% complete)", g.title, g.progress))
        .take(5)
        .collect();

    let join = |items: Vec<String>, fallback: &str| {
        if items.is_empty() {
            fallback.to_string()
        } else {
            items.join(", ")
        }
    };

    format!(
        "**Current Date:** {}\n\n\
         **User's Productivity Summary:**\n\
         - Completed today: {} tasks\n\
         - Pending tasks: {}\n\
         - Urgent tasks: {}\n\n\
         **Urgent Tasks:** {}\n\n\
         **Scheduled Tasks (Gantt):** {}\n\n\
         **Active Projects:** {}\n\n\
         **Today's Events:** {}\n\n\
         **Active Habits:** {}\n\n\
         **Active Goals:** {}",
        today.format("%A, %B %-d, %Y"),
        completed_today,
        pending,
        urgent,
        join(urgent_tasks, "None"),
        join(scheduled_tasks, "None"),
        join(projects, "No active projects"),
        join(today_events, "No events scheduled"),
        join(habits, "No habits tracked"),
        join(goals, "No active goals"),
    )
}

/// Call the Anthropic Messages API with the running conversation plus the
/// productivity context. Returns the raw reply text, blocks and all.
pub async fn chat(api_key: &str, history: &[ChatTurn], context: &str) -> Result<String, String> {
    let system = format!("{}\n\nCurrent user context:\n{}", SYSTEM_PROMPT, context);
    let messages: Vec<serde_json::Value> = history
        .iter()
        .map(|turn| serde_json::json!({ "role": turn.role.as_str(), "content": turn.content }))
        .collect();

    let body = serde_json::json!({
        "model": "claude-haiku-4-5-20251001",
        "max_tokens": 1000,
        "system": system,
        "messages": messages,
    });

    let client = reqwest::Client::new();
    let resp = client
        .post("https://api.anthropic.com/v1/messages")
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| format!("API request failed: {}", e))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        return Err(format!("API error {}: {}", status, text));
    }

    let api_resp: serde_json::Value = resp
        .json()
        .await
        .map_err(|e| format!("Failed to parse API response: {}", e))?;

    api_resp["content"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|block| block["text"].as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| "No text in API response".to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    #[serde(alias = "dueDate")]
    pub due_date: Option<String>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

impl TaskDraft {
    pub fn into_task(self) -> Task {
        let mut task = Task::new(self.title.unwrap_or_else(|| "Untitled Task".to_string()));
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority.as_deref().and_then(Priority::parse) {
            task.priority = priority;
        }
        task.due_date = self.due_date.as_deref().and_then(parse_block_date);
        task.start_date = self.start_date.as_deref().and_then(parse_block_date);
        task.end_date = self.end_date.as_deref().and_then(parse_block_date);
        task
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
    pub color: Option<String>,
}

impl ProjectDraft {
    /// Undated projects get a two-week span starting today, as the model is
    /// told to schedule them for the timeline.
    pub fn into_project(self, today: NaiveDate) -> Project {
        let mut project = Project::new(self.name.unwrap_or_else(|| "Untitled Project".to_string()));
        if let Some(description) = self.description {
            project.description = description;
        }
        project.start_date = Some(
            self.start_date
                .as_deref()
                .and_then(parse_block_date)
                .unwrap_or(today),
        );
        project.end_date = Some(
            self.end_date
                .as_deref()
                .and_then(parse_block_date)
                .unwrap_or(today + chrono::Duration::days(14)),
        );
        if let Some(color) = self.color {
            project.color = color;
        }
        project
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HabitDraft {
    pub name: Option<String>,
    pub frequency: Option<String>,
    pub description: Option<String>,
}

impl HabitDraft {
    pub fn into_habit(self) -> Habit {
        let frequency = self
            .frequency
            .as_deref()
            .and_then(Frequency::parse)
            .unwrap_or(Frequency::Daily);
        let mut habit = Habit::new(
            self.name.unwrap_or_else(|| "Untitled Habit".to_string()),
            frequency,
        );
        if let Some(description) = self.description {
            habit.description = description;
        }
        habit
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "targetDate")]
    pub target_date: Option<String>,
}

impl GoalDraft {
    pub fn into_goal(self) -> Goal {
        let mut goal = Goal::new(self.title.unwrap_or_else(|| "Untitled Goal".to_string()));
        if let Some(description) = self.description {
            goal.description = description;
        }
        goal.target_date = self.target_date.as_deref().and_then(parse_block_date);
        goal
    }
}

/// Creation requests recovered from one model reply, plus the reply text with
/// the recognized blocks removed.
#[derive(Debug, Clone, Default)]
pub struct ParsedReply {
    pub text: String,
    pub tasks: Vec<TaskDraft>,
    pub projects: Vec<ProjectDraft>,
    pub habits: Vec<HabitDraft>,
    pub goals: Vec<GoalDraft>,
}

impl ParsedReply {
    pub fn draft_count(&self) -> usize {
        self.tasks.len() + self.projects.len() + self.habits.len() + self.goals.len()
    }
}

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```\s*(?:json)?:?\s*(task|project|habit|goal)\s*\n?(\{.*?\})\s*```")
        .unwrap()
});

/// Pull creation blocks out of a free-text reply. Each block is decoded
/// independently; a malformed one is logged, skipped, and left in the text so
/// the user can see what the model produced.
pub fn parse_reply(reply: &str) -> ParsedReply {
    let mut parsed = ParsedReply::default();
    let mut excised: Vec<(usize, usize)> = Vec::new();

    for caps in BLOCK_RE.captures_iter(reply) {
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        let kind = caps[1].to_lowercase();
        let body = &caps[2];

        let ok = match kind.as_str() {
            "task" => match serde_json::from_str::<TaskDraft>(body) {
                Ok(draft) => {
                    parsed.tasks.push(draft);
                    true
                }
                Err(e) => {
                    log::warn!("Skipping malformed task block: {}", e);
                    false
                }
            },
            "project" => match serde_json::from_str::<ProjectDraft>(body) {
                Ok(draft) => {
                    parsed.projects.push(draft);
                    true
                }
                Err(e) => {
                    log::warn!("Skipping malformed project block: {}", e);
                    false
                }
            },
            "habit" => match serde_json::from_str::<HabitDraft>(body) {
                Ok(draft) => {
                    parsed.habits.push(draft);
                    true
                }
                Err(e) => {
                    log::warn!("Skipping malformed habit block: {}", e);
                    false
                }
            },
            "goal" => match serde_json::from_str::<GoalDraft>(body) {
                Ok(draft) => {
                    parsed.goals.push(draft);
                    true
                }
                Err(e) => {
                    log::warn!("Skipping malformed goal block: {}", e);
                    false
                }
            },
            _ => false,
        };

        if ok {
            excised.push(whole);
        }
    }

    let mut text = String::new();
    let mut cursor = 0;
    for (start, end) in excised {
        text.push_str(&reply[cursor..start]);
        cursor = end;
    }
    text.push_str(&reply[cursor..]);
    parsed.text = text.trim().to_string();
    parsed
}

/// Dates arrive as "YYYY-MM-DD", but the model occasionally appends a time
/// part; the first ten characters are given a second chance.
fn parse_block_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().or_else(|| {
        s.get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    })
}

/// Store the assistant API key in the system keyring.
pub async fn store_api_key(key: &str) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", super::session::SERVICE_NAME);
    attrs.insert("server", KEYRING_SERVER);

    keyring
        .create_item("Flowstate Assistant API Key", &attrs, key.as_bytes(), true)
        .await
        .map_err(|e| format!("Failed to store API key: {}", e))?;

    Ok(())
}

/// Load the assistant API key from the system keyring.
pub async fn load_api_key() -> Result<Option<String>, String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let mut attrs = HashMap::new();
    attrs.insert("service", super::session::SERVICE_NAME);
    attrs.insert("server", KEYRING_SERVER);

    let items = keyring
        .search_items(&attrs)
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    if let Some(item) = items.first() {
        let secret_bytes = item
            .secret()
            .await
            .map_err(|e| format!("Failed to read secret: {}", e))?;
        let key = String::from_utf8(secret_bytes.to_vec())
            .map_err(|e| format!("Invalid UTF-8 in secret: {}", e))?;
        if !key.is_empty() {
            return Ok(Some(key));
        }
    }

    Ok(None)
}
