use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::Task;

pub const DEFAULT_PROJECT_COLOR: &str = "#6366f1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub color: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Cached share of owned tasks that are done; the store recomputes it
    /// whenever any task changes.
    pub progress: u8,
    pub created_at: NaiveDateTime,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            color: DEFAULT_PROJECT_COLOR.to_string(),
            start_date: None,
            end_date: None,
            progress: 0,
            created_at: chrono::Local::now().naive_local(),
        }
    }
}

/// Completion percentage of the tasks owned by a project; 0 with no tasks.
pub fn project_progress(tasks: &[Task], project_id: Uuid) -> u8 {
    let owned: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.project_id == Some(project_id))
        .collect();
    if owned.is_empty() {
        return 0;
    }
    let done = owned.iter().filter(|t| t.status.is_done()).count();
    ((done as f64 / owned.len() as f64) * 100.0).round() as u8
}
