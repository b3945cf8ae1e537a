use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::Priority;

/// One task a template stamps out when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSeed {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub tags: Vec<Uuid>,
}

impl TaskSeed {
    fn new(title: &str, priority: Priority) -> Self {
        Self {
            title: title.to_string(),
            description: String::new(),
            priority,
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub tasks: Vec<TaskSeed>,
}

impl Template {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            category: category.into(),
            tasks: Vec::new(),
        }
    }
}

/// The templates every fresh workspace starts with.
pub fn builtin_templates() -> Vec<Template> {
    let mut standup = Template::new("Daily Standup", "Work");
    standup.description = "Quick template for daily standup tasks".to_string();
    standup.tasks = vec![
        TaskSeed::new("Review yesterday's progress", Priority::Medium),
        TaskSeed::new("Plan today's tasks", Priority::High),
        TaskSeed::new("Check blockers", Priority::Urgent),
    ];

    let mut weekly = Template::new("Weekly Planning", "Productivity");
    weekly.description = "Plan your week ahead".to_string();
    weekly.tasks = vec![
        TaskSeed::new("Review last week's goals", Priority::High),
        TaskSeed::new("Set weekly priorities", Priority::Urgent),
        TaskSeed::new("Schedule important meetings", Priority::High),
        TaskSeed::new("Block focus time", Priority::Medium),
    ];

    let mut kickoff = Template::new("Project Kickoff", "Projects");
    kickoff.description = "Start a new project right".to_string();
    kickoff.tasks = vec![
        TaskSeed::new("Define project scope", Priority::Urgent),
        TaskSeed::new("Identify stakeholders", Priority::High),
        TaskSeed::new("Create timeline", Priority::High),
        TaskSeed::new("Assign roles", Priority::Medium),
        TaskSeed::new("Set up communication channels", Priority::Medium),
    ];

    vec![standup, weekly, kickoff]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_templates_carry_seeds() {
        let templates = builtin_templates();
        assert_eq!(templates.len(), 3);
        assert_eq!(templates[0].tasks.len(), 3);
        assert_eq!(templates[2].tasks.len(), 5);
        assert_eq!(templates[1].tasks[1].priority, Priority::Urgent);
    }
}
