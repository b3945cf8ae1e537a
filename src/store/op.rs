use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::channel::{Channel, ChatMessage};
use crate::core::event::Event;
use crate::core::goal::Goal;
use crate::core::habit::Habit;
use crate::core::note::Note;
use crate::core::planner::PlannerItem;
use crate::core::project::Project;
use crate::core::reminder::Reminder;
use crate::core::review::WeeklyReview;
use crate::core::tag::Tag;
use crate::core::task::Task;
use crate::core::template::Template;
use crate::store::Snapshot;

/// Which screen the shell is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Dashboard,
    Calendar,
    Tasks,
    Kanban,
    Gantt,
    Planner,
    Goals,
    Habits,
    Analytics,
    Review,
    Channels,
    Notes,
    Assistant,
}

/// A complete or partial state produced by one of the loaders. Collections
/// left as `None` keep whatever the store already holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedState {
    pub tasks: Option<Vec<Task>>,
    pub events: Option<Vec<Event>>,
    pub projects: Option<Vec<Project>>,
    pub habits: Option<Vec<Habit>>,
    pub goals: Option<Vec<Goal>>,
    pub notes: Option<Vec<Note>>,
    pub channels: Option<Vec<Channel>>,
    pub tags: Option<Vec<Tag>>,
    pub templates: Option<Vec<Template>>,
    pub reminders: Option<Vec<Reminder>>,
    pub planner_items: Option<Vec<PlannerItem>>,
    pub weekly_reviews: Option<Vec<WeeklyReview>>,
    pub view: Option<View>,
    pub selected_date: Option<NaiveDate>,
    pub sidebar_open: Option<bool>,
    pub dark_mode: Option<bool>,
}

impl From<Snapshot> for LoadedState {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            tasks: Some(snapshot.tasks),
            events: Some(snapshot.events),
            projects: Some(snapshot.projects),
            habits: Some(snapshot.habits),
            goals: Some(snapshot.goals),
            notes: Some(snapshot.notes),
            channels: Some(snapshot.channels),
            tags: Some(snapshot.tags),
            templates: Some(snapshot.templates),
            reminders: Some(snapshot.reminders),
            planner_items: Some(snapshot.planner_items),
            weekly_reviews: Some(snapshot.weekly_reviews),
            view: Some(snapshot.view),
            selected_date: Some(snapshot.selected_date),
            sidebar_open: Some(snapshot.sidebar_open),
            dark_mode: Some(snapshot.dark_mode),
        }
    }
}

/// Every mutation the store accepts. The set is closed; views and
/// collaborators never touch the collections directly.
///
/// `Add`/`Update` carry the whole record (replace-by-id), `Delete` removes
/// by id, `Set` bulk-replaces a collection during load.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    AddTask(Task),
    UpdateTask(Task),
    DeleteTask(Uuid),
    SetTasks(Vec<Task>),

    AddEvent(Event),
    UpdateEvent(Event),
    DeleteEvent(Uuid),
    SetEvents(Vec<Event>),

    AddProject(Project),
    UpdateProject(Project),
    DeleteProject(Uuid),
    SetProjects(Vec<Project>),

    AddHabit(Habit),
    UpdateHabit(Habit),
    DeleteHabit(Uuid),
    SetHabits(Vec<Habit>),
    ToggleHabit { habit_id: Uuid, date: NaiveDate },

    AddGoal(Goal),
    UpdateGoal(Goal),
    DeleteGoal(Uuid),
    SetGoals(Vec<Goal>),
    ToggleMilestone { goal_id: Uuid, milestone_id: Uuid },

    AddNote(Note),
    UpdateNote(Note),
    DeleteNote(Uuid),
    SetNotes(Vec<Note>),

    AddChannel(Channel),
    SetChannels(Vec<Channel>),
    AddMessage { channel_id: Uuid, message: ChatMessage },

    AddTag(Tag),
    DeleteTag(Uuid),

    AddReminder(Reminder),
    DismissReminder(Uuid),

    AddPlannerItem(PlannerItem),
    UpdatePlannerItem(PlannerItem),
    DeletePlannerItem(Uuid),

    AddReview(WeeklyReview),
    SetReviews(Vec<WeeklyReview>),

    SetView(View),
    SetSelectedDate(NaiveDate),
    ToggleSidebar,
    ToggleDarkMode,

    Load(Box<LoadedState>),
}
