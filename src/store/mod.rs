pub mod op;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::channel::{default_channels, Channel};
use crate::core::event::Event;
use crate::core::goal::Goal;
use crate::core::habit::Habit;
use crate::core::note::Note;
use crate::core::planner::PlannerItem;
use crate::core::project::{project_progress, Project};
use crate::core::reminder::Reminder;
use crate::core::review::WeeklyReview;
use crate::core::tag::{default_tags, Tag};
use crate::core::task::Task;
use crate::core::template::{builtin_templates, Template};
use op::{LoadedState, Op, View};

/// The complete in-memory value every view reads: all entity collections plus
/// the UI-mode flags. One instance exists per running application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
    pub projects: Vec<Project>,
    pub habits: Vec<Habit>,
    pub goals: Vec<Goal>,
    pub notes: Vec<Note>,
    pub channels: Vec<Channel>,
    pub tags: Vec<Tag>,
    pub templates: Vec<Template>,
    pub reminders: Vec<Reminder>,
    pub planner_items: Vec<PlannerItem>,
    pub weekly_reviews: Vec<WeeklyReview>,
    pub view: View,
    pub selected_date: NaiveDate,
    pub sidebar_open: bool,
    pub dark_mode: bool,
}

impl Snapshot {
    /// The state a fresh workspace starts from: default tags, channels and
    /// templates, everything else empty.
    pub fn seeded() -> Self {
        Self {
            tasks: Vec::new(),
            events: Vec::new(),
            projects: Vec::new(),
            habits: Vec::new(),
            goals: Vec::new(),
            notes: Vec::new(),
            channels: default_channels(),
            tags: default_tags(),
            templates: builtin_templates(),
            reminders: Vec::new(),
            planner_items: Vec::new(),
            weekly_reviews: Vec::new(),
            view: View::Dashboard,
            selected_date: Local::now().date_naive(),
            sidebar_open: true,
            dark_mode: true,
        }
    }
}

/// Single writer of the snapshot. Applies the closed operation set; the
/// transition is total — unknown ids no-op on the collection they target and
/// derived caches are refreshed whenever their source data changes.
#[derive(Debug)]
pub struct Store {
    snapshot: Snapshot,
}

impl Store {
    pub fn new() -> Self {
        Self {
            snapshot: Snapshot::seeded(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn apply(&mut self, op: Op) {
        let now = Local::now().naive_local();
        let today = now.date();
        match op {
            Op::AddTask(mut task) => {
                normalize_task(&mut task, now);
                self.snapshot.tasks.push(task);
                self.refresh_project_progress();
            }
            Op::UpdateTask(mut task) => {
                normalize_task(&mut task, now);
                match self.snapshot.tasks.iter_mut().find(|t| t.id == task.id) {
                    Some(slot) => *slot = task,
                    None => log::debug!("update for unknown task {}", task.id),
                }
                self.refresh_project_progress();
            }
            Op::DeleteTask(id) => {
                self.snapshot.tasks.retain(|t| t.id != id);
                // Planner blocks belonging to the task go with it.
                self.snapshot.planner_items.retain(|p| p.task_id != Some(id));
                self.refresh_project_progress();
            }
            Op::SetTasks(mut tasks) => {
                for task in &mut tasks {
                    normalize_task(task, now);
                }
                self.snapshot.tasks = tasks;
                self.refresh_project_progress();
            }

            Op::AddEvent(mut event) => {
                event.normalize();
                self.snapshot.events.push(event);
            }
            Op::UpdateEvent(mut event) => {
                event.normalize();
                match self.snapshot.events.iter_mut().find(|e| e.id == event.id) {
                    Some(slot) => *slot = event,
                    None => log::debug!("update for unknown event {}", event.id),
                }
            }
            Op::DeleteEvent(id) => self.snapshot.events.retain(|e| e.id != id),
            Op::SetEvents(mut events) => {
                for event in &mut events {
                    event.normalize();
                }
                self.snapshot.events = events;
            }

            Op::AddProject(mut project) => {
                project.progress = project_progress(&self.snapshot.tasks, project.id);
                self.snapshot.projects.push(project);
            }
            Op::UpdateProject(mut project) => {
                project.progress = project_progress(&self.snapshot.tasks, project.id);
                match self.snapshot.projects.iter_mut().find(|p| p.id == project.id) {
                    Some(slot) => *slot = project,
                    None => log::debug!("update for unknown project {}", project.id),
                }
            }
            // Tasks keep their project_id; the dangling reference is harmless
            // and mirrors how deletion has always behaved here.
            Op::DeleteProject(id) => self.snapshot.projects.retain(|p| p.id != id),
            Op::SetProjects(projects) => {
                self.snapshot.projects = projects;
                self.refresh_project_progress();
            }

            Op::AddHabit(mut habit) => {
                habit.recalculate_streak(today);
                self.snapshot.habits.push(habit);
            }
            Op::UpdateHabit(mut habit) => {
                habit.recalculate_streak(today);
                match self.snapshot.habits.iter_mut().find(|h| h.id == habit.id) {
                    Some(slot) => *slot = habit,
                    None => log::debug!("update for unknown habit {}", habit.id),
                }
            }
            Op::DeleteHabit(id) => self.snapshot.habits.retain(|h| h.id != id),
            Op::SetHabits(mut habits) => {
                for habit in &mut habits {
                    habit.recalculate_streak(today);
                }
                self.snapshot.habits = habits;
            }
            Op::ToggleHabit { habit_id, date } => {
                match self.snapshot.habits.iter_mut().find(|h| h.id == habit_id) {
                    Some(habit) => habit.toggle(date, today),
                    None => log::debug!("toggle for unknown habit {habit_id}"),
                }
            }

            Op::AddGoal(mut goal) => {
                goal.recalculate_progress();
                self.snapshot.goals.push(goal);
            }
            Op::UpdateGoal(mut goal) => {
                goal.recalculate_progress();
                match self.snapshot.goals.iter_mut().find(|g| g.id == goal.id) {
                    Some(slot) => *slot = goal,
                    None => log::debug!("update for unknown goal {}", goal.id),
                }
            }
            Op::DeleteGoal(id) => self.snapshot.goals.retain(|g| g.id != id),
            Op::SetGoals(mut goals) => {
                for goal in &mut goals {
                    goal.recalculate_progress();
                }
                self.snapshot.goals = goals;
            }
            Op::ToggleMilestone { goal_id, milestone_id } => {
                match self.snapshot.goals.iter_mut().find(|g| g.id == goal_id) {
                    Some(goal) => goal.toggle_milestone(milestone_id, now),
                    None => log::debug!("milestone toggle for unknown goal {goal_id}"),
                }
            }

            Op::AddNote(note) => self.snapshot.notes.push(note),
            Op::UpdateNote(mut note) => {
                match self.snapshot.notes.iter_mut().find(|n| n.id == note.id) {
                    Some(slot) => {
                        note.updated_at = slot.updated_at;
                        note.touch(now);
                        *slot = note;
                    }
                    None => log::debug!("update for unknown note {}", note.id),
                }
            }
            Op::DeleteNote(id) => self.snapshot.notes.retain(|n| n.id != id),
            Op::SetNotes(notes) => self.snapshot.notes = notes,

            Op::AddChannel(channel) => self.snapshot.channels.push(channel),
            Op::SetChannels(channels) => self.snapshot.channels = channels,
            Op::AddMessage { channel_id, message } => {
                match self.snapshot.channels.iter_mut().find(|c| c.id == channel_id) {
                    Some(channel) => channel.messages.push(message),
                    None => log::debug!("message for unknown channel {channel_id}"),
                }
            }

            Op::AddTag(tag) => self.snapshot.tags.push(tag),
            Op::DeleteTag(id) => {
                self.snapshot.tags.retain(|t| t.id != id);
                // A deleted tag must not linger on tasks.
                for task in &mut self.snapshot.tasks {
                    task.tags.retain(|tag_id| *tag_id != id);
                }
            }

            Op::AddReminder(reminder) => self.snapshot.reminders.push(reminder),
            Op::DismissReminder(id) => {
                match self.snapshot.reminders.iter_mut().find(|r| r.id == id) {
                    Some(reminder) => reminder.dismissed = true,
                    None => log::debug!("dismiss for unknown reminder {id}"),
                }
            }

            Op::AddPlannerItem(mut item) => {
                if item.clamp_to_window() {
                    self.snapshot.planner_items.push(item);
                } else {
                    log::warn!("planner block {} lies outside the day window, dropped", item.id);
                }
            }
            Op::UpdatePlannerItem(mut item) => {
                if !item.clamp_to_window() {
                    log::warn!("planner block {} lies outside the day window, dropped", item.id);
                    return;
                }
                match self.snapshot.planner_items.iter_mut().find(|p| p.id == item.id) {
                    Some(slot) => *slot = item,
                    None => log::debug!("update for unknown planner block {}", item.id),
                }
            }
            Op::DeletePlannerItem(id) => self.snapshot.planner_items.retain(|p| p.id != id),

            Op::AddReview(mut review) => {
                review.rating = review.rating.clamp(1, 5);
                self.snapshot.weekly_reviews.push(review);
            }
            Op::SetReviews(mut reviews) => {
                for review in &mut reviews {
                    review.rating = review.rating.clamp(1, 5);
                }
                self.snapshot.weekly_reviews = reviews;
            }

            Op::SetView(view) => self.snapshot.view = view,
            Op::SetSelectedDate(date) => self.snapshot.selected_date = date,
            Op::ToggleSidebar => self.snapshot.sidebar_open = !self.snapshot.sidebar_open,
            Op::ToggleDarkMode => self.snapshot.dark_mode = !self.snapshot.dark_mode,

            Op::Load(loaded) => self.load(*loaded, now),
        }
    }

    fn load(&mut self, loaded: LoadedState, now: NaiveDateTime) {
        let snapshot = &mut self.snapshot;
        if let Some(tasks) = loaded.tasks {
            snapshot.tasks = tasks;
        }
        if let Some(events) = loaded.events {
            snapshot.events = events;
        }
        if let Some(projects) = loaded.projects {
            snapshot.projects = projects;
        }
        if let Some(habits) = loaded.habits {
            snapshot.habits = habits;
        }
        if let Some(goals) = loaded.goals {
            snapshot.goals = goals;
        }
        if let Some(notes) = loaded.notes {
            snapshot.notes = notes;
        }
        if let Some(channels) = loaded.channels {
            snapshot.channels = channels;
        }
        if let Some(tags) = loaded.tags {
            snapshot.tags = tags;
        }
        if let Some(templates) = loaded.templates {
            snapshot.templates = templates;
        }
        if let Some(reminders) = loaded.reminders {
            snapshot.reminders = reminders;
        }
        if let Some(planner_items) = loaded.planner_items {
            snapshot.planner_items = planner_items;
        }
        if let Some(weekly_reviews) = loaded.weekly_reviews {
            snapshot.weekly_reviews = weekly_reviews;
        }
        if let Some(view) = loaded.view {
            snapshot.view = view;
        }
        if let Some(selected_date) = loaded.selected_date {
            snapshot.selected_date = selected_date;
        }
        if let Some(sidebar_open) = loaded.sidebar_open {
            snapshot.sidebar_open = sidebar_open;
        }
        if let Some(dark_mode) = loaded.dark_mode {
            snapshot.dark_mode = dark_mode;
        }
        self.refresh_derived(now);
    }

    /// Re-establish every invariant after a bulk load: normalized records,
    /// recomputed caches, planner blocks inside the window. On data that
    /// already satisfies the invariants this is the identity.
    fn refresh_derived(&mut self, now: NaiveDateTime) {
        let today = now.date();
        let snapshot = &mut self.snapshot;
        for task in &mut snapshot.tasks {
            normalize_task(task, now);
        }
        for event in &mut snapshot.events {
            event.normalize();
        }
        for habit in &mut snapshot.habits {
            habit.recalculate_streak(today);
        }
        for goal in &mut snapshot.goals {
            goal.recalculate_progress();
        }
        for review in &mut snapshot.weekly_reviews {
            review.rating = review.rating.clamp(1, 5);
        }
        snapshot.planner_items.retain_mut(|item| {
            let kept = item.clamp_to_window();
            if !kept {
                log::warn!("planner block {} lies outside the day window, dropped", item.id);
            }
            kept
        });
        self.refresh_project_progress();
    }

    fn refresh_project_progress(&mut self) {
        let snapshot = &mut self.snapshot;
        for project in &mut snapshot.projects {
            project.progress = project_progress(&snapshot.tasks, project.id);
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// `completed_at` is present exactly when the status is done; call sites
/// cannot produce an inconsistent record.
fn normalize_task(task: &mut Task, now: NaiveDateTime) {
    if task.status.is_done() {
        if task.completed_at.is_none() {
            task.completed_at = Some(now);
        }
    } else {
        task.completed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::goal::Milestone;
    use crate::core::habit::{streak, Frequency};
    use crate::core::task::TaskStatus;
    use chrono::NaiveTime;
    use uuid::Uuid;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn seeded_snapshot_has_defaults() {
        let store = Store::new();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.tags.len(), 5);
        assert_eq!(snapshot.channels.len(), 3);
        assert_eq!(snapshot.templates.len(), 3);
        assert!(snapshot.tasks.is_empty());
        assert_eq!(snapshot.view, View::Dashboard);
        assert!(snapshot.sidebar_open);
        assert!(snapshot.dark_mode);
    }

    #[test]
    fn add_task_uses_entity_defaults() {
        let mut store = Store::new();
        store.apply(Op::AddTask(Task::new("Pay rent")));
        let task = &store.snapshot().tasks[0];
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn done_status_stamps_completed_at() {
        let mut store = Store::new();
        let mut task = Task::new("Ship release");
        let id = task.id;
        store.apply(Op::AddTask(task.clone()));

        task.status = TaskStatus::Done;
        store.apply(Op::UpdateTask(task.clone()));
        assert!(store.snapshot().tasks[0].completed_at.is_some());

        task.status = TaskStatus::Todo;
        store.apply(Op::UpdateTask(task));
        assert_eq!(store.snapshot().tasks[0].completed_at, None);
        assert_eq!(store.snapshot().tasks[0].id, id);
    }

    #[test]
    fn operations_on_deleted_ids_are_no_ops() {
        let mut store = Store::new();
        let task = Task::new("Ephemeral");
        let id = task.id;
        store.apply(Op::AddTask(task.clone()));
        store.apply(Op::DeleteTask(id));

        store.apply(Op::UpdateTask(task));
        store.apply(Op::DeleteTask(id));
        assert!(store.snapshot().tasks.is_empty());

        store.apply(Op::ToggleHabit {
            habit_id: Uuid::new_v4(),
            date: Local::now().date_naive(),
        });
        store.apply(Op::DismissReminder(Uuid::new_v4()));
        store.apply(Op::AddMessage {
            channel_id: Uuid::new_v4(),
            message: crate::core::channel::ChatMessage::new("hello", "nobody"),
        });
        assert!(store.snapshot().habits.is_empty());
    }

    #[test]
    fn toggle_habit_twice_restores_state() {
        let mut store = Store::new();
        let habit = Habit::new("Meditate", Frequency::Daily);
        let id = habit.id;
        store.apply(Op::AddHabit(habit));
        let before = store.snapshot().habits[0].clone();

        let today = Local::now().date_naive();
        store.apply(Op::ToggleHabit { habit_id: id, date: today });
        assert_eq!(store.snapshot().habits[0].streak, 1);
        store.apply(Op::ToggleHabit { habit_id: id, date: today });

        let after = &store.snapshot().habits[0];
        assert_eq!(after.completed_dates, before.completed_dates);
        assert_eq!(after.streak, before.streak);
    }

    #[test]
    fn milestone_toggle_recomputes_goal_progress() {
        let mut store = Store::new();
        let mut goal = Goal::new("Learn Spanish");
        goal.milestones = vec![
            Milestone::new("Basics"),
            Milestone::new("B1 exam"),
            Milestone::new("Conversation"),
        ];
        let goal_id = goal.id;
        let milestone_id = goal.milestones[0].id;
        store.apply(Op::AddGoal(goal));

        store.apply(Op::ToggleMilestone { goal_id, milestone_id });
        let goal = &store.snapshot().goals[0];
        assert_eq!(goal.progress, 33);
        assert!(!goal.achieved);
    }

    #[test]
    fn deleting_tag_strips_it_from_tasks() {
        let mut store = Store::new();
        let tag_id = store.snapshot().tags[0].id;
        let mut task = Task::new("Tagged");
        task.tags.push(tag_id);
        store.apply(Op::AddTask(task));

        store.apply(Op::DeleteTag(tag_id));
        assert_eq!(store.snapshot().tags.len(), 4);
        assert!(store.snapshot().tasks[0].tags.is_empty());
    }

    #[test]
    fn deleting_task_removes_its_planner_blocks() {
        let mut store = Store::new();
        let task = Task::new("Deep work");
        let task_id = task.id;
        store.apply(Op::AddTask(task));

        let today = Local::now().date_naive();
        let mut block = PlannerItem::new(today, t(9, 0), t(10, 0));
        block.task_id = Some(task_id);
        store.apply(Op::AddPlannerItem(block));
        store.apply(Op::AddPlannerItem(PlannerItem::new(today, t(10, 0), t(11, 0))));

        store.apply(Op::DeleteTask(task_id));
        assert_eq!(store.snapshot().planner_items.len(), 1);
        assert_eq!(store.snapshot().planner_items[0].task_id, None);
    }

    #[test]
    fn collapsed_planner_block_is_dropped() {
        let mut store = Store::new();
        let today = Local::now().date_naive();
        store.apply(Op::AddPlannerItem(PlannerItem::new(today, t(23, 0), t(23, 30))));
        assert!(store.snapshot().planner_items.is_empty());

        store.apply(Op::AddPlannerItem(PlannerItem::new(today, t(5, 0), t(7, 0))));
        let block = &store.snapshot().planner_items[0];
        assert_eq!(block.start, t(6, 0));
    }

    #[test]
    fn note_updates_keep_updated_at_monotonic() {
        let mut store = Store::new();
        let note = Note::new("Ideas");
        let stamp = note.updated_at;
        store.apply(Op::AddNote(note.clone()));

        let mut edited = note;
        edited.content = "grocery list".to_string();
        edited.updated_at = stamp - chrono::Duration::hours(1);
        store.apply(Op::UpdateNote(edited));

        assert!(store.snapshot().notes[0].updated_at >= stamp);
        assert_eq!(store.snapshot().notes[0].content, "grocery list");
    }

    #[test]
    fn review_rating_is_clamped() {
        let mut store = Store::new();
        let mut review = WeeklyReview::new(Local::now().date_naive());
        review.rating = 9;
        store.apply(Op::AddReview(review));
        assert_eq!(store.snapshot().weekly_reviews[0].rating, 5);
    }

    #[test]
    fn load_replaces_only_given_collections() {
        let mut store = Store::new();
        let loaded = LoadedState {
            tasks: Some(vec![Task::new("from cache")]),
            ..LoadedState::default()
        };
        store.apply(Op::Load(Box::new(loaded)));

        assert_eq!(store.snapshot().tasks.len(), 1);
        // Untouched collections keep their seeds.
        assert_eq!(store.snapshot().tags.len(), 5);
        assert_eq!(store.snapshot().channels.len(), 3);
    }

    #[test]
    fn derived_caches_match_recompute_after_mixed_sequence() {
        let mut store = Store::new();
        let today = Local::now().date_naive();

        let project = Project::new("Rewrite");
        let project_id = project.id;
        store.apply(Op::AddProject(project));

        let mut done = Task::new("step one");
        done.project_id = Some(project_id);
        done.status = TaskStatus::Done;
        let mut open = Task::new("step two");
        open.project_id = Some(project_id);
        store.apply(Op::AddTask(done));
        store.apply(Op::AddTask(open.clone()));

        let habit = Habit::new("Stretch", Frequency::Daily);
        let habit_id = habit.id;
        store.apply(Op::AddHabit(habit));
        store.apply(Op::ToggleHabit { habit_id, date: today });
        store.apply(Op::ToggleHabit {
            habit_id,
            date: today - chrono::Duration::days(1),
        });

        store.apply(Op::DeleteTask(open.id));

        let snapshot = store.snapshot();
        assert_eq!(
            snapshot.projects[0].progress,
            project_progress(&snapshot.tasks, project_id)
        );
        assert_eq!(snapshot.projects[0].progress, 100);
        assert_eq!(
            snapshot.habits[0].streak,
            streak(&snapshot.habits[0].completed_dates, today)
        );
        assert_eq!(snapshot.habits[0].streak, 2);
    }

    #[test]
    fn ui_flag_toggles_flip() {
        let mut store = Store::new();
        store.apply(Op::ToggleSidebar);
        store.apply(Op::ToggleDarkMode);
        assert!(!store.snapshot().sidebar_open);
        assert!(!store.snapshot().dark_mode);
        store.apply(Op::SetView(View::Kanban));
        assert_eq!(store.snapshot().view, View::Kanban);
    }
}
