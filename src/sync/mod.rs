pub mod assistant;
pub mod cache;
pub mod records;
pub mod remote;
pub mod session;

use chrono::Local;
use serde_json::Value;
use uuid::Uuid;

use crate::core::task::Task;
use crate::store::op::{LoadedState, Op};
use crate::store::{Snapshot, Store};
use assistant::ParsedReply;
use cache::{CacheError, SnapshotCache};
use records::{
    ChannelRecord, EventRecord, GoalRecord, HabitRecord, MessageRecord, MilestoneRecord,
    NoteRecord, ProjectRecord, ReviewRecord, TaskRecord,
};
use remote::TableClient;

/// Where the bridge is in its load sequence. State read before `Ready` may
/// still be the seeded defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    Unresolved,
    Loading,
    Ready,
}

/// Owns the store and keeps every applied operation durable: each dispatch
/// applies locally first, then fans out fire-and-forget remote writes, then
/// rewrites the on-disk cache. Remote failures are logged and dropped; the
/// local state is already committed and never rolled back.
pub struct Bridge {
    store: Store,
    cache: SnapshotCache,
    remote: Option<TableClient>,
    owner: Option<Uuid>,
    phase: BridgePhase,
}

impl Bridge {
    pub fn new(cache: SnapshotCache) -> Self {
        Self {
            store: Store::new(),
            cache,
            remote: None,
            owner: None,
            phase: BridgePhase::Unresolved,
        }
    }

    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    /// Hydrate the store. With a signed-in remote the server is the source of
    /// truth; when it cannot be reached (or nobody is signed in) the on-disk
    /// cache is, and a missing or unusable cache leaves the seeded defaults.
    pub async fn start(&mut self, remote: Option<(TableClient, Uuid)>) {
        self.phase = BridgePhase::Loading;
        match remote {
            Some((client, owner)) => {
                match load_remote(&client, owner).await {
                    Ok(loaded) => self.store.apply(Op::Load(Box::new(loaded))),
                    Err(e) => {
                        log::warn!("Remote load failed, using cached state: {}", e);
                        self.load_local();
                    }
                }
                self.remote = Some(client);
                self.owner = Some(owner);
            }
            None => self.load_local(),
        }
        self.phase = BridgePhase::Ready;
        self.write_cache();
    }

    fn load_local(&mut self) {
        match self.cache.load() {
            Ok(snapshot) => {
                self.store
                    .apply(Op::Load(Box::new(LoadedState::from(snapshot))));
            }
            Err(CacheError::Missing(path)) => {
                log::info!(
                    "No cached state at {}, starting from seeded defaults",
                    path.display()
                );
            }
            Err(e) => {
                log::warn!("Cached state unusable ({}), starting from seeded defaults", e);
            }
        }
    }

    /// Apply an operation optimistically and persist it. The remote rows are
    /// derived from the post-apply snapshot so server writes carry the same
    /// derived fields (streaks, progress, completion stamps) the user sees.
    pub fn dispatch(&mut self, op: Op) {
        if let (Some(client), Some(owner)) = (self.remote.clone(), self.owner) {
            self.store.apply(op.clone());
            let jobs = remote_jobs(&op, owner, self.store.snapshot());
            if !jobs.is_empty() {
                tokio::spawn(run_jobs(client, jobs));
            }
        } else {
            self.store.apply(op);
        }
        self.write_cache();
    }

    /// Instantiate every task seed of a template as a fresh task. Returns the
    /// number of tasks created.
    pub fn apply_template(&mut self, template_id: Uuid) -> usize {
        let Some(template) = self
            .store
            .snapshot()
            .templates
            .iter()
            .find(|t| t.id == template_id)
            .cloned()
        else {
            log::debug!("Ignoring unknown template {}", template_id);
            return 0;
        };

        let count = template.tasks.len();
        for seed in template.tasks {
            let mut task = Task::new(seed.title);
            task.description = seed.description;
            task.priority = seed.priority;
            task.tags = seed.tags;
            self.dispatch(Op::AddTask(task));
        }
        count
    }

    /// Create every draft the assistant reply carried. Returns the number of
    /// items created.
    pub fn apply_reply(&mut self, reply: &ParsedReply) -> usize {
        let today = Local::now().date_naive();
        let mut created = 0;
        for draft in reply.tasks.clone() {
            self.dispatch(Op::AddTask(draft.into_task()));
            created += 1;
        }
        for draft in reply.projects.clone() {
            self.dispatch(Op::AddProject(draft.into_project(today)));
            created += 1;
        }
        for draft in reply.habits.clone() {
            self.dispatch(Op::AddHabit(draft.into_habit()));
            created += 1;
        }
        for draft in reply.goals.clone() {
            self.dispatch(Op::AddGoal(draft.into_goal()));
            created += 1;
        }
        created
    }

    fn write_cache(&self) {
        if let Err(e) = self.cache.store(self.store.snapshot()) {
            log::error!("Failed to write state cache: {}", e);
        }
    }
}

/// One server write derived from an applied operation.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteJob {
    Insert { table: &'static str, row: Value },
    Upsert { table: &'static str, row: Value },
    Update { table: &'static str, id: Uuid, row: Value },
    Delete { table: &'static str, id: Uuid },
    DeleteWhere { table: &'static str, column: &'static str, id: Uuid },
}

/// Translate an applied operation into the remote writes it implies, reading
/// rows back out of the post-apply snapshot. An operation the store dropped
/// (unknown id) produces no writes. Bulk `Set*` ops, `Load`, and the
/// device-local collections never reach the server.
fn remote_jobs(op: &Op, owner: Uuid, after: &Snapshot) -> Vec<WriteJob> {
    let mut jobs = Vec::new();

    match op {
        Op::AddTask(task) => {
            if let Some(t) = after.tasks.iter().find(|t| t.id == task.id) {
                jobs.push(WriteJob::Insert {
                    table: TaskRecord::TABLE,
                    row: encode_row(&TaskRecord::from_entity(owner, t)),
                });
            }
        }
        Op::UpdateTask(task) => {
            if let Some(t) = after.tasks.iter().find(|t| t.id == task.id) {
                jobs.push(WriteJob::Update {
                    table: TaskRecord::TABLE,
                    id: t.id,
                    row: encode_row(&TaskRecord::from_entity(owner, t)),
                });
            }
        }
        // Planner blocks that referenced the task are device-local, so the
        // delete does not cascade on the server.
        Op::DeleteTask(id) => jobs.push(WriteJob::Delete {
            table: TaskRecord::TABLE,
            id: *id,
        }),

        Op::AddEvent(event) => {
            if let Some(e) = after.events.iter().find(|e| e.id == event.id) {
                jobs.push(WriteJob::Insert {
                    table: EventRecord::TABLE,
                    row: encode_row(&EventRecord::from_entity(owner, e)),
                });
            }
        }
        Op::UpdateEvent(event) => {
            if let Some(e) = after.events.iter().find(|e| e.id == event.id) {
                jobs.push(WriteJob::Update {
                    table: EventRecord::TABLE,
                    id: e.id,
                    row: encode_row(&EventRecord::from_entity(owner, e)),
                });
            }
        }
        Op::DeleteEvent(id) => jobs.push(WriteJob::Delete {
            table: EventRecord::TABLE,
            id: *id,
        }),

        Op::AddProject(project) => {
            if let Some(p) = after.projects.iter().find(|p| p.id == project.id) {
                jobs.push(WriteJob::Insert {
                    table: ProjectRecord::TABLE,
                    row: encode_row(&ProjectRecord::from_entity(owner, p)),
                });
            }
        }
        Op::UpdateProject(project) => {
            if let Some(p) = after.projects.iter().find(|p| p.id == project.id) {
                jobs.push(WriteJob::Update {
                    table: ProjectRecord::TABLE,
                    id: p.id,
                    row: encode_row(&ProjectRecord::from_entity(owner, p)),
                });
            }
        }
        Op::DeleteProject(id) => jobs.push(WriteJob::Delete {
            table: ProjectRecord::TABLE,
            id: *id,
        }),

        Op::AddHabit(habit) => {
            if let Some(h) = after.habits.iter().find(|h| h.id == habit.id) {
                jobs.push(WriteJob::Insert {
                    table: HabitRecord::TABLE,
                    row: encode_row(&HabitRecord::from_entity(owner, h)),
                });
            }
        }
        Op::UpdateHabit(habit) => {
            if let Some(h) = after.habits.iter().find(|h| h.id == habit.id) {
                jobs.push(WriteJob::Update {
                    table: HabitRecord::TABLE,
                    id: h.id,
                    row: encode_row(&HabitRecord::from_entity(owner, h)),
                });
            }
        }
        Op::DeleteHabit(id) => jobs.push(WriteJob::Delete {
            table: HabitRecord::TABLE,
            id: *id,
        }),
        Op::ToggleHabit { habit_id, .. } => {
            if let Some(h) = after.habits.iter().find(|h| h.id == *habit_id) {
                jobs.push(WriteJob::Update {
                    table: HabitRecord::TABLE,
                    id: h.id,
                    row: encode_row(&HabitRecord::from_entity(owner, h)),
                });
            }
        }

        Op::AddGoal(goal) => {
            if let Some(g) = after.goals.iter().find(|g| g.id == goal.id) {
                jobs.push(WriteJob::Insert {
                    table: GoalRecord::TABLE,
                    row: encode_row(&GoalRecord::from_entity(owner, g)),
                });
                for milestone in &g.milestones {
                    jobs.push(WriteJob::Insert {
                        table: MilestoneRecord::TABLE,
                        row: encode_row(&MilestoneRecord::from_entity(g.id, milestone)),
                    });
                }
            }
        }
        // An update may have added, removed or renamed milestones; the
        // server set is replaced wholesale.
        Op::UpdateGoal(goal) => {
            if let Some(g) = after.goals.iter().find(|g| g.id == goal.id) {
                jobs.push(WriteJob::Update {
                    table: GoalRecord::TABLE,
                    id: g.id,
                    row: encode_row(&GoalRecord::from_entity(owner, g)),
                });
                jobs.push(WriteJob::DeleteWhere {
                    table: MilestoneRecord::TABLE,
                    column: "goal_id",
                    id: g.id,
                });
                for milestone in &g.milestones {
                    jobs.push(WriteJob::Insert {
                        table: MilestoneRecord::TABLE,
                        row: encode_row(&MilestoneRecord::from_entity(g.id, milestone)),
                    });
                }
            }
        }
        // Milestones first: they reference the goal row.
        Op::DeleteGoal(id) => {
            jobs.push(WriteJob::DeleteWhere {
                table: MilestoneRecord::TABLE,
                column: "goal_id",
                id: *id,
            });
            jobs.push(WriteJob::Delete {
                table: GoalRecord::TABLE,
                id: *id,
            });
        }
        Op::ToggleMilestone {
            goal_id,
            milestone_id,
        } => {
            if let Some(g) = after.goals.iter().find(|g| g.id == *goal_id) {
                if let Some(m) = g.milestones.iter().find(|m| m.id == *milestone_id) {
                    jobs.push(WriteJob::Update {
                        table: GoalRecord::TABLE,
                        id: g.id,
                        row: encode_row(&GoalRecord::from_entity(owner, g)),
                    });
                    jobs.push(WriteJob::Upsert {
                        table: MilestoneRecord::TABLE,
                        row: encode_row(&MilestoneRecord::from_entity(g.id, m)),
                    });
                }
            }
        }

        Op::AddNote(note) => {
            if let Some(n) = after.notes.iter().find(|n| n.id == note.id) {
                jobs.push(WriteJob::Insert {
                    table: NoteRecord::TABLE,
                    row: encode_row(&NoteRecord::from_entity(owner, n)),
                });
            }
        }
        Op::UpdateNote(note) => {
            if let Some(n) = after.notes.iter().find(|n| n.id == note.id) {
                jobs.push(WriteJob::Update {
                    table: NoteRecord::TABLE,
                    id: n.id,
                    row: encode_row(&NoteRecord::from_entity(owner, n)),
                });
            }
        }
        Op::DeleteNote(id) => jobs.push(WriteJob::Delete {
            table: NoteRecord::TABLE,
            id: *id,
        }),

        Op::AddChannel(channel) => {
            if let Some(c) = after.channels.iter().find(|c| c.id == channel.id) {
                jobs.push(WriteJob::Insert {
                    table: ChannelRecord::TABLE,
                    row: encode_row(&ChannelRecord::from_entity(owner, c)),
                });
            }
        }
        Op::AddMessage {
            channel_id,
            message,
        } => {
            let attached = after
                .channels
                .iter()
                .any(|c| c.id == *channel_id && c.messages.iter().any(|m| m.id == message.id));
            if attached {
                jobs.push(WriteJob::Insert {
                    table: MessageRecord::TABLE,
                    row: encode_row(&MessageRecord::from_entity(owner, *channel_id, message)),
                });
            }
        }

        Op::AddReview(review) => {
            if let Some(r) = after.weekly_reviews.iter().find(|r| r.id == review.id) {
                jobs.push(WriteJob::Insert {
                    table: ReviewRecord::TABLE,
                    row: encode_row(&ReviewRecord::from_entity(owner, r)),
                });
            }
        }

        // Everything else stays on this device: bulk replacements, tags,
        // templates, reminders, planner blocks, UI flags, and Load itself.
        _ => {}
    }

    jobs
}

fn encode_row<T: serde::Serialize>(record: &T) -> Value {
    serde_json::to_value(record).unwrap_or_else(|e| {
        log::error!("Failed to encode row for remote write: {}", e);
        Value::Null
    })
}

/// Run one dispatch's writes in order. Failures are logged and skipped; the
/// next write still runs.
async fn run_jobs(client: TableClient, jobs: Vec<WriteJob>) {
    for job in jobs {
        let (table, outcome) = match &job {
            WriteJob::Insert { table, row } => (*table, client.insert(table, row).await),
            WriteJob::Upsert { table, row } => (*table, client.upsert(table, row).await),
            WriteJob::Update { table, id, row } => (*table, client.update(table, *id, row).await),
            WriteJob::Delete { table, id } => (*table, client.delete(table, *id).await),
            WriteJob::DeleteWhere { table, column, id } => {
                (*table, client.delete_where(table, column, *id).await)
            }
        };
        if let Err(e) = outcome {
            log::error!("Remote write to {} failed: {}", table, e);
        }
    }
}

/// Fetch every synced collection for the signed-in user and reassemble the
/// nested entities the tables flatten out: milestones onto their goals,
/// messages onto their channels in send order.
async fn load_remote(client: &TableClient, owner: Uuid) -> Result<LoadedState, String> {
    let (tasks, events, projects, habits, goals, notes, channels, messages, reviews) =
        tokio::try_join!(
            client.select_owned::<TaskRecord>(TaskRecord::TABLE, owner),
            client.select_owned::<EventRecord>(EventRecord::TABLE, owner),
            client.select_owned::<ProjectRecord>(ProjectRecord::TABLE, owner),
            client.select_owned::<HabitRecord>(HabitRecord::TABLE, owner),
            client.select_owned::<GoalRecord>(GoalRecord::TABLE, owner),
            client.select_owned::<NoteRecord>(NoteRecord::TABLE, owner),
            client.select_owned::<ChannelRecord>(ChannelRecord::TABLE, owner),
            client.select_owned::<MessageRecord>(MessageRecord::TABLE, owner),
            client.select_owned::<ReviewRecord>(ReviewRecord::TABLE, owner),
        )?;

    let goal_ids: Vec<Uuid> = goals.iter().map(|g| g.id).collect();
    let milestones = client
        .select_where_in::<MilestoneRecord>(MilestoneRecord::TABLE, "goal_id", &goal_ids)
        .await?;

    log::info!(
        "Loaded remote state: {} tasks, {} events, {} projects, {} habits, {} goals, {} notes, {} channels, {} reviews",
        tasks.len(),
        events.len(),
        projects.len(),
        habits.len(),
        goals.len(),
        notes.len(),
        channels.len(),
        reviews.len(),
    );

    let mut goals: Vec<_> = goals.into_iter().map(|r| r.into_entity()).collect();
    for record in milestones {
        let goal_id = record.goal_id;
        if let Some(goal) = goals.iter_mut().find(|g| g.id == goal_id) {
            goal.milestones.push(record.into_entity());
        }
    }

    let mut channels: Vec<_> = channels.into_iter().map(|r| r.into_entity()).collect();
    for record in messages {
        let channel_id = record.channel_id;
        if let Some(channel) = channels.iter_mut().find(|c| c.id == channel_id) {
            channel.messages.push(record.into_entity());
        }
    }
    for channel in &mut channels {
        channel.messages.sort_by_key(|m| m.created_at);
    }

    Ok(LoadedState {
        tasks: Some(tasks.into_iter().map(|r| r.into_entity()).collect()),
        events: Some(events.into_iter().map(|r| r.into_entity()).collect()),
        projects: Some(projects.into_iter().map(|r| r.into_entity()).collect()),
        habits: Some(habits.into_iter().map(|r| r.into_entity()).collect()),
        goals: Some(goals),
        notes: Some(notes.into_iter().map(|r| r.into_entity()).collect()),
        channels: Some(channels),
        weekly_reviews: Some(reviews.into_iter().map(|r| r.into_entity()).collect()),
        ..LoadedState::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::goal::{Goal, Milestone};
    use crate::core::habit::{Frequency, Habit};
    use crate::core::planner::PlannerItem;
    use crate::core::reminder::Reminder;
    use chrono::NaiveDate;
    use std::fs;

    fn scratch_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("flowstate-bridge-{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn dispatched_ops_survive_a_reload_through_the_cache() {
        let path = scratch_path();

        let mut bridge = Bridge::new(SnapshotCache::new(&path));
        bridge.start(None).await;
        assert_eq!(bridge.phase(), BridgePhase::Ready);

        bridge.dispatch(Op::AddTask(Task::new("first")));
        bridge.dispatch(Op::AddTask(Task::new("second")));
        bridge.dispatch(Op::AddTask(Task::new("third")));

        let mut reloaded = Bridge::new(SnapshotCache::new(&path));
        reloaded.start(None).await;
        let titles: Vec<&str> = reloaded
            .snapshot()
            .tasks
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);

        fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn missing_cache_starts_from_seeded_defaults() {
        let path = scratch_path();
        let mut bridge = Bridge::new(SnapshotCache::new(&path));
        bridge.start(None).await;

        assert!(bridge.snapshot().tasks.is_empty());
        assert!(!bridge.snapshot().channels.is_empty());
        assert!(!bridge.snapshot().templates.is_empty());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn added_goal_inserts_the_goal_then_each_milestone() {
        let mut store = Store::new();
        let owner = Uuid::new_v4();

        let mut goal = Goal::new("Ship it");
        goal.milestones.push(Milestone::new("Design"));
        goal.milestones.push(Milestone::new("Build"));
        let goal_id = goal.id;

        let op = Op::AddGoal(goal);
        store.apply(op.clone());
        let jobs = remote_jobs(&op, owner, store.snapshot());

        assert_eq!(jobs.len(), 3);
        match &jobs[0] {
            WriteJob::Insert { table, row } => {
                assert_eq!(*table, "goals");
                assert_eq!(row["title"], "Ship it");
                assert_eq!(row["user_id"], owner.to_string());
            }
            other => panic!("expected goal insert, got {:?}", other),
        }
        match &jobs[1] {
            WriteJob::Insert { table, row } => {
                assert_eq!(*table, "milestones");
                assert_eq!(row["goal_id"], goal_id.to_string());
            }
            other => panic!("expected milestone insert, got {:?}", other),
        }
    }

    #[test]
    fn goal_removal_deletes_milestones_before_the_goal() {
        let store = Store::new();
        let goal_id = Uuid::new_v4();
        let jobs = remote_jobs(&Op::DeleteGoal(goal_id), Uuid::new_v4(), store.snapshot());

        assert_eq!(
            jobs,
            vec![
                WriteJob::DeleteWhere {
                    table: "milestones",
                    column: "goal_id",
                    id: goal_id,
                },
                WriteJob::Delete {
                    table: "goals",
                    id: goal_id,
                },
            ]
        );
    }

    #[test]
    fn toggled_milestone_updates_goal_and_upserts_milestone() {
        let mut store = Store::new();
        let mut goal = Goal::new("g");
        goal.milestones.push(Milestone::new("m"));
        let goal_id = goal.id;
        let milestone_id = goal.milestones[0].id;
        store.apply(Op::AddGoal(goal));

        let op = Op::ToggleMilestone {
            goal_id,
            milestone_id,
        };
        store.apply(op.clone());
        let jobs = remote_jobs(&op, Uuid::new_v4(), store.snapshot());

        assert_eq!(jobs.len(), 2);
        match &jobs[0] {
            WriteJob::Update { table, id, row } => {
                assert_eq!(*table, "goals");
                assert_eq!(*id, goal_id);
                assert_eq!(row["progress"], 100);
            }
            other => panic!("expected goal update, got {:?}", other),
        }
        match &jobs[1] {
            WriteJob::Upsert { table, row } => {
                assert_eq!(*table, "milestones");
                assert_eq!(row["completed"], true);
            }
            other => panic!("expected milestone upsert, got {:?}", other),
        }
    }

    #[test]
    fn toggled_habit_update_carries_the_derived_streak() {
        let mut store = Store::new();
        let habit = Habit::new("Run", Frequency::Daily);
        let habit_id = habit.id;
        store.apply(Op::AddHabit(habit));

        let today = Local::now().date_naive();
        let op = Op::ToggleHabit {
            habit_id,
            date: today,
        };
        store.apply(op.clone());
        let jobs = remote_jobs(&op, Uuid::new_v4(), store.snapshot());

        assert_eq!(jobs.len(), 1);
        match &jobs[0] {
            WriteJob::Update { table, id, row } => {
                assert_eq!(*table, "habits");
                assert_eq!(*id, habit_id);
                assert_eq!(row["streak"], 1);
                assert_eq!(row["completed_dates"].as_array().map(Vec::len), Some(1));
            }
            other => panic!("expected habit update, got {:?}", other),
        }
    }

    #[test]
    fn task_removal_emits_a_single_delete() {
        let store = Store::new();
        let id = Uuid::new_v4();
        let jobs = remote_jobs(&Op::DeleteTask(id), Uuid::new_v4(), store.snapshot());
        assert_eq!(jobs, vec![WriteJob::Delete { table: "tasks", id }]);
    }

    #[test]
    fn message_to_a_missing_channel_is_not_written() {
        let mut store = Store::new();
        let owner = Uuid::new_v4();

        let orphan = Op::AddMessage {
            channel_id: Uuid::new_v4(),
            message: crate::core::channel::ChatMessage::new("hello", "Me"),
        };
        store.apply(orphan.clone());
        assert!(remote_jobs(&orphan, owner, store.snapshot()).is_empty());

        let channel_id = store.snapshot().channels[0].id;
        let sent = Op::AddMessage {
            channel_id,
            message: crate::core::channel::ChatMessage::new("hello", "Me"),
        };
        store.apply(sent.clone());
        let jobs = remote_jobs(&sent, owner, store.snapshot());
        assert_eq!(jobs.len(), 1);
        match &jobs[0] {
            WriteJob::Insert { table, row } => {
                assert_eq!(*table, "messages");
                assert_eq!(row["channel_id"], channel_id.to_string());
            }
            other => panic!("expected message insert, got {:?}", other),
        }
    }

    #[test]
    fn device_local_ops_produce_no_remote_writes() {
        let mut store = Store::new();
        let owner = Uuid::new_v4();
        let at = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        let ops = vec![
            Op::ToggleSidebar,
            Op::SetTasks(Vec::new()),
            Op::AddReminder(Reminder::new("r", "m", at)),
            Op::AddPlannerItem(PlannerItem::new(
                at.date(),
                at.time(),
                at.time() + chrono::Duration::hours(1),
            )),
        ];
        for op in ops {
            store.apply(op.clone());
            assert!(
                remote_jobs(&op, owner, store.snapshot()).is_empty(),
                "unexpected remote write for {:?}",
                op
            );
        }
    }

    #[tokio::test]
    async fn applying_a_template_creates_one_task_per_seed() {
        let path = scratch_path();
        let mut bridge = Bridge::new(SnapshotCache::new(&path));
        bridge.start(None).await;

        let template = bridge
            .snapshot()
            .templates
            .iter()
            .find(|t| t.name == "Daily Standup")
            .cloned()
            .unwrap();
        let created = bridge.apply_template(template.id);

        assert_eq!(created, 3);
        assert_eq!(bridge.snapshot().tasks.len(), 3);
        assert!(bridge
            .snapshot()
            .tasks
            .iter()
            .any(|t| t.title == "Plan today's tasks"));

        assert_eq!(bridge.apply_template(Uuid::new_v4()), 0);

        fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn assistant_reply_drafts_become_entities() {
        let path = scratch_path();
        let mut bridge = Bridge::new(SnapshotCache::new(&path));
        bridge.start(None).await;

        let reply = assistant::parse_reply(
            "Done!\n```json:task\n{\"title\": \"Buy milk\"}\n```\n\
             ```json:habit\n{\"name\": \"Stretch\"}\n```",
        );
        let created = bridge.apply_reply(&reply);

        assert_eq!(created, 2);
        assert_eq!(bridge.snapshot().tasks.len(), 1);
        assert_eq!(bridge.snapshot().habits.len(), 1);
        assert_eq!(bridge.snapshot().habits[0].name, "Stretch");

        fs::remove_file(&path).ok();
    }
}
