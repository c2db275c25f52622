//! End-to-end collaboration flows: two sync clients wired through the room
//! router, with an in-memory store standing in for the REST API. Exercises
//! the full notify/broadcast/apply loop without a network or database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use taskflow::backend::realtime::rooms::{project_room, RoomRouter};
use taskflow::backend::realtime::ConnectionId;
use taskflow::client::{BoardSyncClient, RealtimeSession, TaskGateway};
use taskflow::shared::{
    BoardEvent, ClientMessage, NewTask, SyncError, Task, TaskPatch, TaskPriority, TaskStatus,
};

fn sample_task(project: Uuid, status: TaskStatus, position: i32) -> Task {
    let now = Utc::now();
    Task {
        id: Uuid::new_v4(),
        title: format!("task-{position}"),
        description: String::new(),
        status,
        priority: TaskPriority::Medium,
        project,
        assignee: None,
        creator: Uuid::new_v4(),
        tags: vec![],
        due_date: None,
        start_date: None,
        completed_at: None,
        estimated_hours: None,
        actual_hours: None,
        comments: vec![],
        position,
        is_archived: false,
        created_at: now + Duration::milliseconds(position as i64),
        updated_at: now,
    }
}

/// Shared in-memory store both clients persist through.
#[derive(Default)]
struct SharedStore {
    tasks: Mutex<HashMap<Uuid, Task>>,
    fetches: AtomicUsize,
}

impl SharedStore {
    fn with_tasks(tasks: Vec<Task>) -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(tasks.into_iter().map(|t| (t.id, t)).collect()),
            fetches: AtomicUsize::new(0),
        })
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn sorted(&self, project: Uuid) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.project == project && !t.is_archived)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then(a.created_at.cmp(&b.created_at))
        });
        tasks
    }
}

/// Gateway handle over the shared store. `TaskGateway` has to be
/// implemented on a type owned by this crate, so the `Arc` is wrapped.
#[derive(Clone)]
struct StoreGateway(Arc<SharedStore>);

impl TaskGateway for StoreGateway {
    async fn fetch_tasks(&self, project_id: Uuid) -> Result<Vec<Task>, SyncError> {
        self.0.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.0.sorted(project_id))
    }

    async fn fetch_recent_tasks(&self, limit: usize) -> Result<Vec<Task>, SyncError> {
        let mut tasks: Vec<Task> = self.0.tasks.lock().unwrap().values().cloned().collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tasks.truncate(limit);
        Ok(tasks)
    }

    async fn fetch_projects(&self) -> Result<Vec<taskflow::shared::Project>, SyncError> {
        Ok(vec![])
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Task, SyncError> {
        let position = self
            .0
            .sorted(new_task.project_id)
            .last()
            .map_or(0, |t| t.position + 1);
        let mut task = sample_task(
            new_task.project_id,
            new_task.status.unwrap_or_default(),
            position,
        );
        task.title = new_task.title.clone();
        self.0.tasks.lock().unwrap().insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, task_id: Uuid, patch: &TaskPatch) -> Result<Task, SyncError> {
        let mut tasks = self.0.tasks.lock().unwrap();
        let task = tasks
            .get_mut(&task_id)
            .ok_or_else(|| SyncError::NotFound(task_id.to_string()))?;
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(position) = patch.position {
            task.position = position;
        }
        Ok(task.clone())
    }

    async fn move_task(
        &self,
        task_id: Uuid,
        status: TaskStatus,
        index: usize,
    ) -> Result<Task, SyncError> {
        let mut tasks = self.0.tasks.lock().unwrap();
        let task = tasks
            .get_mut(&task_id)
            .ok_or_else(|| SyncError::NotFound(task_id.to_string()))?;
        task.status = status;
        task.position = index as i32;
        task.completed_at = if status == TaskStatus::Done {
            task.completed_at.or_else(|| Some(Utc::now()))
        } else {
            None
        };
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: Uuid) -> Result<(), SyncError> {
        self.0.tasks.lock().unwrap().remove(&task_id);
        Ok(())
    }
}

/// One participant: a sync client plus its server-side connection.
struct Participant {
    client: BoardSyncClient<StoreGateway>,
    outbound: mpsc::UnboundedReceiver<ClientMessage>,
    connection: ConnectionId,
    inbound: mpsc::UnboundedReceiver<BoardEvent>,
}

fn join_participant(router: &RoomRouter, store: &Arc<SharedStore>) -> Participant {
    let session = Arc::new(RealtimeSession::new());
    session.connect();
    let outbound = session.take_outbound().unwrap();
    let client = BoardSyncClient::new(StoreGateway(store.clone()), session);

    let (tx, inbound) = mpsc::unbounded_channel();
    let connection = router.register(Uuid::new_v4(), tx);
    Participant {
        client,
        outbound,
        connection,
        inbound,
    }
}

/// Forward a participant's queued client messages through the router the way
/// the socket layer does: joins and leaves adjust room membership, task
/// notifications rebroadcast to the project room.
fn pump_outbound(router: &RoomRouter, participant: &mut Participant) {
    while let Ok(message) = participant.outbound.try_recv() {
        match message {
            ClientMessage::JoinProject { project_id } => {
                router.join(participant.connection, &project_room(project_id));
            }
            ClientMessage::LeaveProject { project_id } => {
                router.leave(participant.connection, &project_room(project_id));
            }
            other => {
                if let Some(event) = other.into_board_event() {
                    router.broadcast(&project_room(event.project_id()), &event);
                }
            }
        }
    }
}

/// Apply everything the router delivered to this participant's client.
async fn pump_inbound(participant: &mut Participant) {
    while let Ok(event) = participant.inbound.try_recv() {
        participant.client.handle_event(event).await.unwrap();
    }
}

#[tokio::test]
async fn creation_by_one_user_appears_on_the_other_board_without_a_fetch() {
    let project = Uuid::new_v4();
    let store = SharedStore::with_tasks(vec![]);
    let router = RoomRouter::new();

    let mut alice = join_participant(&router, &store);
    let mut bob = join_participant(&router, &store);
    alice.client.select_project(project).await.unwrap();
    bob.client.select_project(project).await.unwrap();
    pump_outbound(&router, &mut alice);
    pump_outbound(&router, &mut bob);

    let fetches_before = store.fetch_count();
    let created = alice
        .client
        .create_task(NewTask {
            title: "ship the release".into(),
            description: String::new(),
            project_id: project,
            status: None,
            priority: None,
            assignee: None,
            due_date: None,
            tags: vec![],
            estimated_hours: None,
        })
        .await
        .unwrap();
    pump_outbound(&router, &mut alice);
    pump_inbound(&mut bob).await;

    assert!(bob.client.board().contains(created.id));
    // The append path never touched the store.
    assert_eq!(store.fetch_count(), fetches_before);

    // Alice's own echo deduplicates by id.
    pump_inbound(&mut alice).await;
    assert_eq!(alice.client.board().column(TaskStatus::Todo).len(), 1);
}

#[tokio::test]
async fn move_by_one_user_converges_the_other_board_to_server_state() {
    let project = Uuid::new_v4();
    let task = sample_task(project, TaskStatus::Todo, 0);
    let store = SharedStore::with_tasks(vec![task.clone()]);
    let router = RoomRouter::new();

    let mut alice = join_participant(&router, &store);
    let mut bob = join_participant(&router, &store);
    alice.client.select_project(project).await.unwrap();
    bob.client.select_project(project).await.unwrap();
    pump_outbound(&router, &mut alice);
    pump_outbound(&router, &mut bob);

    alice
        .client
        .move_task(task.id, TaskStatus::Done, 0)
        .await
        .unwrap();
    pump_outbound(&router, &mut alice);
    pump_inbound(&mut bob).await;

    let on_bobs_board = bob.client.board().get(task.id).unwrap();
    assert_eq!(on_bobs_board.status, TaskStatus::Done);
    assert!(on_bobs_board.completed_at.is_some());
}

#[tokio::test]
async fn deletion_propagates_and_is_idempotent() {
    let project = Uuid::new_v4();
    let task = sample_task(project, TaskStatus::Review, 0);
    let store = SharedStore::with_tasks(vec![task.clone()]);
    let router = RoomRouter::new();

    let mut alice = join_participant(&router, &store);
    let mut bob = join_participant(&router, &store);
    alice.client.select_project(project).await.unwrap();
    bob.client.select_project(project).await.unwrap();
    pump_outbound(&router, &mut alice);
    pump_outbound(&router, &mut bob);

    alice.client.delete_task(task.id).await.unwrap();
    pump_outbound(&router, &mut alice);
    pump_inbound(&mut bob).await;
    assert!(bob.client.board().is_empty());

    // Replaying the deletion changes nothing.
    bob.client
        .handle_event(BoardEvent::TaskDeleted {
            project_id: project,
            task_id: task.id,
        })
        .await
        .unwrap();
    assert!(bob.client.board().is_empty());
}

#[tokio::test]
async fn user_outside_the_room_receives_nothing() {
    let project = Uuid::new_v4();
    let store = SharedStore::with_tasks(vec![]);
    let router = RoomRouter::new();

    let mut alice = join_participant(&router, &store);
    let mut carol = join_participant(&router, &store);
    alice.client.select_project(project).await.unwrap();
    pump_outbound(&router, &mut alice);
    // Carol is registered but never joined the project room.

    alice
        .client
        .create_task(NewTask {
            title: "quiet work".into(),
            description: String::new(),
            project_id: project,
            status: None,
            priority: None,
            assignee: None,
            due_date: None,
            tags: vec![],
            estimated_hours: None,
        })
        .await
        .unwrap();
    pump_outbound(&router, &mut alice);

    assert!(carol.inbound.try_recv().is_err());
    pump_inbound(&mut carol).await;
    assert!(carol.client.board().is_empty());
}

#[tokio::test]
async fn leaving_a_room_stops_delivery() {
    let project = Uuid::new_v4();
    let task = sample_task(project, TaskStatus::Todo, 0);
    let store = SharedStore::with_tasks(vec![task.clone()]);
    let router = RoomRouter::new();

    let mut alice = join_participant(&router, &store);
    let mut bob = join_participant(&router, &store);
    alice.client.select_project(project).await.unwrap();
    bob.client.select_project(project).await.unwrap();
    pump_outbound(&router, &mut alice);
    pump_outbound(&router, &mut bob);

    let other_project = Uuid::new_v4();
    bob.client.select_project(other_project).await.unwrap();
    pump_outbound(&router, &mut bob);

    alice
        .client
        .move_task(task.id, TaskStatus::Review, 0)
        .await
        .unwrap();
    pump_outbound(&router, &mut alice);

    assert!(bob.inbound.try_recv().is_err());
}
