//! Optimistic board synchronization state machine.
//!
//! A move is optimistically applied, then settles as a [`MoveOutcome`]:
//! `Confirmed` when the store accepted it, `RolledBack` when persistence
//! failed and the board was replaced with fresh server state. While
//! unsettled the task reports [`MoveState::OptimisticallyApplied`]; once
//! settled it is `Idle` again and the outcome is the caller's to act on.
//! The optimistic apply is synchronous and happens before any suspension
//! point, so the UI reflects the user's drag immediately regardless of
//! network latency; persistence and the room notification happen
//! afterwards, and the notification is never awaited for correctness.
//!
//! Reconciliation strategy, deliberately asymmetric:
//!
//! - persist failure or a remote `task-updated`: full refetch-and-replace.
//!   The payload does not carry enough ordering context to merge into
//!   optimistic local state, so the client trades efficiency for
//!   correctness and adopts server truth wholesale.
//! - remote `task-created`: append with duplicate suppression, no refetch. A
//!   creation cannot conflict with position ordering the way an update can.
//! - remote `task-deleted`: remove by id, order-independent.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::client::board::BoardState;
use crate::client::gateway::TaskGateway;
use crate::client::session::RealtimeSession;
use crate::shared::error::SyncError;
use crate::shared::event::{BoardEvent, ClientMessage};
use crate::shared::task::{NewTask, Task, TaskStatus};

/// Whether a task has a move in flight. Terminal states are reported by
/// [`MoveOutcome`] when the move settles, not held here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    Idle,
    OptimisticallyApplied,
}

/// How a move ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The store confirmed the move; local state was already correct.
    Confirmed,
    /// Persistence failed; the board was replaced with fresh server state.
    RolledBack,
}

#[derive(Debug)]
struct PendingMove {
    dest_status: TaskStatus,
    dest_index: usize,
}

/// Client-side sync engine for one user's board view.
///
/// Single-threaded cooperative: call its async methods from one task/event
/// loop. The session is shared with other views and only used for
/// fire-and-forget notifications and room membership.
pub struct BoardSyncClient<G> {
    gateway: G,
    session: Arc<RealtimeSession>,
    board: BoardState,
    selected_project: Option<Uuid>,
    // At most one unconfirmed move per task, so a second move cannot race
    // the first one's rollback.
    in_flight: HashMap<Uuid, PendingMove>,
    generation: u64,
}

impl<G: TaskGateway> BoardSyncClient<G> {
    pub fn new(gateway: G, session: Arc<RealtimeSession>) -> Self {
        Self {
            gateway,
            session,
            board: BoardState::new(),
            selected_project: None,
            in_flight: HashMap::new(),
            generation: 0,
        }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn selected_project(&self) -> Option<Uuid> {
        self.selected_project
    }

    /// State of the pending move for a task, `Idle` if none.
    pub fn move_state(&self, task_id: Uuid) -> MoveState {
        if self.in_flight.contains_key(&task_id) {
            MoveState::OptimisticallyApplied
        } else {
            MoveState::Idle
        }
    }

    /// Switch the visible project: leave the old room, join the new one,
    /// discard board state and refetch.
    pub async fn select_project(&mut self, project_id: Uuid) -> Result<(), SyncError> {
        if let Some(previous) = self.selected_project {
            if previous == project_id {
                return Ok(());
            }
            self.session.leave_project(previous);
        }
        self.session.join_project(project_id);
        self.selected_project = Some(project_id);
        self.generation = self.generation.wrapping_add(1);
        self.board.clear();
        self.in_flight.clear();
        self.refresh().await
    }

    /// Refetch the selected project's tasks and replace the board wholesale.
    /// A refetch that comes back after the user switched projects is
    /// discarded.
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        let Some(project_id) = self.selected_project else {
            return Ok(());
        };
        let generation = self.generation;
        let tasks = self.gateway.fetch_tasks(project_id).await?;
        if self.generation != generation || self.selected_project != Some(project_id) {
            tracing::debug!(%project_id, "discarding superseded refetch");
            return Ok(());
        }
        self.board = BoardState::from_tasks(tasks);
        Ok(())
    }

    /// Apply a drag locally, before any network round trip.
    ///
    /// Rejects a second move of a task whose first move is still
    /// unconfirmed; the UI treats that as "try again in a moment", not as a
    /// hard failure.
    pub fn begin_move(
        &mut self,
        task_id: Uuid,
        dest_status: TaskStatus,
        dest_index: usize,
    ) -> Result<(), SyncError> {
        if self.in_flight.contains_key(&task_id) {
            return Err(SyncError::TransientSyncConflict(format!(
                "move of task {task_id} already in flight"
            )));
        }
        let Some(mut task) = self.board.remove(task_id) else {
            return Err(SyncError::NotFound(format!("task {task_id} not on board")));
        };
        task.status = dest_status;
        task.position = dest_index as i32;
        self.board.insert_at(dest_status, dest_index, task);
        self.in_flight.insert(
            task_id,
            PendingMove {
                dest_status,
                dest_index,
            },
        );
        Ok(())
    }

    /// Full move flow: optimistic apply, persist through the reconciler,
    /// notify the room, confirm or roll back.
    pub async fn move_task(
        &mut self,
        task_id: Uuid,
        dest_status: TaskStatus,
        dest_index: usize,
    ) -> Result<MoveOutcome, SyncError> {
        self.begin_move(task_id, dest_status, dest_index)?;
        let result = self
            .gateway
            .move_task(task_id, dest_status, dest_index)
            .await;
        self.resolve_move(task_id, result).await
    }

    /// Settle a pending move with the persistence result.
    pub async fn resolve_move(
        &mut self,
        task_id: Uuid,
        result: Result<Task, SyncError>,
    ) -> Result<MoveOutcome, SyncError> {
        let Some(pending) = self.in_flight.remove(&task_id) else {
            return Err(SyncError::Internal(format!(
                "no pending move for task {task_id}"
            )));
        };
        match result {
            Ok(server_task) => {
                if let Some(project_id) = self.selected_project {
                    // Notify collaborators; not awaited, failures are
                    // swallowed by the session.
                    self.session.emit(ClientMessage::TaskUpdate {
                        project_id,
                        task_id,
                        status: Some(pending.dest_status),
                        position: Some(pending.dest_index as i32),
                    });
                }
                self.board.replace(server_task);
                Ok(MoveOutcome::Confirmed)
            }
            Err(err) => {
                tracing::warn!(%task_id, error = %err, "move persist failed, refetching board");
                // Discard the optimistic mutation entirely: replace local
                // state with server truth rather than patching it back.
                self.refresh().await?;
                Ok(MoveOutcome::RolledBack)
            }
        }
    }

    /// Create a task in the selected project, append it locally and notify
    /// the room.
    pub async fn create_task(&mut self, new_task: NewTask) -> Result<Task, SyncError> {
        let task = self.gateway.create_task(&new_task).await?;
        if self.selected_project == Some(task.project) {
            self.board.append(task.clone());
            self.session.emit(ClientMessage::TaskCreate {
                project_id: task.project,
                task: Box::new(task.clone()),
            });
        }
        Ok(task)
    }

    /// Delete a task, remove it locally and notify the room.
    pub async fn delete_task(&mut self, task_id: Uuid) -> Result<(), SyncError> {
        self.gateway.delete_task(task_id).await?;
        self.board.remove(task_id);
        if let Some(project_id) = self.selected_project {
            self.session.emit(ClientMessage::TaskDelete {
                project_id,
                task_id,
            });
        }
        Ok(())
    }

    /// Apply a notification from the room router. Own echoes are harmless:
    /// creations deduplicate by id, updates refetch, deletions are
    /// idempotent removals.
    pub async fn handle_event(&mut self, event: BoardEvent) -> Result<(), SyncError> {
        match event {
            BoardEvent::TaskCreated { project_id, task } => {
                if self.selected_project == Some(project_id) {
                    self.board.append(*task);
                }
                Ok(())
            }
            BoardEvent::TaskUpdated { project_id, .. } => {
                if self.selected_project == Some(project_id) {
                    // The payload lacks full ordering context; resync with
                    // the store instead of patching locally.
                    self.refresh().await?;
                }
                Ok(())
            }
            BoardEvent::TaskDeleted { task_id, .. } => {
                self.board.remove(task_id);
                Ok(())
            }
        }
    }
}
