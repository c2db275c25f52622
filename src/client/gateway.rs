//! Persistence collaborator interface consumed by the sync engine.
//!
//! The engine never talks to storage directly; it goes through this trait so
//! tests can substitute an in-memory store and frontends can inject the HTTP
//! implementation from [`crate::client::http`].

use uuid::Uuid;

use crate::shared::error::SyncError;
use crate::shared::project::Project;
use crate::shared::task::{NewTask, Task, TaskPatch, TaskStatus};

/// Minimal task/project persistence contract the board sync engine requires.
///
/// All calls are single-shot request/response operations; ordering across
/// concurrent calls is not guaranteed by the gateway.
#[allow(async_fn_in_trait)]
pub trait TaskGateway {
    /// Non-archived tasks of a project, ordered by `(position, createdAt)`.
    async fn fetch_tasks(&self, project_id: Uuid) -> Result<Vec<Task>, SyncError>;

    /// Bounded window of the caller's most recent tasks across projects.
    async fn fetch_recent_tasks(&self, limit: usize) -> Result<Vec<Task>, SyncError>;

    /// Projects the caller owns or is a member of.
    async fn fetch_projects(&self) -> Result<Vec<Project>, SyncError>;

    /// Create a task; the store assigns `position = max + 1` within the
    /// project.
    async fn create_task(&self, new_task: &NewTask) -> Result<Task, SyncError>;

    /// Whitelisted partial update.
    async fn update_task(&self, task_id: Uuid, patch: &TaskPatch) -> Result<Task, SyncError>;

    /// Authoritative reconciliation of a board move: destination column and
    /// 0-based destination index.
    async fn move_task(
        &self,
        task_id: Uuid,
        status: TaskStatus,
        index: usize,
    ) -> Result<Task, SyncError>;

    async fn delete_task(&self, task_id: Uuid) -> Result<(), SyncError>;
}
