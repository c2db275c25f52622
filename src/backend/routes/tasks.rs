//! Task endpoints.
//!
//! Every handler authorizes against project membership before touching a
//! task, and every mutation finishes with a best-effort statistics
//! recompute for the owning project. The recompute is not transactional
//! with the task write; a failure there is logged and the mutation still
//! succeeds.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::board::reconciler;
use crate::backend::error::ApiError;
use crate::backend::middleware::AuthUser;
use crate::backend::store::tasks::TaskFilter;
use crate::backend::store::{projects, tasks};
use crate::shared::project::Project;
use crate::shared::task::{Comment, NewTask, Task, TaskMove, TaskPatch, TaskPriority, TaskStatus};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListParams {
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub assignee: Option<Uuid>,
    #[serde(default)]
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

/// Load a project and require the user to be a member.
async fn member_project(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Project, ApiError> {
    let project = projects::get_project(pool, project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("project not found"))?;
    if !project.is_member(user_id) {
        return Err(ApiError::forbidden("not a member of this project"));
    }
    Ok(project)
}

/// Load a task and require membership in its project.
async fn member_task(pool: &PgPool, task_id: Uuid, user_id: Uuid) -> Result<(Task, Project), ApiError> {
    let task = tasks::get_task(pool, task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("task not found"))?;
    let project = member_project(pool, task.project, user_id).await?;
    Ok((task, project))
}

fn recompute_stats_or_log(pool: PgPool, project_id: Uuid) {
    tokio::spawn(async move {
        if let Err(err) = projects::recompute_statistics(&pool, project_id).await {
            tracing::warn!(%project_id, error = %err, "statistics recompute failed");
        }
    });
}

/// GET /api/tasks
pub async fn list_tasks(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Query(params): Query<TaskListParams>,
) -> Result<Json<Vec<Task>>, ApiError> {
    if let Some(project_id) = params.project_id {
        member_project(&pool, project_id, auth.user_id).await?;
    }
    let filter = TaskFilter {
        project_id: params.project_id,
        status: params.status,
        priority: params.priority,
        assignee: params.assignee,
        limit: params.limit,
    };
    let tasks = tasks::tasks_for_user(&pool, auth.user_id, &filter).await?;
    Ok(Json(tasks))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let (task, _) = member_task(&pool, task_id, auth.user_id).await?;
    Ok(Json(task))
}

/// POST /api/tasks
pub async fn create_task(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Json(new_task): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    if new_task.title.trim().is_empty() {
        return Err(ApiError::validation("title", "must not be empty"));
    }
    member_project(&pool, new_task.project_id, auth.user_id).await?;

    let task = tasks::create_task(&pool, auth.user_id, &new_task).await?;
    tracing::info!(task_id = %task.id, project_id = %task.project, "task created");
    recompute_stats_or_log(pool, task.project);
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Path(task_id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let (mut task, _) = member_task(&pool, task_id, auth.user_id).await?;
    if patch.is_empty() {
        return Ok(Json(task));
    }

    reconciler::apply_patch(&mut task, &patch);
    let saved = tasks::save_task(&pool, &task).await?;
    recompute_stats_or_log(pool, saved.project);
    Ok(Json(saved))
}

/// PUT /api/tasks/{id}/move
pub async fn move_task(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Path(task_id): Path<Uuid>,
    Json(mv): Json<TaskMove>,
) -> Result<Json<Task>, ApiError> {
    let (mut task, _) = member_task(&pool, task_id, auth.user_id).await?;

    // The destination index becomes the position hint verbatim; readers
    // break ties on created_at.
    reconciler::apply_move(&mut task, mv.status, mv.index);

    let saved = tasks::save_task(&pool, &task).await?;
    tracing::info!(
        task_id = %saved.id,
        status = %saved.status,
        position = saved.position,
        "task moved"
    );
    recompute_stats_or_log(pool, saved.project);
    Ok(Json(saved))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Path(task_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let (task, project) = member_task(&pool, task_id, auth.user_id).await?;
    let role = project
        .role_of(auth.user_id)
        .ok_or_else(|| ApiError::forbidden("not a member of this project"))?;
    if !role.can_administer() {
        return Err(ApiError::forbidden(
            "only project owners and admins may delete tasks",
        ));
    }

    tasks::delete_task(&pool, task.id).await?;
    tracing::info!(task_id = %task.id, "task deleted");
    recompute_stats_or_log(pool, task.project);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/tasks/{id}/archive
///
/// Toggles the flag: archiving hides the task, a second call brings it
/// back.
pub async fn archive_task(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let (mut task, _) = member_task(&pool, task_id, auth.user_id).await?;
    reconciler::toggle_archived(&mut task);
    let saved = tasks::save_task(&pool, &task).await?;
    tracing::info!(
        task_id = %saved.id,
        archived = saved.is_archived,
        "task archive flag toggled"
    );
    recompute_stats_or_log(pool, saved.project);
    Ok(Json(saved))
}

/// POST /api/tasks/{id}/comments
pub async fn add_comment(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Path(task_id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::validation("text", "must not be empty"));
    }
    let (task, _) = member_task(&pool, task_id, auth.user_id).await?;
    let comment = tasks::add_comment(&pool, task.id, auth.user_id, req.text.trim()).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
