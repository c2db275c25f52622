//! Project endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::error::ApiError;
use crate::backend::middleware::AuthUser;
use crate::backend::store::projects;
use crate::shared::project::{Project, ProjectRole};

#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

fn default_color() -> String {
    "#3B82F6".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: ProjectRole,
}

async fn project_or_404(pool: &PgPool, project_id: Uuid) -> Result<Project, ApiError> {
    projects::get_project(pool, project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("project not found"))
}

fn require_role(
    project: &Project,
    user_id: Uuid,
    check: impl Fn(ProjectRole) -> bool,
    denial: &str,
) -> Result<ProjectRole, ApiError> {
    let role = project
        .role_of(user_id)
        .ok_or_else(|| ApiError::forbidden("not a member of this project"))?;
    if !check(role) {
        return Err(ApiError::forbidden(denial));
    }
    Ok(role)
}

/// GET /api/projects
pub async fn list_projects(
    State(pool): State<PgPool>,
    auth: AuthUser,
) -> Result<Json<Vec<Project>>, ApiError> {
    let projects = projects::projects_for_user(&pool, auth.user_id).await?;
    Ok(Json(projects))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    let project = project_or_404(&pool, project_id).await?;
    if !project.is_member(auth.user_id) {
        return Err(ApiError::forbidden("not a member of this project"));
    }
    Ok(Json(project))
}

/// POST /api/projects
pub async fn create_project(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Json(req): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::validation("name", "must not be empty"));
    }
    let project = projects::create_project(
        &pool,
        auth.user_id,
        req.name.trim(),
        &req.description,
        &req.color,
        &req.icon,
    )
    .await?;
    tracing::info!(project_id = %project.id, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/{id}
pub async fn update_project(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
    Json(req): Json<ProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    let project = project_or_404(&pool, project_id).await?;
    require_role(
        &project,
        auth.user_id,
        ProjectRole::can_administer,
        "only project owners and admins may edit the project",
    )?;
    if req.name.trim().is_empty() {
        return Err(ApiError::validation("name", "must not be empty"));
    }

    let updated = projects::update_project(
        &pool,
        project_id,
        req.name.trim(),
        &req.description,
        &req.color,
        &req.icon,
    )
    .await?
    .ok_or_else(|| ApiError::not_found("project not found"))?;
    Ok(Json(updated))
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let project = project_or_404(&pool, project_id).await?;
    if project.owner != auth.user_id {
        return Err(ApiError::forbidden("only the owner may delete a project"));
    }

    projects::delete_project(&pool, project_id).await?;
    tracing::info!(%project_id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/projects/{id}/members
pub async fn add_member(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
    Json(req): Json<MemberRequest>,
) -> Result<Json<Project>, ApiError> {
    let project = project_or_404(&pool, project_id).await?;
    require_role(
        &project,
        auth.user_id,
        ProjectRole::can_administer,
        "only project owners and admins may manage members",
    )?;
    if req.user_id == project.owner {
        return Err(ApiError::validation(
            "userId",
            "the owner is already an implicit member",
        ));
    }
    if req.role == ProjectRole::Owner {
        return Err(ApiError::validation("role", "ownership cannot be granted"));
    }

    projects::add_member(&pool, project_id, req.user_id, req.role).await?;
    let project = project_or_404(&pool, project_id).await?;
    Ok(Json(project))
}

/// DELETE /api/projects/{id}/members/{userId}
pub async fn remove_member(
    State(pool): State<PgPool>,
    auth: AuthUser,
    Path((project_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Project>, ApiError> {
    let project = project_or_404(&pool, project_id).await?;
    // Members may remove themselves; anything else takes admin rights.
    if user_id != auth.user_id {
        require_role(
            &project,
            auth.user_id,
            ProjectRole::can_administer,
            "only project owners and admins may manage members",
        )?;
    }
    if user_id == project.owner {
        return Err(ApiError::validation("userId", "the owner cannot be removed"));
    }

    projects::remove_member(&pool, project_id, user_id).await?;
    let project = project_or_404(&pool, project_id).await?;
    Ok(Json(project))
}
