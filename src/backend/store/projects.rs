//! Project queries, membership, and statistics recompute.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::error::ApiError;
use crate::shared::project::{Project, ProjectMember, ProjectRole, ProjectStatistics};

#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    description: String,
    owner: Uuid,
    color: String,
    icon: String,
    total_tasks: i64,
    completed_tasks: i64,
    in_progress_tasks: i64,
    todo_tasks: i64,
    last_activity: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    project_id: Uuid,
    user_id: Uuid,
    role: String,
    joined_at: DateTime<Utc>,
}

impl MemberRow {
    fn into_member(self) -> ProjectMember {
        ProjectMember {
            user: self.user_id,
            role: self.role.parse().unwrap_or_default(),
            joined_at: self.joined_at,
        }
    }
}

impl ProjectRow {
    fn into_project(self, members: Vec<ProjectMember>) -> Project {
        Project {
            id: self.id,
            name: self.name,
            description: self.description,
            owner: self.owner,
            members,
            color: self.color,
            icon: self.icon,
            statistics: ProjectStatistics {
                total_tasks: self.total_tasks,
                completed_tasks: self.completed_tasks,
                in_progress_tasks: self.in_progress_tasks,
                todo_tasks: self.todo_tasks,
            },
            last_activity: self.last_activity,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const PROJECT_COLUMNS: &str = "id, name, description, owner, color, icon, total_tasks, \
     completed_tasks, in_progress_tasks, todo_tasks, last_activity, created_at, updated_at";

/// Every project the user owns or is a member of, most recently active first.
pub async fn projects_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Project>, ApiError> {
    let rows = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects
         WHERE owner = $1
            OR id IN (SELECT project_id FROM project_members WHERE user_id = $1)
         ORDER BY last_activity DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let member_rows = sqlx::query_as::<_, MemberRow>(
        "SELECT project_id, user_id, role, joined_at FROM project_members
         WHERE project_id = ANY($1) ORDER BY joined_at ASC",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut projects = Vec::with_capacity(rows.len());
    for row in rows {
        let members = member_rows
            .iter()
            .filter(|m| m.project_id == row.id)
            .map(|m| ProjectMember {
                user: m.user_id,
                role: m.role.parse().unwrap_or_default(),
                joined_at: m.joined_at,
            })
            .collect();
        projects.push(row.into_project(members));
    }
    Ok(projects)
}

pub async fn get_project(pool: &PgPool, project_id: Uuid) -> Result<Option<Project>, ApiError> {
    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
    ))
    .bind(project_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else { return Ok(None) };

    let members = sqlx::query_as::<_, MemberRow>(
        "SELECT project_id, user_id, role, joined_at FROM project_members
         WHERE project_id = $1 ORDER BY joined_at ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(
        row.into_project(members.into_iter().map(MemberRow::into_member).collect()),
    ))
}

pub async fn create_project(
    pool: &PgPool,
    owner: Uuid,
    name: &str,
    description: &str,
    color: &str,
    icon: &str,
) -> Result<Project, ApiError> {
    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        "INSERT INTO projects (id, name, description, owner, color, icon,
                               last_activity, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW(), NOW())
         RETURNING {PROJECT_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .bind(owner)
    .bind(color)
    .bind(icon)
    .fetch_one(pool)
    .await?;
    Ok(row.into_project(Vec::new()))
}

pub async fn update_project(
    pool: &PgPool,
    project_id: Uuid,
    name: &str,
    description: &str,
    color: &str,
    icon: &str,
) -> Result<Option<Project>, ApiError> {
    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        "UPDATE projects SET name = $2, description = $3, color = $4, icon = $5,
                             updated_at = NOW()
         WHERE id = $1
         RETURNING {PROJECT_COLUMNS}"
    ))
    .bind(project_id)
    .bind(name)
    .bind(description)
    .bind(color)
    .bind(icon)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let project = get_project(pool, row.id).await?;
            Ok(project)
        }
        None => Ok(None),
    }
}

/// Delete a project. Tasks, comments and memberships go with it via
/// ON DELETE CASCADE.
pub async fn delete_project(pool: &PgPool, project_id: Uuid) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Add or re-role a member. Idempotent: adding an existing member updates
/// their role.
pub async fn add_member(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
    role: ProjectRole,
) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT INTO project_members (project_id, user_id, role, joined_at)
         VALUES ($1, $2, $3, NOW())
         ON CONFLICT (project_id, user_id) DO UPDATE SET role = EXCLUDED.role",
    )
    .bind(project_id)
    .bind(user_id)
    .bind(role.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn remove_member(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Recompute the denormalized task counters with a full scan over the
/// project's non-archived tasks, and bump `last_activity`.
///
/// Deliberately not wrapped in a transaction with the task write that
/// triggered it: the counters are advisory and a rerun after any later
/// mutation converges them.
pub async fn recompute_statistics(pool: &PgPool, project_id: Uuid) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE projects SET
            total_tasks = s.total,
            completed_tasks = s.done,
            in_progress_tasks = s.in_progress,
            todo_tasks = s.todo,
            last_activity = NOW()
         FROM (
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'done') AS done,
                   COUNT(*) FILTER (WHERE status = 'in-progress') AS in_progress,
                   COUNT(*) FILTER (WHERE status = 'todo') AS todo
            FROM tasks WHERE project_id = $1 AND is_archived = FALSE
         ) AS s
         WHERE id = $1",
    )
    .bind(project_id)
    .execute(pool)
    .await?;
    Ok(())
}
