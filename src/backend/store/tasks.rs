//! Task queries.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::backend::error::ApiError;
use crate::shared::task::{Comment, NewTask, Task, TaskPriority, TaskStatus};

/// Row from the `tasks` table. Status and priority come back as text.
#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: String,
    status: String,
    priority: String,
    project_id: Uuid,
    assignee: Option<Uuid>,
    creator: Uuid,
    tags: Vec<String>,
    due_date: Option<DateTime<Utc>>,
    start_date: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    estimated_hours: Option<f64>,
    actual_hours: Option<f64>,
    position: i32,
    is_archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_task(self) -> Task {
        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            status: self.status.parse().unwrap_or_default(),
            priority: self.priority.parse().unwrap_or_default(),
            project: self.project_id,
            assignee: self.assignee,
            creator: self.creator,
            tags: self.tags,
            due_date: self.due_date,
            start_date: self.start_date,
            completed_at: self.completed_at,
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours,
            comments: Vec::new(),
            position: self.position,
            is_archived: self.is_archived,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    user_id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
}

const TASK_COLUMNS: &str = "id, title, description, status, priority, project_id, assignee, \
     creator, tags, due_date, start_date, completed_at, estimated_hours, actual_hours, \
     position, is_archived, created_at, updated_at";

/// Filters for the task list endpoint.
#[derive(Debug, Default)]
pub struct TaskFilter {
    pub project_id: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<Uuid>,
    pub limit: Option<i64>,
}

/// Tasks visible to a user across their projects, newest first.
///
/// With no filters this backs the dashboard's recent-task feed; with a
/// `project_id` filter it is restricted to that project in board order.
pub async fn tasks_for_user(
    pool: &PgPool,
    user_id: Uuid,
    filter: &TaskFilter,
) -> Result<Vec<Task>, ApiError> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {TASK_COLUMNS} FROM tasks
         WHERE is_archived = FALSE
           AND project_id IN (
             SELECT id FROM projects WHERE owner = "
    ));
    query.push_bind(user_id);
    query.push(" UNION SELECT project_id FROM project_members WHERE user_id = ");
    query.push_bind(user_id);
    query.push(")");

    if let Some(project_id) = filter.project_id {
        query.push(" AND project_id = ");
        query.push_bind(project_id);
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ");
        query.push_bind(status.as_str());
    }
    if let Some(priority) = filter.priority {
        query.push(" AND priority = ");
        query.push_bind(priority.as_str());
    }
    if let Some(assignee) = filter.assignee {
        query.push(" AND assignee = ");
        query.push_bind(assignee);
    }

    if filter.project_id.is_some() {
        query.push(" ORDER BY position ASC, created_at ASC");
    } else {
        query.push(" ORDER BY created_at DESC");
    }
    if let Some(limit) = filter.limit {
        query.push(" LIMIT ");
        query.push_bind(limit.clamp(1, 200));
    }

    let rows = query.build_query_as::<TaskRow>().fetch_all(pool).await?;
    Ok(rows.into_iter().map(TaskRow::into_task).collect())
}

/// Fetch one task with its comments.
pub async fn get_task(pool: &PgPool, task_id: Uuid) -> Result<Option<Task>, ApiError> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
    ))
    .bind(task_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else { return Ok(None) };
    let mut task = row.into_task();

    let comments = sqlx::query_as::<_, CommentRow>(
        "SELECT id, user_id, text, created_at FROM task_comments
         WHERE task_id = $1 ORDER BY created_at ASC",
    )
    .bind(task_id)
    .fetch_all(pool)
    .await?;
    task.comments = comments
        .into_iter()
        .map(|c| Comment {
            id: c.id,
            user: c.user_id,
            text: c.text,
            created_at: c.created_at,
        })
        .collect();

    Ok(Some(task))
}

/// Next position hint: one past the current maximum in the target column.
pub async fn next_position(
    pool: &PgPool,
    project_id: Uuid,
    status: TaskStatus,
) -> Result<i32, ApiError> {
    let max: Option<i32> = sqlx::query_scalar(
        "SELECT MAX(position) FROM tasks
         WHERE project_id = $1 AND status = $2 AND is_archived = FALSE",
    )
    .bind(project_id)
    .bind(status.as_str())
    .fetch_one(pool)
    .await?;
    Ok(max.map_or(0, |m| m + 1))
}

pub async fn create_task(
    pool: &PgPool,
    creator: Uuid,
    new_task: &NewTask,
) -> Result<Task, ApiError> {
    let status = new_task.status.unwrap_or_default();
    let priority = new_task.priority.unwrap_or_default();
    let position = next_position(pool, new_task.project_id, status).await?;
    let completed_at = (status == TaskStatus::Done).then(Utc::now);

    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "INSERT INTO tasks (id, title, description, status, priority, project_id, assignee,
                            creator, tags, due_date, completed_at, estimated_hours, position,
                            created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, NOW(), NOW())
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&new_task.title)
    .bind(&new_task.description)
    .bind(status.as_str())
    .bind(priority.as_str())
    .bind(new_task.project_id)
    .bind(new_task.assignee)
    .bind(creator)
    .bind(&new_task.tags)
    .bind(new_task.due_date)
    .bind(completed_at)
    .bind(new_task.estimated_hours)
    .bind(position)
    .fetch_one(pool)
    .await?;
    Ok(row.into_task())
}

/// Write back every mutable column of a task.
///
/// Callers fetch the task, apply their whitelisted changes in memory and
/// hand the result here; project, creator and created_at never change.
pub async fn save_task(pool: &PgPool, task: &Task) -> Result<Task, ApiError> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "UPDATE tasks SET
            title = $2, description = $3, status = $4, priority = $5, assignee = $6,
            tags = $7, due_date = $8, start_date = $9, completed_at = $10,
            estimated_hours = $11, actual_hours = $12, position = $13,
            is_archived = $14, updated_at = NOW()
         WHERE id = $1
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(task.id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status.as_str())
    .bind(task.priority.as_str())
    .bind(task.assignee)
    .bind(&task.tags)
    .bind(task.due_date)
    .bind(task.start_date)
    .bind(task.completed_at)
    .bind(task.estimated_hours)
    .bind(task.actual_hours)
    .bind(task.position)
    .bind(task.is_archived)
    .fetch_one(pool)
    .await?;
    Ok(row.into_task())
}

pub async fn delete_task(pool: &PgPool, task_id: Uuid) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(task_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn add_comment(
    pool: &PgPool,
    task_id: Uuid,
    user_id: Uuid,
    text: &str,
) -> Result<Comment, ApiError> {
    let row = sqlx::query_as::<_, CommentRow>(
        "INSERT INTO task_comments (id, task_id, user_id, text, created_at)
         VALUES ($1, $2, $3, $4, NOW())
         RETURNING id, user_id, text, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(task_id)
    .bind(user_id)
    .bind(text)
    .fetch_one(pool)
    .await?;
    Ok(Comment {
        id: row.id,
        user: row.user_id,
        text: row.text,
        created_at: row.created_at,
    })
}
