//! Task data model.
//!
//! A task lives in exactly one project and one status column. Its `position`
//! is an integer ordering hint within the `(project, status)` group: it is
//! not a dense rank and not guaranteed unique. Readers must always sort by
//! `(position ascending, created_at ascending)`; ties are expected and the
//! creation time breaks them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status column a task belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// All statuses in board column order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    /// Column index on the board (and in `BoardState`).
    pub fn index(self) -> usize {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Review => 2,
            TaskStatus::Done => 3,
        }
    }

    /// Wire/database representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in-progress" => Ok(TaskStatus::InProgress),
            "review" => Ok(TaskStatus::Review),
            "done" => Ok(TaskStatus::Done),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    /// Wire/database representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            "urgent" => Ok(TaskPriority::Urgent),
            other => Err(format!("unknown task priority: {other}")),
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comment attached to a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    /// User who wrote the comment.
    pub user: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A task record.
///
/// Invariant: `completed_at` is `Some` exactly when `status == Done`. Every
/// status-changing write path runs the transition in
/// `backend::board::reconciler::completed_at_transition`, so a task read back
/// from the store always satisfies it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Owning project id.
    pub project: Uuid,
    #[serde(default)]
    pub assignee: Option<Uuid>,
    pub creator: Uuid,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub actual_hours: Option<f64>,
    /// Only populated on single-task fetches.
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Ordering hint within the `(project, status)` group.
    pub position: i32,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the task is past its due date and not done.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) if self.status != TaskStatus::Done => now > due,
            _ => false,
        }
    }
}

/// Fields accepted when creating a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub project_id: Uuid,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub assignee: Option<Uuid>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
}

/// Partial task update. `None` fields are left unchanged.
///
/// This is the field whitelist for task mutation: anything not listed here
/// (creator, project, comments, timestamps) cannot be changed through an
/// update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub position: Option<i32>,
}

/// Board move request: destination column and 0-based destination index
/// within that column's current rendering order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskMove {
    pub status: TaskStatus,
    pub index: usize,
}

impl TaskPatch {
    /// Patch that moves a task to a status column at a position hint.
    pub fn for_move(status: TaskStatus, position: i32) -> Self {
        Self {
            status: Some(status),
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_names() {
        for status in TaskStatus::ALL {
            let parsed: TaskStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
    }

    #[test]
    fn priority_parses_wire_names() {
        assert_eq!("urgent".parse::<TaskPriority>().unwrap(), TaskPriority::Urgent);
        assert!("critical".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn task_serializes_camel_case() {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: "Write docs".into(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            project: Uuid::new_v4(),
            assignee: None,
            creator: Uuid::new_v4(),
            tags: vec![],
            due_date: None,
            start_date: None,
            completed_at: None,
            estimated_hours: None,
            actual_hours: None,
            comments: vec![],
            position: 0,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("isArchived").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["status"], "todo");
    }

    #[test]
    fn overdue_only_before_done() {
        let now = Utc::now();
        let mut task = Task {
            id: Uuid::new_v4(),
            title: "t".into(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Low,
            project: Uuid::new_v4(),
            assignee: None,
            creator: Uuid::new_v4(),
            tags: vec![],
            due_date: Some(now - chrono::Duration::days(1)),
            start_date: None,
            completed_at: None,
            estimated_hours: None,
            actual_hours: None,
            comments: vec![],
            position: 0,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };
        assert!(task.is_overdue(now));
        task.status = TaskStatus::Done;
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn empty_patch_detected() {
        assert!(TaskPatch::default().is_empty());
        assert!(!TaskPatch::for_move(TaskStatus::Done, 2).is_empty());
    }
}
