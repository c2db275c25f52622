//! Project data model and membership roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::task::{Task, TaskStatus};

/// Role of a user inside a project.
///
/// `Owner` is never stored in the member list: the project owner is an
/// implicit full member and `Project::role_of` reports them as `Owner`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    Viewer,
    #[default]
    Member,
    Admin,
    Owner,
}

impl ProjectRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectRole::Viewer => "viewer",
            ProjectRole::Member => "member",
            ProjectRole::Admin => "admin",
            ProjectRole::Owner => "owner",
        }
    }

    /// Owners and admins may delete tasks and manage members.
    pub fn can_administer(self) -> bool {
        matches!(self, ProjectRole::Owner | ProjectRole::Admin)
    }
}

impl std::str::FromStr for ProjectRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer" => Ok(ProjectRole::Viewer),
            "member" => Ok(ProjectRole::Member),
            "admin" => Ok(ProjectRole::Admin),
            "owner" => Ok(ProjectRole::Owner),
            other => Err(format!("unknown project role: {other}")),
        }
    }
}

/// A user's membership entry in a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub user: Uuid,
    pub role: ProjectRole,
    pub joined_at: DateTime<Utc>,
}

/// Denormalized task counts for a project.
///
/// Recomputed by a full scan over the project's non-archived tasks on every
/// task mutation rather than maintained incrementally, so concurrent
/// mutations cannot make the counters drift. Brief staleness between a task
/// write and the follow-up recompute is expected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatistics {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub todo_tasks: i64,
}

impl ProjectStatistics {
    /// Compute statistics from a task collection. Archived tasks are ignored.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let live: Vec<&Task> = tasks.iter().filter(|t| !t.is_archived).collect();
        Self {
            total_tasks: live.len() as i64,
            completed_tasks: live.iter().filter(|t| t.status == TaskStatus::Done).count() as i64,
            in_progress_tasks: live
                .iter()
                .filter(|t| t.status == TaskStatus::InProgress)
                .count() as i64,
            todo_tasks: live.iter().filter(|t| t.status == TaskStatus::Todo).count() as i64,
        }
    }
}

/// A project record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Owning user. Exactly one, immutable authority over the project.
    pub owner: Uuid,
    #[serde(default)]
    pub members: Vec<ProjectMember>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub statistics: ProjectStatistics,
    pub last_activity: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Whether the user is the owner or appears in the member list.
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.owner == user_id || self.members.iter().any(|m| m.user == user_id)
    }

    /// Effective role of the user, treating the owner as an implicit member.
    pub fn role_of(&self, user_id: Uuid) -> Option<ProjectRole> {
        if self.owner == user_id {
            return Some(ProjectRole::Owner);
        }
        self.members
            .iter()
            .find(|m| m.user == user_id)
            .map(|m| m.role)
    }
}
