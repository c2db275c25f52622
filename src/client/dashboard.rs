//! Read-only dashboard aggregation.
//!
//! Derives summary counts from a bounded recent-task window and the
//! caller's project list. No board state, no subscriptions; consumes the
//! store's read APIs only.

use crate::client::gateway::TaskGateway;
use crate::shared::error::SyncError;
use crate::shared::project::Project;
use crate::shared::task::{Task, TaskStatus};

/// How many recent tasks the dashboard looks at by default.
pub const RECENT_TASK_WINDOW: usize = 5;

/// Summary counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
}

impl DashboardStats {
    /// Counts over the recent-task window; `pending` means still in todo.
    pub fn compute(projects: &[Project], recent_tasks: &[Task]) -> Self {
        Self {
            total_projects: projects.len(),
            total_tasks: recent_tasks.len(),
            completed_tasks: recent_tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Done)
                .count(),
            pending_tasks: recent_tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Todo)
                .count(),
        }
    }
}

/// Dashboard view data: projects, the recent-task window, and the counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub projects: Vec<Project>,
    pub recent_tasks: Vec<Task>,
    pub stats: DashboardStats,
}

/// Fetch projects and recent tasks, then aggregate.
pub async fn load_dashboard<G: TaskGateway>(
    gateway: &G,
    recent_limit: usize,
) -> Result<Dashboard, SyncError> {
    let projects = gateway.fetch_projects().await?;
    let recent_tasks = gateway.fetch_recent_tasks(recent_limit).await?;
    let stats = DashboardStats::compute(&projects, &recent_tasks);
    Ok(Dashboard {
        projects,
        recent_tasks,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::sync::tests::{sample_task, MockGateway};
    use uuid::Uuid;

    #[test]
    fn stats_count_done_and_todo() {
        let project = Uuid::new_v4();
        let tasks = vec![
            sample_task(project, TaskStatus::Done, 0),
            sample_task(project, TaskStatus::Todo, 1),
            sample_task(project, TaskStatus::Review, 2),
        ];
        let stats = DashboardStats::compute(&[], &tasks);
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.pending_tasks, 1);
        assert_eq!(stats.total_projects, 0);
    }

    #[tokio::test]
    async fn load_dashboard_respects_window() {
        let project = Uuid::new_v4();
        let tasks: Vec<_> = (0..8)
            .map(|i| sample_task(project, TaskStatus::Todo, i))
            .collect();
        let gateway = MockGateway::with_tasks(tasks);
        let dashboard = load_dashboard(&&gateway, RECENT_TASK_WINDOW).await.unwrap();
        assert_eq!(dashboard.recent_tasks.len(), RECENT_TASK_WINDOW);
        assert_eq!(dashboard.stats.total_tasks, RECENT_TASK_WINDOW);
    }
}
