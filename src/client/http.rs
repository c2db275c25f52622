//! HTTP implementation of the persistence gateway.
//!
//! Talks to the TaskFlow REST API with a bearer token and maps HTTP status
//! codes back onto the shared error taxonomy. Realtime traffic does not go
//! through here; this is the request/response path that keeps working even
//! when the live transport is down.

use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::client::gateway::TaskGateway;
use crate::shared::error::SyncError;
use crate::shared::project::Project;
use crate::shared::task::{NewTask, Task, TaskMove, TaskPatch, TaskStatus};

/// Error body shape the backend returns alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Gateway over the REST API.
pub struct HttpTaskGateway {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl HttpTaskGateway {
    /// `base_url` without a trailing slash, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-2xx response into the matching taxonomy error.
    async fn error_from(response: reqwest::Response) -> SyncError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.message)
            .unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => SyncError::Unauthenticated,
            StatusCode::FORBIDDEN => SyncError::Forbidden(message),
            StatusCode::NOT_FOUND => SyncError::NotFound(message),
            StatusCode::BAD_REQUEST => SyncError::ValidationFailed {
                field: "request".into(),
                message,
            },
            other => SyncError::Internal(format!("unexpected status {other}: {message}")),
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SyncError> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| SyncError::Internal(format!("malformed response body: {e}")))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SyncError> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Self::parse(response).await
    }
}

impl TaskGateway for HttpTaskGateway {
    async fn fetch_tasks(&self, project_id: Uuid) -> Result<Vec<Task>, SyncError> {
        self.get_json("/api/tasks", &[("projectId", project_id.to_string())])
            .await
    }

    async fn fetch_recent_tasks(&self, limit: usize) -> Result<Vec<Task>, SyncError> {
        self.get_json("/api/tasks", &[("limit", limit.to_string())])
            .await
    }

    async fn fetch_projects(&self) -> Result<Vec<Project>, SyncError> {
        self.get_json("/api/projects", &[]).await
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Task, SyncError> {
        let response = self
            .http
            .post(self.url("/api/tasks"))
            .bearer_auth(&self.token)
            .json(new_task)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Self::parse(response).await
    }

    async fn update_task(&self, task_id: Uuid, patch: &TaskPatch) -> Result<Task, SyncError> {
        let response = self
            .http
            .put(self.url(&format!("/api/tasks/{task_id}")))
            .bearer_auth(&self.token)
            .json(patch)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Self::parse(response).await
    }

    async fn move_task(
        &self,
        task_id: Uuid,
        status: TaskStatus,
        index: usize,
    ) -> Result<Task, SyncError> {
        let response = self
            .http
            .put(self.url(&format!("/api/tasks/{task_id}/move")))
            .bearer_auth(&self.token)
            .json(&TaskMove { status, index })
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Self::parse(response).await
    }

    async fn delete_task(&self, task_id: Uuid) -> Result<(), SyncError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/tasks/{task_id}")))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::sync::tests::sample_task;
    use assert_matches::assert_matches;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_tasks_sends_bearer_and_parses_list() {
        let server = MockServer::start().await;
        let project = Uuid::new_v4();
        let task = sample_task(project, TaskStatus::Todo, 0);

        Mock::given(method("GET"))
            .and(path("/api/tasks"))
            .and(query_param("projectId", project.to_string()))
            .and(header("authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![task.clone()]))
            .mount(&server)
            .await;

        let gateway = HttpTaskGateway::new(server.uri(), "secret-token");
        let tasks = gateway.fetch_tasks(project).await.unwrap();
        assert_eq!(tasks, vec![task]);
    }

    #[tokio::test]
    async fn forbidden_maps_to_taxonomy() {
        let server = MockServer::start().await;
        let task_id = Uuid::new_v4();

        Mock::given(method("PUT"))
            .and(path(format!("/api/tasks/{task_id}/move")))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({"message": "not a project member"})),
            )
            .mount(&server)
            .await;

        let gateway = HttpTaskGateway::new(server.uri(), "secret-token");
        let err = gateway
            .move_task(task_id, TaskStatus::Done, 0)
            .await
            .unwrap_err();
        assert_matches!(err, SyncError::Forbidden(msg) if msg == "not a project member");
    }

    #[tokio::test]
    async fn unauthorized_and_missing_map_to_taxonomy() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/projects"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "task not found"})),
            )
            .mount(&server)
            .await;

        let gateway = HttpTaskGateway::new(server.uri(), "secret-token");
        assert_matches!(
            gateway.fetch_projects().await.unwrap_err(),
            SyncError::Unauthenticated
        );
        assert_matches!(
            gateway.delete_task(Uuid::new_v4()).await.unwrap_err(),
            SyncError::NotFound(_)
        );
    }
}
