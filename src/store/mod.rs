//! HTTP client for the remote task store.
//!
//! The store is authoritative: ids and timestamps are assigned server-side,
//! and every call is scoped by both task id and owning-user id so a request
//! for another user's task is rejected rather than silently acted on.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CreateTaskInput, Session, Task, TaskStatus, UpdateStatusInput, UpdateTaskInput};

/// Store errors, with the provider's reason preserved.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Rejected by the store: {0}")]
    Constraint(String),

    #[error("Session rejected by the store")]
    Unauthorized,

    #[error("Store error: {0}")]
    Server(String),
}

/// HTTP client for the task store. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StoreClient {
    base_url: String,
    client: Client,
}

impl StoreClient {
    /// Create client from environment variables.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("TASKDECK_URL").unwrap_or_else(|_| crate::config::DEFAULT_URL.to_string());
        Self::new(base_url)
    }

    /// Create with an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    /// Build a request authenticated with the session's bearer token.
    fn request(
        &self,
        session: &Session,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .bearer_auth(&session.access_token)
            .query(&[("user_id", session.user_id.to_string())])
    }

    /// Handle response, converting HTTP errors to StoreError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::map_failure(status, response.text().await.unwrap_or_default()))
        }
    }

    /// Handle response that may return empty body (204 No Content).
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), StoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::map_failure(status, response.text().await.unwrap_or_default()))
        }
    }

    fn map_failure(status: StatusCode, body: String) -> StoreError {
        match status {
            StatusCode::NOT_FOUND => StoreError::NotFound(body),
            StatusCode::FORBIDDEN => StoreError::PermissionDenied(body),
            StatusCode::UNAUTHORIZED => StoreError::Unauthorized,
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                StoreError::Constraint(body)
            }
            _ => StoreError::Server(format!("{}: {}", status, body)),
        }
    }

    /// List the user's tasks, newest first (server orders by `created_at`
    /// descending).
    pub async fn list(&self, session: &Session) -> Result<Vec<Task>, StoreError> {
        let response = self
            .request(session, reqwest::Method::GET, "/tasks")
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Create a task. The server assigns id and timestamps.
    pub async fn create(
        &self,
        session: &Session,
        input: &CreateTaskInput,
    ) -> Result<Task, StoreError> {
        let response = self
            .request(session, reqwest::Method::POST, "/tasks")
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Full-field edit of a task.
    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        input: &UpdateTaskInput,
    ) -> Result<Task, StoreError> {
        let response = self
            .request(session, reqwest::Method::PUT, &format!("/tasks/{}", id))
            .json(input)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Status-only update. Touches status and `updated_at`, nothing else.
    pub async fn update_status(
        &self,
        session: &Session,
        id: Uuid,
        done: bool,
    ) -> Result<Task, StoreError> {
        let response = self
            .request(session, reqwest::Method::PUT, &format!("/tasks/{}/status", id))
            .json(&UpdateStatusInput {
                status: TaskStatus::from_done(done),
            })
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Delete a task. Permanent; there is no soft-delete.
    pub async fn delete(&self, session: &Session, id: Uuid) -> Result<(), StoreError> {
        let response = self
            .request(session, reqwest::Method::DELETE, &format!("/tasks/{}", id))
            .send()
            .await?;
        self.handle_empty_response(response).await
    }
}
