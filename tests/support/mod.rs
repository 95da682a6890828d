//! In-process stub backend for integration tests.
//!
//! Serves the auth and task-store endpoints the clients expect, with
//! in-memory state, call counters, and injectable failures. Runs on an
//! OS-assigned port so tests stay isolated from each other.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use taskdeck::auth::SessionGateway;
use taskdeck::models::{CreateTaskInput, Session, Task, TaskStatus, UpdateStatusInput, UpdateTaskInput};
use taskdeck::store::StoreClient;

type Shared = Arc<Mutex<StubState>>;

#[derive(Clone)]
pub struct StubUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub confirmed: bool,
}

#[derive(Default)]
pub struct StubState {
    pub users: Vec<StubUser>,
    pub sessions: HashMap<String, Uuid>,
    pub tasks: Vec<Task>,
    seq: i64,
    pub list_calls: usize,
    pub create_calls: usize,
    pub update_calls: usize,
    pub status_calls: usize,
    pub delete_calls: usize,
    pub fail_delete: Option<StatusCode>,
    pub fail_status: Option<StatusCode>,
}

impl StubState {
    /// Strictly increasing timestamps, so newest-first ordering is never
    /// a coin flip between tasks created in the same millisecond.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let ts = Utc::now() + Duration::seconds(self.seq);
        self.seq += 1;
        ts
    }
}

/// Handle to a running stub backend.
pub struct StubBackend {
    pub base_url: String,
    pub state: Shared,
}

impl StubBackend {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(StubState::default()));
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub listener address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn gateway(&self) -> SessionGateway {
        SessionGateway::new(self.base_url.clone(), None)
    }

    pub fn store(&self) -> StoreClient {
        StoreClient::new(self.base_url.clone())
    }

    pub fn add_user(&self, name: Option<&str>, email: &str, password: &str) -> Uuid {
        self.add_user_with_confirmation(name, email, password, true)
    }

    pub fn add_unconfirmed_user(&self, email: &str, password: &str) -> Uuid {
        self.add_user_with_confirmation(None, email, password, false)
    }

    fn add_user_with_confirmation(
        &self,
        name: Option<&str>,
        email: &str,
        password: &str,
        confirmed: bool,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().users.push(StubUser {
            id,
            name: name.map(str::to_string),
            email: email.to_string(),
            password: password.to_string(),
            confirmed,
        });
        id
    }

    /// Seed a task directly into the store, bypassing the HTTP surface.
    pub fn seed_task(
        &self,
        user_id: Uuid,
        title: &str,
        description: Option<&str>,
        done: bool,
    ) -> Task {
        let mut state = self.lock();
        let ts = state.next_timestamp();
        let task = Task {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            description: description.map(str::to_string),
            status: if done {
                TaskStatus::Done
            } else {
                TaskStatus::InProgress
            },
            created_at: ts,
            updated_at: ts,
        };
        state.tasks.push(task.clone());
        task
    }

    pub fn set_fail_delete(&self, code: StatusCode) {
        self.lock().fail_delete = Some(code);
    }

    pub fn set_fail_status(&self, code: StatusCode) {
        self.lock().fail_status = Some(code);
    }

    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    pub fn status_calls(&self) -> usize {
        self.lock().status_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.lock().delete_calls
    }

    pub fn remote_tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.state.lock().expect("stub state lock poisoned")
    }
}

/// Spawn a backend with one confirmed user already signed in.
pub async fn signed_in_backend() -> (StubBackend, Arc<SessionGateway>, StoreClient, Session) {
    let backend = StubBackend::spawn().await;
    backend.add_user(Some("Alex"), "alex@example.com", "hunter2");
    let gateway = Arc::new(backend.gateway());
    let session = gateway
        .login("alex@example.com", "hunter2")
        .await
        .expect("stub login");
    let store = backend.store();
    (backend, gateway, store, session)
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/logout", post(logout))
        .route("/auth/recover", post(recover))
        .route("/auth/password", put(update_password))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", put(update_task).delete(delete_task))
        .route("/tasks/{id}/status", put(update_status))
        .with_state(state)
}

fn auth_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "error_code": code, "message": message })),
    )
        .into_response()
}

fn session_payload(token: &str, user: &StubUser) -> Response {
    Json(json!({
        "access_token": token,
        "user": { "id": user.id, "email": user.email, "name": user.name }
    }))
    .into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Resolve the bearer token to a signed-in user id.
fn authorize(state: &StubState, headers: &HeaderMap) -> Result<Uuid, Response> {
    bearer(headers)
        .and_then(|token| state.sessions.get(&token).copied())
        .ok_or_else(|| (StatusCode::UNAUTHORIZED, "invalid token").into_response())
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct SignupBody {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct RecoverBody {
    email: String,
}

#[derive(Deserialize)]
struct Scope {
    user_id: Uuid,
}

async fn login(State(state): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let mut state = state.lock().expect("stub state lock poisoned");
    let Some(user) = state
        .users
        .iter()
        .find(|u| u.email == body.email && u.password == body.password)
        .cloned()
    else {
        return auth_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Invalid login credentials",
        );
    };
    if !user.confirmed {
        return auth_error(
            StatusCode::FORBIDDEN,
            "email_not_confirmed",
            "Email not confirmed",
        );
    }
    let token = Uuid::new_v4().to_string();
    state.sessions.insert(token.clone(), user.id);
    session_payload(&token, &user)
}

async fn signup(State(state): State<Shared>, Json(body): Json<SignupBody>) -> Response {
    let mut state = state.lock().expect("stub state lock poisoned");
    if state.users.iter().any(|u| u.email == body.email) {
        return auth_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "email_taken",
            "Email already registered",
        );
    }
    let user = StubUser {
        id: Uuid::new_v4(),
        name: Some(body.name),
        email: body.email,
        password: body.password,
        confirmed: true,
    };
    state.users.push(user.clone());
    let token = Uuid::new_v4().to_string();
    state.sessions.insert(token.clone(), user.id);
    session_payload(&token, &user)
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().expect("stub state lock poisoned");
    match bearer(&headers) {
        Some(token) if state.sessions.remove(&token).is_some() => {
            StatusCode::NO_CONTENT.into_response()
        }
        _ => (StatusCode::UNAUTHORIZED, "invalid token").into_response(),
    }
}

async fn recover(State(state): State<Shared>, Json(body): Json<RecoverBody>) -> Response {
    let state = state.lock().expect("stub state lock poisoned");
    if state.users.iter().any(|u| u.email == body.email) {
        StatusCode::OK.into_response()
    } else {
        auth_error(StatusCode::NOT_FOUND, "user_not_found", "No such user")
    }
}

async fn update_password(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().expect("stub state lock poisoned");
    match authorize(&state, &headers) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(rejection) => rejection,
    }
}

async fn list_tasks(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(scope): Query<Scope>,
) -> Response {
    let mut state = state.lock().expect("stub state lock poisoned");
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    state.list_calls += 1;
    let mut tasks: Vec<Task> = state
        .tasks
        .iter()
        .filter(|t| t.user_id == scope.user_id)
        .cloned()
        .collect();
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(tasks).into_response()
}

async fn create_task(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(scope): Query<Scope>,
    Json(input): Json<CreateTaskInput>,
) -> Response {
    let mut state = state.lock().expect("stub state lock poisoned");
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    state.create_calls += 1;
    let ts = state.next_timestamp();
    let task = Task {
        id: Uuid::new_v4(),
        user_id: scope.user_id,
        title: input.title,
        description: input.description,
        status: input.status,
        created_at: ts,
        updated_at: ts,
    };
    state.tasks.push(task.clone());
    Json(task).into_response()
}

async fn update_task(
    State(state): State<Shared>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Query(scope): Query<Scope>,
    Json(input): Json<UpdateTaskInput>,
) -> Response {
    let mut state = state.lock().expect("stub state lock poisoned");
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    state.update_calls += 1;
    let ts = state.next_timestamp();
    let Some(task) = state
        .tasks
        .iter_mut()
        .find(|t| t.id == id && t.user_id == scope.user_id)
    else {
        return (StatusCode::NOT_FOUND, "no such task").into_response();
    };
    task.title = input.title;
    task.description = input.description;
    task.status = input.status;
    task.updated_at = ts;
    Json(task.clone()).into_response()
}

async fn update_status(
    State(state): State<Shared>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Query(scope): Query<Scope>,
    Json(input): Json<UpdateStatusInput>,
) -> Response {
    let mut state = state.lock().expect("stub state lock poisoned");
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    state.status_calls += 1;
    if let Some(code) = state.fail_status {
        return (code, "injected failure").into_response();
    }
    let ts = state.next_timestamp();
    let Some(task) = state
        .tasks
        .iter_mut()
        .find(|t| t.id == id && t.user_id == scope.user_id)
    else {
        return (StatusCode::NOT_FOUND, "no such task").into_response();
    };
    task.status = input.status;
    task.updated_at = ts;
    Json(task.clone()).into_response()
}

async fn delete_task(
    State(state): State<Shared>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Query(scope): Query<Scope>,
) -> Response {
    let mut state = state.lock().expect("stub state lock poisoned");
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    state.delete_calls += 1;
    if let Some(code) = state.fail_delete {
        return (code, "injected failure").into_response();
    }
    // Deleting an id that never existed is a no-op, like a filtered SQL
    // delete matching zero rows.
    state.tasks.retain(|t| !(t.id == id && t.user_id == scope.user_id));
    StatusCode::NO_CONTENT.into_response()
}
