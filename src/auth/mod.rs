//! Session gateway: HTTP client for the external auth provider.
//!
//! The gateway owns the active [`Session`]. Components that need to react
//! to sign-in/sign-out hold a [`SessionEvents`] subscription and must drop
//! it on teardown so no event fires into a stale view.
//!
//! Configuration is via environment variables:
//! - `TASKDECK_URL` - Backend base URL (default: `http://localhost:17020/api/v1`)
//! - `TASKDECK_API_KEY` - Publishable API key sent on unauthenticated calls

use std::sync::Mutex;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{Session, SessionEvent};

/// Auth provider errors. Each variant renders a distinct user-facing message.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email not confirmed: check your inbox for the confirmation link")]
    EmailNotConfirmed,

    #[error("No active session")]
    SessionRequired,

    #[error("Sign-in rejected: {0}")]
    Rejected(String),
}

/// HTTP client for the auth provider, plus the session-change channel.
pub struct SessionGateway {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    session: Mutex<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

/// Subscription handle for session-change events.
///
/// Dropping the handle unregisters the subscription.
pub struct SessionEvents {
    rx: broadcast::Receiver<SessionEvent>,
}

impl SessionEvents {
    /// Wait for the next event. Returns `None` once the gateway is gone.
    /// A subscriber that falls behind skips to the oldest retained event.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll for a pending event.
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

/// Wire types for the provider's auth endpoints.
#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignupRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RecoverRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct PasswordUpdate<'a> {
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Deserialize)]
struct AuthUser {
    id: Uuid,
    email: String,
    name: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error_code: String,
    #[serde(default)]
    message: String,
}

impl SessionGateway {
    /// Create gateway from environment variables.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("TASKDECK_URL").unwrap_or_else(|_| crate::config::DEFAULT_URL.to_string());
        let api_key = std::env::var("TASKDECK_API_KEY").ok();
        Self::new(base_url, api_key)
    }

    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            base_url: base_url.into(),
            api_key,
            client: Client::new(),
            session: Mutex::new(None),
            events,
        }
    }

    /// The cached active session, if one is established.
    pub fn current_session(&self) -> Option<Session> {
        self.session.lock().expect("session lock poisoned").clone()
    }

    /// Subscribe to session-change events.
    pub fn subscribe(&self) -> SessionEvents {
        SessionEvents {
            rx: self.events.subscribe(),
        }
    }

    /// Build a request against the provider, authenticated with the API key.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Map a failed provider response to an [`AuthError`].
    async fn handle_failure(&self, response: reqwest::Response) -> AuthError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if let Ok(err) = serde_json::from_str::<ErrorBody>(&body) {
            match err.error_code.as_str() {
                "invalid_credentials" => AuthError::InvalidCredentials,
                "email_not_confirmed" => AuthError::EmailNotConfirmed,
                _ => AuthError::Rejected(err.message),
            }
        } else if status == StatusCode::UNAUTHORIZED {
            AuthError::InvalidCredentials
        } else {
            AuthError::Rejected(format!("{}: {}", status, body))
        }
    }

    /// Install a new session and notify subscribers.
    fn establish(&self, response: AuthResponse) -> Session {
        let session = Session {
            user_id: response.user.id,
            name: response.user.name,
            email: response.user.email,
            access_token: response.access_token,
        };
        *self.session.lock().expect("session lock poisoned") = Some(session.clone());
        let _ = self.events.send(SessionEvent::SignedIn(session.clone()));
        session
    }

    /// Sign in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let response = self
            .request(reqwest::Method::POST, "/auth/login")
            .json(&PasswordGrant { email, password })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.handle_failure(response).await);
        }
        let payload: AuthResponse = response.json().await?;
        tracing::info!(user_id = %payload.user.id, "signed in");
        Ok(self.establish(payload))
    }

    /// Create an account. The display name is stored as user metadata.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let response = self
            .request(reqwest::Method::POST, "/auth/signup")
            .json(&SignupRequest {
                name,
                email,
                password,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.handle_failure(response).await);
        }
        let payload: AuthResponse = response.json().await?;
        tracing::info!(user_id = %payload.user.id, "account created");
        Ok(self.establish(payload))
    }

    /// Sign out and invalidate the cached session.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let session = self.current_session().ok_or(AuthError::SessionRequired)?;
        let response = self
            .client
            .post(format!("{}/auth/logout", self.base_url))
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.handle_failure(response).await);
        }
        *self.session.lock().expect("session lock poisoned") = None;
        let _ = self.events.send(SessionEvent::SignedOut);
        tracing::info!("signed out");
        Ok(())
    }

    /// Ask the provider to start password recovery for `email`.
    /// No session change; the provider mails a reset link.
    pub async fn reset_password_request(&self, email: &str) -> Result<(), AuthError> {
        let response = self
            .request(reqwest::Method::POST, "/auth/recover")
            .json(&RecoverRequest { email })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.handle_failure(response).await);
        }
        Ok(())
    }

    /// Set a new password for the signed-in user.
    pub async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        let session = self.current_session().ok_or(AuthError::SessionRequired)?;
        let response = self
            .client
            .put(format!("{}/auth/password", self.base_url))
            .bearer_auth(&session.access_token)
            .json(&PasswordUpdate {
                password: new_password,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.handle_failure(response).await);
        }
        Ok(())
    }
}
