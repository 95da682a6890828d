use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated identity's active login context.
///
/// Established by the auth provider on login or signup, invalidated on
/// logout or token expiry. The gateway owns the active session; every
/// other component observes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: Uuid,
    /// Display name from signup metadata, when the user provided one.
    pub name: Option<String>,
    pub email: String,
    /// Bearer token the store client attaches to every request.
    pub access_token: String,
}

impl Session {
    /// Name to show in the UI: metadata name, else the email local-part.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.email.split('@').next().unwrap_or("User"),
        }
    }
}

/// A change in the active session, delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
}
