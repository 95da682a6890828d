use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-owned unit of work.
///
/// Tasks are created, edited and deleted through the remote store; the
/// store is authoritative. The `id` and both timestamps are assigned
/// server-side at creation — the client never generates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,
    /// Owning user. Every store call is scoped by this id so a request
    /// for another user's task is rejected rather than acted on.
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the task is checked off.
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// The completion status of a task.
///
/// - `InProgress`: Open, still being worked on
/// - `Done`: Checked off
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Map a checkbox state onto a status.
    pub fn from_done(done: bool) -> Self {
        if done {
            Self::Done
        } else {
            Self::InProgress
        }
    }
}

/// Input for creating a new task. The server assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

/// Input for a full-field task edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

/// Body of a status-only update. Touches status and `updated_at`, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusInput {
    pub status: TaskStatus,
}
