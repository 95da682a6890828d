//! Controllers: the client-side synchronization model.
//!
//! [`TaskListController`] is the single source of truth for the signed-in
//! user's tasks; [`TaskForm`] holds transient input for one task. Local
//! state changes only after the remote store confirms, so a failed call
//! never leaves anything to roll back.

mod task_form;
mod task_list;

pub use task_form::TaskForm;
pub use task_list::{LoadState, TaskListController};

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the controllers.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Client-side rejection; never reaches the network layer.
    #[error("{0}")]
    Validation(String),

    /// No active session for an operation that requires one.
    #[error("Sign in to manage your tasks")]
    AuthRequired,

    /// A submission for this form is already in flight.
    #[error("Submission already in progress")]
    SubmitInFlight,

    #[error(transparent)]
    Store(#[from] StoreError),
}
