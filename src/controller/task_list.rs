use std::sync::Arc;

use uuid::Uuid;

use super::ControllerError;
use crate::auth::SessionGateway;
use crate::models::{Session, Task};
use crate::store::StoreClient;

/// Load state of the controller as a whole.
///
/// `Uninitialized → Loading → Ready` on a successful load, or `→ LoadError`
/// with the collection left empty. From `Ready`, individual mutations may
/// fail without changing the load state; each reports through its `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loading,
    Ready,
    LoadError,
}

/// Single source of truth for the current user's tasks.
///
/// Owns the in-memory collection, ordered newest-first. All mutations
/// route through here so the local collection and the remote store stay
/// consistent: the store is asked first, and the local entry changes only
/// on confirmation. A failed call leaves the collection in its
/// last-known-good state.
pub struct TaskListController {
    gateway: Arc<SessionGateway>,
    store: StoreClient,
    tasks: Vec<Task>,
    state: LoadState,
}

impl TaskListController {
    pub fn new(gateway: Arc<SessionGateway>, store: StoreClient) -> Self {
        Self {
            gateway,
            store,
            tasks: Vec::new(),
            state: LoadState::Uninitialized,
        }
    }

    /// The local collection, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Task lookup by id in the local collection.
    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn require_session(&self) -> Result<Session, ControllerError> {
        self.gateway
            .current_session()
            .ok_or(ControllerError::AuthRequired)
    }

    /// Fetch the full collection and replace the local one wholesale.
    ///
    /// No incremental merge: the store's newest-first ordering is taken
    /// as-is. On failure the collection is left empty, never partially
    /// populated.
    pub async fn load(&mut self) -> Result<(), ControllerError> {
        let session = self.require_session()?;
        self.state = LoadState::Loading;
        match self.store.list(&session).await {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "task list loaded");
                self.tasks = tasks;
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(err) => {
                self.tasks.clear();
                self.state = LoadState::LoadError;
                Err(err.into())
            }
        }
    }

    /// Toggle a task's completion status.
    ///
    /// The store confirms first; only then do the local entry's status and
    /// `updated_at` change, taken from the server's returned task. On
    /// failure the local collection is untouched. Setting the same status
    /// twice yields the same observable end state.
    pub async fn set_status(&mut self, id: Uuid, done: bool) -> Result<(), ControllerError> {
        let session = self.require_session()?;
        let confirmed = self.store.update_status(&session, id, done).await?;
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.status = confirmed.status;
            task.updated_at = confirmed.updated_at;
        }
        Ok(())
    }

    /// Delete a task remotely, then drop it from the local collection.
    ///
    /// The store is authoritative on existence: an id absent locally is a
    /// local no-op once the remote call returns.
    pub async fn remove(&mut self, id: Uuid) -> Result<(), ControllerError> {
        let session = self.require_session()?;
        self.store.delete(&session, id).await?;
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }

    /// Replace the local entry with a matching id by full value.
    ///
    /// Called after an edit flow already persisted; issues no store call.
    /// An unknown id is a no-op.
    pub fn apply_edit(&mut self, updated: Task) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
            *task = updated;
        }
    }

    /// Prepend a freshly created task.
    ///
    /// Always index 0: the collection is newest-first and the caller's
    /// create just produced the newest task, so no reload is needed.
    pub fn insert(&mut self, new_task: Task) {
        self.tasks.insert(0, new_task);
    }
}
