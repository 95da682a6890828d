use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use uuid::Uuid;

use super::ControllerError;
use crate::auth::SessionGateway;
use crate::models::{CreateTaskInput, Task, TaskStatus, UpdateTaskInput};
use crate::store::StoreClient;

/// Transient editable state for one task, new or existing.
///
/// The `submitting` flag is a compare-and-swap guard: while one submission
/// is in flight, further attempts are rejected without touching the
/// network, so a double-click cannot create duplicate tasks. The flag is
/// released on every exit path.
pub struct TaskForm {
    fields: Mutex<Fields>,
    submitting: AtomicBool,
}

#[derive(Clone)]
struct Fields {
    title: String,
    description: String,
    status: TaskStatus,
}

/// Releases the submitting flag when the submission ends, however it ends.
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TaskForm {
    /// Empty form for creating a task. New tasks start `InProgress`.
    pub fn new() -> Self {
        Self {
            fields: Mutex::new(Fields {
                title: String::new(),
                description: String::new(),
                status: TaskStatus::InProgress,
            }),
            submitting: AtomicBool::new(false),
        }
    }

    /// Form prefilled from an existing task, for editing.
    pub fn for_task(task: &Task) -> Self {
        Self {
            fields: Mutex::new(Fields {
                title: task.title.clone(),
                description: task.description.clone().unwrap_or_default(),
                status: task.status,
            }),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.lock().title = title.into();
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.lock().description = description.into();
    }

    pub fn set_status(&self, status: TaskStatus) {
        self.lock().status = status;
    }

    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    pub fn description(&self) -> String {
        self.lock().description.clone()
    }

    pub fn status(&self) -> TaskStatus {
        self.lock().status
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Fields> {
        self.fields.lock().expect("form lock poisoned")
    }

    /// Reject a title that is empty after trimming. Runs before any
    /// network call and blocks submission.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.lock().title.trim().is_empty() {
            return Err(ControllerError::Validation("title required".to_string()));
        }
        Ok(())
    }

    fn begin_submit(&self) -> Result<SubmitGuard<'_>, ControllerError> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ControllerError::SubmitInFlight);
        }
        Ok(SubmitGuard(&self.submitting))
    }

    /// Snapshot of the fields with the title trimmed and an empty
    /// description mapped to `None`.
    fn snapshot(&self) -> Fields {
        let mut fields = self.lock().clone();
        fields.title = fields.title.trim().to_string();
        fields
    }

    fn description_value(description: String) -> Option<String> {
        if description.trim().is_empty() {
            None
        } else {
            Some(description)
        }
    }

    /// Create a new task from the form.
    ///
    /// Returns the server-created task for the caller to feed to
    /// [`TaskListController::insert`](super::TaskListController::insert).
    /// On success the transient fields reset for the next entry.
    pub async fn submit_create(
        &self,
        gateway: &SessionGateway,
        store: &StoreClient,
    ) -> Result<Task, ControllerError> {
        self.validate()?;
        let _guard = self.begin_submit()?;
        let session = gateway
            .current_session()
            .ok_or(ControllerError::AuthRequired)?;

        let fields = self.snapshot();
        let input = CreateTaskInput {
            title: fields.title,
            description: Self::description_value(fields.description),
            status: TaskStatus::InProgress,
        };
        let task = store.create(&session, &input).await?;

        let mut locked = self.lock();
        locked.title.clear();
        locked.description.clear();
        locked.status = TaskStatus::InProgress;
        Ok(task)
    }

    /// Persist a full-field edit of the task with id `id`.
    ///
    /// Returns the server-confirmed task for the caller to feed to
    /// [`TaskListController::apply_edit`](super::TaskListController::apply_edit).
    /// The fields are kept as-is; an edit form closes rather than resets.
    pub async fn submit_edit(
        &self,
        gateway: &SessionGateway,
        store: &StoreClient,
        id: Uuid,
    ) -> Result<Task, ControllerError> {
        self.validate()?;
        let _guard = self.begin_submit()?;
        let session = gateway
            .current_session()
            .ok_or(ControllerError::AuthRequired)?;

        let fields = self.snapshot();
        let input = UpdateTaskInput {
            title: fields.title,
            description: Self::description_value(fields.description),
            status: fields.status,
        };
        let task = store.update(&session, id, &input).await?;
        Ok(task)
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}
