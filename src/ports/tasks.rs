//! Repository port for task persistence and lookup.

use crate::domain::{ApiResult, DataWithPages, PageRequest, PhaseId, Task, TaskId, TaskPatch};
use async_trait::async_trait;

/// Filters applied to task listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    /// Exact name match.
    pub name: Option<String>,
    /// Completion-flag match.
    pub done: Option<bool>,
    /// Owning-phase match.
    pub phase_id: Option<PhaseId>,
}

impl TaskFilters {
    /// Filter matching undone tasks under `phase_id`.
    ///
    /// This is the existence probe behind the phase-completion cascade: an
    /// empty result means every task of the phase is done.
    #[must_use]
    pub const fn undone_in(phase_id: PhaseId) -> Self {
        Self {
            name: None,
            done: Some(false),
            phase_id: Some(phase_id),
        }
    }
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ApiError::BadRequest`] when the referenced
    /// phase does not exist.
    async fn insert(&self, task: &Task) -> ApiResult<()>;

    /// Applies a partial update to an existing task.
    ///
    /// Returns `None` when the task does not exist.
    async fn update(&self, id: TaskId, patch: &TaskPatch) -> ApiResult<Option<Task>>;

    /// Finds a task by id.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> ApiResult<Option<Task>>;

    /// Lists tasks matching `filters`, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ApiError::BadRequest`] for unknown sort
    /// keys.
    async fn find_many(
        &self,
        filters: &TaskFilters,
        page: &PageRequest,
    ) -> ApiResult<DataWithPages<Task>>;

    /// Deletes a task, returning the number of rows removed (0 or 1).
    async fn delete_by_id(&self, id: TaskId) -> ApiResult<usize>;
}
