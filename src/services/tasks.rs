//! Task lifecycle workflow and cross-entity state propagation.

use crate::domain::{
    ApiError, ApiResult, DataWithPages, DomainError, PageRequest, Phase, PhaseId, PhasePatch,
    PhaseProjection, Task, TaskId, TaskPatch,
};
use crate::ports::{PhaseFilters, PhaseRepository, TaskFilters, TaskRepository};
use mockable::Clock;
use std::sync::Arc;

/// Partial task edit accepted at the service boundary.
///
/// As with phases, the completion flag can only be raised; there is no
/// un-marking edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    name: Option<String>,
    mark_done: bool,
}

impl TaskEdit {
    /// Creates an empty edit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            mark_done: false,
        }
    }

    /// Sets a replacement name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Requests the done transition.
    #[must_use]
    pub const fn mark_done(mut self) -> Self {
        self.mark_done = true;
        self
    }

    /// True when the edit requests the done transition.
    #[must_use]
    pub const fn marks_done(&self) -> bool {
        self.mark_done
    }

    fn validate(&self) -> Result<(), DomainError> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err(DomainError::EmptyTaskName),
            _ => Ok(()),
        }
    }

    fn into_patch(self, updated_on: chrono::DateTime<chrono::Utc>) -> TaskPatch {
        TaskPatch {
            name: self.name,
            done: self.mark_done.then_some(true),
            updated_on,
        }
    }
}

/// Task lifecycle orchestration service.
///
/// Holds both repositories: task mutations ripple into the owning phase
/// (completion cascade, reopen-on-create) and phase ordering gates task
/// completion.
#[derive(Clone)]
pub struct TaskService<T, P, C>
where
    T: TaskRepository,
    P: PhaseRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    phases: Arc<P>,
    clock: Arc<C>,
}

impl<T, P, C> TaskService<T, P, C>
where
    T: TaskRepository,
    P: PhaseRepository,
    C: Clock + Send + Sync,
{
    /// Creates a task service over both repositories.
    #[must_use]
    pub const fn new(tasks: Arc<T>, phases: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            phases,
            clock,
        }
    }

    /// Creates a new open task under `phase_id`.
    ///
    /// Creating a task under a completed phase reopens the phase before
    /// the task is inserted.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] when the referenced phase does not
    /// exist or the name is blank.
    pub async fn create_task(&self, phase_id: PhaseId, name: &str) -> ApiResult<Task> {
        let related = self
            .phases
            .find_by_id(phase_id, PhaseProjection::Raw)
            .await?
            .ok_or_else(|| ApiError::bad_request("related phase does not exist"))?;
        let task = Task::new(phase_id, name, self.clock.as_ref())?;
        if related.phase().is_done() {
            self.phases
                .update(phase_id, &PhasePatch::reopen(self.clock.utc()))
                .await?;
        }
        self.tasks.insert(&task).await?;
        Ok(task)
    }

    /// Applies a partial edit to a task.
    ///
    /// A plain rename only touches the task. The done transition is
    /// gated on every earlier-created phase being done, checked before
    /// the write; after a successful write, the owning phase is marked
    /// done if no undone sibling remains. The cascade never runs before
    /// or instead of the task write, and its failure does not change the
    /// reported outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id and
    /// [`ApiError::BadRequest`] when the ordering gate fails.
    pub async fn edit_task(&self, id: TaskId, edit: TaskEdit) -> ApiResult<Task> {
        edit.validate()?;
        let current = self
            .tasks
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound)?;
        if !edit.marks_done() {
            let patch = edit.into_patch(self.clock.utc());
            return self
                .tasks
                .update(id, &patch)
                .await?
                .ok_or(ApiError::NotFound);
        }
        let phase_id = current.phase_id();
        self.verify_ordering_gate(phase_id).await?;
        let patch = edit.into_patch(self.clock.utc());
        let updated = self
            .tasks
            .update(id, &patch)
            .await?
            .ok_or(ApiError::NotFound)?;
        self.complete_phase_if_settled(phase_id).await;
        Ok(updated)
    }

    /// Lists tasks matching the filters.
    ///
    /// # Errors
    ///
    /// Propagates repository failures unchanged.
    pub async fn get_tasks(
        &self,
        filters: &TaskFilters,
        page: &PageRequest,
    ) -> ApiResult<DataWithPages<Task>> {
        self.tasks.find_many(filters, page).await
    }

    /// Fetches a task by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    pub async fn get_task_by_id(&self, id: TaskId) -> ApiResult<Task> {
        self.tasks.find_by_id(id).await?.ok_or(ApiError::NotFound)
    }

    /// Deletes a task, returning the number of rows removed.
    ///
    /// # Errors
    ///
    /// Propagates repository failures unchanged.
    pub async fn delete_task_by_id(&self, id: TaskId) -> ApiResult<usize> {
        self.tasks.delete_by_id(id).await
    }

    /// Rejects the done transition while an earlier-created phase is open.
    async fn verify_ordering_gate(&self, phase_id: PhaseId) -> ApiResult<()> {
        let owning = self.owning_phase(phase_id).await?;
        let earlier = PhaseFilters::undone_before(owning.created_on());
        let undone = self
            .phases
            .find_many(PhaseProjection::Raw, &earlier, &PageRequest::single())
            .await?;
        if undone.data.is_empty() {
            Ok(())
        } else {
            Err(ApiError::bad_request("previous phases must be done"))
        }
    }

    async fn owning_phase(&self, phase_id: PhaseId) -> ApiResult<Phase> {
        self.phases
            .find_by_id(phase_id, PhaseProjection::Raw)
            .await?
            .map(crate::domain::PhaseView::into_phase)
            .ok_or_else(|| {
                tracing::warn!(%phase_id, "task references a missing phase");
                ApiError::Internal
            })
    }

    /// Marks the owning phase done when no undone task remains under it.
    ///
    /// Runs strictly after a successful task write; failures here are
    /// logged and swallowed so the task edit outcome stands.
    async fn complete_phase_if_settled(&self, phase_id: PhaseId) {
        let probe = TaskFilters::undone_in(phase_id);
        match self.tasks.find_many(&probe, &PageRequest::single()).await {
            Ok(page) if page.data.is_empty() => {
                if let Err(err) = self
                    .phases
                    .update(phase_id, &PhasePatch::complete(self.clock.utc()))
                    .await
                {
                    tracing::warn!(%phase_id, error = %err, "phase completion cascade failed");
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(%phase_id, error = %err, "undone-task probe failed after task edit");
            }
        }
    }
}
