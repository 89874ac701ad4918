//! Phase lifecycle workflow.

use crate::domain::{
    ApiError, ApiResult, DataWithPages, DomainError, PageRequest, Phase, PhaseId, PhasePatch,
    PhaseProjection, PhaseView, PhaseWithTasks,
};
use crate::ports::{PhaseFilters, PhaseRepository};
use mockable::Clock;
use std::sync::Arc;

/// Partial phase edit accepted at the service boundary.
///
/// The completion flag can only be raised: [`PhaseEdit::mark_done`] is the
/// sole way to touch it, so an un-marking edit is unrepresentable.
/// Reopening a phase happens as a side effect of creating a task under it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseEdit {
    name: Option<String>,
    mark_done: bool,
}

impl PhaseEdit {
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
            Some(name) if name.trim().is_empty() => Err(DomainError::EmptyPhaseName),
            _ => Ok(()),
        }
    }

    fn into_patch(self, updated_on: chrono::DateTime<chrono::Utc>) -> PhasePatch {
        PhasePatch {
            name: self.name,
            done: self.mark_done.then_some(true),
            updated_on,
        }
    }
}

/// Phase lifecycle orchestration service.
#[derive(Clone)]
pub struct PhaseService<R, C>
where
    R: PhaseRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    default_projection: PhaseProjection,
}

impl<R, C> PhaseService<R, C>
where
    R: PhaseRepository,
    C: Clock + Send + Sync,
{
    /// Creates a phase service defaulting to the raw projection.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            default_projection: PhaseProjection::Raw,
        }
    }

    /// Creates a new open phase.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] for a blank name and
    /// [`ApiError::Conflict`] when the name is already taken.
    pub async fn create_phase(&self, name: &str) -> ApiResult<Phase> {
        let phase = Phase::new(name, self.clock.as_ref())?;
        self.repository.insert(&phase).await?;
        Ok(phase)
    }

    /// Applies a partial edit to a phase.
    ///
    /// A plain rename goes straight to the repository. When the edit
    /// requests the done transition, the gate is verified first — every
    /// task done, then every earlier-created phase done — and nothing is
    /// written unless both checks pass.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id and
    /// [`ApiError::BadRequest`] when a gate check fails.
    pub async fn edit_phase(&self, id: PhaseId, edit: PhaseEdit) -> ApiResult<Phase> {
        edit.validate()?;
        if edit.marks_done() {
            self.verify_done_gate(id).await?;
        }
        let patch = edit.into_patch(self.clock.utc());
        self.repository
            .update(id, &patch)
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// Lists phases, defaulting the projection when unspecified.
    ///
    /// # Errors
    ///
    /// Propagates repository failures unchanged.
    pub async fn get_phases(
        &self,
        projection: Option<PhaseProjection>,
        filters: &PhaseFilters,
        page: &PageRequest,
    ) -> ApiResult<DataWithPages<PhaseView>> {
        self.repository
            .find_many(projection.unwrap_or(self.default_projection), filters, page)
            .await
    }

    /// Fetches a phase by id, defaulting the projection when unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id.
    pub async fn get_phase_by_id(
        &self,
        id: PhaseId,
        projection: Option<PhaseProjection>,
    ) -> ApiResult<PhaseView> {
        self.repository
            .find_by_id(id, projection.unwrap_or(self.default_projection))
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// Deletes a phase, returning the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] while the phase still owns tasks.
    pub async fn delete_phase_by_id(&self, id: PhaseId) -> ApiResult<usize> {
        self.repository.delete_by_id(id).await
    }

    /// Verifies the done-transition gate without writing anything.
    ///
    /// Check order matters: task completeness before phase ordering.
    async fn verify_done_gate(&self, id: PhaseId) -> ApiResult<()> {
        let detail = self.fetch_with_tasks(id).await?;
        if !detail.all_tasks_done() {
            return Err(ApiError::bad_request("all tasks must be done"));
        }
        let earlier = PhaseFilters::undone_before(detail.phase().created_on());
        let undone = self
            .repository
            .find_many(PhaseProjection::Raw, &earlier, &PageRequest::single())
            .await?;
        if undone.data.is_empty() {
            Ok(())
        } else {
            Err(ApiError::bad_request("previous phases must be done"))
        }
    }

    async fn fetch_with_tasks(&self, id: PhaseId) -> ApiResult<PhaseWithTasks> {
        self.repository
            .find_by_id(id, PhaseProjection::WithTasks)
            .await?
            .ok_or(ApiError::NotFound)?
            .into_with_tasks()
            .ok_or_else(|| {
                tracing::warn!(phase_id = %id, "repository ignored the with-tasks projection");
                ApiError::Internal
            })
    }
}
