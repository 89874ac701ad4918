//! Repository port for phase persistence and lookup.

use crate::domain::{
    ApiResult, DataWithPages, PageRequest, Phase, PhaseId, PhasePatch, PhaseProjection, PhaseView,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Filters applied to phase listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseFilters {
    /// Exact name match.
    pub name: Option<String>,
    /// Completion-flag match.
    pub done: Option<bool>,
    /// Phases created strictly before this instant.
    pub created_before: Option<DateTime<Utc>>,
    /// Phases created strictly after this instant.
    pub created_after: Option<DateTime<Utc>>,
}

impl PhaseFilters {
    /// Filter matching undone phases created strictly before `instant`.
    ///
    /// This is the existence probe behind the ordering gate: a non-empty
    /// result means an earlier phase is still open.
    #[must_use]
    pub const fn undone_before(instant: DateTime<Utc>) -> Self {
        Self {
            name: None,
            done: Some(false),
            created_before: Some(instant),
            created_after: None,
        }
    }
}

/// Phase persistence contract.
#[async_trait]
pub trait PhaseRepository: Send + Sync {
    /// Stores a new phase.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ApiError::Conflict`] when the name is
    /// already taken.
    async fn insert(&self, phase: &Phase) -> ApiResult<()>;

    /// Applies a partial update to an existing phase.
    ///
    /// Returns `None` when the phase does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ApiError::Conflict`] when a rename
    /// collides with an existing name.
    async fn update(&self, id: PhaseId, patch: &PhasePatch) -> ApiResult<Option<Phase>>;

    /// Finds a phase by id in the requested projection.
    ///
    /// Returns `None` when the phase does not exist.
    async fn find_by_id(
        &self,
        id: PhaseId,
        projection: PhaseProjection,
    ) -> ApiResult<Option<PhaseView>>;

    /// Lists phases matching `filters`, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ApiError::BadRequest`] for unknown sort
    /// keys.
    async fn find_many(
        &self,
        projection: PhaseProjection,
        filters: &PhaseFilters,
        page: &PageRequest,
    ) -> ApiResult<DataWithPages<PhaseView>>;

    /// Deletes a phase, returning the number of rows removed (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::ApiError::Forbidden`] while tasks still
    /// reference the phase.
    async fn delete_by_id(&self, id: PhaseId) -> ApiResult<usize>;
}
