//! In-memory phase repository.

use super::{InMemoryStore, StoreState, sorted_refs};
use crate::domain::{
    ApiError, ApiResult, DataWithPages, PageRequest, Phase, PhaseId, PhasePatch, PhaseProjection,
    PhaseView, PhaseWithTasks, SortField, TaskSummary,
};
use crate::ports::{PhaseFilters, PhaseRepository};
use async_trait::async_trait;
use std::cmp::Ordering;

/// Phase repository backed by a shared [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryPhaseRepository {
    store: InMemoryStore,
}

impl InMemoryPhaseRepository {
    /// Creates a repository over the given store.
    #[must_use]
    pub const fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

fn matches_filters(phase: &Phase, filters: &PhaseFilters) -> bool {
    filters
        .name
        .as_deref()
        .is_none_or(|name| phase.name() == name)
        && filters.done.is_none_or(|done| phase.is_done() == done)
        && filters
            .created_before
            .is_none_or(|before| phase.created_on() < before)
        && filters
            .created_after
            .is_none_or(|after| phase.created_on() > after)
}

fn cmp_field(a: &Phase, b: &Phase, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name().cmp(b.name()),
        SortField::Done => a.is_done().cmp(&b.is_done()),
        SortField::CreatedOn => a.created_on().cmp(&b.created_on()),
        SortField::UpdatedOn => a.updated_on().cmp(&b.updated_on()),
    }
}

fn project(state: &StoreState, phase: &Phase, projection: PhaseProjection) -> PhaseView {
    match projection {
        PhaseProjection::Raw => PhaseView::Raw(phase.clone()),
        PhaseProjection::WithTasks => {
            let tasks = state
                .tasks
                .iter()
                .filter(|task| task.phase_id() == phase.id())
                .map(TaskSummary::from)
                .collect();
            PhaseView::WithTasks(PhaseWithTasks::new(phase.clone(), tasks))
        }
    }
}

#[async_trait]
impl PhaseRepository for InMemoryPhaseRepository {
    async fn insert(&self, phase: &Phase) -> ApiResult<()> {
        let mut state = self.store.write()?;
        if state
            .phases
            .iter()
            .any(|existing| existing.name() == phase.name())
        {
            return Err(ApiError::conflict(format!(
                "phase {} already exists",
                phase.name()
            )));
        }
        state.phases.push(phase.clone());
        Ok(())
    }

    async fn update(&self, id: PhaseId, patch: &PhasePatch) -> ApiResult<Option<Phase>> {
        let mut state = self.store.write()?;
        if let Some(name) = &patch.name {
            if state
                .phases
                .iter()
                .any(|existing| existing.id() != id && existing.name() == name)
            {
                return Err(ApiError::conflict(format!("phase {name} already exists")));
            }
        }
        let Some(phase) = state.phases.iter_mut().find(|phase| phase.id() == id) else {
            return Ok(None);
        };
        phase.apply(patch);
        Ok(Some(phase.clone()))
    }

    async fn find_by_id(
        &self,
        id: PhaseId,
        projection: PhaseProjection,
    ) -> ApiResult<Option<PhaseView>> {
        let state = self.store.read()?;
        Ok(state
            .phases
            .iter()
            .find(|phase| phase.id() == id)
            .map(|phase| project(&state, phase, projection)))
    }

    async fn find_many(
        &self,
        projection: PhaseProjection,
        filters: &PhaseFilters,
        page: &PageRequest,
    ) -> ApiResult<DataWithPages<PhaseView>> {
        let state = self.store.read()?;
        let matched = sorted_refs(
            state
                .phases
                .iter()
                .filter(|phase| matches_filters(phase, filters)),
            page,
            cmp_field,
        )?;
        let pages = page.total_pages(matched.len());
        let data = matched
            .into_iter()
            .skip(page.offset())
            .take(page.page_size)
            .map(|phase| project(&state, phase, projection))
            .collect();
        Ok(DataWithPages { data, pages })
    }

    async fn delete_by_id(&self, id: PhaseId) -> ApiResult<usize> {
        let mut state = self.store.write()?;
        if state.tasks.iter().any(|task| task.phase_id() == id) {
            return Err(ApiError::Forbidden);
        }
        let before = state.phases.len();
        state.phases.retain(|phase| phase.id() != id);
        Ok(before.saturating_sub(state.phases.len()))
    }
}
