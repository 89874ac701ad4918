//! In-memory task repository.

use super::{InMemoryStore, sorted_refs};
use crate::domain::{
    ApiError, ApiResult, DataWithPages, PageRequest, SortField, Task, TaskId, TaskPatch,
};
use crate::ports::{TaskFilters, TaskRepository};
use async_trait::async_trait;
use std::cmp::Ordering;

/// Task repository backed by a shared [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryTaskRepository {
    store: InMemoryStore,
}

impl InMemoryTaskRepository {
    /// Creates a repository over the given store.
    #[must_use]
    pub const fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

fn matches_filters(task: &Task, filters: &TaskFilters) -> bool {
    filters.name.as_deref().is_none_or(|name| task.name() == name)
        && filters.done.is_none_or(|done| task.is_done() == done)
        && filters
            .phase_id
            .is_none_or(|phase_id| task.phase_id() == phase_id)
}

fn cmp_field(a: &Task, b: &Task, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name().cmp(b.name()),
        SortField::Done => a.is_done().cmp(&b.is_done()),
        SortField::CreatedOn => a.created_on().cmp(&b.created_on()),
        SortField::UpdatedOn => a.updated_on().cmp(&b.updated_on()),
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, task: &Task) -> ApiResult<()> {
        let mut state = self.store.write()?;
        if !state
            .phases
            .iter()
            .any(|phase| phase.id() == task.phase_id())
        {
            return Err(ApiError::bad_request("related phase does not exist"));
        }
        state.tasks.push(task.clone());
        Ok(())
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> ApiResult<Option<Task>> {
        let mut state = self.store.write()?;
        let Some(task) = state.tasks.iter_mut().find(|task| task.id() == id) else {
            return Ok(None);
        };
        task.apply(patch);
        Ok(Some(task.clone()))
    }

    async fn find_by_id(&self, id: TaskId) -> ApiResult<Option<Task>> {
        let state = self.store.read()?;
        Ok(state.tasks.iter().find(|task| task.id() == id).cloned())
    }

    async fn find_many(
        &self,
        filters: &TaskFilters,
        page: &PageRequest,
    ) -> ApiResult<DataWithPages<Task>> {
        let state = self.store.read()?;
        let matched = sorted_refs(
            state
                .tasks
                .iter()
                .filter(|task| matches_filters(task, filters)),
            page,
            cmp_field,
        )?;
        let pages = page.total_pages(matched.len());
        let data = matched
            .into_iter()
            .skip(page.offset())
            .take(page.page_size)
            .cloned()
            .collect();
        Ok(DataWithPages { data, pages })
    }

    async fn delete_by_id(&self, id: TaskId) -> ApiResult<usize> {
        let mut state = self.store.write()?;
        let before = state.tasks.len();
        state.tasks.retain(|task| task.id() != id);
        Ok(before.saturating_sub(state.tasks.len()))
    }
}
