//! In-memory repositories for tests and local development.
//!
//! Both repositories share one [`InMemoryStore`] so the phase adapter can
//! build task projections and enforce the delete guard, mirroring the
//! production schema where both tables live in one database.

mod phases;
mod tasks;

pub use phases::InMemoryPhaseRepository;
pub use tasks::InMemoryTaskRepository;

use crate::domain::{ApiError, ApiResult, PageRequest, Phase, SortDir, SortField, Task};
use std::cmp::Ordering;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe shared state backing the in-memory repositories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    phases: Vec<Phase>,
    tasks: Vec<Task>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ApiResult<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|err| poisoned(&err))
    }

    fn write(&self) -> ApiResult<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|err| poisoned(&err))
    }
}

fn poisoned(err: &dyn fmt::Display) -> ApiError {
    tracing::warn!(error = %err, "in-memory store lock poisoned");
    ApiError::Internal
}

/// Collects, filters, and sorts references according to the page request.
///
/// Without sort keys the stable insertion order is preserved.
fn sorted_refs<'a, T>(
    items: impl Iterator<Item = &'a T>,
    page: &PageRequest,
    cmp: fn(&T, &T, SortField) -> Ordering,
) -> ApiResult<Vec<&'a T>> {
    let fields = page.sort_fields()?;
    let mut refs: Vec<&T> = items.collect();
    if fields.is_empty() {
        return Ok(refs);
    }
    let descending = matches!(page.sort_direction(), SortDir::Desc);
    refs.sort_by(|a, b| {
        let ordering = fields
            .iter()
            .map(|field| cmp(a, b, *field))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal);
        if descending { ordering.reverse() } else { ordering }
    });
    Ok(refs)
}
