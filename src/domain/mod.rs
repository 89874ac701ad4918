//! Domain model for phase and task tracking.
//!
//! All business rules operate on the types in this module; nothing here
//! depends on the persistence or transport layers.

mod error;
mod ids;
mod pagination;
mod phase;
mod task;

pub use error::{ApiError, ApiResult, DomainError};
pub use ids::{PhaseId, TaskId};
pub use pagination::{DataWithPages, PageRequest, SortDir, SortField};
pub use phase::{
    PersistedPhaseData, Phase, PhasePatch, PhaseProjection, PhaseView, PhaseWithTasks, TaskSummary,
};
pub use task::{PersistedTaskData, Task, TaskPatch};
