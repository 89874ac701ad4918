//! Task aggregate and its partial-update patch.

use super::{DomainError, PhaseId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A unit of work belonging to exactly one phase.
///
/// The `phase_id` is a weak reference: it is looked up where needed but
/// the task never owns or cascades into its phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    phase_id: PhaseId,
    name: String,
    done: bool,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning-phase reference.
    pub phase_id: PhaseId,
    /// Persisted name.
    pub name: String,
    /// Persisted completion flag.
    pub done: bool,
    /// Persisted creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_on: DateTime<Utc>,
}

impl Task {
    /// Creates a new open task under `phase_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyTaskName`] when the name is blank.
    pub fn new(
        phase_id: PhaseId,
        name: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::EmptyTaskName);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            phase_id,
            name,
            done: false,
            created_on: timestamp,
            updated_on: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            phase_id: data.phase_id,
            name: data.name,
            done: data.done,
            created_on: data.created_on,
            updated_on: data.updated_on,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning-phase reference.
    #[must_use]
    pub const fn phase_id(&self) -> PhaseId {
        self.phase_id
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the completion flag.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_on(&self) -> DateTime<Utc> {
        self.updated_on
    }

    /// Applies a partial edit, refreshing the mutation timestamp.
    ///
    /// Used by repository implementations; the id and `phase_id` are
    /// immutable.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
        self.updated_on = patch.updated_on;
    }
}

/// Partial update applied to a stored task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    /// Replacement name, when present.
    pub name: Option<String>,
    /// Replacement completion flag, when present.
    pub done: Option<bool>,
    /// Mutation timestamp to record.
    pub updated_on: DateTime<Utc>,
}
