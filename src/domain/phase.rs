//! Phase aggregate and its projections.

use super::{DomainError, PhaseId, Task, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Shape in which a phase is returned by repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseProjection {
    /// Bare phase fields.
    Raw,
    /// Bare fields plus the phase's tasks.
    WithTasks,
}

/// A named project stage containing zero or more tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    id: PhaseId,
    name: String,
    done: bool,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPhaseData {
    /// Persisted phase identifier.
    pub id: PhaseId,
    /// Persisted name.
    pub name: String,
    /// Persisted completion flag.
    pub done: bool,
    /// Persisted creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_on: DateTime<Utc>,
}

impl Phase {
    /// Creates a new open phase named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyPhaseName`] when the name is blank.
    pub fn new(name: impl Into<String>, clock: &impl Clock) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::EmptyPhaseName);
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: PhaseId::new(),
            name,
            done: false,
            created_on: timestamp,
            updated_on: timestamp,
        })
    }

    /// Reconstructs a phase from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedPhaseData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            done: data.done,
            created_on: data.created_on,
            updated_on: data.updated_on,
        }
    }

    /// Returns the phase identifier.
    #[must_use]
    pub const fn id(&self) -> PhaseId {
        self.id
    }

    /// Returns the phase name.
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
    /// Used by repository implementations; `created_on` and the id are
    /// immutable.
    pub fn apply(&mut self, patch: &PhasePatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(done) = patch.done {
            self.done = done;
        }
        self.updated_on = patch.updated_on;
    }
}

/// Partial update applied to a stored phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhasePatch {
    /// Replacement name, when present.
    pub name: Option<String>,
    /// Replacement completion flag, when present.
    pub done: Option<bool>,
    /// Mutation timestamp to record.
    pub updated_on: DateTime<Utc>,
}

impl PhasePatch {
    /// Patch reopening a completed phase.
    #[must_use]
    pub const fn reopen(updated_on: DateTime<Utc>) -> Self {
        Self {
            name: None,
            done: Some(false),
            updated_on,
        }
    }

    /// Patch marking a phase complete.
    #[must_use]
    pub const fn complete(updated_on: DateTime<Utc>) -> Self {
        Self {
            name: None,
            done: Some(true),
            updated_on,
        }
    }
}

/// Task fields nested under a phase projection.
///
/// The `phase_id` back-reference is omitted: it is redundant inside its
/// owning phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    /// Task identifier.
    pub id: TaskId,
    /// Task name.
    pub name: String,
    /// Completion flag.
    pub done: bool,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Latest mutation timestamp.
    pub updated_on: DateTime<Utc>,
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id(),
            name: task.name().to_owned(),
            done: task.is_done(),
            created_on: task.created_on(),
            updated_on: task.updated_on(),
        }
    }
}

/// Phase projection enriched with its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseWithTasks {
    #[serde(flatten)]
    phase: Phase,
    tasks: Vec<TaskSummary>,
}

impl PhaseWithTasks {
    /// Combines a phase with its task summaries.
    #[must_use]
    pub const fn new(phase: Phase, tasks: Vec<TaskSummary>) -> Self {
        Self { phase, tasks }
    }

    /// Returns the bare phase record.
    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Returns the nested task summaries.
    #[must_use]
    pub fn tasks(&self) -> &[TaskSummary] {
        &self.tasks
    }

    /// True when every task under the phase is done.
    #[must_use]
    pub fn all_tasks_done(&self) -> bool {
        self.tasks.iter().all(|task| task.done)
    }

    /// Consumes the projection, returning the bare phase.
    #[must_use]
    pub fn into_phase(self) -> Phase {
        self.phase
    }
}

/// A phase in one of its two projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PhaseView {
    /// Bare fields only.
    Raw(Phase),
    /// Bare fields plus nested tasks.
    WithTasks(PhaseWithTasks),
}

impl PhaseView {
    /// Returns the bare phase record in either projection.
    #[must_use]
    pub const fn phase(&self) -> &Phase {
        match self {
            Self::Raw(phase) => phase,
            Self::WithTasks(detail) => detail.phase(),
        }
    }

    /// Returns the nested tasks when the projection carries them.
    #[must_use]
    pub fn tasks(&self) -> Option<&[TaskSummary]> {
        match self {
            Self::Raw(_) => None,
            Self::WithTasks(detail) => Some(detail.tasks()),
        }
    }

    /// Consumes the view, returning the bare phase record.
    #[must_use]
    pub fn into_phase(self) -> Phase {
        match self {
            Self::Raw(phase) => phase,
            Self::WithTasks(detail) => detail.into_phase(),
        }
    }

    /// Consumes the view, returning the detail projection when present.
    #[must_use]
    pub fn into_with_tasks(self) -> Option<PhaseWithTasks> {
        match self {
            Self::Raw(_) => None,
            Self::WithTasks(detail) => Some(detail),
        }
    }
}
