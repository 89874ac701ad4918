//! Diesel row models and changesets for phase and task persistence.

use super::schema::{phases, tasks};
use crate::domain::{
    PersistedPhaseData, PersistedTaskData, Phase, PhaseId, PhasePatch, Task, TaskId, TaskPatch,
    TaskSummary,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Query result row for phase records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = phases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PhaseRow {
    /// Phase identifier.
    pub id: Uuid,
    /// Unique phase name.
    pub name: String,
    /// Completion flag.
    pub done: bool,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_on: DateTime<Utc>,
}

/// Insert model for phase records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = phases)]
pub struct NewPhaseRow {
    /// Phase identifier.
    pub id: Uuid,
    /// Unique phase name.
    pub name: String,
    /// Completion flag.
    pub done: bool,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_on: DateTime<Utc>,
}

/// Partial-update changeset for phase records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = phases)]
pub struct PhaseChangeset {
    /// Replacement name, when present.
    pub name: Option<String>,
    /// Replacement completion flag, when present.
    pub done: Option<bool>,
    /// Mutation timestamp to record.
    pub updated_on: DateTime<Utc>,
}

impl From<&Phase> for NewPhaseRow {
    fn from(phase: &Phase) -> Self {
        Self {
            id: phase.id().into_inner(),
            name: phase.name().to_owned(),
            done: phase.is_done(),
            created_on: phase.created_on(),
            updated_on: phase.updated_on(),
        }
    }
}

impl From<PhaseRow> for Phase {
    fn from(row: PhaseRow) -> Self {
        Self::from_persisted(PersistedPhaseData {
            id: PhaseId::from_uuid(row.id),
            name: row.name,
            done: row.done,
            created_on: row.created_on,
            updated_on: row.updated_on,
        })
    }
}

impl From<&PhasePatch> for PhaseChangeset {
    fn from(patch: &PhasePatch) -> Self {
        Self {
            name: patch.name.clone(),
            done: patch.done,
            updated_on: patch.updated_on,
        }
    }
}

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Owning phase.
    pub phase_id: Uuid,
    /// Task name.
    pub name: String,
    /// Completion flag.
    pub done: bool,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_on: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Owning phase.
    pub phase_id: Uuid,
    /// Task name.
    pub name: String,
    /// Completion flag.
    pub done: bool,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_on: DateTime<Utc>,
}

/// Partial-update changeset for task records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskChangeset {
    /// Replacement name, when present.
    pub name: Option<String>,
    /// Replacement completion flag, when present.
    pub done: Option<bool>,
    /// Mutation timestamp to record.
    pub updated_on: DateTime<Utc>,
}

impl From<&Task> for NewTaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id().into_inner(),
            phase_id: task.phase_id().into_inner(),
            name: task.name().to_owned(),
            done: task.is_done(),
            created_on: task.created_on(),
            updated_on: task.updated_on(),
        }
    }
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self::from_persisted(PersistedTaskData {
            id: TaskId::from_uuid(row.id),
            phase_id: PhaseId::from_uuid(row.phase_id),
            name: row.name,
            done: row.done,
            created_on: row.created_on,
            updated_on: row.updated_on,
        })
    }
}

impl From<TaskRow> for TaskSummary {
    fn from(row: TaskRow) -> Self {
        Self {
            id: TaskId::from_uuid(row.id),
            name: row.name,
            done: row.done,
            created_on: row.created_on,
            updated_on: row.updated_on,
        }
    }
}

impl From<&TaskPatch> for TaskChangeset {
    fn from(patch: &TaskPatch) -> Self {
        Self {
            name: patch.name.clone(),
            done: patch.done,
            updated_on: patch.updated_on,
        }
    }
}
