//! Shared fixtures and builders for unit tests.

use crate::adapters::memory::{InMemoryPhaseRepository, InMemoryStore, InMemoryTaskRepository};
use crate::domain::{PersistedPhaseData, PersistedTaskData, Phase, PhaseId, Task, TaskId};
use crate::services::{PhaseService, TaskService};
use chrono::{DateTime, Duration, Utc};
use mockable::DefaultClock;
use rstest::fixture;
use std::sync::Arc;

/// Phase service wired to the in-memory adapter.
pub type TestPhaseService = PhaseService<InMemoryPhaseRepository, DefaultClock>;

/// Task service wired to the in-memory adapters.
pub type TestTaskService =
    TaskService<InMemoryTaskRepository, InMemoryPhaseRepository, DefaultClock>;

/// Full in-memory wiring: shared store, both repositories, both services.
pub struct Harness {
    /// Phase repository, for seeding and direct assertions.
    pub phases: Arc<InMemoryPhaseRepository>,
    /// Task repository, for seeding and direct assertions.
    pub tasks: Arc<InMemoryTaskRepository>,
    /// Phase workflow under test.
    pub phase_service: TestPhaseService,
    /// Task workflow under test.
    pub task_service: TestTaskService,
}

/// Builds a fresh harness around an empty store.
#[fixture]
pub fn harness() -> Harness {
    let store = InMemoryStore::new();
    let phases = Arc::new(InMemoryPhaseRepository::new(store.clone()));
    let tasks = Arc::new(InMemoryTaskRepository::new(store));
    let clock = Arc::new(DefaultClock);
    Harness {
        phase_service: PhaseService::new(Arc::clone(&phases), Arc::clone(&clock)),
        task_service: TaskService::new(Arc::clone(&tasks), Arc::clone(&phases), clock),
        phases,
        tasks,
    }
}

/// Fixed base instant for deterministic timestamps.
pub fn base_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("valid epoch second")
}

/// [`base_time`] shifted by `offset_secs`.
pub fn at(offset_secs: i64) -> DateTime<Utc> {
    base_time() + Duration::seconds(offset_secs)
}

/// Phase record with explicit state, for seeding repositories.
pub fn phase_record(name: &str, done: bool, created_on: DateTime<Utc>) -> Phase {
    Phase::from_persisted(PersistedPhaseData {
        id: PhaseId::new(),
        name: name.to_owned(),
        done,
        created_on,
        updated_on: created_on,
    })
}

/// Task record with explicit state, for seeding repositories.
pub fn task_record(phase_id: PhaseId, name: &str, done: bool, created_on: DateTime<Utc>) -> Task {
    Task::from_persisted(PersistedTaskData {
        id: TaskId::new(),
        phase_id,
        name: name.to_owned(),
        done,
        created_on,
        updated_on: created_on,
    })
}
