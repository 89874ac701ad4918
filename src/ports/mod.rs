//! Port contracts for phase and task persistence.
//!
//! Ports define infrastructure-agnostic interfaces consumed by the
//! workflow services; adapters supply the implementations.

pub mod phases;
pub mod tasks;

pub use phases::{PhaseFilters, PhaseRepository};
pub use tasks::{TaskFilters, TaskRepository};
