//! Gantt: phase and task tracking backend core.
//!
//! This crate implements the state-consistency workflow for a two-level
//! project hierarchy: phases containing tasks, each with a completion
//! flag that must stay mutually consistent. A phase can only be marked
//! done once all of its tasks are done and every earlier phase is done;
//! completing the last task of a phase completes the phase; creating a
//! task under a completed phase reopens it.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business types with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: Concrete port implementations (in-memory, `PostgreSQL`)
//! - **Services**: Workflow orchestration consumed by transport layers
//!
//! Transport (REST/GraphQL) is deliberately out of scope; services return
//! [`domain::ApiResult`] values that a transport adapter maps to status
//! codes via [`domain::ApiError::status_code`].

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
