//! Workflow services consumed by transport adapters.
//!
//! Services own the business rules that keep phase and task completion
//! state consistent; they talk to persistence exclusively through the
//! repository ports.

mod phases;
mod tasks;

pub use phases::{PhaseEdit, PhaseService};
pub use tasks::{TaskEdit, TaskService};
