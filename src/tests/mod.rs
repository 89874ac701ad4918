//! Unit and service tests for the tracking workflow.

mod domain_tests;
mod support;
mod task_service_tests;
