//! Closed error taxonomy shared by repositories and services.
//!
//! Business-rule outcomes are values, never panics: every fallible
//! operation returns [`ApiResult`], and repository implementations
//! translate raw persistence failures into [`ApiError`] before they reach
//! a service.

use thiserror::Error;

/// Result alias used across ports and services.
pub type ApiResult<T> = Result<T, ApiError>;

/// Closed set of failure kinds surfaced to the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Caller-supplied data is semantically invalid (missing referenced
    /// phase, unmet business precondition).
    #[error("bad request: {}", .0.join("; "))]
    BadRequest(Vec<String>),

    /// Uniqueness or state conflict, e.g. a duplicate phase name.
    #[error("conflict: {}", .0.join("; "))]
    Conflict(Vec<String>),

    /// Operation disallowed by an ownership or dependency rule.
    #[error("forbidden")]
    Forbidden,

    /// Referenced entity does not exist.
    #[error("not found")]
    NotFound,

    /// Unclassified failure from the persistence layer.
    #[error("internal error")]
    Internal,
}

impl ApiError {
    /// Bad-request error carrying a single detail message.
    #[must_use]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest(vec![detail.into()])
    }

    /// Conflict error carrying a single detail message.
    #[must_use]
    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict(vec![detail.into()])
    }

    /// HTTP status code a transport adapter should render this kind as.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict(_) => 409,
            Self::Internal => 500,
        }
    }

    /// Detail messages for the kinds that carry them; empty otherwise.
    #[must_use]
    pub fn details(&self) -> &[String] {
        match self {
            Self::BadRequest(details) | Self::Conflict(details) => details,
            Self::Forbidden | Self::NotFound | Self::Internal => &[],
        }
    }
}

/// Validation failures raised while constructing domain values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The phase name is empty after trimming.
    #[error("phase name must not be empty")]
    EmptyPhaseName,

    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::BadRequest(vec![err.to_string()])
    }
}
