//! `PostgreSQL` repositories backed by Diesel and an r2d2 connection pool.
//!
//! Queries run on the blocking thread pool via `spawn_blocking`; raw
//! database failures never escape — they are translated into the closed
//! [`ApiError`](crate::domain::ApiError) taxonomy at this boundary, with
//! unrecognized failures logged and collapsed into `Internal`.

mod models;
mod phases;
mod schema;
mod tasks;

pub use phases::PostgresPhaseRepository;
pub use tasks::PostgresTaskRepository;

use crate::domain::{ApiError, ApiResult};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use std::fmt;

/// Connection pool shared by the `PostgreSQL` repositories.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns the pool construction error when the database is unreachable.
pub fn build_pool(database_url: &str) -> Result<PgPool, PoolError> {
    Pool::builder().build(ConnectionManager::new(database_url))
}

/// Runs a blocking database closure on the Tokio blocking pool.
async fn run_blocking<F, T>(pool: &PgPool, f: F) -> ApiResult<T>
where
    F: FnOnce(&mut PgConnection) -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(|err| unclassified(&err))?;
        f(&mut connection)
    })
    .await
    .map_err(|err| unclassified(&err))?
}

/// Fallback translation for failures outside the known taxonomy.
fn unclassified(err: &dyn fmt::Display) -> ApiError {
    tracing::warn!(error = %err, "unclassified persistence failure");
    ApiError::Internal
}

/// Clamping conversion for Diesel's signed offsets and limits.
fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Row counts reported by the database are never negative.
fn to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or_default()
}
