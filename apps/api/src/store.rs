//! Persistence primitives shared by the application, profile and analysis stores.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Upper bound on any single store round-trip.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store call timed out after {}s", STORE_TIMEOUT.as_secs())]
    Timeout,

    /// Injected by the in-memory stores to simulate an outage.
    #[cfg(test)]
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Runs a sqlx future under `STORE_TIMEOUT`.
pub async fn bounded<T, F>(fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(STORE_TIMEOUT, fut).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout),
    }
}
