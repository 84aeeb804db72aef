//! Redis lease that keeps two reminder runs from overlapping.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

const LEASE_KEY: &str = "placement-alarm:reminders:lease";

/// Upper bound on a single Redis round-trip while taking or releasing the lease.
const REDIS_TIMEOUT: Duration = Duration::from_secs(2);

/// Deletes the key only if it still holds our token.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

#[derive(Debug, Error)]
pub enum LeaseError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis did not answer within {}s", REDIS_TIMEOUT.as_secs())]
    Timeout,
}

/// Proof of holding the lease; hand it back to [`RunLock::release`].
#[derive(Debug)]
pub struct LeaseToken(pub(crate) String);

/// Mutual exclusion between reminder runs.
#[async_trait]
pub trait RunLock: Send + Sync {
    /// `Ok(None)` when another run already holds the lock.
    async fn acquire(&self) -> Result<Option<LeaseToken>, LeaseError>;

    /// Best effort; an unreleased lock simply expires.
    async fn release(&self, token: LeaseToken);
}

#[derive(Clone)]
pub struct RunLease {
    client: redis::Client,
    ttl: Duration,
}

impl RunLease {
    /// `ttl` should outlive the longest run so a crashed holder cannot block
    /// the next trigger forever.
    pub fn new(client: redis::Client, ttl: Duration) -> Self {
        Self { client, ttl }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, LeaseError> {
        with_timeout(self.client.get_multiplexed_async_connection()).await
    }
}

#[async_trait]
impl RunLock for RunLease {
    async fn acquire(&self) -> Result<Option<LeaseToken>, LeaseError> {
        let mut conn = self.connection().await?;
        let token = Uuid::new_v4().to_string();
        let reply: Option<String> = with_timeout(
            redis::cmd("SET")
                .arg(LEASE_KEY)
                .arg(&token)
                .arg("NX")
                .arg("PX")
                .arg(self.ttl.as_millis() as u64)
                .query_async(&mut conn),
        )
        .await?;

        Ok(reply.map(|_| {
            debug!(ttl_ms = self.ttl.as_millis() as u64, "reminder lease acquired");
            LeaseToken(token)
        }))
    }

    async fn release(&self, token: LeaseToken) {
        let result = async {
            let mut conn = self.connection().await?;
            let deleted: i32 = with_timeout(
                redis::Script::new(RELEASE_SCRIPT)
                    .key(LEASE_KEY)
                    .arg(&token.0)
                    .invoke_async(&mut conn),
            )
            .await?;
            Ok::<_, LeaseError>(deleted)
        }
        .await;

        match result {
            Ok(0) => warn!("reminder lease expired before release"),
            Ok(_) => debug!("reminder lease released"),
            Err(e) => warn!(error = %e, "failed to release reminder lease"),
        }
    }
}

async fn with_timeout<T, F>(fut: F) -> Result<T, LeaseError>
where
    F: std::future::Future<Output = Result<T, redis::RedisError>>,
{
    match tokio::time::timeout(REDIS_TIMEOUT, fut).await {
        Ok(result) => result.map_err(LeaseError::from),
        Err(_) => Err(LeaseError::Timeout),
    }
}
