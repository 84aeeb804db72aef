//! Outbound notification channels used by reminder delivery.
//!
//! Each channel is a trait so the scheduler can be driven by fakes in tests
//! and so either channel can be left unconfigured in a deployment.

use async_trait::async_trait;
use thiserror::Error;

pub mod email;
#[cfg(test)]
pub mod testing;
pub mod whatsapp;

/// Per-call timeout applied by every HTTP channel client.
pub const CHANNEL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(std::time::Duration),
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), NotifyError>;
}

#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send(&self, to: &str, text: &str) -> Result<(), NotifyError>;
}

/// Reads a provider error body, keeping the log line bounded.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    body.chars().take(500).collect()
}
