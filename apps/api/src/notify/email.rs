use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::EmailConfig;
use crate::notify::{error_body, EmailSender, NotifyError, CHANNEL_TIMEOUT};

/// Display name on every outgoing reminder.
const SENDER_NAME: &str = "Placement-Alarm";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: String,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Transactional email over an HTTP API (`POST {api_url}` with a bearer key).
#[derive(Clone)]
pub struct HttpEmailSender {
    client: Client,
    config: EmailConfig,
}

impl HttpEmailSender {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(CHANNEL_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            config,
        }
    }
}

fn sender_address(from: &str) -> String {
    format!("\"{SENDER_NAME}\" <{from}>")
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), NotifyError> {
        let body = SendEmailRequest {
            from: sender_address(&self.config.from),
            to: [to],
            subject,
            html,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message: error_body(response).await,
            });
        }
        debug!("email accepted by provider ({status})");
        Ok(())
    }
}
