use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::WhatsAppConfig;
use crate::notify::{error_body, ChatSender, NotifyError, CHANNEL_TIMEOUT};

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01/Accounts";

#[derive(Debug, Deserialize)]
struct MessageCreated {
    sid: String,
}

/// WhatsApp delivery through the Twilio Messages API.
#[derive(Clone)]
pub struct TwilioWhatsAppSender {
    client: Client,
    config: WhatsAppConfig,
    api_base: String,
}

impl TwilioWhatsAppSender {
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(CHANNEL_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            config,
            api_base: TWILIO_API_BASE.to_string(),
        }
    }

    #[cfg(test)]
    fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/Messages.json", self.api_base, self.config.account_sid)
    }
}

/// Twilio addresses WhatsApp endpoints as `whatsapp:+<number>`.
fn whatsapp_address(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{number}")
    }
}

fn message_form(from: &str, to: &str, body: &str) -> [(&'static str, String); 3] {
    [
        ("From", whatsapp_address(from)),
        ("To", whatsapp_address(to)),
        ("Body", body.to_string()),
    ]
}

#[async_trait]
impl ChatSender for TwilioWhatsAppSender {
    async fn send(&self, to: &str, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&message_form(&self.config.from, to, text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message: error_body(response).await,
            });
        }
        // Twilio already accepted the message; an unreadable reply is not a failure.
        match response.json::<MessageCreated>().await {
            Ok(created) => debug!(message_sid = %created.sid, "WhatsApp message queued"),
            Err(e) => debug!(error = %e, "WhatsApp message accepted with an unreadable reply"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;

    fn config() -> WhatsAppConfig {
        WhatsAppConfig {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            from: "+14155238886".to_string(),
        }
    }

    /// Serves `router` on an ephemeral local port and returns its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_whatsapp_address_prefixes_once() {
        assert_eq!(whatsapp_address("+919876543210"), "whatsapp:+919876543210");
        assert_eq!(
            whatsapp_address("whatsapp:+14155238886"),
            "whatsapp:+14155238886"
        );
    }

    #[test]
    fn test_message_form_fields() {
        let form = message_form("+14155238886", "+919876543210", "hello");
        assert_eq!(form[0], ("From", "whatsapp:+14155238886".to_string()));
        assert_eq!(form[1], ("To", "whatsapp:+919876543210".to_string()));
        assert_eq!(form[2], ("Body", "hello".to_string()));
    }

    #[test]
    fn test_messages_url_uses_account_sid() {
        let sender = TwilioWhatsAppSender::new(config());
        assert_eq!(
            sender.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_send_accepts_created_reply() {
        let base = serve(Router::new().route(
            "/AC123/Messages.json",
            post(|| async { (StatusCode::CREATED, r#"{"sid":"SM1"}"#) }),
        ))
        .await;
        let sender = TwilioWhatsAppSender::new(config()).with_api_base(base);
        assert!(sender.send("+919876543210", "hello").await.is_ok());
    }

    #[tokio::test]
    async fn test_send_tolerates_unreadable_success_body() {
        let base = serve(Router::new().route(
            "/AC123/Messages.json",
            post(|| async { (StatusCode::CREATED, "not json") }),
        ))
        .await;
        let sender = TwilioWhatsAppSender::new(config()).with_api_base(base);
        assert!(sender.send("+919876543210", "hello").await.is_ok());
    }

    #[tokio::test]
    async fn test_send_reports_rejection() {
        let base = serve(Router::new().route(
            "/AC123/Messages.json",
            post(|| async { (StatusCode::BAD_REQUEST, "invalid To number") }),
        ))
        .await;
        let sender = TwilioWhatsAppSender::new(config()).with_api_base(base);
        match sender.send("+919876543210", "hello").await {
            Err(NotifyError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "invalid To number");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }
}
