use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;

use crate::reminders::thresholds::ReminderThresholds;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub gemini_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub reminders: ReminderConfig,
    pub email: Option<EmailConfig>,
    pub whatsapp: Option<WhatsAppConfig>,
}

/// Reminder policy and run limits.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub thresholds: ReminderThresholds,
    /// Timezone deadlines are rendered in inside reminder messages.
    pub display_timezone: Tz,
    /// When set, an in-process job triggers a run on this period.
    pub interval: Option<Duration>,
    pub run_timeout: Duration,
    pub concurrency: usize,
    /// Bearer secret the external cron trigger must present.
    pub cron_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_url: String,
    pub api_key: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            reminders: ReminderConfig::from_env()?,
            email: EmailConfig::from_env(),
            whatsapp: WhatsAppConfig::from_env(),
        })
    }
}

impl ReminderConfig {
    fn from_env() -> Result<Self> {
        let thresholds = optional_env("REMINDER_THRESHOLDS_HOURS")
            .unwrap_or_else(|| "4,3,2,1".to_string())
            .parse::<ReminderThresholds>()
            .context("REMINDER_THRESHOLDS_HOURS must be a decreasing list of positive hours")?;

        let display_timezone = optional_env("REMINDER_TIMEZONE")
            .unwrap_or_else(|| "Asia/Kolkata".to_string())
            .parse::<Tz>()
            .map_err(|e| anyhow!("REMINDER_TIMEZONE is not a known IANA timezone: {e}"))?;

        let interval = optional_env("REMINDER_INTERVAL_SECS")
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("REMINDER_INTERVAL_SECS must be a whole number of seconds")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let run_timeout = optional_env("REMINDER_RUN_TIMEOUT_SECS")
            .unwrap_or_else(|| "240".to_string())
            .parse::<u64>()
            .context("REMINDER_RUN_TIMEOUT_SECS must be a whole number of seconds")?;

        let concurrency = optional_env("REMINDER_CONCURRENCY")
            .unwrap_or_else(|| "8".to_string())
            .parse::<usize>()
            .context("REMINDER_CONCURRENCY must be a positive integer")?
            .max(1);

        Ok(ReminderConfig {
            thresholds,
            display_timezone,
            interval,
            run_timeout: Duration::from_secs(run_timeout),
            concurrency,
            cron_secret: optional_env("CRON_SECRET"),
        })
    }
}

impl EmailConfig {
    /// Email delivery is enabled only when all three variables are present.
    fn from_env() -> Option<Self> {
        Some(EmailConfig {
            api_url: optional_env("EMAIL_API_URL")?,
            api_key: optional_env("EMAIL_API_KEY")?,
            from: optional_env("EMAIL_FROM")?,
        })
    }
}

impl WhatsAppConfig {
    fn from_env() -> Option<Self> {
        Some(WhatsAppConfig {
            account_sid: optional_env("TWILIO_SID")?,
            auth_token: optional_env("TWILIO_TOKEN")?,
            from: optional_env("TWILIO_WHATSAPP_FROM")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an env var, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
