use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The only workflow status that participates in deadline reminders.
pub const STATUS_NOT_APPLIED: &str = "Not Applied";

/// Statuses counted as an active interview on the dashboard.
pub const INTERVIEW_STATUSES: [&str; 2] = ["Interview", "Technical round"];
pub const STATUS_OFFER: &str = "Offer";
pub const STATUS_REJECTED: &str = "Rejected";

/// A tracked job application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub role: String,
    pub package: String,
    pub drive_type: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub deadline: Option<DateTime<Utc>>,
    pub link: Option<String>,
    pub status: String,
    pub notes: Option<String>,
    pub status_updated_at: Option<DateTime<Utc>>,
    pub reminders_sent: i32,
    pub last_reminder_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRow {
    pub fn is_not_applied(&self) -> bool {
        self.status == STATUS_NOT_APPLIED
    }
}
