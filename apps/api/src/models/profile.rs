use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub whatsapp_number: Option<String>,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a reminder for a user can be delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactProfile {
    pub email: Option<String>,
    pub whatsapp_number: Option<String>,
}

impl ContactProfile {
    pub fn has_any_channel(&self) -> bool {
        self.email.is_some() || self.whatsapp_number.is_some()
    }
}

impl From<ProfileRow> for ContactProfile {
    fn from(row: ProfileRow) -> Self {
        fn present(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        ContactProfile {
            email: present(row.email),
            whatsapp_number: present(row.whatsapp_number),
        }
    }
}
