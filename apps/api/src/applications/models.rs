use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::application::STATUS_NOT_APPLIED;

/// Body of `POST /api/v1/applications`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewApplication {
    pub name: String,
    pub role: String,
    pub package: String,
    pub drive_type: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub deadline: Option<DateTime<Utc>>,
    pub link: Option<String>,
    pub status: Option<String>,
}

impl NewApplication {
    /// Trims every field, rejects blank required fields and defaults the status.
    pub fn normalize(self) -> Result<Self, AppError> {
        let required = |field: &str, value: String| -> Result<String, AppError> {
            let value = value.trim().to_string();
            if value.is_empty() {
                return Err(AppError::Validation(format!("{field} cannot be empty")));
            }
            Ok(value)
        };

        Ok(NewApplication {
            name: required("name", self.name)?,
            role: required("role", self.role)?,
            package: required("package", self.package)?,
            drive_type: required("drive_type", self.drive_type)?,
            kind: required("type", self.kind)?,
            deadline: self.deadline,
            link: non_blank(self.link),
            status: Some(non_blank(self.status).unwrap_or_else(|| STATUS_NOT_APPLIED.to_string())),
        })
    }

    pub fn status_or_default(&self) -> &str {
        self.status.as_deref().unwrap_or(STATUS_NOT_APPLIED)
    }
}

/// Body of `PATCH /api/v1/applications/:id`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailsPatch {
    pub status: Option<String>,
    pub status_updated_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

impl DetailsPatch {
    pub fn normalize(self) -> Result<Self, AppError> {
        let status = match self.status {
            Some(s) if s.trim().is_empty() => {
                return Err(AppError::Validation("status cannot be blank".to_string()))
            }
            Some(s) => Some(s.trim().to_string()),
            None => None,
        };
        Ok(DetailsPatch { status, ..self })
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.status_updated_at.is_none()
            && self.notes.is_none()
            && self.deadline.is_none()
    }
}

/// Query string of `GET /api/v1/applications`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationFilter {
    /// Case-insensitive substring over company name and role.
    pub search: Option<String>,
    pub status: Option<String>,
    pub drive_type: Option<String>,
}

impl ApplicationFilter {
    /// Drops blank values and the UI's `"all"` sentinel.
    pub fn normalize(self) -> Self {
        let keep = |v: Option<String>| {
            non_blank(v).filter(|s| !s.eq_ignore_ascii_case("all"))
        };
        ApplicationFilter {
            search: non_blank(self.search),
            status: keep(self.status),
            drive_type: keep(self.drive_type),
        }
    }
}

/// Selection the reminder scheduler asks the store for.
#[derive(Debug, Clone, PartialEq)]
pub struct DueCandidateQuery {
    pub status: &'static str,
    pub deadline_before: DateTime<Utc>,
    pub reminders_sent_less_than: i32,
}

/// Result of a conditional reminder-count increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkOutcome {
    Marked,
    /// The row no longer had the expected count, or was deleted.
    Stale,
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
