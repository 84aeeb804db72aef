use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub owner_id: String,
    pub job_description: String,
    pub overall_score: i16,
    pub analysis: Value,
    pub created_at: DateTime<Utc>,
}
