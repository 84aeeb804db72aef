use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::analyzer::analysis::ResumeAnalysis;
use crate::auth::Principal;
use crate::models::analysis::AnalysisRow;
use crate::store::{bounded, StoreError};

/// How much of the job description a history entry carries.
pub const JD_EXCERPT_CHARS: usize = 160;

/// One row of the analysis history list.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AnalysisSummary {
    pub id: Uuid,
    pub overall_score: i16,
    pub jd_excerpt: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn save(
        &self,
        owner: &Principal,
        job_description: &str,
        analysis: &ResumeAnalysis,
    ) -> Result<AnalysisRow, StoreError>;

    /// Newest first.
    async fn history(&self, owner: &Principal) -> Result<Vec<AnalysisSummary>, StoreError>;

    async fn get(&self, owner: &Principal, id: Uuid) -> Result<Option<AnalysisRow>, StoreError>;
}

pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn save(
        &self,
        owner: &Principal,
        job_description: &str,
        analysis: &ResumeAnalysis,
    ) -> Result<AnalysisRow, StoreError> {
        bounded(
            sqlx::query_as::<_, AnalysisRow>(
                r#"
                INSERT INTO resume_analyses (id, owner_id, job_description, overall_score, analysis)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&owner.user_id)
            .bind(job_description)
            .bind(i16::from(analysis.overall_score))
            .bind(sqlx::types::Json(analysis))
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn history(&self, owner: &Principal) -> Result<Vec<AnalysisSummary>, StoreError> {
        bounded(
            sqlx::query_as::<_, AnalysisSummary>(
                r#"
                SELECT id, overall_score, LEFT(job_description, $2) AS jd_excerpt, created_at
                FROM resume_analyses
                WHERE owner_id = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(&owner.user_id)
            .bind(JD_EXCERPT_CHARS as i32)
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn get(&self, owner: &Principal, id: Uuid) -> Result<Option<AnalysisRow>, StoreError> {
        bounded(
            sqlx::query_as::<_, AnalysisRow>(
                "SELECT * FROM resume_analyses WHERE id = $1 AND owner_id = $2",
            )
            .bind(id)
            .bind(&owner.user_id)
            .fetch_optional(&self.pool),
        )
        .await
    }
}
