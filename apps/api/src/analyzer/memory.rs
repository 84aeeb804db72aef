//! In-memory `AnalysisStore` for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::analyzer::analysis::{truncate_chars, ResumeAnalysis};
use crate::analyzer::store::{AnalysisStore, AnalysisSummary, JD_EXCERPT_CHARS};
use crate::auth::Principal;
use crate::models::analysis::AnalysisRow;
use crate::store::StoreError;

#[derive(Default)]
pub struct InMemoryAnalysisStore {
    rows: Mutex<Vec<AnalysisRow>>,
}

impl InMemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn save(
        &self,
        owner: &Principal,
        job_description: &str,
        analysis: &ResumeAnalysis,
    ) -> Result<AnalysisRow, StoreError> {
        let row = AnalysisRow {
            id: Uuid::new_v4(),
            owner_id: owner.user_id.clone(),
            job_description: job_description.to_string(),
            overall_score: i16::from(analysis.overall_score),
            analysis: serde_json::to_value(analysis)
                .map_err(|e| StoreError::Unavailable(e.to_string()))?,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn history(&self, owner: &Principal) -> Result<Vec<AnalysisSummary>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.owner_id == owner.user_id)
            .map(|r| AnalysisSummary {
                id: r.id,
                overall_score: r.overall_score,
                jd_excerpt: truncate_chars(&r.job_description, JD_EXCERPT_CHARS).to_string(),
                created_at: r.created_at,
            })
            .collect())
    }

    async fn get(&self, owner: &Principal, id: Uuid) -> Result<Option<AnalysisRow>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && r.owner_id == owner.user_id)
            .cloned())
    }
}
