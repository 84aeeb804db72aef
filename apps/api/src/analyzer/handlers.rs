//! Axum route handlers for the Analyzer API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analyzer::analysis::{analyze_resume, ResumeAnalysis, Suggestion};
use crate::analyzer::extract::extract_resume_text;
use crate::analyzer::improve::improve_resume;
use crate::analyzer::store::AnalysisSummary;
use crate::auth::{AuthUser, Principal};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub id: Uuid,
    pub analysis: ResumeAnalysis,
}

#[derive(Debug, Serialize)]
pub struct AnalysisDetailResponse {
    pub id: Uuid,
    pub job_description: String,
    pub created_at: DateTime<Utc>,
    pub analysis: ResumeAnalysis,
}

#[derive(Debug, Deserialize)]
pub struct ImproveRequest {
    pub resume_text: String,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Serialize)]
pub struct ImproveResponse {
    pub resume_text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyses
pub async fn handle_analyze(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(request): Json<AnalyzeRequest>,
) -> Result<(StatusCode, Json<AnalyzeResponse>), AppError> {
    run_analysis(&state, &principal, &request.resume_text, &request.job_description).await
}

/// POST /api/v1/analyses/upload
///
/// Multipart with a `resume` PDF file and a `job_description` text field.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AnalyzeResponse>), AppError> {
    let mut resume_text = None;
    let mut job_description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("resume") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let body = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read resume: {e}")))?;
                resume_text = Some(extract_resume_text(&content_type, body).await?);
            }
            Some("job_description") => {
                job_description = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("could not read job_description: {e}"))
                })?);
            }
            _ => continue,
        }
    }

    let resume_text =
        resume_text.ok_or_else(|| AppError::Validation("missing 'resume' file".to_string()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::Validation("missing 'job_description' field".to_string()))?;

    run_analysis(&state, &principal, &resume_text, &job_description).await
}

async fn run_analysis(
    state: &AppState,
    principal: &Principal,
    resume_text: &str,
    job_description: &str,
) -> Result<(StatusCode, Json<AnalyzeResponse>), AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    if job_description.trim().is_empty() {
        return Err(AppError::Validation("job_description cannot be empty".to_string()));
    }

    let analysis = analyze_resume(&state.llm, resume_text, job_description).await?;
    let row = state
        .analyses
        .save(principal, job_description.trim(), &analysis)
        .await?;

    info!(
        analysis_id = %row.id,
        owner = %principal.user_id,
        score = analysis.overall_score,
        "resume analysis stored"
    );
    Ok((
        StatusCode::CREATED,
        Json(AnalyzeResponse {
            id: row.id,
            analysis,
        }),
    ))
}

/// GET /api/v1/analyses
pub async fn handle_history(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<Vec<AnalysisSummary>>, AppError> {
    Ok(Json(state.analyses.history(&principal).await?))
}

/// GET /api/v1/analyses/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisDetailResponse>, AppError> {
    let row = state
        .analyses
        .get(&principal, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))?;

    // Rows are only written after validation, so a decode failure means corruption.
    let analysis: ResumeAnalysis = serde_json::from_value(row.analysis)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("stored analysis {id} is corrupt: {e}")))?;

    Ok(Json(AnalysisDetailResponse {
        id: row.id,
        job_description: row.job_description,
        created_at: row.created_at,
        analysis,
    }))
}

/// POST /api/v1/analyses/improve
pub async fn handle_improve(
    State(state): State<AppState>,
    AuthUser(_principal): AuthUser,
    Json(request): Json<ImproveRequest>,
) -> Result<Json<ImproveResponse>, AppError> {
    let resume_text = improve_resume(&state.llm, &request.resume_text, &request.suggestions).await?;
    Ok(Json(ImproveResponse { resume_text }))
}
