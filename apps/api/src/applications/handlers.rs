//! Axum route handlers for the Applications API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::applications::models::{ApplicationFilter, DetailsPatch, NewApplication};
use crate::applications::stats::{compute_stats, ApplicationStats};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::application::ApplicationRow;
use crate::state::AppState;

/// POST /api/v1/applications
pub async fn handle_create(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(request): Json<NewApplication>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let request = request.normalize()?;
    let row = state.applications.create(&principal, request).await?;
    info!(application_id = %row.id, owner = %principal.user_id, "application created");
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/applications
pub async fn handle_list(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(filter): Query<ApplicationFilter>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    let rows = state
        .applications
        .list(&principal, &filter.normalize())
        .await?;
    Ok(Json(rows))
}

/// GET /api/v1/applications/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ApplicationStats>, AppError> {
    let rows = state
        .applications
        .list(&principal, &ApplicationFilter::default())
        .await?;
    Ok(Json(compute_stats(&rows)))
}

/// PATCH /api/v1/applications/:id
pub async fn handle_update(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<DetailsPatch>,
) -> Result<Json<ApplicationRow>, AppError> {
    let patch = patch.normalize()?;
    if patch.is_empty() {
        return Err(AppError::Validation("nothing to update".to_string()));
    }
    state
        .applications
        .update_details(&principal, id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.applications.delete(&principal, id).await? {
        return Err(AppError::NotFound(format!("Application {id} not found")));
    }
    info!(application_id = %id, owner = %principal.user_id, "application deleted");
    Ok(StatusCode::NO_CONTENT)
}
