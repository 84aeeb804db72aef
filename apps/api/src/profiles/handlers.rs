//! Axum route handlers for the Profile API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::ProfileRow;
use crate::profiles::images::upload_profile_image;
use crate::profiles::store::ProfileUpsert;
use crate::profiles::validation::{normalize_whatsapp_number, validate_email};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WhatsAppUpdate {
    pub whatsapp_number: String,
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<Json<ProfileRow>, AppError> {
    state
        .profiles
        .get(&principal)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// PUT /api/v1/profile
pub async fn handle_upsert_profile(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(request): Json<ProfileUpsert>,
) -> Result<Json<ProfileRow>, AppError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    let whatsapp_number = match request.whatsapp_number.as_deref().map(str::trim) {
        Some(n) if !n.is_empty() => Some(normalize_whatsapp_number(n)?),
        _ => None,
    };
    let upsert = ProfileUpsert {
        name,
        email: validate_email(&request.email)?,
        whatsapp_number,
        profile_image: request.profile_image,
    };

    let row = state.profiles.upsert(&principal, &upsert).await?;
    Ok(Json(row))
}

/// PATCH /api/v1/profile/whatsapp
pub async fn handle_update_whatsapp(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(request): Json<WhatsAppUpdate>,
) -> Result<Json<ProfileRow>, AppError> {
    let number = normalize_whatsapp_number(&request.whatsapp_number)?;
    state
        .profiles
        .update_whatsapp(&principal, &number)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// POST /api/v1/profile/image
///
/// Multipart with a single `image` file field.
pub async fn handle_upload_image(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ProfileRow>, AppError> {
    if state.profiles.get(&principal).await?.is_none() {
        return Err(AppError::NotFound("Profile not found".to_string()));
    }

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read image: {e}")))?;

        let url = upload_profile_image(
            &state.s3,
            &state.config.s3_endpoint,
            &state.config.s3_bucket,
            &principal.user_id,
            &content_type,
            body,
        )
        .await?;

        return state
            .profiles
            .update_image(&principal, &url)
            .await?
            .map(Json)
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()));
    }

    Err(AppError::Validation("missing 'image' field".to_string()))
}
