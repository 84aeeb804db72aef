use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::errors::AppError;
use crate::reminders::scheduler::ReminderError;
use crate::state::AppState;

impl From<ReminderError> for AppError {
    fn from(e: ReminderError) -> Self {
        match e {
            ReminderError::Query(store) => AppError::Store(store),
        }
    }
}

/// GET /api/cron/send-reminders
///
/// Never cached. When `CRON_SECRET` is configured the caller must send
/// `Authorization: Bearer <secret>`.
pub async fn handle_send_reminders(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut response = match authorize(state.config.reminders.cron_secret.as_deref(), &headers) {
        Err(e) => e.into_response(),
        Ok(()) => match state.reminders.run_guarded(Utc::now()).await {
            Ok(summary) => Json(summary).into_response(),
            Err(e) => AppError::from(e).into_response(),
        },
    };
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn authorize(secret: Option<&str>, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(secret) = secret else {
        return Ok(());
    };
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);
    match presented {
        Some(token) if token == secret => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}
