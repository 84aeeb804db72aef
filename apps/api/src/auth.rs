//! Authenticated principal extraction.
//!
//! The identity provider runs in front of this service and forwards the
//! verified subject in `x-authenticated-user`. Handlers receive the subject as
//! an explicit `Principal` and pass it down; nothing below the handler layer
//! looks at request headers.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;

pub const AUTH_HEADER: &str = "x-authenticated-user";

/// The authenticated user on whose behalf a request runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Axum extractor wrapping the request's `Principal`.
pub struct AuthUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let subject = parts
            .headers
            .get(AUTH_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser(Principal::new(subject)))
    }
}
