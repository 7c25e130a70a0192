//! Bearer-token extractors
//!
//! `AdminIdentity` for admin routes, [`AuthUser`] for customer routes. Both
//! read `Authorization: Bearer <token>`.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;
use shared::models::User;

use super::session::AdminIdentity;
use crate::error::ServiceError;
use crate::state::AppState;

/// Authenticated customer, re-read from the store on every request
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Pull the bearer token out of the request headers
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    match header {
        Some(value) => value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header")),
        None => {
            tracing::warn!(uri = %parts.uri, "Missing authorization header");
            Err(AppError::not_authenticated())
        }
    }
}

impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<AdminIdentity>() {
            return Ok(identity.clone());
        }
        let token = bearer_token(parts)?;
        let identity = state.sessions.validate_admin(token).inspect_err(|e| {
            tracing::warn!(uri = %parts.uri, code = %e.code, "Admin auth failed");
        })?;
        parts.extensions.insert(identity.clone());
        Ok(identity)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        let token = bearer_token(parts)?;
        let user = state
            .sessions
            .validate_user(token, state.credentials.as_ref())
            .await?;
        let user = AuthUser(user);
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
