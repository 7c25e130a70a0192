//! Admin account handlers
//!
//! POST /admin/register: create an admin (no OTP, created verified)
//! POST /admin/login: exchange credentials for an admin session token

use axum::Router;
use axum::extract::State;
use axum::routing::post;
use serde::Deserialize;
use serde_json::{Value, json};
use shared::error::{ApiResponse, AppError};
use shared::models::{Admin, NewAdmin};
use validator::ValidateEmail;

use super::ApiResult;
use super::extract::ApiJson;
use crate::services::otp::check_password_length;
use crate::state::AppState;
use crate::store::StoreError;
use crate::util::{hash_password, normalize_email, now_millis, verify_password};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[derive(Debug, Deserialize)]
pub struct AdminRegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn valid_email(raw: &str) -> Result<String, AppError> {
    let email = normalize_email(raw);
    if !email.validate_email() {
        return Err(AppError::validation("Invalid email format"));
    }
    Ok(email)
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AdminRegisterRequest>,
) -> ApiResult<Admin> {
    let (Some(name), Some(email), Some(password)) = (
        req.name.as_deref().map(str::trim).filter(|v| !v.is_empty()),
        req.email.as_deref().filter(|v| !v.trim().is_empty()),
        req.password.as_deref().filter(|v| !v.is_empty()),
    ) else {
        return Err(AppError::validation("Name, email, and password are required").into());
    };
    let email = valid_email(email)?;
    check_password_length(password)?;

    if state.credentials.find_admin_by_email(&email).await?.is_some() {
        return Err(AppError::conflict("Admin already exists").into());
    }

    let new_admin = NewAdmin {
        name: name.to_string(),
        email,
        password_hash: hash_password(password)?,
        created_at: now_millis(),
    };
    let admin = match state.credentials.create_admin(new_admin).await {
        Ok(admin) => admin,
        Err(StoreError::Conflict(_)) => {
            return Err(AppError::conflict("Admin already exists").into());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(admin_id = admin.id, email = %admin.email, "Admin registered");
    Ok(ApiResponse::created("Admin registered successfully", admin))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AdminLoginRequest>,
) -> ApiResult<Value> {
    let (Some(email), Some(password)) = (
        req.email.as_deref().filter(|v| !v.trim().is_empty()),
        req.password.as_deref().filter(|v| !v.is_empty()),
    ) else {
        return Err(AppError::validation("Email and password are required").into());
    };
    let email = valid_email(email)?;

    let Some(admin) = state.credentials.find_admin_by_email(&email).await? else {
        tracing::warn!(email = %email, "Admin login failed: unknown email");
        return Err(AppError::invalid_credentials().into());
    };
    if !verify_password(password, &admin.password_hash) {
        tracing::warn!(admin_id = admin.id, "Admin login failed: wrong password");
        return Err(AppError::invalid_credentials().into());
    }

    let token = state.sessions.issue_admin_token(admin.id, &admin.email)?;
    tracing::info!(admin_id = admin.id, "Admin logged in");
    Ok(ApiResponse::success_with_message(
        "Login successful",
        json!({ "token": token }),
    ))
}
