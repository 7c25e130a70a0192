//! Customer handlers: registration with OTP, login, password reset, profile
//! and the public catalog listings

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post, put};
use serde::Deserialize;
use serde_json::{Value, json};
use shared::error::{ApiResponse, AppError};
use shared::models::{Category, MenuItem, ProfileUpdate, UserProfile};

use super::ApiResult;
use super::extract::ApiJson;
use crate::auth::AuthUser;
use crate::services::otp::RegisterRequest;
use crate::services::profile::resolve_update;
use crate::state::AppState;
use crate::util::now_millis;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-otp", post(verify_otp))
        .route("/resend-otp", post(resend_otp))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/profile", get(get_profile))
        .route("/updateprofile", put(update_profile))
        .route("/getCategories", get(list_categories))
        .route("/getMenuItems", get(list_menu_items))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

fn email_data(email: &str) -> Value {
    json!({ "email": email })
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<Value> {
    let user = state.otp.register(req, now_millis()).await?;
    Ok(ApiResponse::success_with_message(
        "User registered. OTP sent to email.",
        email_data(&user.email),
    ))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<VerifyOtpRequest>,
) -> ApiResult<Value> {
    let user = state.otp.verify(&req.email, &req.otp, now_millis()).await?;
    Ok(ApiResponse::success_with_message(
        "Email verified successfully",
        email_data(&user.email),
    ))
}

pub async fn resend_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> ApiResult<Value> {
    state.otp.resend(&req.email, now_millis()).await?;
    Ok(ApiResponse::success_with_message(
        "New OTP sent to email",
        email_data(req.email.trim()),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Value> {
    let outcome = state.otp.login(&req.email, &req.password).await?;
    Ok(ApiResponse::success_with_message(
        "Login successful",
        json!({ "token": outcome.token }),
    ))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EmailRequest>,
) -> ApiResult<Value> {
    state.otp.forgot_password(&req.email, now_millis()).await?;
    Ok(ApiResponse::success_with_message(
        "Password reset OTP sent to email",
        email_data(req.email.trim()),
    ))
}

pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> ApiResult<Value> {
    state
        .otp
        .reset_password(&req.email, &req.otp, &req.new_password, now_millis())
        .await?;
    Ok(ApiResponse::success_with_message(
        "Password reset successfully",
        email_data(req.email.trim()),
    ))
}

pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<UserProfile> {
    let profile = state
        .credentials
        .get_profile(user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(ApiResponse::success_with_message("Profile fetched", profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(update): ApiJson<ProfileUpdate>,
) -> ApiResult<UserProfile> {
    let write = resolve_update(&update)?;
    let profile = state
        .credentials
        .update_profile(user.id, &write)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    tracing::info!(user_id = user.id, "Profile updated");
    Ok(ApiResponse::success_with_message(
        "Profile updated successfully",
        profile,
    ))
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let categories = state.catalog_service.list_categories().await?;
    Ok(ApiResponse::success_with_message(
        "Categories fetched successfully",
        categories,
    ))
}

pub async fn list_menu_items(State(state): State<AppState>) -> ApiResult<Vec<MenuItem>> {
    let items = state.catalog_service.list_menu_items().await?;
    Ok(super::menu_item::listing_response(items))
}
