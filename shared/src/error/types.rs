//! Error types and API response structures

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error surfaced to HTTP callers: a code plus the message put in the envelope
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
}

impl AppError {
    /// Error carrying the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// 400 with a field-specific message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// `"<resource> not found"`
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::NotFound, format!("{} not found", resource.into()))
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Malformed body or unreadable upload
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::AlreadyExists, msg)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    /// Admin login failure; never says which half was wrong
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }
}

/// `{isSuccess, status, message, data}` envelope returned by every endpoint.
///
/// `status` echoes the HTTP status; `data` is `null` on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub is_success: bool,
    pub status: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            is_success: true,
            status: StatusCode::OK.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }

    /// 201 for newly created resources
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            is_success: true,
            status: StatusCode::CREATED.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// 200 with `data: null`
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            is_success: true,
            status: StatusCode::OK.as_u16(),
            message: message.into(),
            data: None,
        }
    }

    pub fn error(err: &AppError) -> Self {
        Self {
            is_success: false,
            status: err.http_status().as_u16(),
            message: err.message.clone(),
            data: None,
        }
    }
}

impl<T> From<AppError> for ApiResponse<T> {
    fn from(err: AppError) -> Self {
        Self {
            is_success: false,
            status: err.http_status().as_u16(),
            message: err.message,
            data: None,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ApiResponse::<()>::error(&self);

        if matches!(self.code.category(), super::category::ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "Request failed with a system error"
            );
        }

        (status, Json(body)).into_response()
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_and_custom_messages() {
        let err = AppError::new(ErrorCode::EmailNotVerified);
        assert_eq!(err.message, "Email not verified");

        let err = AppError::validation("Valid price required");
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.to_string(), "Valid price required");
    }

    #[test]
    fn status_follows_code() {
        assert_eq!(
            AppError::new(ErrorCode::NotFound).http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::new(ErrorCode::NotAuthenticated).http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::new(ErrorCode::AdminRequired).http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn convenience_constructors() {
        let err = AppError::not_found("Order");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Order not found");

        let err = AppError::conflict("Email already registered");
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);

        let err = AppError::invalid_credentials();
        assert_eq!(err.message, "Invalid email or password");
        assert_eq!(err.http_status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn created_envelope() {
        let response = ApiResponse::created("Category created", "x");
        assert!(response.is_success);
        assert_eq!(response.status, 201);
    }

    #[test]
    fn failure_envelope_has_no_data() {
        let err = AppError::new(ErrorCode::OtpInvalid);
        let response = ApiResponse::<()>::error(&err);

        assert!(!response.is_success);
        assert_eq!(response.status, 400);
        assert_eq!(response.message, "Invalid or expired OTP");
        assert!(response.data.is_none());
    }

    #[test]
    fn into_typed_envelope() {
        let err = AppError::new(ErrorCode::InternalError);
        let response: ApiResponse<String> = err.into();

        assert_eq!(response.status, 500);
        assert_eq!(response.message, "Internal server error");
        assert!(response.data.is_none());
    }

    #[test]
    fn camel_case_wire_shape() {
        let json =
            serde_json::to_value(ApiResponse::success_with_message("Profile fetched", "hello"))
                .unwrap();
        assert_eq!(json["isSuccess"], true);
        assert_eq!(json["status"], 200);
        assert_eq!(json["data"], "hello");

        let json = serde_json::to_value(ApiResponse::<()>::ok("done")).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["message"], "done");
    }
}
