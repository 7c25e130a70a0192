//! Unified service-layer error type for food-cloud
//!
//! `ServiceError` bridges store, mail and crypto failures to the API-layer
//! `AppError`, so handlers and services can propagate with `?`.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::BoxError;
use crate::email::MailError;
use crate::store::StoreError;

/// Service-layer error
///
/// - `Db`: Store/infrastructure errors (logged, mapped to InternalError)
/// - `App`: Business-rule errors (transparent pass-through to client)
#[derive(Debug)]
pub enum ServiceError {
    /// Database or infrastructure error (sqlx, io, hashing)
    Db(BoxError),
    /// Business-rule error (already an AppError with the correct ErrorCode)
    App(AppError),
}

impl ServiceError {
    /// Error code as seen by the client
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::App(e) => e.code,
            ServiceError::Db(_) => ErrorCode::InternalError,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Db(e) => write!(f, "infrastructure error: {e}"),
            ServiceError::App(e) => write!(f, "{e}"),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(constraint) => {
                tracing::warn!(constraint = %constraint, "Unmapped store conflict");
                ServiceError::App(AppError::new(ErrorCode::AlreadyExists))
            }
            StoreError::Backend(e) => ServiceError::Db(e),
        }
    }
}

impl From<MailError> for ServiceError {
    fn from(e: MailError) -> Self {
        tracing::error!(error = %e, "Mail dispatch failed");
        ServiceError::App(AppError::new(ErrorCode::DispatchFailed))
    }
}

impl From<argon2::password_hash::Error> for ServiceError {
    fn from(e: argon2::password_hash::Error) -> Self {
        ServiceError::Db(format!("password hashing failed: {e}").into())
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_hide_detail() {
        let err: ServiceError = StoreError::Backend("connection reset".into()).into();
        assert_eq!(err.code(), ErrorCode::InternalError);
        let app: AppError = err.into();
        assert_eq!(app.message, "Internal server error");
    }

    #[test]
    fn conflicts_hide_constraint_names() {
        let err: ServiceError = StoreError::Conflict("categories_name_lower_key".into()).into();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::AlreadyExists);
        assert_eq!(app.message, "Resource already exists");
        assert_eq!(app.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn mail_errors_become_dispatch_failed() {
        let err: ServiceError = MailError::InvalidAddress("nope".into()).into();
        assert_eq!(err.code(), ErrorCode::DispatchFailed);
    }
}
