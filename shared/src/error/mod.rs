//! Error codes and the response envelope shared by all handlers
//!
//! Codes are grouped by range (see [`ErrorCategory`]); each code owns its
//! HTTP status and default message.
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::OtpInvalid);
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.status, 400);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError};
