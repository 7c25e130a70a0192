//! Unified error codes for the Yoga Food backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values so clients can branch on them without parsing
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Invalid email or password (admin login)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Invalid email or password (customer login)
    InvalidLogin = 1005,
    /// Customer has not verified their email yet
    EmailNotVerified = 1006,
    /// Email already registered
    EmailAlreadyRegistered = 1007,
    /// Password below minimum length
    PasswordTooShort = 1008,
    /// New password equals the current one
    SamePassword = 1009,
    /// One-time code is wrong, expired or not outstanding
    OtpInvalid = 1010,
    /// No account for this email
    UserNotFound = 1011,

    // ==================== 2xxx: Permission ====================
    /// Admin role required
    AdminRequired = 2002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no items
    OrderEmpty = 4002,
    /// Order status not found
    OrderStatusNotFound = 4003,
    /// Delivery person not found
    DeliveryPersonNotFound = 4004,
    /// Payment status not found
    PaymentStatusNotFound = 4005,

    // ==================== 6xxx: Catalog ====================
    /// Category not found
    CategoryNotFound = 6001,
    /// Category name already exists
    CategoryNameExists = 6002,
    /// Menu item not found
    MenuItemNotFound = 6101,
    /// Uploaded image exceeds the size limit
    ImageTooLarge = 6201,
    /// Uploaded file extension is not allowed
    ImageFormatUnsupported = 6202,
    /// Uploaded file is not a readable image
    ImageInvalid = 6203,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Mail transport refused or failed the message
    DispatchFailed = 9101,
}

impl ErrorCode {
    /// Numeric value of this code
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",

            // Auth
            Self::NotAuthenticated => "Authentication required",
            Self::InvalidCredentials => "Invalid email or password",
            Self::TokenExpired => "Token has expired",
            Self::TokenInvalid => "Invalid or expired token",
            Self::InvalidLogin => "Invalid credentials",
            Self::EmailNotVerified => "Email not verified",
            Self::EmailAlreadyRegistered => "Email already registered",
            Self::PasswordTooShort => "Password must be at least 6 characters",
            Self::SamePassword => "New password must not be the same as the old password",
            Self::OtpInvalid => "Invalid or expired OTP",
            Self::UserNotFound => "User not found with this email",

            // Permission
            Self::AdminRequired => "Admin role required",

            // Order
            Self::OrderNotFound => "Order not found",
            Self::OrderEmpty => "Order must contain at least one item",
            Self::OrderStatusNotFound => "Order status not found",
            Self::DeliveryPersonNotFound => "Delivery person not found",
            Self::PaymentStatusNotFound => "Payment status not found",

            // Catalog
            Self::CategoryNotFound => "Category not found",
            Self::CategoryNameExists => "Category name already exists",
            Self::MenuItemNotFound => "Menu item not found",
            Self::ImageTooLarge => "File too large. Maximum allowed size is 5 MB.",
            Self::ImageFormatUnsupported => "Only image files (jpeg, jpg, png, webp) are allowed",
            Self::ImageInvalid => "Uploaded file is not a valid image",

            // System
            Self::InternalError => "Internal server error",
            Self::DispatchFailed => "Failed to send email",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::InvalidLogin),
            1006 => Ok(ErrorCode::EmailNotVerified),
            1007 => Ok(ErrorCode::EmailAlreadyRegistered),
            1008 => Ok(ErrorCode::PasswordTooShort),
            1009 => Ok(ErrorCode::SamePassword),
            1010 => Ok(ErrorCode::OtpInvalid),
            1011 => Ok(ErrorCode::UserNotFound),

            // Permission
            2002 => Ok(ErrorCode::AdminRequired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderEmpty),
            4003 => Ok(ErrorCode::OrderStatusNotFound),
            4004 => Ok(ErrorCode::DeliveryPersonNotFound),
            4005 => Ok(ErrorCode::PaymentStatusNotFound),

            // Catalog
            6001 => Ok(ErrorCode::CategoryNotFound),
            6002 => Ok(ErrorCode::CategoryNameExists),
            6101 => Ok(ErrorCode::MenuItemNotFound),
            6201 => Ok(ErrorCode::ImageTooLarge),
            6202 => Ok(ErrorCode::ImageFormatUnsupported),
            6203 => Ok(ErrorCode::ImageInvalid),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9101 => Ok(ErrorCode::DispatchFailed),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
