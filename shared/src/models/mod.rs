//! Data models
//!
//! Shared between the HTTP service and its stores.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (Postgres BIGSERIAL), timestamps are Unix millis.

pub mod admin;
pub mod catalog;
pub mod lookup;
pub mod order;
pub mod user;

// Re-exports
pub use admin::*;
pub use catalog::*;
pub use lookup::*;
pub use order::*;
pub use user::*;
