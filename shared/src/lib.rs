//! Shared types for the Yoga Food backend
//!
//! Error codes, the response envelope and the domain records used by the
//! HTTP service and its stores.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
