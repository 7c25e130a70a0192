//! food-cloud: Yoga Food ordering backend
//!
//! REST service that:
//! - Registers customers and verifies their email with one-time codes
//! - Issues admin and customer session tokens
//! - Places orders and tracks their status through delivery
//! - Manages the menu catalog with image uploads

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod logger;
pub mod services;
pub mod state;
pub mod store;
pub mod util;

pub use config::Config;
pub use state::AppState;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
