//! API routes for food-cloud
//!
//! Everything lives under `/api/v1`; uploaded images are served from
//! `/uploads`. Admin routes take an [`AdminIdentity`](crate::auth::AdminIdentity)
//! extractor, customer routes an [`AuthUser`](crate::auth::AuthUser).

pub mod admin;
pub mod category;
pub mod delivery_person;
pub mod extract;
pub mod health;
pub mod lookup;
pub mod menu_item;
pub mod order;
pub mod user;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use shared::error::ApiResponse;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::ServiceError;
use crate::services::images::MAX_FILE_SIZE;
use crate::state::AppState;

/// Handler result: the envelope on success, an error envelope otherwise
pub type ApiResult<T> = Result<ApiResponse<T>, ServiceError>;

/// Headroom above the image limit for the other multipart fields
const BODY_LIMIT: usize = MAX_FILE_SIZE + 1024 * 1024;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/admin", admin::router())
        .nest("/user", user::router())
        .nest("/categories", category::router())
        .nest("/menuItems", menu_item::router())
        .nest("/orders", order::router())
        .nest("/delivery-persons", delivery_person::router())
        .merge(lookup::router());

    let uploads = ServeDir::new(state.images.dir());

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api)
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
