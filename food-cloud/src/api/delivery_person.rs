//! Courier handlers (admin)

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use shared::error::{ApiResponse, AppError};
use shared::models::{DeliveryPerson, DeliveryPersonCreate};

use super::ApiResult;
use super::extract::ApiJson;
use crate::auth::AdminIdentity;
use crate::state::AppState;
use crate::util::now_millis;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-person", post(create))
        .route("/get-persons", get(list))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    ApiJson(req): ApiJson<DeliveryPersonCreate>,
) -> ApiResult<DeliveryPerson> {
    let name = req.name.as_deref().map(str::trim).unwrap_or_default();
    let phone = req.phone.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() || phone.is_empty() {
        return Err(AppError::validation("Name and phone are required").into());
    }

    let person = state
        .orders
        .create_delivery_person(name, phone, now_millis())
        .await?;
    tracing::info!(delivery_person_id = person.id, "Delivery person added");
    Ok(ApiResponse::success_with_message("Delivery person added", person))
}

pub async fn list(
    State(state): State<AppState>,
    _admin: AdminIdentity,
) -> ApiResult<Vec<DeliveryPerson>> {
    let persons = state.orders.list_delivery_persons().await?;
    Ok(ApiResponse::success_with_message(
        "Delivery persons fetched",
        persons,
    ))
}
