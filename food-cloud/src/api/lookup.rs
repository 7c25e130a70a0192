//! Status lookup tables (admin)

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use shared::error::ApiResponse;
use shared::models::{OrderStatus, PaymentStatus};

use super::ApiResult;
use crate::auth::AdminIdentity;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/order-status", get(order_statuses))
        .route("/payment-statuses", get(payment_statuses))
}

pub async fn order_statuses(
    State(state): State<AppState>,
    _admin: AdminIdentity,
) -> ApiResult<Vec<OrderStatus>> {
    let statuses = state.orders.list_order_statuses().await?;
    Ok(ApiResponse::success_with_message(
        "Order statuses fetched",
        statuses,
    ))
}

pub async fn payment_statuses(
    State(state): State<AppState>,
    _admin: AdminIdentity,
) -> ApiResult<Vec<PaymentStatus>> {
    let statuses = state.orders.list_payment_statuses().await?;
    Ok(ApiResponse::success_with_message(
        "Payment statuses fetched",
        statuses,
    ))
}
