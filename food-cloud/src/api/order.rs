//! Order handlers
//!
//! Customers place orders and read their current ones; admins list current
//! and delivered orders and move them through the status table.

use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use shared::error::ApiResponse;
use shared::models::{CreateOrderRequest, OrderView, UpdateOrderStatusRequest};

use super::ApiResult;
use super::extract::ApiJson;
use crate::auth::{AdminIdentity, AuthUser};
use crate::state::AppState;
use crate::util::now_millis;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(create_order))
        .route("/current", get(current_orders))
        .route("/order/{order_id}", get(get_user_order))
        .route("/admin/get-current-orders", get(admin_current_orders))
        .route("/admin/get-delivered-orders", get(admin_delivered_orders))
        .route("/admin/update-order/{order_id}", put(update_order_status))
}

pub async fn create_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<CreateOrderRequest>,
) -> ApiResult<OrderView> {
    let order = state
        .order_service
        .create_order(user.id, req, now_millis())
        .await?;
    Ok(ApiResponse::success_with_message(
        "Order created successfully",
        order,
    ))
}

pub async fn current_orders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Vec<OrderView>> {
    let orders = state.order_service.current_for_user(user.id).await?;
    Ok(ApiResponse::success_with_message(
        "Current orders fetched successfully",
        orders,
    ))
}

pub async fn get_user_order(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(order_id): Path<String>,
) -> ApiResult<OrderView> {
    let order = state
        .order_service
        .user_order_by_id(user.id, &order_id)
        .await?;
    Ok(ApiResponse::success_with_message(
        "Order fetched successfully",
        order,
    ))
}

pub async fn admin_current_orders(
    State(state): State<AppState>,
    _admin: AdminIdentity,
) -> ApiResult<Vec<OrderView>> {
    let orders = state.order_service.current_admin().await?;
    Ok(ApiResponse::success_with_message(
        "Current orders fetched successfully",
        orders,
    ))
}

pub async fn admin_delivered_orders(
    State(state): State<AppState>,
    _admin: AdminIdentity,
) -> ApiResult<Vec<OrderView>> {
    let orders = state.order_service.delivered().await?;
    Ok(ApiResponse::success_with_message(
        "Delivered orders fetched successfully",
        orders,
    ))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Path(order_id): Path<String>,
    ApiJson(req): ApiJson<UpdateOrderStatusRequest>,
) -> ApiResult<OrderView> {
    tracing::debug!(admin_id = admin.admin_id, order_id = %order_id, "Updating order status");
    let order = state.order_service.update_status(&order_id, req).await?;
    Ok(ApiResponse::success_with_message(
        "Order status updated successfully",
        order,
    ))
}
