//! Order Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default currency when the client sends none
pub const DEFAULT_CURRENCY: &str = "CHF";

/// One line of an order, persisted as part of an opaque JSON payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
    pub subtotal: Decimal,
}

/// Order row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Human-readable identifier, `ORD-YYYYMMDD-XXXXXX`
    pub order_id: String,
    pub user_id: i64,
    pub payment_id: Option<String>,
    pub payment_status_id: Option<i64>,
    pub order_status_id: i64,
    pub total_amount: Decimal,
    pub currency: String,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub items: Vec<OrderItem>,
    pub delivery_person_id: Option<i64>,
    pub created_at: i64,
}

/// Order joined with human-readable status, payment and courier names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderView {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub order: Order,
    pub payment_status: Option<String>,
    pub order_status: Option<String>,
    pub delivery_person_name: Option<String>,
    pub delivery_person_phone: Option<String>,
    /// Customer full name (admin lists only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_name: Option<String>,
    /// Customer contact email (admin lists only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub contact_email: Option<String>,
}

impl OrderView {
    pub fn is_delivered(&self) -> bool {
        self.order_status.as_deref() == Some(super::lookup::ORDER_STATUS_DELIVERED)
    }
}

/// Insert payload for a new order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: String,
    pub user_id: i64,
    pub payment_id: Option<String>,
    pub payment_status_id: Option<i64>,
    pub order_status_id: i64,
    pub total_amount: Decimal,
    pub currency: String,
    pub items: Vec<OrderItem>,
    pub created_at: i64,
}

/// Create order request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub payment_id: Option<String>,
    pub payment_status_id: Option<i64>,
    pub total_amount: Decimal,
    pub currency: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Update order status request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub order_status_id: i64,
    pub delivery_person_id: Option<i64>,
}
