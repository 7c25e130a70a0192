//! Lookup tables: order statuses, payment statuses, couriers

use serde::{Deserialize, Serialize};

/// Name of the status every new order starts in
pub const ORDER_STATUS_PENDING: &str = "Pending";
/// Name of the terminal status
pub const ORDER_STATUS_DELIVERED: &str = "Delivered";

/// Order status entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderStatus {
    pub id: i64,
    pub name: String,
}

impl OrderStatus {
    pub fn is_delivered(&self) -> bool {
        self.name == ORDER_STATUS_DELIVERED
    }
}

/// Payment status entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaymentStatus {
    pub id: i64,
    pub name: String,
}

/// Delivery person (courier)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DeliveryPerson {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub created_at: i64,
}

/// Create delivery person payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryPersonCreate {
    pub name: Option<String>,
    pub phone: Option<String>,
}
