use shared::models::{NewOrder, ORDER_STATUS_DELIVERED, OrderView};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::store::OrderScope;

/// Joined columns shared by every order read; `o` is the order row source
const VIEW_COLUMNS: &str = "o.id, o.order_id, o.user_id, o.payment_id, o.payment_status_id, \
     o.order_status_id, o.total_amount, o.currency, o.items, o.delivery_person_id, o.created_at, \
     ps.name AS payment_status, os.name AS order_status, \
     dp.name AS delivery_person_name, dp.phone AS delivery_person_phone";

const VIEW_JOINS: &str = "LEFT JOIN payment_statuses ps ON ps.id = o.payment_status_id
     LEFT JOIN order_statuses os ON os.id = o.order_status_id
     LEFT JOIN delivery_persons dp ON dp.id = o.delivery_person_id";

const NO_CUSTOMER: &str = "NULL::TEXT AS user_name, NULL::TEXT AS contact_email";

const WITH_CUSTOMER: &str =
    "CONCAT(u.firstname, ' ', u.lastname) AS user_name, u.contact_email AS contact_email";

pub async fn insert(pool: &PgPool, order: &NewOrder) -> Result<OrderView, sqlx::Error> {
    sqlx::query_as(&format!(
        "WITH o AS (
            INSERT INTO orders (order_id, user_id, payment_id, payment_status_id,
                                order_status_id, total_amount, currency, items, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
         )
         SELECT {VIEW_COLUMNS}, {NO_CUSTOMER} FROM o {VIEW_JOINS}"
    ))
    .bind(&order.order_id)
    .bind(order.user_id)
    .bind(&order.payment_id)
    .bind(order.payment_status_id)
    .bind(order.order_status_id)
    .bind(order.total_amount)
    .bind(&order.currency)
    .bind(Json(&order.items))
    .bind(order.created_at)
    .fetch_one(pool)
    .await
}

pub async fn find(pool: &PgPool, order_id: &str) -> Result<Option<OrderView>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {VIEW_COLUMNS}, {NO_CUSTOMER} FROM orders o {VIEW_JOINS} WHERE o.order_id = $1"
    ))
    .bind(order_id)
    .fetch_optional(pool)
    .await
}

/// Overwrites status and courier; transitions are not restricted
pub async fn update_status(
    pool: &PgPool,
    order_id: &str,
    order_status_id: i64,
    delivery_person_id: Option<i64>,
) -> Result<Option<OrderView>, sqlx::Error> {
    sqlx::query_as(&format!(
        "WITH o AS (
            UPDATE orders SET order_status_id = $2, delivery_person_id = $3
            WHERE order_id = $1
            RETURNING *
         )
         SELECT {VIEW_COLUMNS}, {NO_CUSTOMER} FROM o {VIEW_JOINS}"
    ))
    .bind(order_id)
    .bind(order_status_id)
    .bind(delivery_person_id)
    .fetch_optional(pool)
    .await
}

pub async fn list(pool: &PgPool, scope: OrderScope) -> Result<Vec<OrderView>, sqlx::Error> {
    match scope {
        OrderScope::CurrentForUser(user_id) => {
            sqlx::query_as(&format!(
                "SELECT {VIEW_COLUMNS}, {NO_CUSTOMER} FROM orders o {VIEW_JOINS}
                 WHERE o.user_id = $1 AND os.name <> $2
                 ORDER BY o.created_at DESC, o.id DESC"
            ))
            .bind(user_id)
            .bind(ORDER_STATUS_DELIVERED)
            .fetch_all(pool)
            .await
        }
        OrderScope::Current | OrderScope::Delivered => {
            let op = if scope == OrderScope::Delivered {
                "="
            } else {
                "<>"
            };
            sqlx::query_as(&format!(
                "SELECT {VIEW_COLUMNS}, {WITH_CUSTOMER} FROM orders o {VIEW_JOINS}
                 JOIN users u ON u.id = o.user_id
                 WHERE os.name {op} $1
                 ORDER BY o.created_at DESC, o.id DESC"
            ))
            .bind(ORDER_STATUS_DELIVERED)
            .fetch_all(pool)
            .await
        }
    }
}
