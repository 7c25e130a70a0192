use shared::models::{DeliveryPerson, OrderStatus, PaymentStatus};
use sqlx::PgPool;

pub async fn list_order_statuses(pool: &PgPool) -> Result<Vec<OrderStatus>, sqlx::Error> {
    sqlx::query_as("SELECT id, name FROM order_statuses ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_order_status(pool: &PgPool, id: i64) -> Result<Option<OrderStatus>, sqlx::Error> {
    sqlx::query_as("SELECT id, name FROM order_statuses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_order_status_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<OrderStatus>, sqlx::Error> {
    sqlx::query_as("SELECT id, name FROM order_statuses WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn list_payment_statuses(pool: &PgPool) -> Result<Vec<PaymentStatus>, sqlx::Error> {
    sqlx::query_as("SELECT id, name FROM payment_statuses ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_payment_status(
    pool: &PgPool,
    id: i64,
) -> Result<Option<PaymentStatus>, sqlx::Error> {
    sqlx::query_as("SELECT id, name FROM payment_statuses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_delivery_person(
    pool: &PgPool,
    name: &str,
    phone: &str,
    now: i64,
) -> Result<DeliveryPerson, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO delivery_persons (name, phone, created_at)
         VALUES ($1, $2, $3)
         RETURNING id, name, phone, created_at",
    )
    .bind(name)
    .bind(phone)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn list_delivery_persons(pool: &PgPool) -> Result<Vec<DeliveryPerson>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, phone, created_at FROM delivery_persons ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_delivery_person(
    pool: &PgPool,
    id: i64,
) -> Result<Option<DeliveryPerson>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, phone, created_at FROM delivery_persons WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
