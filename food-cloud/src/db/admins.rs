use shared::models::{Admin, NewAdmin};
use sqlx::PgPool;

pub async fn create(pool: &PgPool, admin: &NewAdmin) -> Result<Admin, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO admins (name, email, password_hash, created_at)
         VALUES ($1, $2, $3, $4)
         RETURNING id, name, email, password_hash, created_at",
    )
    .bind(&admin.name)
    .bind(&admin.email)
    .bind(&admin.password_hash)
    .bind(admin.created_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Admin>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM admins WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Admin>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM admins WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
