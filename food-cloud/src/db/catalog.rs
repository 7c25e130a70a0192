use shared::models::{Category, CategoryInput, MenuItem, MenuItemInput};
use sqlx::PgPool;

// ── Categories ──

pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, image, created_at FROM categories ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find_category(pool: &PgPool, id: i64) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, image, created_at FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_category_by_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, name, image, created_at FROM categories WHERE LOWER(name) = LOWER($1)",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn create_category(
    pool: &PgPool,
    input: &CategoryInput,
    now: i64,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO categories (name, image, created_at) VALUES ($1, $2, $3)
         RETURNING id, name, image, created_at",
    )
    .bind(&input.name)
    .bind(&input.image)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn update_category(
    pool: &PgPool,
    id: i64,
    input: &CategoryInput,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE categories SET name = $1, image = COALESCE($2, image) WHERE id = $3
         RETURNING id, name, image, created_at",
    )
    .bind(&input.name)
    .bind(&input.image)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_category(pool: &PgPool, id: i64) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as(
        "DELETE FROM categories WHERE id = $1 RETURNING id, name, image, created_at",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

// ── Menu items ──

const ITEM_SELECT: &str = "SELECT m.id, m.name, m.price, m.currency, m.category_id, \
     c.name AS category, m.description, m.image, m.created_at \
     FROM menu_items m LEFT JOIN categories c ON c.id = m.category_id";

pub async fn list_menu_items(pool: &PgPool) -> Result<Vec<MenuItem>, sqlx::Error> {
    sqlx::query_as(&format!("{ITEM_SELECT} ORDER BY m.created_at DESC, m.id DESC"))
        .fetch_all(pool)
        .await
}

pub async fn find_menu_item(pool: &PgPool, id: i64) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as(&format!("{ITEM_SELECT} WHERE m.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_menu_item(
    pool: &PgPool,
    input: &MenuItemInput,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO menu_items (name, price, currency, category_id, description, image, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id",
    )
    .bind(&input.name)
    .bind(input.price)
    .bind(&input.currency)
    .bind(input.category_id)
    .bind(&input.description)
    .bind(&input.image)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Returns `false` when no row matched
pub async fn update_menu_item(
    pool: &PgPool,
    id: i64,
    input: &MenuItemInput,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE menu_items SET name = $1, price = $2, currency = $3, category_id = $4,
            description = $5, image = COALESCE($6, image)
         WHERE id = $7",
    )
    .bind(&input.name)
    .bind(input.price)
    .bind(&input.currency)
    .bind(input.category_id)
    .bind(&input.description)
    .bind(&input.image)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_menu_item(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
