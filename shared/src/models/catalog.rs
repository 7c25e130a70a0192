//! Catalog Models (categories and menu items)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Public path under `/uploads`
    pub image: Option<String>,
    pub created_at: i64,
}

/// Create/update category payload
#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    pub name: String,
    /// `None` keeps the current image on update
    pub image: Option<String>,
}

/// Menu item entity, joined with its category name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub currency: String,
    pub category_id: Option<i64>,
    /// Category name (LEFT JOIN)
    pub category: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: i64,
}

/// Create/update menu item payload
#[derive(Debug, Clone)]
pub struct MenuItemInput {
    pub name: String,
    pub price: Decimal,
    pub currency: String,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    /// `None` keeps the current image on update
    pub image: Option<String>,
}
