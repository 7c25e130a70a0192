//! Storage abstractions
//!
//! Three async traits split by owner: credentials, orders (with their lookup
//! tables) and the menu catalog. `db::PgStore` is the production backend,
//! [`MemoryStore`] backs tests and local runs without a database.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use shared::models::{
    Admin, Category, CategoryInput, DeliveryPerson, MenuItem, MenuItemInput, NewAdmin, NewOrder,
    NewUser, OrderStatus, OrderView, OtpState, PaymentStatus, ProfileWrite, User, UserProfile,
};
use thiserror::Error;

use crate::BoxError;

/// Store-boundary error
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("conflict: {0}")]
    Conflict(String),
    /// Backend failure or a row that violates a record invariant
    #[error("store backend error: {0}")]
    Backend(BoxError),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error()
            && db_err.is_unique_violation()
        {
            let constraint = db_err.constraint().unwrap_or("unique constraint");
            return StoreError::Conflict(constraint.to_string());
        }
        StoreError::Backend(e.into())
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Admin and customer credentials, including the inline OTP state
///
/// Emails passed in are already normalized.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert an admin; `Conflict` on a taken email
    async fn create_admin(&self, admin: NewAdmin) -> StoreResult<Admin>;

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>>;

    async fn find_admin_by_id(&self, id: i64) -> StoreResult<Option<Admin>>;

    /// Insert an unverified user with its first OTP; `Conflict` on a taken email
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Overwrite any outstanding OTP. Returns `false` when no user has this email.
    async fn set_otp(&self, email: &str, otp: &OtpState) -> StoreResult<bool>;

    /// Clear the OTP and mark the user verified, only if the stored code hash
    /// still equals `expected_hash` and has not expired at `now`.
    async fn consume_otp(
        &self,
        email: &str,
        expected_hash: &str,
        now: i64,
    ) -> StoreResult<Option<User>>;

    /// Replace the password hash and clear the OTP under the same condition
    /// as [`consume_otp`](Self::consume_otp). Returns `false` if it lost the race.
    async fn reset_password(
        &self,
        email: &str,
        expected_hash: &str,
        now: i64,
        new_password_hash: &str,
    ) -> StoreResult<bool>;

    async fn get_profile(&self, user_id: i64) -> StoreResult<Option<UserProfile>>;

    async fn update_profile(
        &self,
        user_id: i64,
        profile: &ProfileWrite,
    ) -> StoreResult<Option<UserProfile>>;
}

/// Which slice of the order table a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Non-delivered orders of one customer
    CurrentForUser(i64),
    /// All non-delivered orders, with customer name and contact email
    Current,
    /// All delivered orders, with customer name and contact email
    Delivered,
}

/// Orders and the lookup tables they reference
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn list_order_statuses(&self) -> StoreResult<Vec<OrderStatus>>;

    async fn find_order_status(&self, id: i64) -> StoreResult<Option<OrderStatus>>;

    async fn find_order_status_by_name(&self, name: &str) -> StoreResult<Option<OrderStatus>>;

    async fn list_payment_statuses(&self) -> StoreResult<Vec<PaymentStatus>>;

    async fn find_payment_status(&self, id: i64) -> StoreResult<Option<PaymentStatus>>;

    async fn create_delivery_person(
        &self,
        name: &str,
        phone: &str,
        now: i64,
    ) -> StoreResult<DeliveryPerson>;

    async fn list_delivery_persons(&self) -> StoreResult<Vec<DeliveryPerson>>;

    async fn find_delivery_person(&self, id: i64) -> StoreResult<Option<DeliveryPerson>>;

    /// Insert an order; `Conflict` when `order_id` is already taken
    async fn insert_order(&self, order: &NewOrder) -> StoreResult<OrderView>;

    async fn find_order(&self, order_id: &str) -> StoreResult<Option<OrderView>>;

    /// Overwrite status and courier. `None` when the order does not exist.
    async fn update_order_status(
        &self,
        order_id: &str,
        order_status_id: i64,
        delivery_person_id: Option<i64>,
    ) -> StoreResult<Option<OrderView>>;

    /// Newest first
    async fn list_orders(&self, scope: OrderScope) -> StoreResult<Vec<OrderView>>;
}

/// Menu categories and items
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;

    async fn find_category(&self, id: i64) -> StoreResult<Option<Category>>;

    /// Case-insensitive name lookup
    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>>;

    async fn create_category(&self, input: &CategoryInput, now: i64) -> StoreResult<Category>;

    /// `input.image == None` keeps the current image
    async fn update_category(&self, id: i64, input: &CategoryInput)
    -> StoreResult<Option<Category>>;

    /// Returns the deleted row
    async fn delete_category(&self, id: i64) -> StoreResult<Option<Category>>;

    /// Newest first
    async fn list_menu_items(&self) -> StoreResult<Vec<MenuItem>>;

    async fn find_menu_item(&self, id: i64) -> StoreResult<Option<MenuItem>>;

    async fn create_menu_item(&self, input: &MenuItemInput, now: i64) -> StoreResult<MenuItem>;

    /// `input.image == None` keeps the current image
    async fn update_menu_item(
        &self,
        id: i64,
        input: &MenuItemInput,
    ) -> StoreResult<Option<MenuItem>>;

    /// Returns the deleted row
    async fn delete_menu_item(&self, id: i64) -> StoreResult<Option<MenuItem>>;
}
