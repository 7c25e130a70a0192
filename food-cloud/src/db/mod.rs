//! Database access layer (PostgreSQL)
//!
//! Free functions per table take `&PgPool`; [`PgStore`] wires them into the
//! store traits the services depend on.

pub mod admins;
pub mod catalog;
pub mod lookups;
pub mod orders;
pub mod users;

use async_trait::async_trait;
use shared::models::{
    Admin, Category, CategoryInput, DeliveryPerson, MenuItem, MenuItemInput, NewAdmin, NewOrder,
    NewUser, OrderStatus, OrderView, OtpState, PaymentStatus, ProfileWrite, User, UserProfile,
};
use sqlx::PgPool;

use crate::store::{
    CatalogStore, CredentialStore, OrderScope, OrderStore, StoreError, StoreResult,
};

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn to_user(row: Option<users::UserRow>) -> StoreResult<Option<User>> {
    row.map(User::try_from).transpose()
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_admin(&self, admin: NewAdmin) -> StoreResult<Admin> {
        Ok(admins::create(&self.pool, &admin).await?)
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        Ok(admins::find_by_email(&self.pool, email).await?)
    }

    async fn find_admin_by_id(&self, id: i64) -> StoreResult<Option<Admin>> {
        Ok(admins::find_by_id(&self.pool, id).await?)
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        users::create(&self.pool, &user).await?.try_into()
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        to_user(users::find_by_email(&self.pool, email).await?)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        to_user(users::find_by_id(&self.pool, id).await?)
    }

    async fn set_otp(&self, email: &str, otp: &OtpState) -> StoreResult<bool> {
        Ok(users::set_otp(&self.pool, email, otp).await?)
    }

    async fn consume_otp(
        &self,
        email: &str,
        expected_hash: &str,
        now: i64,
    ) -> StoreResult<Option<User>> {
        to_user(users::consume_otp(&self.pool, email, expected_hash, now).await?)
    }

    async fn reset_password(
        &self,
        email: &str,
        expected_hash: &str,
        now: i64,
        new_password_hash: &str,
    ) -> StoreResult<bool> {
        Ok(users::reset_password(&self.pool, email, expected_hash, now, new_password_hash).await?)
    }

    async fn get_profile(&self, user_id: i64) -> StoreResult<Option<UserProfile>> {
        Ok(users::get_profile(&self.pool, user_id).await?)
    }

    async fn update_profile(
        &self,
        user_id: i64,
        profile: &ProfileWrite,
    ) -> StoreResult<Option<UserProfile>> {
        Ok(users::update_profile(&self.pool, user_id, profile).await?)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn list_order_statuses(&self) -> StoreResult<Vec<OrderStatus>> {
        Ok(lookups::list_order_statuses(&self.pool).await?)
    }

    async fn find_order_status(&self, id: i64) -> StoreResult<Option<OrderStatus>> {
        Ok(lookups::find_order_status(&self.pool, id).await?)
    }

    async fn find_order_status_by_name(&self, name: &str) -> StoreResult<Option<OrderStatus>> {
        Ok(lookups::find_order_status_by_name(&self.pool, name).await?)
    }

    async fn list_payment_statuses(&self) -> StoreResult<Vec<PaymentStatus>> {
        Ok(lookups::list_payment_statuses(&self.pool).await?)
    }

    async fn find_payment_status(&self, id: i64) -> StoreResult<Option<PaymentStatus>> {
        Ok(lookups::find_payment_status(&self.pool, id).await?)
    }

    async fn create_delivery_person(
        &self,
        name: &str,
        phone: &str,
        now: i64,
    ) -> StoreResult<DeliveryPerson> {
        Ok(lookups::create_delivery_person(&self.pool, name, phone, now).await?)
    }

    async fn list_delivery_persons(&self) -> StoreResult<Vec<DeliveryPerson>> {
        Ok(lookups::list_delivery_persons(&self.pool).await?)
    }

    async fn find_delivery_person(&self, id: i64) -> StoreResult<Option<DeliveryPerson>> {
        Ok(lookups::find_delivery_person(&self.pool, id).await?)
    }

    async fn insert_order(&self, order: &NewOrder) -> StoreResult<OrderView> {
        Ok(orders::insert(&self.pool, order).await?)
    }

    async fn find_order(&self, order_id: &str) -> StoreResult<Option<OrderView>> {
        Ok(orders::find(&self.pool, order_id).await?)
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        order_status_id: i64,
        delivery_person_id: Option<i64>,
    ) -> StoreResult<Option<OrderView>> {
        Ok(orders::update_status(&self.pool, order_id, order_status_id, delivery_person_id).await?)
    }

    async fn list_orders(&self, scope: OrderScope) -> StoreResult<Vec<OrderView>> {
        Ok(orders::list(&self.pool, scope).await?)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(catalog::list_categories(&self.pool).await?)
    }

    async fn find_category(&self, id: i64) -> StoreResult<Option<Category>> {
        Ok(catalog::find_category(&self.pool, id).await?)
    }

    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        Ok(catalog::find_category_by_name(&self.pool, name).await?)
    }

    async fn create_category(&self, input: &CategoryInput, now: i64) -> StoreResult<Category> {
        Ok(catalog::create_category(&self.pool, input, now).await?)
    }

    async fn update_category(
        &self,
        id: i64,
        input: &CategoryInput,
    ) -> StoreResult<Option<Category>> {
        Ok(catalog::update_category(&self.pool, id, input).await?)
    }

    async fn delete_category(&self, id: i64) -> StoreResult<Option<Category>> {
        Ok(catalog::delete_category(&self.pool, id).await?)
    }

    async fn list_menu_items(&self) -> StoreResult<Vec<MenuItem>> {
        Ok(catalog::list_menu_items(&self.pool).await?)
    }

    async fn find_menu_item(&self, id: i64) -> StoreResult<Option<MenuItem>> {
        Ok(catalog::find_menu_item(&self.pool, id).await?)
    }

    async fn create_menu_item(&self, input: &MenuItemInput, now: i64) -> StoreResult<MenuItem> {
        let id = catalog::create_menu_item(&self.pool, input, now).await?;
        catalog::find_menu_item(&self.pool, id)
            .await?
            .ok_or_else(|| StoreError::Backend(format!("menu item {id} vanished after insert").into()))
    }

    async fn update_menu_item(
        &self,
        id: i64,
        input: &MenuItemInput,
    ) -> StoreResult<Option<MenuItem>> {
        if !catalog::update_menu_item(&self.pool, id, input).await? {
            return Ok(None);
        }
        Ok(catalog::find_menu_item(&self.pool, id).await?)
    }

    async fn delete_menu_item(&self, id: i64) -> StoreResult<Option<MenuItem>> {
        let Some(item) = catalog::find_menu_item(&self.pool, id).await? else {
            return Ok(None);
        };
        if !catalog::delete_menu_item(&self.pool, id).await? {
            return Ok(None);
        }
        Ok(Some(item))
    }
}
