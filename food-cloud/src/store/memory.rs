//! In-memory storage implementation
//!
//! Mirrors the Postgres schema closely enough for the services and the HTTP
//! layer to be exercised without a database: same seeded lookup rows, same
//! uniqueness rules, same conditional OTP updates.

use async_trait::async_trait;
use shared::models::{
    Admin, Category, CategoryInput, DeliveryPerson, MenuItem, MenuItemInput, NewAdmin, NewOrder,
    NewUser, ORDER_STATUS_DELIVERED, Order, OrderStatus, OrderView, OtpState, PaymentStatus,
    ProfileWrite, User, UserProfile,
};
use tokio::sync::RwLock;

use super::{
    CatalogStore, CredentialStore, OrderScope, OrderStore, StoreError, StoreResult,
};

/// Seeded order statuses, in id order
pub const SEED_ORDER_STATUSES: &[&str] = &["Pending", "Preparing", "Out for delivery", "Delivered"];
/// Seeded payment statuses, in id order
pub const SEED_PAYMENT_STATUSES: &[&str] = &["Pending", "Paid", "Failed", "Refunded"];

#[derive(Debug, Clone, Default)]
struct ProfileFields {
    companyname: Option<String>,
    country: Option<String>,
    street_address: Option<String>,
    address_line2: Option<String>,
    postcode: Option<String>,
    city: Option<String>,
    phone: Option<String>,
    ship_to_different_address: bool,
    order_notes: Option<String>,
}

#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    profile: ProfileFields,
}

impl UserRecord {
    fn to_profile(&self) -> UserProfile {
        let p = &self.profile;
        UserProfile {
            id: self.user.id,
            firstname: self.user.firstname.clone(),
            lastname: self.user.lastname.clone(),
            companyname: p.companyname.clone(),
            country: p.country.clone(),
            street_address: p.street_address.clone(),
            address_line2: p.address_line2.clone(),
            postcode: p.postcode.clone(),
            city: p.city.clone(),
            email: self.user.email.clone(),
            contact_email: self.user.contact_email.clone(),
            phone: p.phone.clone(),
            ship_to_different_address: p.ship_to_different_address,
            order_notes: p.order_notes.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    admins: Vec<Admin>,
    users: Vec<UserRecord>,
    order_statuses: Vec<OrderStatus>,
    payment_statuses: Vec<PaymentStatus>,
    delivery_persons: Vec<DeliveryPerson>,
    orders: Vec<Order>,
    categories: Vec<Category>,
    menu_items: Vec<MenuItem>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_mut(&mut self, email: &str) -> Option<&mut UserRecord> {
        self.users.iter_mut().find(|r| r.user.email == email)
    }

    fn order_view(&self, order: &Order, with_customer: bool) -> OrderView {
        let status = self
            .order_statuses
            .iter()
            .find(|s| s.id == order.order_status_id);
        let payment = order
            .payment_status_id
            .and_then(|id| self.payment_statuses.iter().find(|s| s.id == id));
        let courier = order
            .delivery_person_id
            .and_then(|id| self.delivery_persons.iter().find(|d| d.id == id));
        let customer = if with_customer {
            self.users.iter().find(|r| r.user.id == order.user_id)
        } else {
            None
        };

        OrderView {
            order: order.clone(),
            payment_status: payment.map(|p| p.name.clone()),
            order_status: status.map(|s| s.name.clone()),
            delivery_person_name: courier.map(|d| d.name.clone()),
            delivery_person_phone: courier.map(|d| d.phone.clone()),
            user_name: customer.map(|r| format!("{} {}", r.user.firstname, r.user.lastname)),
            contact_email: customer.and_then(|r| r.user.contact_email.clone()),
        }
    }

    fn is_delivered(&self, order: &Order) -> bool {
        self.order_statuses
            .iter()
            .any(|s| s.id == order.order_status_id && s.name == ORDER_STATUS_DELIVERED)
    }

    fn menu_item_view(&self, item: &MenuItem) -> MenuItem {
        let mut item = item.clone();
        item.category = item
            .category_id
            .and_then(|id| self.categories.iter().find(|c| c.id == id))
            .map(|c| c.name.clone());
        item
    }
}

/// In-memory store with the same seeded lookup rows as the migrations
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let tables = Tables {
            order_statuses: (1..)
                .zip(SEED_ORDER_STATUSES)
                .map(|(id, name)| OrderStatus {
                    id,
                    name: name.to_string(),
                })
                .collect(),
            payment_statuses: (1..)
                .zip(SEED_PAYMENT_STATUSES)
                .map(|(id, name)| PaymentStatus {
                    id,
                    name: name.to_string(),
                })
                .collect(),
            ..Tables::default()
        };
        Self {
            tables: RwLock::new(tables),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_admin(&self, admin: NewAdmin) -> StoreResult<Admin> {
        let mut t = self.tables.write().await;
        if t.admins.iter().any(|a| a.email == admin.email) {
            return Err(StoreError::Conflict("admins_email_key".into()));
        }
        let record = Admin {
            id: t.next_id(),
            name: admin.name,
            email: admin.email,
            password_hash: admin.password_hash,
            created_at: admin.created_at,
        };
        t.admins.push(record.clone());
        Ok(record)
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<Admin>> {
        let t = self.tables.read().await;
        Ok(t.admins.iter().find(|a| a.email == email).cloned())
    }

    async fn find_admin_by_id(&self, id: i64) -> StoreResult<Option<Admin>> {
        let t = self.tables.read().await;
        Ok(t.admins.iter().find(|a| a.id == id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|r| r.user.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".into()));
        }
        let record = User {
            id: t.next_id(),
            firstname: user.firstname,
            lastname: user.lastname,
            email: user.email,
            password_hash: user.password_hash,
            is_verified: false,
            otp: Some(user.otp),
            contact_email: None,
            created_at: user.created_at,
        };
        t.users.push(UserRecord {
            user: record.clone(),
            profile: ProfileFields::default(),
        });
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t
            .users
            .iter()
            .find(|r| r.user.email == email)
            .map(|r| r.user.clone()))
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t
            .users
            .iter()
            .find(|r| r.user.id == id)
            .map(|r| r.user.clone()))
    }

    async fn set_otp(&self, email: &str, otp: &OtpState) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        match t.user_mut(email) {
            Some(record) => {
                record.user.otp = Some(otp.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn consume_otp(
        &self,
        email: &str,
        expected_hash: &str,
        now: i64,
    ) -> StoreResult<Option<User>> {
        let mut t = self.tables.write().await;
        let Some(record) = t.user_mut(email) else {
            return Ok(None);
        };
        let matches = record
            .user
            .otp
            .as_ref()
            .is_some_and(|otp| otp.code_hash == expected_hash && otp.is_valid_at(now));
        if !matches {
            return Ok(None);
        }
        record.user.otp = None;
        record.user.is_verified = true;
        Ok(Some(record.user.clone()))
    }

    async fn reset_password(
        &self,
        email: &str,
        expected_hash: &str,
        now: i64,
        new_password_hash: &str,
    ) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let Some(record) = t.user_mut(email) else {
            return Ok(false);
        };
        let matches = record
            .user
            .otp
            .as_ref()
            .is_some_and(|otp| otp.code_hash == expected_hash && otp.is_valid_at(now));
        if !matches {
            return Ok(false);
        }
        record.user.otp = None;
        record.user.password_hash = new_password_hash.to_string();
        Ok(true)
    }

    async fn get_profile(&self, user_id: i64) -> StoreResult<Option<UserProfile>> {
        let t = self.tables.read().await;
        Ok(t
            .users
            .iter()
            .find(|r| r.user.id == user_id)
            .map(UserRecord::to_profile))
    }

    async fn update_profile(
        &self,
        user_id: i64,
        profile: &ProfileWrite,
    ) -> StoreResult<Option<UserProfile>> {
        let mut t = self.tables.write().await;
        let Some(record) = t.users.iter_mut().find(|r| r.user.id == user_id) else {
            return Ok(None);
        };
        record.user.firstname = profile.firstname.clone();
        record.user.lastname = profile.lastname.clone();
        record.user.contact_email = Some(profile.contact_email.clone());
        record.profile = ProfileFields {
            companyname: Some(profile.companyname.clone()),
            country: Some(profile.country.clone()),
            street_address: Some(profile.street_address.clone()),
            address_line2: Some(profile.address_line2.clone()),
            postcode: Some(profile.postcode.clone()),
            city: Some(profile.city.clone()),
            phone: Some(profile.phone.clone()),
            ship_to_different_address: profile.ship_to_different_address,
            order_notes: Some(profile.order_notes.clone()),
        };
        Ok(Some(record.to_profile()))
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn list_order_statuses(&self) -> StoreResult<Vec<OrderStatus>> {
        Ok(self.tables.read().await.order_statuses.clone())
    }

    async fn find_order_status(&self, id: i64) -> StoreResult<Option<OrderStatus>> {
        let t = self.tables.read().await;
        Ok(t.order_statuses.iter().find(|s| s.id == id).cloned())
    }

    async fn find_order_status_by_name(&self, name: &str) -> StoreResult<Option<OrderStatus>> {
        let t = self.tables.read().await;
        Ok(t.order_statuses.iter().find(|s| s.name == name).cloned())
    }

    async fn list_payment_statuses(&self) -> StoreResult<Vec<PaymentStatus>> {
        Ok(self.tables.read().await.payment_statuses.clone())
    }

    async fn find_payment_status(&self, id: i64) -> StoreResult<Option<PaymentStatus>> {
        let t = self.tables.read().await;
        Ok(t.payment_statuses.iter().find(|s| s.id == id).cloned())
    }

    async fn create_delivery_person(
        &self,
        name: &str,
        phone: &str,
        now: i64,
    ) -> StoreResult<DeliveryPerson> {
        let mut t = self.tables.write().await;
        let person = DeliveryPerson {
            id: t.next_id(),
            name: name.to_string(),
            phone: phone.to_string(),
            created_at: now,
        };
        t.delivery_persons.push(person.clone());
        Ok(person)
    }

    async fn list_delivery_persons(&self) -> StoreResult<Vec<DeliveryPerson>> {
        Ok(self.tables.read().await.delivery_persons.clone())
    }

    async fn find_delivery_person(&self, id: i64) -> StoreResult<Option<DeliveryPerson>> {
        let t = self.tables.read().await;
        Ok(t.delivery_persons.iter().find(|d| d.id == id).cloned())
    }

    async fn insert_order(&self, order: &NewOrder) -> StoreResult<OrderView> {
        let mut t = self.tables.write().await;
        if t.orders.iter().any(|o| o.order_id == order.order_id) {
            return Err(StoreError::Conflict("orders_order_id_key".into()));
        }
        let record = Order {
            id: t.next_id(),
            order_id: order.order_id.clone(),
            user_id: order.user_id,
            payment_id: order.payment_id.clone(),
            payment_status_id: order.payment_status_id,
            order_status_id: order.order_status_id,
            total_amount: order.total_amount,
            currency: order.currency.clone(),
            items: order.items.clone(),
            delivery_person_id: None,
            created_at: order.created_at,
        };
        t.orders.push(record.clone());
        Ok(t.order_view(&record, false))
    }

    async fn find_order(&self, order_id: &str) -> StoreResult<Option<OrderView>> {
        let t = self.tables.read().await;
        Ok(t
            .orders
            .iter()
            .find(|o| o.order_id == order_id)
            .map(|o| t.order_view(o, false)))
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        order_status_id: i64,
        delivery_person_id: Option<i64>,
    ) -> StoreResult<Option<OrderView>> {
        let mut t = self.tables.write().await;
        let Some(order) = t.orders.iter_mut().find(|o| o.order_id == order_id) else {
            return Ok(None);
        };
        order.order_status_id = order_status_id;
        order.delivery_person_id = delivery_person_id;
        let order = order.clone();
        Ok(Some(t.order_view(&order, false)))
    }

    async fn list_orders(&self, scope: OrderScope) -> StoreResult<Vec<OrderView>> {
        let t = self.tables.read().await;
        let mut orders: Vec<&Order> = t
            .orders
            .iter()
            .filter(|o| match scope {
                OrderScope::CurrentForUser(user_id) => o.user_id == user_id && !t.is_delivered(o),
                OrderScope::Current => !t.is_delivered(o),
                OrderScope::Delivered => t.is_delivered(o),
            })
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let with_customer = !matches!(scope, OrderScope::CurrentForUser(_));
        Ok(orders
            .into_iter()
            .map(|o| t.order_view(o, with_customer))
            .collect())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.tables.read().await.categories.clone())
    }

    async fn find_category(&self, id: i64) -> StoreResult<Option<Category>> {
        let t = self.tables.read().await;
        Ok(t.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        let t = self.tables.read().await;
        let needle = name.to_lowercase();
        Ok(t
            .categories
            .iter()
            .find(|c| c.name.to_lowercase() == needle)
            .cloned())
    }

    async fn create_category(&self, input: &CategoryInput, now: i64) -> StoreResult<Category> {
        let mut t = self.tables.write().await;
        let needle = input.name.to_lowercase();
        if t.categories.iter().any(|c| c.name.to_lowercase() == needle) {
            return Err(StoreError::Conflict("categories_name_lower_key".into()));
        }
        let category = Category {
            id: t.next_id(),
            name: input.name.clone(),
            image: input.image.clone(),
            created_at: now,
        };
        t.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: i64,
        input: &CategoryInput,
    ) -> StoreResult<Option<Category>> {
        let mut t = self.tables.write().await;
        let needle = input.name.to_lowercase();
        if t
            .categories
            .iter()
            .any(|c| c.id != id && c.name.to_lowercase() == needle)
        {
            return Err(StoreError::Conflict("categories_name_lower_key".into()));
        }
        let Some(category) = t.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        category.name = input.name.clone();
        if input.image.is_some() {
            category.image = input.image.clone();
        }
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: i64) -> StoreResult<Option<Category>> {
        let mut t = self.tables.write().await;
        let Some(pos) = t.categories.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        let removed = t.categories.remove(pos);
        for item in t.menu_items.iter_mut() {
            if item.category_id == Some(id) {
                item.category_id = None;
            }
        }
        Ok(Some(removed))
    }

    async fn list_menu_items(&self) -> StoreResult<Vec<MenuItem>> {
        let t = self.tables.read().await;
        let mut items: Vec<MenuItem> = t.menu_items.iter().map(|m| t.menu_item_view(m)).collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn find_menu_item(&self, id: i64) -> StoreResult<Option<MenuItem>> {
        let t = self.tables.read().await;
        Ok(t
            .menu_items
            .iter()
            .find(|m| m.id == id)
            .map(|m| t.menu_item_view(m)))
    }

    async fn create_menu_item(&self, input: &MenuItemInput, now: i64) -> StoreResult<MenuItem> {
        let mut t = self.tables.write().await;
        if let Some(category_id) = input.category_id
            && !t.categories.iter().any(|c| c.id == category_id)
        {
            return Err(StoreError::Backend(
                format!("menu_items_category_id_fkey: no category {category_id}").into(),
            ));
        }
        let item = MenuItem {
            id: t.next_id(),
            name: input.name.clone(),
            price: input.price,
            currency: input.currency.clone(),
            category_id: input.category_id,
            category: None,
            description: input.description.clone(),
            image: input.image.clone(),
            created_at: now,
        };
        t.menu_items.push(item.clone());
        Ok(t.menu_item_view(&item))
    }

    async fn update_menu_item(
        &self,
        id: i64,
        input: &MenuItemInput,
    ) -> StoreResult<Option<MenuItem>> {
        let mut t = self.tables.write().await;
        let Some(item) = t.menu_items.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        item.name = input.name.clone();
        item.price = input.price;
        item.currency = input.currency.clone();
        item.category_id = input.category_id;
        item.description = input.description.clone();
        if input.image.is_some() {
            item.image = input.image.clone();
        }
        let item = item.clone();
        Ok(Some(t.menu_item_view(&item)))
    }

    async fn delete_menu_item(&self, id: i64) -> StoreResult<Option<MenuItem>> {
        let mut t = self.tables.write().await;
        let Some(pos) = t.menu_items.iter().position(|m| m.id == id) else {
            return Ok(None);
        };
        let removed = t.menu_items.remove(pos);
        Ok(Some(t.menu_item_view(&removed)))
    }
}
