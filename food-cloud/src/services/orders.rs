//! Order lifecycle
//!
//! New orders start in "Pending". Status changes are unconditional
//! overwrites driven by admins; "Delivered" splits the current and delivered
//! listings. Order ids are `ORD-<YYYYMMDD>-<6 × [A-Z0-9]>`, uniqueness is
//! enforced by the store and a colliding id is regenerated a bounded number
//! of times.

use std::sync::Arc;

use rand::Rng;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    CreateOrderRequest, DEFAULT_CURRENCY, NewOrder, ORDER_STATUS_PENDING, OrderItem, OrderView,
    UpdateOrderStatusRequest,
};

use crate::email::{DispatchMode, Notification, NotificationDispatcher};
use crate::error::ServiceResult;
use crate::store::{CredentialStore, OrderScope, OrderStore, StoreError};
use crate::util::is_storable_amount;

/// Insert attempts before giving up on order id collisions
pub const MAX_ORDER_ID_ATTEMPTS: usize = 3;
pub const MAX_CURRENCY_LEN: usize = 10;

const ORDER_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_ID_SUFFIX_LEN: usize = 6;

const AMOUNT_RULE: &str =
    "amounts must be non-negative, below 100000000 and have at most 2 decimal places";

type IdGenerator = Box<dyn Fn(i64) -> String + Send + Sync>;

/// `ORD-<UTC date of now>-<6 random chars>`
pub fn generate_order_id(now: i64) -> String {
    let date = chrono::DateTime::from_timestamp_millis(now)
        .unwrap_or_default()
        .format("%Y%m%d");
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ORDER_ID_SUFFIX_LEN)
        .map(|_| ORDER_ID_CHARSET[rng.gen_range(0..ORDER_ID_CHARSET.len())] as char)
        .collect();
    format!("ORD-{date}-{suffix}")
}

fn validate_items(items: &[OrderItem]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    for (idx, item) in items.iter().enumerate() {
        let n = idx + 1;
        if item.name.trim().is_empty() {
            return Err(AppError::validation(format!("Item {n}: name is required")));
        }
        if item.quantity <= 0 {
            return Err(AppError::validation(format!(
                "Item {n}: quantity must be positive"
            )));
        }
        if !is_storable_amount(item.price) || !is_storable_amount(item.subtotal) {
            return Err(AppError::validation(format!("Item {n}: {AMOUNT_RULE}")));
        }
    }
    Ok(())
}

fn resolve_currency(currency: Option<&str>) -> Result<String, AppError> {
    let currency = match currency.map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => DEFAULT_CURRENCY,
    };
    if currency.chars().count() > MAX_CURRENCY_LEN {
        return Err(AppError::validation(format!(
            "Currency must be at most {MAX_CURRENCY_LEN} characters"
        )));
    }
    Ok(currency.to_string())
}

pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    credentials: Arc<dyn CredentialStore>,
    dispatcher: Arc<NotificationDispatcher>,
    id_generator: IdGenerator,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        credentials: Arc<dyn CredentialStore>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            orders,
            credentials,
            dispatcher,
            id_generator: Box::new(generate_order_id),
        }
    }

    /// Replace the order id generator
    pub fn with_id_generator(
        mut self,
        generator: impl Fn(i64) -> String + Send + Sync + 'static,
    ) -> Self {
        self.id_generator = Box::new(generator);
        self
    }

    /// Persist a Pending order, then send a best-effort confirmation
    pub async fn create_order(
        &self,
        user_id: i64,
        req: CreateOrderRequest,
        now: i64,
    ) -> ServiceResult<OrderView> {
        validate_items(&req.items)?;
        if !is_storable_amount(req.total_amount) {
            return Err(AppError::validation(format!("Total amount: {AMOUNT_RULE}")).into());
        }
        let currency = resolve_currency(req.currency.as_deref())?;

        if let Some(id) = req.payment_status_id
            && self.orders.find_payment_status(id).await?.is_none()
        {
            return Err(AppError::new(ErrorCode::PaymentStatusNotFound).into());
        }
        let user = self
            .credentials
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::with_message(ErrorCode::NotAuthenticated, "User not found"))?;
        let pending = self
            .orders
            .find_order_status_by_name(ORDER_STATUS_PENDING)
            .await?
            .ok_or_else(|| {
                tracing::error!("Order status {ORDER_STATUS_PENDING:?} is missing");
                AppError::new(ErrorCode::InternalError)
            })?;

        let payment_id = req
            .payment_id
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let mut created = None;
        for attempt in 1..=MAX_ORDER_ID_ATTEMPTS {
            let new_order = NewOrder {
                order_id: (self.id_generator)(now),
                user_id,
                payment_id: payment_id.clone(),
                payment_status_id: req.payment_status_id,
                order_status_id: pending.id,
                total_amount: req.total_amount,
                currency: currency.clone(),
                items: req.items.clone(),
                created_at: now,
            };
            match self.orders.insert_order(&new_order).await {
                Ok(view) => {
                    created = Some(view);
                    break;
                }
                Err(StoreError::Conflict(_)) => {
                    tracing::warn!(
                        order_id = %new_order.order_id,
                        attempt,
                        "Order id collision, regenerating"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        let Some(order) = created else {
            tracing::error!(user_id, "No unique order id after {MAX_ORDER_ID_ATTEMPTS} attempts");
            return Err(AppError::new(ErrorCode::InternalError).into());
        };
        tracing::info!(order_id = %order.order.order_id, user_id, "Order created");

        // Order stands even if the confirmation cannot be sent
        let _ = self
            .dispatcher
            .dispatch(
                DispatchMode::BestEffort,
                user.notification_email(),
                &Notification::OrderConfirmation {
                    full_name: user.full_name(),
                    order_id: order.order.order_id.clone(),
                    total_amount: order.order.total_amount,
                    currency: order.order.currency.clone(),
                    items: order.order.items.clone(),
                },
            )
            .await;

        Ok(order)
    }

    /// Overwrite status and courier. Any transition is allowed.
    pub async fn update_status(
        &self,
        order_id: &str,
        req: UpdateOrderStatusRequest,
    ) -> ServiceResult<OrderView> {
        if self
            .orders
            .find_order_status(req.order_status_id)
            .await?
            .is_none()
        {
            return Err(AppError::new(ErrorCode::OrderStatusNotFound).into());
        }
        if let Some(id) = req.delivery_person_id
            && self.orders.find_delivery_person(id).await?.is_none()
        {
            return Err(AppError::new(ErrorCode::DeliveryPersonNotFound).into());
        }
        let order = self
            .orders
            .update_order_status(order_id, req.order_status_id, req.delivery_person_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
        tracing::info!(
            order_id = %order_id,
            status = ?order.order_status,
            delivery_person_id = ?req.delivery_person_id,
            "Order status updated"
        );
        Ok(order)
    }

    /// Non-delivered orders of one user, newest first
    pub async fn current_for_user(&self, user_id: i64) -> ServiceResult<Vec<OrderView>> {
        Ok(self
            .orders
            .list_orders(OrderScope::CurrentForUser(user_id))
            .await?)
    }

    /// All non-delivered orders with customer details, newest first
    pub async fn current_admin(&self) -> ServiceResult<Vec<OrderView>> {
        Ok(self.orders.list_orders(OrderScope::Current).await?)
    }

    /// All delivered orders with customer details, newest first
    pub async fn delivered(&self) -> ServiceResult<Vec<OrderView>> {
        Ok(self.orders.list_orders(OrderScope::Delivered).await?)
    }

    /// A current order of this user. Other users' and delivered orders are not found.
    pub async fn user_order_by_id(&self, user_id: i64, order_id: &str) -> ServiceResult<OrderView> {
        match self.orders.find_order(order_id).await? {
            Some(order) if order.order.user_id == user_id && !order.is_delivered() => Ok(order),
            _ => Err(AppError::with_message(
                ErrorCode::OrderNotFound,
                "Order not found or already delivered",
            )
            .into()),
        }
    }
}
