//! Application state for food-cloud

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use crate::BoxError;
use crate::auth::SessionIssuer;
use crate::config::Config;
use crate::db::PgStore;
use crate::email::console::ConsoleTransport;
use crate::email::smtp::SmtpTransport;
use crate::email::{MailTransport, NotificationDispatcher};
use crate::services::{CatalogService, ImageStore, OrderService, OtpService};
use crate::store::{CatalogStore, CredentialStore, OrderStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Admin and customer credentials
    pub credentials: Arc<dyn CredentialStore>,
    /// Orders plus status/payment/courier lookups
    pub orders: Arc<dyn OrderStore>,
    /// Categories and menu items
    pub catalog: Arc<dyn CatalogStore>,
    /// Session token issuer/validator
    pub sessions: SessionIssuer,
    pub otp: Arc<OtpService>,
    pub order_service: Arc<OrderService>,
    pub catalog_service: Arc<CatalogService>,
    /// Upload directory, also served under `/uploads`
    pub images: ImageStore,
    pub dispatcher: Arc<NotificationDispatcher>,
}

impl AppState {
    /// Connect to PostgreSQL, run migrations and wire the services
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let transport: Arc<dyn MailTransport> = match &config.smtp {
            Some(smtp) => {
                tracing::info!(host = %smtp.host, port = smtp.port, "Using SMTP mail transport");
                Arc::new(SmtpTransport::new(
                    smtp,
                    &config.mail_from_name,
                    &config.mail_from_address,
                )?)
            }
            None => {
                if !config.is_development() {
                    tracing::warn!("EMAIL_* not configured, mail will only be logged");
                }
                Arc::new(ConsoleTransport)
            }
        };
        let dispatcher = Arc::new(NotificationDispatcher::new(&config.template_dir, transport)?);

        let images = ImageStore::new(&config.upload_dir);
        images.ensure_dir().await?;

        let sessions = SessionIssuer::new(&config.jwt_secret, config.admin_token_ttl_secs);

        Ok(Self::from_parts(
            Arc::new(PgStore::new(pool)),
            dispatcher,
            sessions,
            images,
        ))
    }

    /// Wire the services over a single backend implementing every store trait
    pub fn from_parts<S>(
        store: Arc<S>,
        dispatcher: Arc<NotificationDispatcher>,
        sessions: SessionIssuer,
        images: ImageStore,
    ) -> Self
    where
        S: CredentialStore + OrderStore + CatalogStore + 'static,
    {
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let orders: Arc<dyn OrderStore> = store.clone();
        let catalog: Arc<dyn CatalogStore> = store;

        let otp = Arc::new(OtpService::new(
            credentials.clone(),
            dispatcher.clone(),
            sessions.clone(),
        ));
        let order_service = Arc::new(OrderService::new(
            orders.clone(),
            credentials.clone(),
            dispatcher.clone(),
        ));
        let catalog_service = Arc::new(CatalogService::new(catalog.clone(), images.clone()));

        Self {
            credentials,
            orders,
            catalog,
            sessions,
            otp,
            order_service,
            catalog_service,
            images,
            dispatcher,
        }
    }
}
