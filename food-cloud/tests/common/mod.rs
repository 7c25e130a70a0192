//! Shared harness: the full router over `MemoryStore` with a recording mailer

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use food_cloud::AppState;
use food_cloud::api::create_router;
use food_cloud::auth::SessionIssuer;
use food_cloud::email::{MailError, MailTransport, NotificationDispatcher, OutgoingMail};
use food_cloud::services::ImageStore;
use food_cloud::store::MemoryStore;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret";

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, to: &str) -> Vec<OutgoingMail> {
        self.sent().into_iter().filter(|m| m.to == to).collect()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// The six-digit code in the plain-text part of a mail
pub fn code_in(mail: &OutgoingMail) -> String {
    mail.text
        .split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() == 6)
        .expect("mail carries a 6-digit code")
        .to_string()
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub mail: Arc<RecordingTransport>,
    pub uploads: TempDir,
}

pub fn app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let mail = Arc::new(RecordingTransport::default());
    let dispatcher = Arc::new(
        NotificationDispatcher::new(
            concat!(env!("CARGO_MANIFEST_DIR"), "/templates"),
            mail.clone(),
        )
        .unwrap(),
    );
    let uploads = tempfile::tempdir().unwrap();
    let state = AppState::from_parts(
        store.clone(),
        dispatcher,
        SessionIssuer::new(JWT_SECRET, 3600),
        ImageStore::new(uploads.path()),
    );
    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        mail,
        uploads,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, token, None).await
    }

    /// Most recent code mailed to `email`
    pub fn last_code(&self, email: &str) -> String {
        let mails = self.mail.sent_to(email);
        code_in(mails.last().expect("a mail was sent"))
    }

    /// Register and log in an admin
    pub async fn admin_token(&self) -> String {
        let (status, _) = self
            .post(
                "/api/v1/admin/register",
                None,
                json!({ "name": "Root", "email": "admin@yoga.test", "password": "admin-pass" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self
            .post(
                "/api/v1/admin/login",
                None,
                json!({ "email": "admin@yoga.test", "password": "admin-pass" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Register, verify and log in a customer
    pub async fn user_token(&self, email: &str) -> String {
        let (status, _) = self
            .post(
                "/api/v1/user/register",
                None,
                json!({
                    "firstname": "Anna",
                    "lastname": "Muster",
                    "email": email,
                    "password": "secret1",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let code = self.last_code(email);
        let (status, _) = self
            .post(
                "/api/v1/user/verify-otp",
                None,
                json!({ "email": email, "otp": code }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = self
            .post(
                "/api/v1/user/login",
                None,
                json!({ "email": email, "password": "secret1" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }
}
