//! Request extractors that reject with the response envelope
//!
//! The admin console posts categories as JSON and menu items as
//! `multipart/form-data` with an optional `image` file field. [`CatalogForm`]
//! flattens both into string fields plus the raw upload.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{FromRequest, Multipart, Request};
use http::{StatusCode, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::error::{AppError, ErrorCode};

use crate::services::ImageUpload;
use crate::services::images::MAX_FILE_SIZE;

/// JSON body whose rejection is an `AppError`
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e.body_text(), "Rejected JSON body");
            AppError::invalid_request(e.body_text())
        })?;
        Ok(Self(value))
    }
}

/// Name of the multipart file field carrying the image
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Default)]
pub struct CatalogForm {
    pub fields: HashMap<String, String>,
    pub image: Option<ImageUpload>,
}

impl CatalogForm {
    /// Owned copy of a field, `None` when it was not sent
    pub fn take(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::new(ErrorCode::ImageTooLarge);
    }
    AppError::with_message(ErrorCode::InvalidRequest, format!("Multipart error: {}", e.body_text()))
}

/// JSON scalars become strings; `null`, arrays and objects are dropped
fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl<S> FromRequest<S> for CatalogForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let ApiJson(body) =
                ApiJson::<serde_json::Map<String, Value>>::from_request(req, state).await?;
            let fields = body
                .into_iter()
                .filter_map(|(k, v)| scalar_to_string(v).map(|v| (k, v)))
                .collect();
            return Ok(Self {
                fields,
                image: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::invalid_request(e.body_text()))?;

        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == IMAGE_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                if data.len() > MAX_FILE_SIZE {
                    return Err(AppError::new(ErrorCode::ImageTooLarge));
                }
                // Browsers send an empty part when no file was picked
                if !data.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        data: data.to_vec(),
                    });
                }
            } else {
                let text = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, text);
            }
        }
        Ok(form)
    }
}
