//! Categories and menu items
//!
//! Write payloads arrive as multipart text fields plus an optional image,
//! so the forms here carry raw strings and parsing happens in this module.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{Category, CategoryInput, MenuItem, MenuItemInput};

use super::images::ImageStore;
use crate::error::ServiceResult;
use crate::store::{CatalogStore, StoreError};
use crate::util::is_storable_amount;

const MAX_CURRENCY_LEN: usize = 10;

/// An uploaded image, not yet validated
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Menu item form fields as sent by the admin console
#[derive(Debug, Clone, Default)]
pub struct MenuItemForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    /// Absent keeps the current category on update; empty clears it
    pub category_id: Option<String>,
    pub description: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(raw: Option<&str>) -> Result<Decimal, AppError> {
    non_blank(raw)
        .and_then(|p| Decimal::from_str(p).ok())
        .filter(|p| is_storable_amount(*p))
        .ok_or_else(|| AppError::validation("Valid price required"))
}

fn parse_currency(raw: &str) -> Result<String, AppError> {
    let currency = raw.trim();
    if currency.is_empty() || currency.chars().count() > MAX_CURRENCY_LEN {
        return Err(AppError::validation("Currency is required"));
    }
    Ok(currency.to_string())
}

/// `None` for an empty field, otherwise the parsed id
fn parse_category_id(raw: &str) -> Result<Option<i64>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| AppError::validation("Invalid category id"))
}

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    images: ImageStore,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, images: ImageStore) -> Self {
        Self { store, images }
    }

    // ── Categories ──

    pub async fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.store.list_categories().await?)
    }

    pub async fn get_category(&self, id: i64) -> ServiceResult<Category> {
        self.store
            .find_category(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound).into())
    }

    pub async fn create_category(
        &self,
        name: Option<&str>,
        image: Option<ImageUpload>,
        now: i64,
    ) -> ServiceResult<Category> {
        let name = non_blank(name).ok_or_else(|| AppError::validation("Name is required"))?;
        if self.store.find_category_by_name(name).await?.is_some() {
            return Err(AppError::new(ErrorCode::CategoryNameExists).into());
        }

        let image = self.store_image(image, now).await?;
        let input = CategoryInput {
            name: name.to_string(),
            image: image.clone(),
        };
        match self.store.create_category(&input, now).await {
            Ok(category) => {
                tracing::info!(category_id = category.id, name = %category.name, "Category created");
                Ok(category)
            }
            Err(e) => {
                self.discard(image).await;
                Err(map_category_conflict(e))
            }
        }
    }

    /// Rename and optionally replace the image; the old file is removed on replace
    pub async fn update_category(
        &self,
        id: i64,
        name: Option<&str>,
        image: Option<ImageUpload>,
        now: i64,
    ) -> ServiceResult<Category> {
        let name = non_blank(name).ok_or_else(|| AppError::validation("Name is required"))?;
        let existing = self.get_category(id).await?;
        if let Some(other) = self.store.find_category_by_name(name).await?
            && other.id != id
        {
            return Err(AppError::new(ErrorCode::CategoryNameExists).into());
        }

        let image = self.store_image(image, now).await?;
        let input = CategoryInput {
            name: name.to_string(),
            image: image.clone(),
        };
        let updated = match self.store.update_category(id, &input).await {
            Ok(Some(category)) => category,
            Ok(None) => {
                self.discard(image).await;
                return Err(AppError::new(ErrorCode::CategoryNotFound).into());
            }
            Err(e) => {
                self.discard(image).await;
                return Err(map_category_conflict(e));
            }
        };
        if image.is_some()
            && let Some(old) = existing.image
        {
            self.images.remove(&old).await;
        }
        tracing::info!(category_id = id, "Category updated");
        Ok(updated)
    }

    /// Items in the category keep existing without one
    pub async fn delete_category(&self, id: i64) -> ServiceResult<Category> {
        let deleted = self
            .store
            .delete_category(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::CategoryNotFound))?;
        self.discard(deleted.image.clone()).await;
        tracing::info!(category_id = id, "Category deleted");
        Ok(deleted)
    }

    // ── Menu items ──

    pub async fn list_menu_items(&self) -> ServiceResult<Vec<MenuItem>> {
        Ok(self.store.list_menu_items().await?)
    }

    pub async fn get_menu_item(&self, id: i64) -> ServiceResult<MenuItem> {
        self.store
            .find_menu_item(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound).into())
    }

    pub async fn create_menu_item(
        &self,
        form: MenuItemForm,
        image: Option<ImageUpload>,
        now: i64,
    ) -> ServiceResult<MenuItem> {
        let name = non_blank(form.name.as_deref())
            .ok_or_else(|| AppError::validation("Name is required"))?
            .to_string();
        let price = parse_price(form.price.as_deref())?;
        let currency = parse_currency(form.currency.as_deref().unwrap_or_default())?;
        let category_id = match form.category_id.as_deref() {
            Some(raw) => parse_category_id(raw)?,
            None => None,
        };
        self.check_category(category_id).await?;

        let image = self.store_image(image, now).await?;
        let input = MenuItemInput {
            name,
            price,
            currency,
            category_id,
            description: non_blank(form.description.as_deref()).map(str::to_string),
            image: image.clone(),
        };
        match self.store.create_menu_item(&input, now).await {
            Ok(item) => {
                tracing::info!(menu_item_id = item.id, name = %item.name, "Menu item created");
                Ok(item)
            }
            Err(e) => {
                self.discard(image).await;
                Err(e.into())
            }
        }
    }

    /// Name and price are required; a blank currency or an absent category keeps the current value
    pub async fn update_menu_item(
        &self,
        id: i64,
        form: MenuItemForm,
        image: Option<ImageUpload>,
        now: i64,
    ) -> ServiceResult<MenuItem> {
        let name = non_blank(form.name.as_deref())
            .ok_or_else(|| AppError::validation("Name is required"))?
            .to_string();
        let price = parse_price(form.price.as_deref())?;
        let existing = self.get_menu_item(id).await?;

        let currency = match non_blank(form.currency.as_deref()) {
            Some(raw) => parse_currency(raw)?,
            None => existing.currency.clone(),
        };
        let category_id = match form.category_id.as_deref() {
            Some(raw) => parse_category_id(raw)?,
            None => existing.category_id,
        };
        self.check_category(category_id).await?;

        let image = self.store_image(image, now).await?;
        let input = MenuItemInput {
            name,
            price,
            currency,
            category_id,
            description: non_blank(form.description.as_deref()).map(str::to_string),
            image: image.clone(),
        };
        let updated = match self.store.update_menu_item(id, &input).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                self.discard(image).await;
                return Err(AppError::new(ErrorCode::MenuItemNotFound).into());
            }
            Err(e) => {
                self.discard(image).await;
                return Err(e.into());
            }
        };
        if image.is_some()
            && let Some(old) = existing.image
        {
            self.images.remove(&old).await;
        }
        tracing::info!(menu_item_id = id, "Menu item updated");
        Ok(updated)
    }

    pub async fn delete_menu_item(&self, id: i64) -> ServiceResult<MenuItem> {
        let deleted = self
            .store
            .delete_menu_item(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound))?;
        self.discard(deleted.image.clone()).await;
        tracing::info!(menu_item_id = id, "Menu item deleted");
        Ok(deleted)
    }

    async fn check_category(&self, category_id: Option<i64>) -> ServiceResult<()> {
        if let Some(id) = category_id
            && self.store.find_category(id).await?.is_none()
        {
            return Err(AppError::new(ErrorCode::CategoryNotFound).into());
        }
        Ok(())
    }

    async fn store_image(&self, image: Option<ImageUpload>, now: i64) -> ServiceResult<Option<String>> {
        match image {
            Some(upload) => Ok(Some(
                self.images.save(&upload.file_name, &upload.data, now).await?,
            )),
            None => Ok(None),
        }
    }

    async fn discard(&self, image: Option<String>) {
        if let Some(path) = image {
            self.images.remove(&path).await;
        }
    }
}

fn map_category_conflict(e: StoreError) -> crate::error::ServiceError {
    match e {
        StoreError::Conflict(_) => AppError::new(ErrorCode::CategoryNameExists).into(),
        other => other.into(),
    }
}
