//! Menu item management (admin)
//!
//! Create and update take `multipart/form-data` with an optional `image`
//! file; JSON bodies are accepted too when no picture is sent.

use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use shared::error::ApiResponse;
use shared::models::MenuItem;

use super::ApiResult;
use super::extract::CatalogForm;
use crate::auth::AdminIdentity;
use crate::services::MenuItemForm;
use crate::state::AppState;
use crate::util::now_millis;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/getMenuItems", get(list))
        .route("/getMenuItem/{id}", get(get_by_id))
        .route("/addMenuItem", post(create))
        .route("/updateMenuItem/{id}", put(update))
        .route("/deleteMenuItem/{id}", delete(remove))
}

/// An empty catalog still succeeds, with its own message
pub(crate) fn listing_response(items: Vec<MenuItem>) -> ApiResponse<Vec<MenuItem>> {
    let message = if items.is_empty() {
        "No menu items found"
    } else {
        "Menu items fetched successfully"
    };
    ApiResponse::success_with_message(message, items)
}

fn menu_item_form(form: &mut CatalogForm) -> MenuItemForm {
    MenuItemForm {
        name: form.take("name"),
        price: form.take("price"),
        currency: form.take("currency"),
        category_id: form.take("category_id"),
        description: form.take("description"),
    }
}

pub async fn list(State(state): State<AppState>, _admin: AdminIdentity) -> ApiResult<Vec<MenuItem>> {
    let items = state.catalog_service.list_menu_items().await?;
    Ok(listing_response(items))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i64>,
) -> ApiResult<MenuItem> {
    let item = state.catalog_service.get_menu_item(id).await?;
    Ok(ApiResponse::success_with_message(
        "Menu item fetched successfully",
        item,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    mut form: CatalogForm,
) -> ApiResult<MenuItem> {
    let fields = menu_item_form(&mut form);
    let item = state
        .catalog_service
        .create_menu_item(fields, form.image.take(), now_millis())
        .await?;
    Ok(ApiResponse::created("Menu item created successfully", item))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i64>,
    mut form: CatalogForm,
) -> ApiResult<MenuItem> {
    let fields = menu_item_form(&mut form);
    let item = state
        .catalog_service
        .update_menu_item(id, fields, form.image.take(), now_millis())
        .await?;
    Ok(ApiResponse::success_with_message(
        "Menu item updated successfully",
        item,
    ))
}

pub async fn remove(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state.catalog_service.delete_menu_item(id).await?;
    Ok(ApiResponse::ok("Menu item deleted successfully"))
}
