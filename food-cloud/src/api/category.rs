//! Category management (admin)

use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use shared::error::ApiResponse;
use shared::models::Category;

use super::ApiResult;
use super::extract::CatalogForm;
use crate::auth::AdminIdentity;
use crate::state::AppState;
use crate::util::now_millis;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/getCategories", get(list))
        .route("/getCategory/{id}", get(get_by_id))
        .route("/addCategory", post(create))
        .route("/updateCategory/{id}", put(update))
        .route("/deleteCategory/{id}", delete(remove))
}

/// GET /categories/getCategories
pub async fn list(State(state): State<AppState>, _admin: AdminIdentity) -> ApiResult<Vec<Category>> {
    let categories = state.catalog_service.list_categories().await?;
    Ok(ApiResponse::success_with_message(
        "Categories fetched successfully",
        categories,
    ))
}

/// GET /categories/getCategory/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Category> {
    let category = state.catalog_service.get_category(id).await?;
    Ok(ApiResponse::success_with_message(
        "Category fetched successfully",
        category,
    ))
}

/// POST /categories/addCategory (JSON or multipart with `image`)
pub async fn create(
    State(state): State<AppState>,
    admin: AdminIdentity,
    mut form: CatalogForm,
) -> ApiResult<Category> {
    let name = form.take("name");
    let category = state
        .catalog_service
        .create_category(name.as_deref(), form.image.take(), now_millis())
        .await?;
    tracing::debug!(admin_id = admin.admin_id, category_id = category.id, "Category added");
    Ok(ApiResponse::created("Category created successfully", category))
}

/// PUT /categories/updateCategory/{id}
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i64>,
    mut form: CatalogForm,
) -> ApiResult<Category> {
    let name = form.take("name");
    let category = state
        .catalog_service
        .update_category(id, name.as_deref(), form.image.take(), now_millis())
        .await?;
    Ok(ApiResponse::success_with_message(
        "Category updated successfully",
        category,
    ))
}

/// DELETE /categories/deleteCategory/{id}
pub async fn remove(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Category> {
    let deleted = state.catalog_service.delete_category(id).await?;
    Ok(ApiResponse::success_with_message(
        "Category deleted successfully",
        deleted,
    ))
}
