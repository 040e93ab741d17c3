//! Item API Handlers

use axum::Json;
use axum::extract::{Path, State};

use crate::auth::AuthUser;
use crate::core::ServerState;
use crate::db::repository::{category, item};
use shared::models::{Item, ItemCreate, ItemUpdate, VariationInput};
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

fn validate_variations(variations: &[VariationInput]) -> AppResult<()> {
    for variation in variations {
        if variation.name.trim().is_empty() {
            return Err(AppError::validation("Variation name must not be empty"));
        }
        if variation.price < 0.0 {
            return Err(AppError::validation(format!(
                "Variation '{}' has a negative price",
                variation.name
            )));
        }
    }
    Ok(())
}

/// GET /api/items/:category_id - 获取分类下的全部菜品
pub async fn list_by_category(
    State(state): State<ServerState>,
    _auth: AuthUser,
    Path(category_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<Item>>>> {
    let items = item::find_by_category(&state.db.pool, category_id).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// POST /api/items - 创建菜品
pub async fn create(
    State(state): State<ServerState>,
    auth: AuthUser,
    Json(mut payload): Json<ItemCreate>,
) -> AppResult<Json<ApiResponse<Item>>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Item name must not be empty"));
    }
    if payload.price < 0.0 {
        return Err(AppError::validation("Item price must not be negative"));
    }
    validate_variations(&payload.variations)?;
    payload.uid = auth.uid().to_string();

    // Reject before writing when the category does not exist
    if category::find_by_id(&state.db.pool, payload.category_id)
        .await?
        .is_none()
    {
        return Err(AppError::with_message(
            ErrorCode::CategoryNotFound,
            format!("Category {} not found", payload.category_id),
        ));
    }

    let created = item::create(&state.db.pool, payload).await?;
    tracing::info!(item_id = created.id, uid = %created.uid, "Item created");
    Ok(Json(ApiResponse::success(created)))
}

/// PUT /api/items/:id - 更新菜品
pub async fn update(
    State(state): State<ServerState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<ItemUpdate>,
) -> AppResult<Json<ApiResponse<Item>>> {
    if let Some(name) = &payload.name
        && name.trim().is_empty()
    {
        return Err(AppError::validation("Item name must not be empty"));
    }
    if let Some(price) = payload.price
        && price < 0.0
    {
        return Err(AppError::validation("Item price must not be negative"));
    }
    if let Some(variations) = &payload.variations {
        validate_variations(variations)?;
    }

    let updated = item::update(&state.db.pool, id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /api/items/:id - 删除菜品
pub async fn delete(
    State(state): State<ServerState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let deleted = item::delete(&state.db.pool, id).await?;
    Ok(Json(ApiResponse::success(deleted)))
}
