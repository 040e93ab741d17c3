//! Category API Handlers

use axum::Json;
use axum::extract::{Path, State};

use crate::auth::AuthUser;
use crate::core::ServerState;
use crate::db::repository::category;
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::{ApiResponse, AppError, AppResult};

/// GET /api/categories/:uid - 获取一个账号的全部分类
pub async fn list_by_uid(
    State(state): State<ServerState>,
    _auth: AuthUser,
    Path(uid): Path<String>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let categories = category::find_by_uid(&state.db.pool, &uid).await?;
    Ok(Json(ApiResponse::success(categories)))
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    auth: AuthUser,
    Json(mut payload): Json<CategoryCreate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Category name must not be empty"));
    }
    // The owning account always comes from the token, never the body
    payload.uid = auth.uid().to_string();

    let created = category::create(&state.db.pool, payload).await?;
    tracing::info!(category_id = created.id, uid = %created.uid, "Category created");
    Ok(Json(ApiResponse::success(created)))
}

/// PUT /api/categories/:id - 更新分类
pub async fn update(
    State(state): State<ServerState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    if let Some(name) = &payload.name
        && name.trim().is_empty()
    {
        return Err(AppError::validation("Category name must not be empty"));
    }

    let updated = category::update(&state.db.pool, id, payload).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /api/categories/:id - 删除分类
pub async fn delete(
    State(state): State<ServerState>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let deleted = category::delete(&state.db.pool, id).await?;
    Ok(Json(ApiResponse::success(deleted)))
}
