//! Restaurant Account Handlers

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use crate::core::ServerState;
use shared::{ApiResponse, AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

/// GET /api/restaurant/:uid - 为餐厅账号签发访问令牌
///
/// 身份本身由外部身份提供方负责；这里只把已认证账号的 uid 换成
/// 本服务接受的 Bearer 令牌。
pub async fn access_token(
    State(state): State<ServerState>,
    Path(uid): Path<String>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    if uid.trim().is_empty() {
        return Err(AppError::validation("uid must not be empty"));
    }

    let access_token = state.jwt.generate_token(&uid)?;
    tracing::info!(uid = %uid, "Access token issued");

    Ok(Json(ApiResponse::success(TokenResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt.config.expiration_minutes * 60,
    })))
}
