//! Health Check Handler

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::core::ServerState;
use shared::ApiResponse;

/// GET /api/health - 健康检查
pub async fn health(State(state): State<ServerState>) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
    })))
}
