//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`restaurant`] - 餐厅账号令牌
//! - [`categories`] - 分类管理接口
//! - [`items`] - 菜品管理接口
//! - [`tables`] - 桌台与订单操作接口

pub mod categories;
pub mod health;
pub mod items;
pub mod restaurant;
pub mod tables;

use crate::core::ServerState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Assemble the full API router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(restaurant::router())
        .merge(categories::router())
        .merge(items::router())
        .merge(tables::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
