//! Table API 模块
//!
//! 桌台概览、桌台详情 (含 SSE 实时流) 和订单生命周期操作。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{table_no}", get(handler::get_view))
        .route("/{table_no}/events", get(handler::events))
        .route("/{table_no}/orders", post(handler::place_order))
        .route("/{table_no}/kot", post(handler::generate_kot))
        .route("/{table_no}/bill", post(handler::generate_bill))
        .route("/{table_no}/complete", post(handler::complete_order))
}
