//! Item API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/items", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        // GET takes a category id, PUT/DELETE take an item id
        .route(
            "/{key}",
            get(handler::list_by_category)
                .put(handler::update)
                .delete(handler::delete),
        )
}
