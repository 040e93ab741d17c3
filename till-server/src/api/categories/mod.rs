//! Category API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/categories", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        // GET takes an account uid, PUT/DELETE take a category id
        .route(
            "/{key}",
            get(handler::list_by_uid)
                .put(handler::update)
                .delete(handler::delete),
        )
}
