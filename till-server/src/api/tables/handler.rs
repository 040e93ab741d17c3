//! Table API Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use validator::Validate;

use crate::auth::AuthUser;
use crate::core::ServerState;
use crate::orders::TableSession;
use shared::order::{LineItem, TableView};
use shared::{ApiResponse, AppError, AppResult};

// ==================== Payloads ====================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LineItemPayload {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    pub quantity: u32,
    pub variation: Option<String>,
}

impl From<LineItemPayload> for LineItem {
    fn from(payload: LineItemPayload) -> Self {
        let mut item = LineItem::new(payload.name, payload.price, payload.quantity);
        item.variation = payload.variation;
        item
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PlaceOrderRequest {
    #[validate(nested)]
    pub items: Vec<LineItemPayload>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct KotRequest {
    /// Pending manual line items; empty means print-only
    #[serde(default)]
    #[validate(nested)]
    pub pending: Vec<LineItemPayload>,
}

#[derive(Debug, Serialize)]
pub struct KotResponse {
    pub printed: usize,
    pub updated: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_order_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub total: f64,
    pub orders: usize,
    pub printed: bool,
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub archived: usize,
    pub manual_deleted: usize,
}

fn check<T: Validate>(payload: &T) -> AppResult<()> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))
}

// ==================== Handlers ====================

/// GET /api/tables - 全部桌台的派生视图
pub async fn list(
    State(state): State<ServerState>,
    _auth: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<TableView>>>> {
    let tables = state.store.table_numbers().await?;
    let results = futures::future::join_all(
        tables
            .iter()
            .map(|table_no| state.lifecycle.current_view(table_no)),
    )
    .await;

    let mut views = Vec::with_capacity(results.len());
    for result in results {
        views.push(result?);
    }
    Ok(Json(ApiResponse::success(views)))
}

/// GET /api/tables/:table_no - 单个桌台的派生视图
pub async fn get_view(
    State(state): State<ServerState>,
    _auth: AuthUser,
    Path(table_no): Path<String>,
) -> AppResult<Json<ApiResponse<TableView>>> {
    let view = state.lifecycle.current_view(&table_no).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// GET /api/tables/:table_no/events - 桌台视图实时流 (SSE)
///
/// 打开请求即打开一个桌台会话；客户端断开时流被丢弃，会话随之
/// 取消订阅 (所有退出路径都会释放)。
pub async fn events(
    State(state): State<ServerState>,
    _auth: AuthUser,
    Path(table_no): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let session = TableSession::open(state.store.clone(), state.tracker.clone(), table_no);

    let stream = futures::stream::unfold((session, true), |(mut session, first)| async move {
        if !first && !session.changed().await {
            // Session task ended; close the stream.
            return None;
        }
        let view = session.view();
        let event = Event::default().json_data(&view).unwrap_or_default();
        Some((Ok::<_, Infallible>(event), (session, false)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// POST /api/tables/:table_no/orders - 顾客下单 (checkout)
pub async fn place_order(
    State(state): State<ServerState>,
    _auth: AuthUser,
    Path(table_no): Path<String>,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<Json<ApiResponse<shared::order::Order>>> {
    check(&payload)?;
    let items: Vec<LineItem> = payload.items.into_iter().map(LineItem::from).collect();
    let order = state.lifecycle.place_order(&table_no, items).await?;
    Ok(Json(ApiResponse::success(order)))
}

/// POST /api/tables/:table_no/kot - 生成厨房单
pub async fn generate_kot(
    State(state): State<ServerState>,
    _auth: AuthUser,
    Path(table_no): Path<String>,
    Json(payload): Json<KotRequest>,
) -> AppResult<Json<ApiResponse<KotResponse>>> {
    check(&payload)?;

    let pending: Vec<LineItem> = payload.pending.into_iter().map(LineItem::from).collect();
    let outcome = state.lifecycle.generate_kot(&table_no, pending).await?;
    Ok(Json(ApiResponse::success(KotResponse {
        printed: outcome.printed,
        updated: outcome.updated,
        manual_order_id: outcome.manual_order.map(|o| o.key()),
    })))
}

/// POST /api/tables/:table_no/bill - 生成账单
pub async fn generate_bill(
    State(state): State<ServerState>,
    _auth: AuthUser,
    Path(table_no): Path<String>,
) -> AppResult<Json<ApiResponse<BillResponse>>> {
    let outcome = state.lifecycle.generate_bill(&table_no).await?;
    Ok(Json(ApiResponse::success(BillResponse {
        total: outcome.total,
        orders: outcome.orders,
        printed: outcome.printed,
    })))
}

/// POST /api/tables/:table_no/complete - 结账归档
pub async fn complete_order(
    State(state): State<ServerState>,
    _auth: AuthUser,
    Path(table_no): Path<String>,
) -> AppResult<Json<ApiResponse<CompleteResponse>>> {
    let outcome = state.lifecycle.complete_order(&table_no).await?;
    Ok(Json(ApiResponse::success(CompleteResponse {
        archived: outcome.archived,
        manual_deleted: outcome.manual_deleted,
    })))
}
