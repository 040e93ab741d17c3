//! Order store contract
//!
//! The order core never talks to a concrete database. It depends on
//! exactly three capabilities: read a table's snapshot, apply an atomic
//! batch of mutations, and subscribe to change notifications. Anything
//! that provides those is a valid backing store.

use async_trait::async_trait;
use shared::AppError;
use shared::order::{Order, OrderOrigin, OrderStatus, TableSnapshot};
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::broadcast;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Backward status transition: {from:?} -> {to:?}")]
    BackwardTransition { from: OrderStatus, to: OrderStatus },

    #[error("Storage error: {0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        use shared::ErrorCode;
        match err {
            StoreError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order {} not found", id))
            }
            StoreError::BackwardTransition { .. } => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, err.to_string())
            }
            StoreError::Internal(msg) => AppError::database(msg),
        }
    }
}

/// Change notification emitted after every successful write.
///
/// Carries which logical collection changed so subscribers can react
/// selectively (the completion tracker only cares about `Bills`).
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// Persisted (digital) orders changed
    Orders { table_no: String },
    /// Manual orders changed
    Manual { table_no: String },
    /// Archive (bills) set changed
    Bills { table_no: String },
}

impl StoreEvent {
    pub fn table_no(&self) -> &str {
        match self {
            Self::Orders { table_no } | Self::Manual { table_no } | Self::Bills { table_no } => {
                table_no
            }
        }
    }
}

/// A single document mutation
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Insert a persisted customer order
    PutDigital(Order),
    /// Insert an ephemeral staff-entered order
    PutManual(Order),
    /// Forward-only status write on an existing order
    SetStatus {
        origin: OrderOrigin,
        status: OrderStatus,
    },
    /// Upsert an archived copy keyed by the order id. Re-applying the
    /// same upsert is a no-op, which is what makes completion retries
    /// safe.
    ArchiveUpsert(Order),
    /// Hard-delete a manual order (no-op if already gone)
    DeleteManual { id: String },
}

/// Atomic batch of mutations: all applied or none
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    mutations: Vec<Mutation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_digital(&mut self, order: Order) {
        self.mutations.push(Mutation::PutDigital(order));
    }

    pub fn put_manual(&mut self, order: Order) {
        self.mutations.push(Mutation::PutManual(order));
    }

    pub fn set_status(&mut self, origin: OrderOrigin, status: OrderStatus) {
        self.mutations.push(Mutation::SetStatus { origin, status });
    }

    pub fn archive_upsert(&mut self, order: Order) {
        self.mutations.push(Mutation::ArchiveUpsert(order));
    }

    pub fn delete_manual(&mut self, id: impl Into<String>) {
        self.mutations.push(Mutation::DeleteManual { id: id.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }
}

/// Backing store for live orders, manual orders and the archive set
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Current snapshot of one table's two order collections
    async fn snapshot(&self, table_no: &str) -> StoreResult<TableSnapshot>;

    /// All table numbers with at least one order on record
    async fn table_numbers(&self) -> StoreResult<Vec<String>>;

    /// Ids of every archived (completed) order
    async fn completed_ids(&self) -> StoreResult<HashSet<String>>;

    /// Apply a batch atomically, then notify subscribers
    async fn apply(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Subscribe to change notifications
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
