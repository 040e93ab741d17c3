//! Order and table domain types

mod snapshot;
mod types;

pub use snapshot::{TableSnapshot, TableStatus, TableView};
pub use types::{
    LineItem, MANUAL_ID_PREFIX, Order, OrderOrigin, OrderStatus, PendingCart, normalize_table_no,
};
