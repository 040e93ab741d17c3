//! Core order types
//!
//! 订单只有两个来源：顾客下单（digital，持久化）和服务员手工录入
//! （manual，临时记录，结账归档后删除）。状态只能前进，不能回退。

use crate::util;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix carried by staff-entered (ephemeral) order ids
pub const MANUAL_ID_PREFIX: &str = "man-";

/// Normalize a table number: strips any leading "table" prefix so
/// "table-4", "Table 4" and "4" all address the same table.
pub fn normalize_table_no(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    match lower.strip_prefix("table") {
        Some(rest) => {
            let rest = rest.trim_start_matches(['-', '_', ' ']);
            if rest.is_empty() {
                trimmed.to_string()
            } else {
                // ASCII lowercasing preserves byte offsets
                trimmed[trimmed.len() - rest.len()..].to_string()
            }
        }
        None => trimmed.to_string(),
    }
}

// ============================================================================
// Order Status
// ============================================================================

/// 订单状态 - 只能沿 Open → Kot → Billed → Completed 前进
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// 已下单，厨房尚未接到
    #[default]
    Open,
    /// 厨房单已打印
    Kot,
    /// 账单已打印
    Billed,
    /// 已归档完成
    Completed,
}

impl OrderStatus {
    /// Position along the forward-only lifecycle
    pub fn rank(&self) -> u8 {
        match self {
            Self::Open => 0,
            Self::Kot => 1,
            Self::Billed => 2,
            Self::Completed => 3,
        }
    }

    /// Whether a transition to `target` is allowed.
    ///
    /// Same-status writes are accepted (idempotent retries); only
    /// backward transitions are refused.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        target.rank() >= self.rank()
    }
}

// ============================================================================
// Order Origin
// ============================================================================

/// Where an order came from.
///
/// Digital orders are persisted by checkout; manual orders are entered
/// by staff, carry a client-generated `man-` id, and are hard-deleted
/// once folded into a completed bill. The tag makes the branch
/// exhaustive instead of relying on id-prefix sniffing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderOrigin {
    /// Persisted customer order
    Digital { id: Uuid },
    /// Ephemeral staff-entered order
    Manual { id: String },
}

impl OrderOrigin {
    /// New persisted order identity
    pub fn digital() -> Self {
        Self::Digital { id: Uuid::new_v4() }
    }

    /// New staff-entered order identity
    pub fn manual() -> Self {
        Self::Manual {
            id: format!("{}{}", MANUAL_ID_PREFIX, Uuid::new_v4()),
        }
    }

    /// Canonical string id, used as the key in completion sets and the
    /// archive
    pub fn key(&self) -> String {
        match self {
            Self::Digital { id } => id.to_string(),
            Self::Manual { id } => id.clone(),
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual { .. })
    }
}

// ============================================================================
// Line Items
// ============================================================================

/// A single line on an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Item name as it appears on tickets
    pub name: String,
    /// Unit price (non-negative)
    pub price: f64,
    /// Quantity (always positive once persisted)
    pub quantity: u32,
    /// Selected variation name, if the item has variations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
            variation: None,
        }
    }

    pub fn with_variation(mut self, variation: impl Into<String>) -> Self {
        self.variation = Some(variation.into());
        self
    }

    /// Line subtotal: price × quantity
    pub fn subtotal(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// In-memory cart for manual order entry.
///
/// Lines whose quantity reaches zero are removed outright; a
/// zero-quantity line never survives long enough to be persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingCart {
    items: Vec<LineItem>,
}

impl PendingCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line, merging quantity into an existing line with the same
    /// name and variation
    pub fn add(&mut self, item: LineItem) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.name == item.name && i.variation == item.variation)
        {
            existing.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
    }

    /// Set a line's quantity; zero removes the line entirely
    pub fn set_quantity(&mut self, name: &str, quantity: u32) {
        if quantity == 0 {
            self.items.retain(|i| i.name != name);
        } else if let Some(item) = self.items.iter_mut().find(|i| i.name == name) {
            item.quantity = quantity;
        }
    }

    /// Decrement a line by one; hitting zero removes it
    pub fn decrement(&mut self, name: &str) {
        if let Some(item) = self.items.iter_mut().find(|i| i.name == name) {
            let next = item.quantity.saturating_sub(1);
            self.set_quantity(name, next);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }
}

// ============================================================================
// Order
// ============================================================================

/// A table's order: one checkout or one round of manual entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Tagged identity (persisted vs manual)
    pub origin: OrderOrigin,
    /// Table number, normalized without any table prefix
    pub table_no: String,
    /// Ordered sequence of line items
    pub items: Vec<LineItem>,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Creation instant (UTC)
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Business-timezone display timestamp shown on tickets
    pub display_time: String,
}

impl Order {
    /// Create an order stamped with the current instant
    pub fn new(origin: OrderOrigin, table_no: impl Into<String>, items: Vec<LineItem>) -> Self {
        let now = chrono::Utc::now();
        Self {
            origin,
            table_no: table_no.into(),
            items,
            status: OrderStatus::Open,
            created_at: now,
            display_time: util::format_display_time(now.with_timezone(&util::ist_offset())),
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// Canonical string id (delegates to the origin tag)
    pub fn key(&self) -> String {
        self.origin.key()
    }

    /// Order total: Σ line subtotals
    pub fn total(&self) -> f64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Total unit count across all lines
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}
