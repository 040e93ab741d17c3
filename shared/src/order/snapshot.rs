//! Table snapshot and derived view types
//!
//! A [`TableSnapshot`] is the raw input the reducer sees: the two live
//! order collections for one table. The reducer folds it (together with
//! the completion set) into a [`TableView`], the single structure the
//! dashboard renders.

use super::types::Order;
use serde::{Deserialize, Serialize};

/// Raw per-table state as read from the order store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Persisted customer orders, in creation order
    pub digital: Vec<Order>,
    /// Ephemeral staff-entered orders, in creation order
    pub manual: Vec<Order>,
}

impl TableSnapshot {
    pub fn is_empty(&self) -> bool {
        self.digital.is_empty() && self.manual.is_empty()
    }
}

/// Visual status of a table, derived from its merged orders
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    /// No active orders
    #[default]
    Blank,
    /// At least one order has a kitchen ticket running (orange)
    Kot,
    /// Every active order is billed (green)
    Billed,
}

impl TableStatus {
    /// Dashboard color name for this status
    pub fn color(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Kot => "orange",
            Self::Billed => "green",
        }
    }
}

/// Derived state for one table: what the table-details view renders
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableView {
    /// Table number
    pub table_no: String,
    /// Merged active orders (digital ++ manual, completed excluded)
    pub orders: Vec<Order>,
    /// Derived status color
    pub status: TableStatus,
    /// Cached KOT display time (hour:minute), present while orange
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kot_time: Option<String>,
}

impl TableView {
    /// Blank view for a table with no activity
    pub fn blank(table_no: impl Into<String>) -> Self {
        Self {
            table_no: table_no.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors() {
        assert_eq!(TableStatus::Blank.color(), "blank");
        assert_eq!(TableStatus::Kot.color(), "orange");
        assert_eq!(TableStatus::Billed.color(), "green");
    }

    #[test]
    fn test_blank_view() {
        let view = TableView::blank("7");
        assert_eq!(view.table_no, "7");
        assert_eq!(view.status, TableStatus::Blank);
        assert!(view.orders.is_empty());
        assert!(view.kot_time.is_none());
    }
}
