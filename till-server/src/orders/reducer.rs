//! Table state reducer
//!
//! A deliberately total function: every snapshot change recomputes the
//! whole view from scratch instead of patching an incremental state
//! machine. At tens of tables the recompute cost is irrelevant and the
//! absence of hidden state is worth it.

use chrono::{DateTime, FixedOffset};
use shared::order::{Order, OrderStatus, TableSnapshot, TableStatus, TableView};
use shared::util;
use std::collections::HashSet;

/// Merge the two collections into the active order list:
/// digital ++ manual, minus anything in the completion set.
///
/// An id in the completion set is invisible even if the stored status
/// has not caught up yet (double-accounting guard under eventual
/// consistency).
pub fn merge_orders(snapshot: &TableSnapshot, completed: &HashSet<String>) -> Vec<Order> {
    snapshot
        .digital
        .iter()
        .chain(snapshot.manual.iter())
        .filter(|o| !completed.contains(&o.key()))
        .cloned()
        .collect()
}

/// Fold a table's snapshot into its derived view.
///
/// Color selection is a three-way priority fold:
/// 1. any order in `Kot` → orange, capturing `now` (hour:minute, fixed
///    UTC+5:30) when no KOT time is cached yet;
/// 2. else a non-empty list where every order is `Billed` → green;
/// 3. else blank, and the cached KOT time clears.
pub fn reduce(
    table_no: &str,
    snapshot: &TableSnapshot,
    completed: &HashSet<String>,
    cached_kot_time: Option<String>,
    now: DateTime<FixedOffset>,
) -> TableView {
    let orders = merge_orders(snapshot, completed);

    let any_kot = orders.iter().any(|o| o.status == OrderStatus::Kot);
    let all_billed =
        !orders.is_empty() && orders.iter().all(|o| o.status == OrderStatus::Billed);

    let (status, kot_time) = if any_kot {
        let time = cached_kot_time.unwrap_or_else(|| util::format_kot_time(now));
        (TableStatus::Kot, Some(time))
    } else if all_billed {
        (TableStatus::Billed, cached_kot_time)
    } else {
        (TableStatus::Blank, None)
    };

    TableView {
        table_no: table_no.to_string(),
        orders,
        status,
        kot_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared::order::{LineItem, OrderOrigin};

    fn at_19_05() -> DateTime<FixedOffset> {
        util::ist_offset()
            .with_ymd_and_hms(2025, 3, 14, 19, 5, 0)
            .unwrap()
    }

    fn order(status: OrderStatus, items: Vec<LineItem>) -> Order {
        Order::new(OrderOrigin::digital(), "4", items).with_status(status)
    }

    fn manual_order(status: OrderStatus, items: Vec<LineItem>) -> Order {
        Order::new(OrderOrigin::manual(), "4", items).with_status(status)
    }

    #[test]
    fn test_any_kot_wins_regardless_of_other_statuses() {
        let snapshot = TableSnapshot {
            digital: vec![
                order(OrderStatus::Billed, vec![LineItem::new("Tea", 10.0, 1)]),
                order(OrderStatus::Kot, vec![LineItem::new("Dal", 80.0, 1)]),
                order(OrderStatus::Open, vec![LineItem::new("Roti", 12.0, 4)]),
            ],
            manual: vec![],
        };
        let view = reduce("4", &snapshot, &HashSet::new(), None, at_19_05());
        assert_eq!(view.status, TableStatus::Kot);
        assert_eq!(view.kot_time.as_deref(), Some("19:05"));
    }

    #[test]
    fn test_cached_kot_time_is_not_overwritten() {
        let snapshot = TableSnapshot {
            digital: vec![order(OrderStatus::Kot, vec![LineItem::new("Tea", 10.0, 1)])],
            manual: vec![],
        };
        let view = reduce(
            "4",
            &snapshot,
            &HashSet::new(),
            Some("18:30".to_string()),
            at_19_05(),
        );
        assert_eq!(view.kot_time.as_deref(), Some("18:30"));
    }

    #[test]
    fn test_all_billed_is_green() {
        let snapshot = TableSnapshot {
            digital: vec![order(OrderStatus::Billed, vec![LineItem::new("Tea", 10.0, 1)])],
            manual: vec![manual_order(
                OrderStatus::Billed,
                vec![LineItem::new("Coffee", 20.0, 1)],
            )],
        };
        let view = reduce("4", &snapshot, &HashSet::new(), None, at_19_05());
        assert_eq!(view.status, TableStatus::Billed);
    }

    #[test]
    fn test_empty_table_is_blank_and_clears_kot_time() {
        let view = reduce(
            "4",
            &TableSnapshot::default(),
            &HashSet::new(),
            Some("18:30".to_string()),
            at_19_05(),
        );
        assert_eq!(view.status, TableStatus::Blank);
        assert!(view.kot_time.is_none());
        assert!(view.orders.is_empty());
    }

    #[test]
    fn test_open_order_without_kot_is_blank() {
        let snapshot = TableSnapshot {
            digital: vec![order(OrderStatus::Open, vec![LineItem::new("Tea", 10.0, 1)])],
            manual: vec![],
        };
        let view = reduce("4", &snapshot, &HashSet::new(), None, at_19_05());
        assert_eq!(view.status, TableStatus::Blank);
    }

    #[test]
    fn test_completed_set_hides_stale_kot_order() {
        // The archived order still reads KOT in the store; the
        // completion set must hide it anyway.
        let stale = order(OrderStatus::Kot, vec![LineItem::new("Tea", 10.0, 1)]);
        let completed: HashSet<String> = [stale.key()].into();
        let snapshot = TableSnapshot {
            digital: vec![stale],
            manual: vec![],
        };
        let view = reduce("4", &snapshot, &completed, None, at_19_05());
        assert_eq!(view.status, TableStatus::Blank);
        assert!(view.orders.is_empty());
    }

    #[test]
    fn test_merged_list_keeps_digital_before_manual() {
        let snapshot = TableSnapshot {
            digital: vec![order(OrderStatus::Open, vec![LineItem::new("Tea", 10.0, 2)])],
            manual: vec![manual_order(
                OrderStatus::Kot,
                vec![LineItem::new("Coffee", 20.0, 1)],
            )],
        };
        let view = reduce("4", &snapshot, &HashSet::new(), None, at_19_05());
        assert_eq!(view.orders.len(), 2);
        assert!(!view.orders[0].origin.is_manual());
        assert!(view.orders[1].origin.is_manual());
        // Scenario from the dashboard: one open digital order plus one
        // manual KOT order shows orange with the KOT time set.
        assert_eq!(view.status, TableStatus::Kot);
        assert_eq!(view.kot_time.as_deref(), Some("19:05"));
    }
}
