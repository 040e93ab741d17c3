//! Order lifecycle controller
//!
//! The command side of the table-details view: generate a kitchen
//! ticket, generate a bill, complete the table. Every command reads the
//! merged state at call time, then writes through the store. There is
//! no version check between read and write; a snapshot may go stale
//! while a command awaits I/O and the last write wins.
//!
//! Side-effect order for KOT is fixed: persist the manual order, render,
//! dispatch, then write the status - so a print failure never rolls
//! back persistence.

use super::completion::CompletionTracker;
use super::reducer;
use super::store::{OrderStore, StoreResult, WriteBatch};
use crate::printing::ReceiptService;
use shared::order::{LineItem, Order, OrderOrigin, OrderStatus, TableView, normalize_table_no};
use shared::util;
use shared::{AppError, AppResult, ErrorCode};
use std::sync::Arc;

/// Result of a `generate_kot` call
#[derive(Debug, Default)]
pub struct KotOutcome {
    /// Manual order persisted from pending line items, if any
    pub manual_order: Option<Order>,
    /// KOT documents dispatched
    pub printed: usize,
    /// Orders whose status moved to KOT
    pub updated: usize,
}

/// Result of a `generate_bill` call
#[derive(Debug, Default)]
pub struct BillOutcome {
    /// Grand total across the billed orders, recomputed this call
    pub total: f64,
    /// Orders covered by the bill
    pub orders: usize,
    /// Whether the bill document reached the counter printer
    pub printed: bool,
}

/// Result of a `complete_order` call
#[derive(Debug, Default)]
pub struct CompleteOutcome {
    /// Orders archived (upserted) this call
    pub archived: usize,
    /// Manual orders hard-deleted
    pub manual_deleted: usize,
}

pub struct LifecycleController {
    store: Arc<dyn OrderStore>,
    tracker: CompletionTracker,
    receipts: ReceiptService,
}

impl LifecycleController {
    pub fn new(
        store: Arc<dyn OrderStore>,
        tracker: CompletionTracker,
        receipts: ReceiptService,
    ) -> Self {
        Self {
            store,
            tracker,
            receipts,
        }
    }

    /// Derived view for one table, computed from the current snapshot
    pub async fn current_view(&self, table_no: &str) -> StoreResult<TableView> {
        let table_no = normalize_table_no(table_no);
        let snapshot = self.store.snapshot(&table_no).await?;
        Ok(reducer::reduce(
            &table_no,
            &snapshot,
            &self.tracker.ids(),
            None,
            util::ist_now(),
        ))
    }

    /// Merged active orders, excluding anything completed by set or by
    /// stored status
    async fn active_orders(&self, table_no: &str) -> StoreResult<Vec<Order>> {
        let snapshot = self.store.snapshot(table_no).await?;
        let mut orders = reducer::merge_orders(&snapshot, &self.tracker.ids());
        orders.retain(|o| o.status != OrderStatus::Completed);
        Ok(orders)
    }

    /// Persist a customer checkout as a digital order
    pub async fn place_order(&self, table_no: &str, items: Vec<LineItem>) -> AppResult<Order> {
        let table_no = normalize_table_no(table_no);
        let items = validate_line_items(items)?;
        let order = Order::new(OrderOrigin::digital(), table_no.as_str(), items);

        let mut batch = WriteBatch::new();
        batch.put_digital(order.clone());
        self.store.apply(batch).await?;

        tracing::info!(order_id = %order.key(), table_no = %table_no, "Order placed");
        Ok(order)
    }

    /// Generate kitchen order tickets for a table.
    ///
    /// Pending line items (manual staff entry) are persisted first as a
    /// new manual order already in KOT state. Then every un-billed,
    /// un-completed order gets a KOT rendered, dispatched and its
    /// status moved to KOT. No-op when there is nothing pending and
    /// nothing un-billed.
    pub async fn generate_kot(
        &self,
        table_no: &str,
        pending: Vec<LineItem>,
    ) -> AppResult<KotOutcome> {
        let table_no = normalize_table_no(table_no);
        let pending = if pending.is_empty() {
            pending
        } else {
            validate_line_items(pending)?
        };

        let mut outcome = KotOutcome::default();
        let mut candidates = self.active_orders(&table_no).await?;
        candidates.retain(|o| o.status.rank() < OrderStatus::Billed.rank());

        if pending.is_empty() && candidates.is_empty() {
            tracing::debug!(table_no = %table_no, "Nothing to send to the kitchen");
            return Ok(outcome);
        }

        // 1. Persist the manual order before anything is printed.
        if !pending.is_empty() {
            let manual = Order::new(OrderOrigin::manual(), table_no.as_str(), pending)
                .with_status(OrderStatus::Kot);
            let mut batch = WriteBatch::new();
            batch.put_manual(manual.clone());
            self.store.apply(batch).await?;
            tracing::info!(order_id = %manual.key(), table_no = %table_no, "Manual order persisted");
            candidates.push(manual.clone());
            outcome.manual_order = Some(manual);
        }

        // 2. Per order: render → dispatch → status write. A failed
        // dispatch is logged inside the receipt service and the status
        // still advances.
        for order in &candidates {
            if self.receipts.print_kot(order).await {
                outcome.printed += 1;
            }

            let mut batch = WriteBatch::new();
            batch.set_status(order.origin.clone(), OrderStatus::Kot);
            self.store.apply(batch).await?;
            outcome.updated += 1;
        }

        tracing::info!(
            table_no = %table_no,
            printed = outcome.printed,
            updated = outcome.updated,
            "KOT generated"
        );
        Ok(outcome)
    }

    /// Generate the bill for a table.
    ///
    /// The total is recomputed from the current merged state on every
    /// call, never cached. All covered orders move to `Billed`.
    pub async fn generate_bill(&self, table_no: &str) -> AppResult<BillOutcome> {
        let table_no = normalize_table_no(table_no);
        let candidates = self.active_orders(&table_no).await?;
        if candidates.is_empty() {
            tracing::debug!(table_no = %table_no, "No active orders to bill");
            return Ok(BillOutcome::default());
        }

        let total: f64 = candidates.iter().map(Order::total).sum();

        let printed = self.receipts.print_bill(&candidates, total).await;

        let mut batch = WriteBatch::new();
        for order in &candidates {
            batch.set_status(order.origin.clone(), OrderStatus::Billed);
        }
        self.store.apply(batch).await?;

        tracing::info!(
            table_no = %table_no,
            orders = candidates.len(),
            total = format!("{:.2}", total),
            "Bill generated"
        );
        Ok(BillOutcome {
            total,
            orders: candidates.len(),
            printed,
        })
    }

    /// Complete a table: archive every active order and clear it from
    /// the live collections.
    ///
    /// One atomic batch per call: archive upserts keyed by order id,
    /// completed-status writes for digital orders, hard-deletes for
    /// manual ones. Retrying after a failure cannot duplicate archive
    /// records - the upsert is keyed, not appended.
    pub async fn complete_order(&self, table_no: &str) -> AppResult<CompleteOutcome> {
        let table_no = normalize_table_no(table_no);
        let candidates = self.active_orders(&table_no).await?;
        if candidates.is_empty() {
            tracing::debug!(table_no = %table_no, "No active orders to complete");
            return Ok(CompleteOutcome::default());
        }

        let mut outcome = CompleteOutcome::default();
        let mut batch = WriteBatch::new();
        for order in &candidates {
            batch.archive_upsert(order.clone().with_status(OrderStatus::Completed));
            outcome.archived += 1;
            if order.origin.is_manual() {
                batch.delete_manual(order.key());
                outcome.manual_deleted += 1;
            } else {
                batch.set_status(order.origin.clone(), OrderStatus::Completed);
            }
        }
        self.store.apply(batch).await?;

        tracing::info!(
            table_no = %table_no,
            archived = outcome.archived,
            manual_deleted = outcome.manual_deleted,
            "Table completed"
        );
        Ok(outcome)
    }
}

/// Reject malformed lines before any network call. Zero-quantity lines
/// are dropped rather than persisted.
fn validate_line_items(items: Vec<LineItem>) -> AppResult<Vec<LineItem>> {
    for item in &items {
        if item.name.trim().is_empty() {
            return Err(AppError::validation("Line item name must not be empty"));
        }
        if item.price < 0.0 {
            return Err(AppError::validation(format!(
                "Line item '{}' has a negative price",
                item.name
            )));
        }
    }
    let items: Vec<LineItem> = items.into_iter().filter(|i| i.quantity > 0).collect();
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::memory::MemoryOrderStore;
    use async_trait::async_trait;
    use dhaba_printer::{MemorySink, PrintAck, PrintError, PrintResult, ReceiptDocument, ReceiptSink};
    use shared::order::TableStatus;

    /// Sink that always fails, for the print-failure path
    struct FailingSink;

    #[async_trait]
    impl ReceiptSink for FailingSink {
        async fn send(&self, _doc: &ReceiptDocument) -> PrintResult<PrintAck> {
            Err(PrintError::Offline("printer unplugged".to_string()))
        }
    }

    struct Fixture {
        store: Arc<dyn OrderStore>,
        tracker: CompletionTracker,
        kitchen: Arc<MemorySink>,
        counter: Arc<MemorySink>,
        controller: LifecycleController,
    }

    impl Fixture {
        fn new() -> Self {
            let store: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::new());
            let tracker = CompletionTracker::new();
            let kitchen = Arc::new(MemorySink::new());
            let counter = Arc::new(MemorySink::new());
            let receipts = ReceiptService::new(kitchen.clone(), counter.clone(), 32);
            let controller =
                LifecycleController::new(store.clone(), tracker.clone(), receipts);
            Self {
                store,
                tracker,
                kitchen,
                counter,
                controller,
            }
        }

        /// Keep the tracker in sync without the background task
        async fn sync_tracker(&self) {
            self.tracker.refresh(self.store.as_ref()).await;
        }
    }

    fn tea(qty: u32) -> LineItem {
        LineItem::new("Tea", 10.0, qty)
    }

    fn coffee(qty: u32) -> LineItem {
        LineItem::new("Coffee", 20.0, qty)
    }

    #[tokio::test]
    async fn test_kot_noop_when_nothing_pending_or_unbilled() {
        let f = Fixture::new();
        let outcome = f.controller.generate_kot("4", vec![]).await.unwrap();
        assert!(outcome.manual_order.is_none());
        assert_eq!(outcome.printed, 0);
        assert_eq!(outcome.updated, 0);
        assert!(f.kitchen.sent().is_empty());
    }

    #[tokio::test]
    async fn test_kot_persists_manual_order_and_prints() {
        let f = Fixture::new();
        f.controller.place_order("4", vec![tea(2)]).await.unwrap();

        let outcome = f
            .controller
            .generate_kot("4", vec![coffee(1)])
            .await
            .unwrap();

        let manual = outcome.manual_order.expect("manual order persisted");
        assert!(manual.origin.is_manual());
        assert_eq!(manual.status, OrderStatus::Kot);

        // Digital order + manual order both printed and moved to KOT
        assert_eq!(outcome.printed, 2);
        assert_eq!(outcome.updated, 2);
        assert_eq!(f.kitchen.sent().len(), 2);

        let view = f.controller.current_view("4").await.unwrap();
        assert_eq!(view.orders.len(), 2);
        assert_eq!(view.status, TableStatus::Kot);
        assert!(view.kot_time.is_some());
        assert!(view.orders.iter().all(|o| o.status == OrderStatus::Kot));
    }

    #[tokio::test]
    async fn test_kot_print_failure_does_not_block_status() {
        let store: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::new());
        let tracker = CompletionTracker::new();
        let receipts =
            ReceiptService::new(Arc::new(FailingSink), Arc::new(MemorySink::new()), 32);
        let controller = LifecycleController::new(store.clone(), tracker, receipts);

        controller.place_order("4", vec![tea(2)]).await.unwrap();
        let outcome = controller.generate_kot("4", vec![]).await.unwrap();

        // Nothing printed, but the status transition stands.
        assert_eq!(outcome.printed, 0);
        assert_eq!(outcome.updated, 1);
        let view = controller.current_view("4").await.unwrap();
        assert_eq!(view.orders[0].status, OrderStatus::Kot);
    }

    #[tokio::test]
    async fn test_bill_total_is_recomputed_each_call() {
        let f = Fixture::new();
        f.controller.place_order("4", vec![tea(2)]).await.unwrap();

        let first = f.controller.generate_bill("4").await.unwrap();
        assert_eq!(first.total, 20.0);
        assert_eq!(first.orders, 1);
        assert!(first.printed);

        // More orders arrive; the next bill must see them.
        f.controller
            .place_order("4", vec![coffee(3)])
            .await
            .unwrap();
        let second = f.controller.generate_bill("4").await.unwrap();
        assert_eq!(second.total, 80.0);
        assert_eq!(second.orders, 2);
        assert_eq!(f.counter.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_bill_marks_every_order_billed() {
        let f = Fixture::new();
        f.controller.place_order("4", vec![tea(2)]).await.unwrap();
        f.controller
            .generate_kot("4", vec![coffee(1)])
            .await
            .unwrap();

        f.controller.generate_bill("4").await.unwrap();

        let view = f.controller.current_view("4").await.unwrap();
        assert!(view.orders.iter().all(|o| o.status == OrderStatus::Billed));
        assert_eq!(view.status, TableStatus::Billed);
    }

    #[tokio::test]
    async fn test_complete_archives_once_and_clears_table() {
        let f = Fixture::new();
        f.controller.place_order("4", vec![tea(2)]).await.unwrap();
        f.controller
            .generate_kot("4", vec![coffee(1)])
            .await
            .unwrap();
        f.controller.generate_bill("4").await.unwrap();

        let outcome = f.controller.complete_order("4").await.unwrap();
        assert_eq!(outcome.archived, 2);
        assert_eq!(outcome.manual_deleted, 1);

        f.sync_tracker().await;

        // Manual order gone, digital order invisible, table blank.
        let snapshot = f.store.snapshot("4").await.unwrap();
        assert!(snapshot.manual.is_empty());
        let view = f.controller.current_view("4").await.unwrap();
        assert!(view.orders.is_empty());
        assert_eq!(view.status, TableStatus::Blank);

        // Retry is a no-op: the archive is keyed, not appended.
        let retry = f.controller.complete_order("4").await.unwrap();
        assert_eq!(retry.archived, 0);
        assert_eq!(f.store.completed_ids().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_completed_order_invisible_despite_stale_status() {
        let f = Fixture::new();
        let order = f.controller.place_order("4", vec![tea(2)]).await.unwrap();

        // Archive the order without touching its stored status,
        // simulating the status write lagging behind.
        let mut batch = WriteBatch::new();
        batch.archive_upsert(order.clone().with_status(OrderStatus::Completed));
        f.store.apply(batch).await.unwrap();
        f.sync_tracker().await;

        let view = f.controller.current_view("4").await.unwrap();
        assert!(view.orders.is_empty());

        // And the lifecycle no longer touches it either.
        let outcome = f.controller.generate_kot("4", vec![]).await.unwrap();
        assert_eq!(outcome.updated, 0);
    }

    #[tokio::test]
    async fn test_place_order_rejects_bad_lines() {
        let f = Fixture::new();
        assert!(
            f.controller
                .place_order("4", vec![LineItem::new("", 10.0, 1)])
                .await
                .is_err()
        );
        assert!(
            f.controller
                .place_order("4", vec![LineItem::new("Tea", -1.0, 1)])
                .await
                .is_err()
        );
        // All-zero quantities leave nothing to persist.
        let err = f
            .controller
            .place_order("4", vec![LineItem::new("Tea", 10.0, 0)])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderEmpty);
    }

    #[tokio::test]
    async fn test_table_prefix_normalized_across_ops() {
        let f = Fixture::new();
        f.controller
            .place_order("table-4", vec![tea(1)])
            .await
            .unwrap();
        let view = f.controller.current_view("4").await.unwrap();
        assert_eq!(view.table_no, "4");
        assert_eq!(view.orders.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_quantity_lines_are_dropped_not_persisted() {
        let f = Fixture::new();
        let order = f
            .controller
            .place_order("4", vec![tea(2), LineItem::new("Coffee", 20.0, 0)])
            .await
            .unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].name, "Tea");
    }
}
