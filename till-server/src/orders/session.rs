//! Table session
//!
//! One session per open table-details view. The session owns the store
//! subscription for its table, recomputes the derived view on every
//! relevant change event, and publishes it through a watch channel.
//! Teardown is unconditional: dropping the session cancels the
//! background task on every exit path.

use super::completion::CompletionTracker;
use super::reducer;
use super::store::OrderStore;
use shared::order::{TableView, normalize_table_no};
use shared::util;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub struct TableSession {
    table_no: String,
    view_rx: watch::Receiver<TableView>,
    cancel: CancellationToken,
}

impl TableSession {
    /// Open a session: subscribe to the store and start deriving views
    pub fn open(
        store: Arc<dyn OrderStore>,
        tracker: CompletionTracker,
        table_no: impl Into<String>,
    ) -> Self {
        let table_no = normalize_table_no(&table_no.into());
        let cancel = CancellationToken::new();
        let (view_tx, view_rx) = watch::channel(TableView::blank(table_no.as_str()));

        let task_cancel = cancel.clone();
        let task_table = table_no.clone();
        tokio::spawn(async move {
            // Subscribe before the initial read so no change can slip
            // between snapshot and subscription.
            let mut events = store.subscribe();
            let mut kot_cache: Option<String> = None;

            recompute(&store, &tracker, &task_table, &mut kot_cache, &view_tx).await;
            tracing::debug!(table_no = %task_table, "Table session opened");

            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    event = events.recv() => {
                        match event {
                            Ok(event) if event.table_no() == task_table => {
                                recompute(&store, &tracker, &task_table, &mut kot_cache, &view_tx).await;
                            }
                            Ok(_) => {}
                            Err(RecvError::Lagged(_)) => {
                                recompute(&store, &tracker, &task_table, &mut kot_cache, &view_tx).await;
                            }
                            Err(RecvError::Closed) => break,
                        }
                    }
                }
            }
            tracing::debug!(table_no = %task_table, "Table session closed");
        });

        Self {
            table_no,
            view_rx,
            cancel,
        }
    }

    pub fn table_no(&self) -> &str {
        &self.table_no
    }

    /// Latest derived view
    pub fn view(&self) -> TableView {
        self.view_rx.borrow().clone()
    }

    /// Wait for the next view change. Returns false once the session
    /// task has ended.
    pub async fn changed(&mut self) -> bool {
        self.view_rx.changed().await.is_ok()
    }

    /// Explicit teardown (Drop does the same)
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TableSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn recompute(
    store: &Arc<dyn OrderStore>,
    tracker: &CompletionTracker,
    table_no: &str,
    kot_cache: &mut Option<String>,
    view_tx: &watch::Sender<TableView>,
) {
    let snapshot = match store.snapshot(table_no).await {
        Ok(s) => s,
        Err(e) => {
            // Keep the previous view; the next event retries.
            tracing::error!(table_no = %table_no, error = %e, "Failed to read table snapshot");
            return;
        }
    };
    let view = reducer::reduce(
        table_no,
        &snapshot,
        &tracker.ids(),
        kot_cache.clone(),
        util::ist_now(),
    );
    *kot_cache = view.kot_time.clone();
    let _ = view_tx.send(view);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::memory::MemoryOrderStore;
    use crate::orders::store::WriteBatch;
    use shared::order::{LineItem, Order, OrderOrigin, OrderStatus, TableStatus};
    use std::time::Duration;

    async fn wait_for<F: Fn(&TableView) -> bool>(session: &TableSession, pred: F) -> TableView {
        for _ in 0..100 {
            let view = session.view();
            if pred(&view) {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("session never reached expected view: {:?}", session.view());
    }

    #[tokio::test]
    async fn test_session_tracks_store_changes() {
        let store: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::new());
        let tracker = CompletionTracker::new();
        let session = TableSession::open(store.clone(), tracker, "4");

        assert_eq!(session.view().status, TableStatus::Blank);

        let mut batch = WriteBatch::new();
        batch.put_manual(
            Order::new(
                OrderOrigin::manual(),
                "4",
                vec![LineItem::new("Coffee", 20.0, 1)],
            )
            .with_status(OrderStatus::Kot),
        );
        store.apply(batch).await.unwrap();

        let view = wait_for(&session, |v| v.status == TableStatus::Kot).await;
        assert_eq!(view.orders.len(), 1);
        assert!(view.kot_time.is_some());
    }

    #[tokio::test]
    async fn test_session_ignores_other_tables() {
        let store: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::new());
        let tracker = CompletionTracker::new();
        let session = TableSession::open(store.clone(), tracker, "4");

        let mut batch = WriteBatch::new();
        batch.put_digital(Order::new(
            OrderOrigin::digital(),
            "9",
            vec![LineItem::new("Tea", 10.0, 1)],
        ));
        store.apply(batch).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(session.view().orders.is_empty());
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let store: Arc<dyn OrderStore> = Arc::new(MemoryOrderStore::new());
        let tracker = CompletionTracker::new();
        let session = TableSession::open(store.clone(), tracker, "4");
        let mut view_rx = {
            // Watch the same channel the session publishes on, then
            // drop the session.
            let rx = session.view_rx.clone();
            drop(session);
            rx
        };

        // The session task must end, closing the watch sender.
        let closed = tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                if view_rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await;
        assert!(closed.is_ok(), "session task did not end on drop");
    }
}
