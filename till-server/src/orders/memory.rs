//! In-process order store
//!
//! Holds the three logical collections behind one `RwLock` so a batch
//! is applied atomically: validation runs first against the locked
//! state, mutations second, and change events are emitted only after
//! the lock is released.

use super::store::{Mutation, OrderStore, StoreError, StoreEvent, StoreResult, WriteBatch};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared::order::{Order, OrderOrigin, TableSnapshot};
use std::collections::{HashMap, HashSet};
use tokio::sync::broadcast;

/// Event channel capacity - ample for tens of tables
const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Default)]
struct Inner {
    /// Persisted customer orders per table, in creation order
    digital: HashMap<String, Vec<Order>>,
    /// Staff-entered orders per table, in creation order
    manual: HashMap<String, Vec<Order>>,
    /// Archived copies keyed by order id (an upsert set, not a log)
    archive: HashMap<String, Order>,
}

impl Inner {
    fn find_mut(&mut self, key: &str) -> Option<&mut Order> {
        self.digital
            .values_mut()
            .chain(self.manual.values_mut())
            .flat_map(|orders| orders.iter_mut())
            .find(|o| o.key() == key)
    }

    fn find(&self, key: &str) -> Option<&Order> {
        self.digital
            .values()
            .chain(self.manual.values())
            .flat_map(|orders| orders.iter())
            .find(|o| o.key() == key)
    }
}

pub struct MemoryOrderStore {
    inner: RwLock<Inner>,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: RwLock::new(Inner::default()),
            event_tx,
        }
    }

    /// Validate a batch against the current state. Runs before any
    /// mutation so a failing batch leaves the store untouched.
    fn validate(inner: &Inner, batch: &WriteBatch) -> StoreResult<()> {
        for mutation in batch.mutations() {
            if let Mutation::SetStatus { origin, status } = mutation {
                let key = origin.key();
                let order = inner
                    .find(&key)
                    .ok_or_else(|| StoreError::OrderNotFound(key.clone()))?;
                if !order.status.can_transition_to(*status) {
                    return Err(StoreError::BackwardTransition {
                        from: order.status,
                        to: *status,
                    });
                }
            }
        }
        Ok(())
    }

    /// Apply one mutation, returning the event it produces (if any)
    fn apply_one(inner: &mut Inner, mutation: Mutation) -> Option<StoreEvent> {
        match mutation {
            Mutation::PutDigital(order) => {
                let table_no = order.table_no.clone();
                inner.digital.entry(table_no.clone()).or_default().push(order);
                Some(StoreEvent::Orders { table_no })
            }
            Mutation::PutManual(order) => {
                let table_no = order.table_no.clone();
                inner.manual.entry(table_no.clone()).or_default().push(order);
                Some(StoreEvent::Manual { table_no })
            }
            Mutation::SetStatus { origin, status } => {
                // Presence and forward direction were checked in validate()
                let order = inner.find_mut(&origin.key())?;
                order.status = status;
                let table_no = order.table_no.clone();
                if origin.is_manual() {
                    Some(StoreEvent::Manual { table_no })
                } else {
                    Some(StoreEvent::Orders { table_no })
                }
            }
            Mutation::ArchiveUpsert(order) => {
                let table_no = order.table_no.clone();
                inner.archive.insert(order.key(), order);
                Some(StoreEvent::Bills { table_no })
            }
            Mutation::DeleteManual { id } => {
                for (table_no, orders) in inner.manual.iter_mut() {
                    let before = orders.len();
                    orders.retain(|o| o.key() != id);
                    if orders.len() != before {
                        return Some(StoreEvent::Manual {
                            table_no: table_no.clone(),
                        });
                    }
                }
                // Already gone - deletes are idempotent
                None
            }
        }
    }
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn snapshot(&self, table_no: &str) -> StoreResult<TableSnapshot> {
        let inner = self.inner.read();
        Ok(TableSnapshot {
            digital: inner.digital.get(table_no).cloned().unwrap_or_default(),
            manual: inner.manual.get(table_no).cloned().unwrap_or_default(),
        })
    }

    async fn table_numbers(&self) -> StoreResult<Vec<String>> {
        let inner = self.inner.read();
        let mut tables: Vec<String> = inner
            .digital
            .iter()
            .chain(inner.manual.iter())
            .filter(|(_, orders)| !orders.is_empty())
            .map(|(table_no, _)| table_no.clone())
            .collect();
        tables.sort();
        tables.dedup();
        Ok(tables)
    }

    async fn completed_ids(&self) -> StoreResult<HashSet<String>> {
        let inner = self.inner.read();
        Ok(inner.archive.keys().cloned().collect())
    }

    async fn apply(&self, batch: WriteBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let events = {
            let mut inner = self.inner.write();
            Self::validate(&inner, &batch)?;

            let mut events: Vec<StoreEvent> = Vec::new();
            for mutation in batch.mutations().iter().cloned() {
                if let Some(event) = Self::apply_one(&mut inner, mutation) {
                    events.push(event);
                }
            }
            events
        };

        // Notify outside the lock; a send error only means nobody is
        // listening right now.
        for event in events {
            let _ = self.event_tx.send(event);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{LineItem, OrderStatus};

    fn tea_order(table_no: &str) -> Order {
        Order::new(
            OrderOrigin::digital(),
            table_no,
            vec![LineItem::new("Tea", 10.0, 2)],
        )
    }

    #[tokio::test]
    async fn test_put_and_snapshot() {
        let store = MemoryOrderStore::new();
        let order = tea_order("4");

        let mut batch = WriteBatch::new();
        batch.put_digital(order.clone());
        store.apply(batch).await.unwrap();

        let snapshot = store.snapshot("4").await.unwrap();
        assert_eq!(snapshot.digital.len(), 1);
        assert_eq!(snapshot.digital[0].key(), order.key());
        assert!(snapshot.manual.is_empty());
    }

    #[tokio::test]
    async fn test_backward_transition_rejected() {
        let store = MemoryOrderStore::new();
        let order = tea_order("4");
        let origin = order.origin.clone();

        let mut batch = WriteBatch::new();
        batch.put_digital(order);
        batch.set_status(origin.clone(), OrderStatus::Billed);
        store.apply(batch).await.unwrap();

        let mut backward = WriteBatch::new();
        backward.set_status(origin, OrderStatus::Kot);
        let err = store.apply(backward).await.unwrap_err();
        assert!(matches!(err, StoreError::BackwardTransition { .. }));
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_store_untouched() {
        let store = MemoryOrderStore::new();
        let order = tea_order("4");

        let mut batch = WriteBatch::new();
        batch.put_digital(order);
        // References an order that does not exist, so the whole batch
        // must be rejected.
        batch.set_status(OrderOrigin::manual(), OrderStatus::Kot);
        assert!(store.apply(batch).await.is_err());

        let snapshot = store.snapshot("4").await.unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_archive_upsert_is_idempotent() {
        let store = MemoryOrderStore::new();
        let order = tea_order("4");

        for _ in 0..2 {
            let mut batch = WriteBatch::new();
            batch.archive_upsert(order.clone().with_status(OrderStatus::Completed));
            store.apply(batch).await.unwrap();
        }

        let completed = store.completed_ids().await.unwrap();
        assert_eq!(completed.len(), 1);
        assert!(completed.contains(&order.key()));
    }

    #[tokio::test]
    async fn test_delete_manual_is_idempotent() {
        let store = MemoryOrderStore::new();
        let order = Order::new(
            OrderOrigin::manual(),
            "4",
            vec![LineItem::new("Coffee", 20.0, 1)],
        );
        let key = order.key();

        let mut batch = WriteBatch::new();
        batch.put_manual(order);
        store.apply(batch).await.unwrap();

        for _ in 0..2 {
            let mut batch = WriteBatch::new();
            batch.delete_manual(key.clone());
            store.apply(batch).await.unwrap();
        }

        let snapshot = store.snapshot("4").await.unwrap();
        assert!(snapshot.manual.is_empty());
    }

    #[tokio::test]
    async fn test_events_emitted_per_collection() {
        let store = MemoryOrderStore::new();
        let mut rx = store.subscribe();

        let mut batch = WriteBatch::new();
        batch.put_digital(tea_order("4"));
        store.apply(batch).await.unwrap();

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, StoreEvent::Orders { ref table_no } if table_no == "4"));
    }

    #[tokio::test]
    async fn test_table_numbers_deduplicated() {
        let store = MemoryOrderStore::new();

        let mut batch = WriteBatch::new();
        batch.put_digital(tea_order("4"));
        batch.put_manual(Order::new(
            OrderOrigin::manual(),
            "4",
            vec![LineItem::new("Coffee", 20.0, 1)],
        ));
        batch.put_digital(tea_order("2"));
        store.apply(batch).await.unwrap();

        assert_eq!(store.table_numbers().await.unwrap(), vec!["2", "4"]);
    }
}
