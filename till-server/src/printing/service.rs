//! Receipt dispatch service
//!
//! Routes rendered documents to the kitchen and counter sinks. Dispatch
//! failures are logged and swallowed: a failed print never blocks or
//! reverses the status transition that triggered it.

use super::renderer;
use crate::core::Config;
use dhaba_printer::{
    MemorySink, NetworkPrinter, PrintTarget, ReceiptDocument, ReceiptSink,
};
use shared::order::Order;
use shared::{AppError, AppResult, ErrorCode};
use std::sync::Arc;

#[derive(Clone)]
pub struct ReceiptService {
    kitchen: Arc<dyn ReceiptSink>,
    counter: Arc<dyn ReceiptSink>,
    width: usize,
}

impl ReceiptService {
    pub fn new(kitchen: Arc<dyn ReceiptSink>, counter: Arc<dyn ReceiptSink>, width: usize) -> Self {
        Self {
            kitchen,
            counter,
            width,
        }
    }

    /// Build sinks from configuration. A target without a configured
    /// address gets an in-memory sink so development machines work
    /// without hardware.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let kitchen = build_sink("kitchen", config.kitchen_printer_addr.as_deref())?;
        let counter = build_sink("counter", config.counter_printer_addr.as_deref())?;
        Ok(Self::new(kitchen, counter, config.receipt_width))
    }

    /// Render and dispatch a KOT for one order. Returns whether the
    /// physical dispatch succeeded.
    pub async fn print_kot(&self, order: &Order) -> bool {
        let content = renderer::render_kot(order, self.width);
        let doc = ReceiptDocument::new(PrintTarget::Kitchen, content);
        self.dispatch(&self.kitchen, &doc, Some(&order.key())).await
    }

    /// Render and dispatch one bill covering the supplied orders
    pub async fn print_bill(&self, orders: &[Order], total: f64) -> bool {
        let content = renderer::render_bill(orders, total, self.width);
        let doc = ReceiptDocument::new(PrintTarget::Counter, content);
        self.dispatch(&self.counter, &doc, None).await
    }

    async fn dispatch(
        &self,
        sink: &Arc<dyn ReceiptSink>,
        doc: &ReceiptDocument,
        order_key: Option<&str>,
    ) -> bool {
        match sink.send(doc).await {
            Ok(ack) => {
                tracing::info!(
                    target = ?doc.target,
                    order_id = order_key.unwrap_or("-"),
                    bytes = ack.bytes_sent,
                    "Receipt dispatched"
                );
                true
            }
            Err(e) => {
                // Logged only: the caller's status transition stands
                // even when the paper never came out.
                tracing::error!(
                    target = ?doc.target,
                    order_id = order_key.unwrap_or("-"),
                    error = %e,
                    "Receipt dispatch failed"
                );
                false
            }
        }
    }
}

fn build_sink(label: &str, addr: Option<&str>) -> AppResult<Arc<dyn ReceiptSink>> {
    match addr {
        Some(addr) => {
            let printer = NetworkPrinter::from_addr(addr).map_err(|e| {
                AppError::with_message(
                    ErrorCode::PrinterNotAvailable,
                    format!("{} printer: {}", label, e),
                )
            })?;
            tracing::info!(printer = label, addr = %addr, "Network printer configured");
            Ok(Arc::new(printer))
        }
        None => {
            tracing::warn!(
                printer = label,
                "No printer address configured, receipts buffered in memory"
            );
            Ok(Arc::new(MemorySink::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{LineItem, OrderOrigin};

    #[tokio::test]
    async fn test_kot_goes_to_kitchen_sink() {
        let kitchen = Arc::new(MemorySink::new());
        let counter = Arc::new(MemorySink::new());
        let service = ReceiptService::new(kitchen.clone(), counter.clone(), 32);

        let order = Order::new(
            OrderOrigin::digital(),
            "4",
            vec![LineItem::new("Tea", 10.0, 2)],
        );
        assert!(service.print_kot(&order).await);

        assert_eq!(kitchen.sent().len(), 1);
        assert!(counter.sent().is_empty());
        assert_eq!(kitchen.sent()[0].target, PrintTarget::Kitchen);
    }

    #[tokio::test]
    async fn test_bill_goes_to_counter_sink() {
        let kitchen = Arc::new(MemorySink::new());
        let counter = Arc::new(MemorySink::new());
        let service = ReceiptService::new(kitchen.clone(), counter.clone(), 32);

        let orders = vec![Order::new(
            OrderOrigin::digital(),
            "4",
            vec![LineItem::new("Tea", 10.0, 2)],
        )];
        assert!(service.print_bill(&orders, 20.0).await);

        assert!(kitchen.sent().is_empty());
        assert_eq!(counter.sent().len(), 1);
    }

    #[test]
    fn test_bad_printer_address_is_a_config_error() {
        let mut config = Config::with_overrides(":memory:", 0);
        config.kitchen_printer_addr = Some("not-an-address".to_string());
        assert!(ReceiptService::from_config(&config).is_err());
    }
}
