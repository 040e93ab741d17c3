//! # dhaba-printer
//!
//! Thermal receipt printing - low-level capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - Plain-text/ESC-POS ticket building (alignment, emphasis, column
//!   padding, separators, paper cut)
//! - The asynchronous [`ReceiptSink`] dispatch contract
//! - Network printing (TCP port 9100)
//!
//! Business logic (WHAT to print) stays in application code: KOT and
//! Bill rendering live in till-server.
//!
//! ## Example
//!
//! ```ignore
//! use dhaba_printer::{NetworkPrinter, PrintTarget, ReceiptDocument, ReceiptSink, TicketBuilder};
//!
//! // Build ticket content
//! let mut b = TicketBuilder::new(32);
//! b.align_center();
//! b.size_double();
//! b.write_line("KOT");
//! b.size_reset();
//! b.align_left();
//! b.write_line("Table: 4");
//! b.cut();
//!
//! // Send to the kitchen printer
//! let printer = NetworkPrinter::new("192.168.1.100", 9100)?;
//! let doc = ReceiptDocument::new(PrintTarget::Kitchen, b.finalize());
//! printer.send(&doc).await?;
//! ```

mod error;
mod sink;
mod ticket;

// Re-exports
pub use error::{PrintError, PrintResult};
pub use sink::{MemorySink, NetworkPrinter, PrintAck, PrintTarget, ReceiptDocument, ReceiptSink};
pub use ticket::{TicketBuilder, pad_width, text_width, truncate_width};
