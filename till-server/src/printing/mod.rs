//! Receipt rendering and dispatch
//!
//! [`renderer`] knows WHAT a KOT or Bill looks like; [`ReceiptService`]
//! routes rendered documents to the configured kitchen and counter
//! sinks.

pub mod renderer;
mod service;

pub use service::ReceiptService;
