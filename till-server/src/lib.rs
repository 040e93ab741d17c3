//! Dhaba POS till server
//!
//! A restaurant point-of-sale backend: menu catalog management plus the
//! table/order core - live order reconciliation, table status
//! derivation, KOT/Bill generation and printing, and order completion.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod printing;
pub mod server;
pub mod utils;

pub use crate::core::{Config, ServerState};
pub use crate::server::Server;

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(None, log_dir.as_deref());
    Ok(())
}
