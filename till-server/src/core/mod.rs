//! Core server infrastructure
//!
//! - [`Config`] - environment-driven configuration
//! - [`ServerState`] - shared service handles

mod config;
mod state;

pub use config::Config;
pub use state::ServerState;
