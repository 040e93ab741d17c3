//! Shared domain types for the Dhaba POS workspace
//!
//! This crate holds everything the server and printer crates agree on:
//! order and table vocabulary, menu catalog models, the unified error
//! code / response envelope, and small time/id utilities.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-export the error vocabulary at the crate root; nearly every
// downstream module wants these.
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
