//! Unified error codes
//!
//! Error codes are shared between the till server and the dashboard
//! frontend, organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order errors
//! - 6xxx: Catalog errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values for efficient serialization and
/// cross-language compatibility (Rust, TypeScript).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been completed
    OrderAlreadyCompleted = 4002,
    /// Backward status transition rejected
    InvalidStatusTransition = 4003,
    /// Order has no line items
    OrderEmpty = 4004,

    // ==================== 6xxx: Catalog ====================
    /// Category not found
    CategoryNotFound = 6001,
    /// Category still has items
    CategoryHasItems = 6002,
    /// Item not found
    ItemNotFound = 6003,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Printer not available
    PrinterNotAvailable = 9401,
    /// Print dispatch failed
    PrintFailed = 9402,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::NotAuthenticated => "Not authenticated",
            Self::InvalidCredentials => "Invalid credentials",
            Self::TokenExpired => "Token has expired",
            Self::TokenInvalid => "Token is invalid",
            Self::OrderNotFound => "Order not found",
            Self::OrderAlreadyCompleted => "Order already completed",
            Self::InvalidStatusTransition => "Order status can only move forward",
            Self::OrderEmpty => "Order has no line items",
            Self::CategoryNotFound => "Category not found",
            Self::CategoryHasItems => "Category still has items",
            Self::ItemNotFound => "Item not found",
            Self::TableNotFound => "Table not found",
            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::PrinterNotAvailable => "Printer not available",
            Self::PrintFailed => "Print dispatch failed",
        }
    }

    /// Whether this code belongs to the 9xxx system category
    pub fn is_system(&self) -> bool {
        self.code() >= 9000
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            1001 => Self::NotAuthenticated,
            1002 => Self::InvalidCredentials,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,
            4001 => Self::OrderNotFound,
            4002 => Self::OrderAlreadyCompleted,
            4003 => Self::InvalidStatusTransition,
            4004 => Self::OrderEmpty,
            6001 => Self::CategoryNotFound,
            6002 => Self::CategoryHasItems,
            6003 => Self::ItemNotFound,
            7001 => Self::TableNotFound,
            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9401 => Self::PrinterNotAvailable,
            9402 => Self::PrintFailed,
            other => return Err(format!("Unknown error code: {}", other)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
