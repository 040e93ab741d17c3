//! Category Model

use serde::{Deserialize, Serialize};

/// Menu category, owned by a single restaurant account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    /// Owning restaurant account (external identity provider uid)
    pub uid: String,
    pub name: String,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub uid: String,
    pub name: String,
}

/// Update category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
}
