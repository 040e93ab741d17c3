//! Item and Variation Models

use serde::{Deserialize, Serialize};

/// Menu item
///
/// When `variations` is non-empty, the item-level `price`/`weight` are
/// display defaults only; billing always uses the chosen variation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Item {
    pub id: i64,
    pub category_id: i64,
    /// Owning restaurant account (external identity provider uid)
    pub uid: String,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    /// Variations (junction table)
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub variations: Vec<Variation>,
}

impl Item {
    /// Price used for billing a given variation selection.
    ///
    /// Variations take precedence over the item-level price whenever
    /// they exist; an unknown variation name falls back to the first
    /// variation rather than the unused item-level field.
    pub fn billing_price(&self, variation: Option<&str>) -> f64 {
        if self.variations.is_empty() {
            return self.price;
        }
        let chosen = variation
            .and_then(|name| self.variations.iter().find(|v| v.name == name))
            .or_else(|| self.variations.first());
        chosen.map(|v| v.price).unwrap_or(self.price)
    }
}

/// Item variation (size/portion)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Variation {
    pub id: i64,
    pub item_id: i64,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Variation payload nested in item create/update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationInput {
    pub name: String,
    pub price: f64,
    pub weight: Option<f64>,
    pub unit: Option<String>,
}

/// Create item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreate {
    pub category_id: i64,
    pub uid: String,
    pub name: String,
    pub price: f64,
    pub weight: Option<f64>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub variations: Vec<VariationInput>,
}

/// Update item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub weight: Option<f64>,
    pub image_url: Option<String>,
    /// None = no change, Some(vec) = replace the variation set
    pub variations: Option<Vec<VariationInput>>,
}
