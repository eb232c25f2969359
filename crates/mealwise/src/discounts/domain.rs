use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::Location;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    pub address: String,
    pub location: Location,
}

/// A single clearance offer at one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountItem {
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub store: Store,
    pub original_price: f64,
    pub discount_price: f64,
    pub percent_discount: f64,
    pub currency: String,
    pub expires_at: DateTime<Utc>,
    pub organic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl DiscountItem {
    pub fn savings(&self) -> f64 {
        (self.original_price - self.discount_price).max(0.0)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn hours_until_expiry(&self, now: DateTime<Utc>) -> f64 {
        (self.expires_at - now).num_minutes() as f64 / 60.0
    }

    /// Searchable text: product name plus category, lowercased.
    pub(crate) fn search_text(&self) -> String {
        match &self.category {
            Some(category) => format!("{} {}", self.product_name, category).to_lowercase(),
            None => self.product_name.to_lowercase(),
        }
    }
}

/// Percent discount derived from prices when the source does not report one.
pub(crate) fn percent_off(original: f64, discounted: f64) -> f64 {
    if original > 0.0 {
        ((original - discounted) / original * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

const ORGANIC_MARKERS: [&str; 4] = ["organic", "øko", "oeko", " bio "];

pub(crate) fn looks_organic(description: &str) -> bool {
    let padded = format!(" {} ", description.to_lowercase());
    ORGANIC_MARKERS.iter().any(|marker| padded.contains(marker))
}
