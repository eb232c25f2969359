use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::discounts::DiscountItem;

/// Shelf life at which the freshness sub-score saturates.
pub const FRESHNESS_HORIZON_HOURS: f64 = 72.0;

/// Weights of the linear score. They sum to 1 so the total lands in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub savings: f64,
    pub distance: f64,
    pub freshness: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            savings: 0.5,
            distance: 0.3,
            freshness: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub savings: f64,
    pub distance: f64,
    pub freshness: f64,
}

impl ScoreBreakdown {
    pub fn for_item(item: &DiscountItem, max_distance_km: f64, now: DateTime<Utc>) -> Self {
        Self {
            savings: savings_score(item.percent_discount),
            distance: distance_score(item.distance_km, max_distance_km),
            freshness: freshness_score(item.hours_until_expiry(now)),
        }
    }

    pub fn total(&self, weights: &ScoringWeights) -> f64 {
        100.0
            * (weights.savings * self.savings
                + weights.distance * self.distance
                + weights.freshness * self.freshness)
    }
}

pub fn savings_score(percent_discount: f64) -> f64 {
    (percent_discount / 100.0).clamp(0.0, 1.0)
}

/// Unknown distances score neutral.
pub fn distance_score(distance_km: Option<f64>, max_distance_km: f64) -> f64 {
    match distance_km {
        Some(_) if max_distance_km <= 0.0 => 0.0,
        Some(distance) => 1.0 - (distance / max_distance_km).clamp(0.0, 1.0),
        None => 0.5,
    }
}

pub fn freshness_score(hours_until_expiry: f64) -> f64 {
    (hours_until_expiry / FRESHNESS_HORIZON_HOURS).clamp(0.0, 1.0)
}
