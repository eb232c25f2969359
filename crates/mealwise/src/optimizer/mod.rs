//! Multi-criteria ranking of discount offers into a shopping basket.

mod scoring;
mod tips;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::discounts::DiscountItem;

pub use scoring::{
    distance_score, freshness_score, savings_score, ScoreBreakdown, ScoringWeights,
    FRESHNESS_HORIZON_HOURS,
};
pub use tips::{shopping_tips, TipContext};

/// A ranked offer the user could buy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseOption {
    pub item: DiscountItem,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub savings: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BasketTotals {
    pub total_cost: f64,
    pub original_cost: f64,
    pub total_savings: f64,
    pub savings_percentage: f64,
}

impl BasketTotals {
    pub fn from_purchases(purchases: &[PurchaseOption]) -> Self {
        let total_cost: f64 = purchases.iter().map(|p| p.item.discount_price).sum();
        let original_cost: f64 = purchases.iter().map(|p| p.item.original_price).sum();
        let total_savings: f64 = purchases.iter().map(|p| p.savings).sum();
        let savings_percentage = if original_cost > 0.0 {
            total_savings / original_cost * 100.0
        } else {
            0.0
        };

        Self {
            total_cost: round_cents(total_cost),
            original_cost: round_cents(original_cost),
            total_savings: round_cents(total_savings),
            savings_percentage: (savings_percentage * 10.0).round() / 10.0,
        }
    }
}

/// Limits applied when turning a ranking into a basket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasketLimits {
    pub max_items: usize,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Optimizer {
    weights: ScoringWeights,
    max_distance_km: f64,
}

impl Optimizer {
    pub fn new(max_distance_km: f64) -> Self {
        Self::with_weights(ScoringWeights::default(), max_distance_km)
    }

    pub fn with_weights(weights: ScoringWeights, max_distance_km: f64) -> Self {
        Self {
            weights,
            max_distance_km,
        }
    }

    /// Scores every item and orders by descending score. Equal scores keep
    /// their input order.
    pub fn rank(&self, items: Vec<DiscountItem>, now: DateTime<Utc>) -> Vec<PurchaseOption> {
        let mut options: Vec<PurchaseOption> = items
            .into_iter()
            .map(|item| {
                let breakdown = ScoreBreakdown::for_item(&item, self.max_distance_km, now);
                PurchaseOption {
                    score: round_cents(breakdown.total(&self.weights)),
                    savings: round_cents(item.savings()),
                    breakdown,
                    item,
                }
            })
            .collect();

        options.sort_by(|a, b| b.score.total_cmp(&a.score));
        options
    }

    /// Walks the ranking, skipping options that would break the budget,
    /// until `max_items` are chosen.
    pub fn select(&self, ranked: Vec<PurchaseOption>, limits: BasketLimits) -> Vec<PurchaseOption> {
        let mut spent = 0.0;
        let mut basket = Vec::new();

        for option in ranked {
            if basket.len() >= limits.max_items {
                break;
            }
            let price = option.item.discount_price;
            if let Some(budget) = limits.budget {
                if spent + price > budget + f64::EPSILON {
                    continue;
                }
            }
            spent += price;
            basket.push(option);
        }

        basket
    }
}

/// Orders by absolute savings, largest first; ties keep ranking order.
pub fn rank_by_savings(options: &[PurchaseOption]) -> Vec<&PurchaseOption> {
    let mut ordered: Vec<&PurchaseOption> = options.iter().collect();
    ordered.sort_by(|a, b| b.savings.total_cmp(&a.savings));
    ordered
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
