use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::meals::{MealSource, MealSuggestion};
use crate::optimizer::{BasketTotals, PurchaseOption};

pub const NO_DISCOUNTS_MESSAGE: &str = "No discounts found near your location";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreVisit {
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub items: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub purchases: Vec<PurchaseOption>,
    pub meals: Vec<MealSuggestion>,
    pub meal_source: MealSource,
    pub stores: Vec<StoreVisit>,
    #[serde(flatten)]
    pub totals: BasketTotals,
    pub tips: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn empty(message: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            purchases: Vec::new(),
            meals: Vec::new(),
            meal_source: MealSource::None,
            stores: Vec::new(),
            totals: BasketTotals::default(),
            tips: Vec::new(),
            message: Some(message.into()),
            generated_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty()
    }
}

/// Stores in first-appearance order of the ranked basket.
pub(crate) fn store_visits(purchases: &[PurchaseOption]) -> Vec<StoreVisit> {
    let mut visits: Vec<StoreVisit> = Vec::new();
    for option in purchases {
        match visits
            .iter_mut()
            .find(|visit| visit.name == option.item.store.name)
        {
            Some(visit) => visit.items += 1,
            None => visits.push(StoreVisit {
                name: option.item.store.name.clone(),
                address: option.item.store.address.clone(),
                distance_km: option
                    .item
                    .distance_km
                    .map(|distance| (distance * 100.0).round() / 100.0),
                items: 1,
            }),
        }
    }
    visits
}
