use chrono::{DateTime, Utc};

use super::domain::DiscountItem;
use crate::geo::Location;

// English and Danish stems; retailer feeds use Danish product descriptions.
const MEAT_AND_FISH: [&str; 28] = [
    "meat", "beef", "pork", "chicken", "turkey", "lamb", "bacon", "ham", "sausage", "salami",
    "fish", "salmon", "tuna", "shrimp", "kylling", "okse", "svin", "gris", "lam", "kalv", "laks",
    "torsk", "rejer", "tun", "fisk", "pølse", "skinke", "kød",
];

/// Filters applied to raw offers before scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCriteria {
    pub max_distance_km: f64,
    pub organic_only: bool,
    pub vegetarian: bool,
    pub avoid_ingredients: Vec<String>,
}

impl MatchCriteria {
    pub fn within(max_distance_km: f64) -> Self {
        Self {
            max_distance_km,
            organic_only: false,
            vegetarian: false,
            avoid_ingredients: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscountMatcher {
    criteria: MatchCriteria,
    avoid_lowercase: Vec<String>,
}

impl DiscountMatcher {
    pub fn new(criteria: MatchCriteria) -> Self {
        let avoid_lowercase = criteria
            .avoid_ingredients
            .iter()
            .map(|ingredient| ingredient.trim().to_lowercase())
            .filter(|ingredient| !ingredient.is_empty())
            .collect();
        Self {
            criteria,
            avoid_lowercase,
        }
    }

    /// Annotates every item with its distance from `origin` and keeps the
    /// ones that satisfy the criteria, nearest first.
    pub fn select(
        &self,
        items: Vec<DiscountItem>,
        origin: Location,
        now: DateTime<Utc>,
    ) -> Vec<DiscountItem> {
        let total = items.len();
        let mut matched: Vec<DiscountItem> = items
            .into_iter()
            .map(|mut item| {
                item.distance_km = Some(origin.distance_km(&item.store.location));
                item
            })
            .filter(|item| self.accepts(item, now))
            .collect();

        matched.sort_by(|a, b| {
            a.distance_km
                .unwrap_or(f64::INFINITY)
                .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY))
        });

        tracing::debug!(total, matched = matched.len(), "matched discount offers");
        matched
    }

    fn accepts(&self, item: &DiscountItem, now: DateTime<Utc>) -> bool {
        if item
            .distance_km
            .is_some_and(|distance| distance > self.criteria.max_distance_km)
        {
            return false;
        }
        if item.is_expired(now) {
            return false;
        }
        if self.criteria.organic_only && !item.organic {
            return false;
        }

        let text = item.search_text();
        if self.criteria.vegetarian && mentions_meat_or_fish(&text) {
            return false;
        }
        !self
            .avoid_lowercase
            .iter()
            .any(|ingredient| text.contains(ingredient.as_str()))
    }
}

// Word-prefix match so "champignon" does not read as "ham".
fn mentions_meat_or_fish(text: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|word| MEAT_AND_FISH.iter().any(|meat| word.starts_with(meat)))
}
