use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::optimizer::PurchaseOption;

/// A dish proposed for one of the requested meals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSuggestion {
    pub meal: String,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub discounted_items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Which suggester produced the meal ideas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSource {
    Generative,
    RuleBased,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MealIngredient {
    pub name: String,
    pub store: String,
    pub price: f64,
    pub original_price: f64,
    pub currency: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&PurchaseOption> for MealIngredient {
    fn from(option: &PurchaseOption) -> Self {
        Self {
            name: option.item.product_name.clone(),
            store: option.item.store.name.clone(),
            price: option.item.discount_price,
            original_price: option.item.original_price,
            currency: option.item.currency.clone(),
            expires_at: option.item.expires_at,
        }
    }
}

/// Everything a suggester may use: the requested meal slots, dietary
/// constraints and the discounted items picked by the optimizer, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct MealContext {
    pub meals: Vec<String>,
    pub vegetarian: bool,
    pub organic_only: bool,
    pub avoid_ingredients: Vec<String>,
    pub ingredients: Vec<MealIngredient>,
}
