use serde::{Deserialize, Serialize};

use crate::discounts::MatchCriteria;
use crate::geo::Location;
use crate::optimizer::BasketLimits;

pub const MAX_SEARCH_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_MAX_ITEMS: usize = 10;
pub const MAX_ITEMS_LIMIT: usize = 50;

/// Body of `POST /api/optimize`. Every field is optional at the wire level so
/// validation can report each missing one by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizeRequest {
    #[serde(default)]
    pub location: Option<LocationInput>,
    #[serde(default)]
    pub meals: Option<Vec<String>>,
    #[serde(default)]
    pub preferences: Preferences,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LocationInput {
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lng", alias = "lon")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub organic_only: bool,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub avoid_ingredients: Vec<String>,
    #[serde(default)]
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub max_items: Option<usize>,
}

/// Human-readable messages, one per offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid request: {}", .0.join("; "))]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

/// A request that passed validation, with defaults resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub location: Location,
    pub meals: Vec<String>,
    pub criteria: MatchCriteria,
    pub limits: BasketLimits,
}

impl OptimizeRequest {
    pub fn validate(&self, default_radius_km: f64) -> Result<ValidatedRequest, ValidationErrors> {
        let mut errors = Vec::new();

        let location = match self.location {
            None => {
                errors.push("location is required".to_string());
                None
            }
            Some(LocationInput {
                latitude,
                longitude,
            }) => {
                if latitude.is_none() {
                    errors.push("location.latitude is required".to_string());
                }
                if longitude.is_none() {
                    errors.push("location.longitude is required".to_string());
                }
                // A missing coordinate is already reported; 0.0 keeps it out of the range checks.
                let candidate = Location::new(latitude.unwrap_or(0.0), longitude.unwrap_or(0.0));
                errors.extend(
                    candidate
                        .validate()
                        .into_iter()
                        .map(|message| format!("location.{message}")),
                );
                latitude.zip(longitude).map(|(lat, lng)| Location::new(lat, lng))
            }
        };

        let meals: Vec<String> = match &self.meals {
            None => {
                errors.push("meals is required".to_string());
                Vec::new()
            }
            Some(meals) if meals.is_empty() => {
                errors.push("meals must contain at least one entry".to_string());
                Vec::new()
            }
            Some(meals) => {
                for (index, meal) in meals.iter().enumerate() {
                    if meal.trim().is_empty() {
                        errors.push(format!("meals[{index}] must not be blank"));
                    }
                }
                meals.iter().map(|meal| meal.trim().to_string()).collect()
            }
        };

        let prefs = &self.preferences;
        if let Some(radius) = prefs.max_distance_km {
            if !(radius > 0.0 && radius <= MAX_SEARCH_RADIUS_KM) {
                errors.push(format!(
                    "preferences.max_distance_km must be greater than 0 and at most {MAX_SEARCH_RADIUS_KM}"
                ));
            }
        }
        if let Some(budget) = prefs.budget {
            if !(budget.is_finite() && budget > 0.0) {
                errors.push("preferences.budget must be a positive amount".to_string());
            }
        }
        if let Some(max_items) = prefs.max_items {
            if max_items == 0 || max_items > MAX_ITEMS_LIMIT {
                errors.push(format!(
                    "preferences.max_items must be between 1 and {MAX_ITEMS_LIMIT}"
                ));
            }
        }

        match location {
            Some(location) if errors.is_empty() => Ok(ValidatedRequest {
                location,
                meals,
                criteria: MatchCriteria {
                    max_distance_km: prefs.max_distance_km.unwrap_or(default_radius_km),
                    organic_only: prefs.organic_only,
                    vegetarian: prefs.vegetarian,
                    avoid_ingredients: prefs.avoid_ingredients.clone(),
                },
                limits: BasketLimits {
                    max_items: prefs.max_items.unwrap_or(DEFAULT_MAX_ITEMS),
                    budget: prefs.budget,
                },
            }),
            _ => Err(ValidationErrors(errors)),
        }
    }
}
