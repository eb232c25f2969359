//! Request validation and the end-to-end planning pipeline.

mod recommendation;
mod request;
mod service;

#[cfg(test)]
mod tests;

pub use recommendation::{Recommendation, StoreVisit, NO_DISCOUNTS_MESSAGE};
pub use request::{
    LocationInput, OptimizeRequest, Preferences, ValidatedRequest, ValidationErrors,
    DEFAULT_MAX_ITEMS, MAX_ITEMS_LIMIT, MAX_SEARCH_RADIUS_KM,
};
pub use service::{MealPlanService, PlanError};
