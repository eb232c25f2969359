use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::recommendation::{store_visits, Recommendation, NO_DISCOUNTS_MESSAGE};
use super::request::{OptimizeRequest, ValidationErrors};
use crate::discounts::{DiscountMatcher, DiscountSource, DiscountSourceError};
use crate::meals::{
    MealContext, MealIngredient, MealSource, MealSuggester, MealSuggestion,
    RuleBasedMealSuggester,
};
use crate::optimizer::{shopping_tips, BasketTotals, Optimizer, TipContext};

const FALLBACK_MEALS_TIP: &str =
    "Meal ideas were assembled from your best-value items because the meal assistant was unavailable.";

/// Service composing the discount source, matcher, optimizer and meal
/// suggesters into one recommendation per request.
pub struct MealPlanService<S> {
    source: Arc<S>,
    suggester: Option<Arc<dyn MealSuggester>>,
    fallback: RuleBasedMealSuggester,
    default_radius_km: f64,
}

impl<S> MealPlanService<S>
where
    S: DiscountSource + 'static,
{
    pub fn new(source: Arc<S>, default_radius_km: f64) -> Self {
        Self {
            source,
            suggester: None,
            fallback: RuleBasedMealSuggester::new(),
            default_radius_km,
        }
    }

    pub fn with_suggester(mut self, suggester: Arc<dyn MealSuggester>) -> Self {
        self.suggester = Some(suggester);
        self
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn meal_mode(&self) -> &'static str {
        match &self.suggester {
            Some(suggester) => suggester.describe(),
            None => self.fallback.describe(),
        }
    }

    pub fn default_radius_km(&self) -> f64 {
        self.default_radius_km
    }

    pub async fn plan(&self, request: OptimizeRequest) -> Result<Recommendation, PlanError> {
        self.plan_at(request, Utc::now()).await
    }

    /// Validate, fetch, match, rank, suggest meals. `now` anchors expiry and
    /// freshness checks.
    pub async fn plan_at(
        &self,
        request: OptimizeRequest,
        now: DateTime<Utc>,
    ) -> Result<Recommendation, PlanError> {
        let validated = request.validate(self.default_radius_km)?;
        let radius_km = validated.criteria.max_distance_km;

        let raw = self.source.fetch(validated.location, radius_km).await?;
        let matcher = DiscountMatcher::new(validated.criteria.clone());
        let matched = matcher.select(raw, validated.location, now);

        if matched.is_empty() {
            tracing::info!(
                latitude = validated.location.latitude,
                longitude = validated.location.longitude,
                radius_km,
                "no matching discounts"
            );
            return Ok(Recommendation::empty(NO_DISCOUNTS_MESSAGE, now));
        }

        let optimizer = Optimizer::new(radius_km);
        let ranked = optimizer.rank(matched, now);
        let purchases = optimizer.select(ranked, validated.limits);
        if purchases.is_empty() {
            return Ok(Recommendation::empty(
                "No discounted items fit within your budget",
                now,
            ));
        }

        let totals = BasketTotals::from_purchases(&purchases);
        let mut tips = shopping_tips(
            &purchases,
            &totals,
            TipContext {
                organic_only: validated.criteria.organic_only,
                budget: validated.limits.budget,
                now,
            },
        );

        let context = MealContext {
            meals: validated.meals.clone(),
            vegetarian: validated.criteria.vegetarian,
            organic_only: validated.criteria.organic_only,
            avoid_ingredients: validated.criteria.avoid_ingredients.clone(),
            ingredients: purchases.iter().map(MealIngredient::from).collect(),
        };
        let (meals, meal_source) = self.suggest_meals(&context).await;
        if meal_source == MealSource::RuleBased && self.suggester.is_some() {
            tips.push(FALLBACK_MEALS_TIP.to_string());
        }

        tracing::info!(
            purchases = purchases.len(),
            meals = meals.len(),
            total_savings = totals.total_savings,
            ?meal_source,
            "built recommendation"
        );

        Ok(Recommendation {
            stores: store_visits(&purchases),
            purchases,
            meals,
            meal_source,
            totals,
            tips,
            message: None,
            generated_at: now,
        })
    }

    async fn suggest_meals(&self, context: &MealContext) -> (Vec<MealSuggestion>, MealSource) {
        if let Some(suggester) = &self.suggester {
            match suggester.suggest(context).await {
                Ok(meals) => return (meals, MealSource::Generative),
                Err(err) => {
                    tracing::warn!(error = %err, "meal assistant failed, using rule-based ideas");
                }
            }
        }

        let meals = self.fallback.suggest_now(context);
        let source = if meals.is_empty() {
            MealSource::None
        } else {
            MealSource::RuleBased
        };
        (meals, source)
    }
}

/// Error raised by the planning service.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Upstream(#[from] DiscountSourceError),
}
