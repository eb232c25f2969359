use crate::infra::build_planner;
use clap::Args;
use mealwise::config::AppConfig;
use mealwise::error::AppError;
use mealwise::planner::{LocationInput, OptimizeRequest, Preferences, Recommendation};
use std::fmt::Write as _;

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// Latitude of the shopper in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) latitude: f64,
    /// Longitude of the shopper in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) longitude: f64,
    /// Meal to plan for; repeat for several (e.g. --meal lunch --meal dinner)
    #[arg(long = "meal", required = true)]
    pub(crate) meals: Vec<String>,
    /// Only consider organic offers
    #[arg(long)]
    pub(crate) organic_only: bool,
    /// Skip meat and fish offers
    #[arg(long)]
    pub(crate) vegetarian: bool,
    /// Ingredient to avoid; repeatable
    #[arg(long)]
    pub(crate) avoid: Vec<String>,
    /// Search radius in kilometres (defaults to DISCOUNT_SEARCH_RADIUS_KM)
    #[arg(long)]
    pub(crate) max_distance_km: Option<f64>,
    /// Maximum amount to spend on the basket
    #[arg(long)]
    pub(crate) budget: Option<f64>,
    /// Maximum number of items in the basket
    #[arg(long)]
    pub(crate) max_items: Option<usize>,
    /// Print the recommendation as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

impl PlanArgs {
    fn into_request(self) -> OptimizeRequest {
        OptimizeRequest {
            location: Some(LocationInput {
                latitude: Some(self.latitude),
                longitude: Some(self.longitude),
            }),
            meals: Some(self.meals),
            preferences: Preferences {
                organic_only: self.organic_only,
                vegetarian: self.vegetarian,
                avoid_ingredients: self.avoid,
                max_distance_km: self.max_distance_km,
                budget: self.budget,
                max_items: self.max_items,
            },
        }
    }
}

pub(crate) async fn run_plan(args: PlanArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let planner = build_planner(&config)?;
    let as_json = args.json;

    let recommendation = planner.plan(args.into_request()).await?;

    if as_json {
        match serde_json::to_string_pretty(&recommendation) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("Recommendation could not be serialized: {err}"),
        }
    } else {
        print!("{}", render_recommendation(&recommendation));
    }
    Ok(())
}

pub(crate) fn render_recommendation(recommendation: &Recommendation) -> String {
    let mut out = String::new();
    writeln!(out, "Meal plan").expect("write to string");

    if let Some(message) = &recommendation.message {
        writeln!(out, "{message}").expect("write to string");
        if recommendation.is_empty() {
            return out;
        }
    }

    let totals = &recommendation.totals;
    writeln!(
        out,
        "Basket: {:.2} (was {:.2}), saving {:.2} ({:.1}%)",
        totals.total_cost, totals.original_cost, totals.total_savings, totals.savings_percentage
    )
    .expect("write to string");

    writeln!(out, "\nBuy").expect("write to string");
    for purchase in &recommendation.purchases {
        let item = &purchase.item;
        let distance = item
            .distance_km
            .map(|km| format!("{km:.1} km"))
            .unwrap_or_else(|| "distance unknown".to_string());
        writeln!(
            out,
            "- {} at {} ({}): {:.2} {} instead of {:.2}, score {:.1}",
            item.product_name,
            item.store.name,
            distance,
            item.discount_price,
            item.currency,
            item.original_price,
            purchase.score
        )
        .expect("write to string");
    }

    if !recommendation.stores.is_empty() {
        writeln!(out, "\nStores").expect("write to string");
        for store in &recommendation.stores {
            writeln!(
                out,
                "- {}, {} ({} item{})",
                store.name,
                store.address,
                store.items,
                if store.items == 1 { "" } else { "s" }
            )
            .expect("write to string");
        }
    }

    if !recommendation.meals.is_empty() {
        writeln!(out, "\nMeals").expect("write to string");
        for meal in &recommendation.meals {
            writeln!(out, "- {}: {}", meal.meal, meal.name).expect("write to string");
            if !meal.discounted_items.is_empty() {
                writeln!(out, "    uses {}", meal.discounted_items.join(", "))
                    .expect("write to string");
            }
        }
    }

    if !recommendation.tips.is_empty() {
        writeln!(out, "\nTips").expect("write to string");
        for tip in &recommendation.tips {
            writeln!(out, "- {tip}").expect("write to string");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealwise::discounts::{DiscountSource, MockDiscountSource};
    use mealwise::planner::{MealPlanService, NO_DISCOUNTS_MESSAGE};
    use std::sync::Arc;

    fn args(latitude: f64, longitude: f64) -> PlanArgs {
        PlanArgs {
            latitude,
            longitude,
            meals: vec!["dinner".to_string()],
            organic_only: false,
            vegetarian: false,
            avoid: Vec::new(),
            max_distance_km: None,
            budget: None,
            max_items: Some(3),
            json: false,
        }
    }

    async fn plan_with_mock(args: PlanArgs) -> Recommendation {
        let source = Arc::new(MockDiscountSource::new());
        assert_eq!(source.describe(), "mock");
        MealPlanService::new(source, 5.0)
            .plan(args.into_request())
            .await
            .expect("plan succeeds")
    }

    #[tokio::test]
    async fn renders_basket_meals_and_stores() {
        let recommendation = plan_with_mock(args(55.6759, 12.5655)).await;
        let text = render_recommendation(&recommendation);

        assert!(text.starts_with("Meal plan\n"));
        assert!(text.contains("Basket: "));
        assert!(text.contains("\nBuy\n"));
        assert!(text.contains("\nStores\n"));
        assert!(text.contains("- dinner: "));
        assert_eq!(recommendation.purchases.len(), 3);
    }

    #[tokio::test]
    async fn renders_message_only_for_empty_plan() {
        let recommendation = plan_with_mock(args(0.0, 0.0)).await;
        let text = render_recommendation(&recommendation);
        assert_eq!(text, format!("Meal plan\n{NO_DISCOUNTS_MESSAGE}\n"));
    }
}
