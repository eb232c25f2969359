use std::sync::Arc;

use mealwise::discounts::{DiscountSource, MockDiscountSource};
use mealwise::meals::MealSource;
use mealwise::planner::{MealPlanService, OptimizeRequest, PlanError, NO_DISCOUNTS_MESSAGE};
use serde_json::json;

fn service() -> MealPlanService<MockDiscountSource> {
    MealPlanService::new(Arc::new(MockDiscountSource::new()), 5.0)
}

fn request(value: serde_json::Value) -> OptimizeRequest {
    serde_json::from_value(value).expect("request deserializes")
}

#[tokio::test]
async fn copenhagen_request_returns_ranked_basket_and_meals() {
    let recommendation = service()
        .plan(request(json!({
            "location": {"latitude": 55.6759, "longitude": 12.5655},
            "meals": ["breakfast", "dinner"],
            "preferences": {"max_items": 5}
        })))
        .await
        .expect("plan succeeds");

    assert!(!recommendation.purchases.is_empty());
    assert!(recommendation.purchases.len() <= 5);
    assert!(recommendation
        .purchases
        .iter()
        .all(|option| option.item.distance_km.is_some_and(|d| d <= 5.0)));
    assert!(recommendation.totals.total_savings > 0.0);
    assert!(recommendation.totals.savings_percentage > 0.0);
    assert_eq!(recommendation.meal_source, MealSource::RuleBased);
    assert!(!recommendation.tips.is_empty());
    assert!(!recommendation.stores.is_empty());

    let body = serde_json::to_value(&recommendation).expect("serializes");
    assert!(body.get("total_savings").is_some(), "totals are flattened");
    assert_eq!(body["meal_source"], "rule_based");
}

#[tokio::test]
async fn organic_vegetarian_preferences_flow_through() {
    let recommendation = service()
        .plan(request(json!({
            "location": {"latitude": 55.6759, "longitude": 12.5655},
            "meals": ["lunch"],
            "preferences": {"organic_only": true, "vegetarian": true, "max_distance_km": 10.0}
        })))
        .await
        .expect("plan succeeds");

    assert!(!recommendation.purchases.is_empty());
    assert!(recommendation.purchases.iter().all(|option| option.item.organic));
    assert!(recommendation
        .tips
        .iter()
        .any(|tip| tip.contains("organic")));
}

#[tokio::test]
async fn remote_location_has_no_discounts() {
    let recommendation = service()
        .plan(request(json!({
            "location": {"latitude": -33.8688, "longitude": 151.2093},
            "meals": ["dinner"]
        })))
        .await
        .expect("empty result is not an error");

    assert!(recommendation.is_empty());
    assert_eq!(recommendation.message.as_deref(), Some(NO_DISCOUNTS_MESSAGE));
}

#[tokio::test]
async fn invalid_longitude_is_rejected() {
    let err = service()
        .plan(request(json!({
            "location": {"latitude": 55.0, "longitude": 190.0},
            "meals": ["dinner"]
        })))
        .await
        .expect_err("invalid longitude rejected");

    match err {
        PlanError::Validation(errors) => {
            assert_eq!(
                errors.messages(),
                ["location.longitude must be between -180 and 180"]
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn mock_source_reports_its_mode() {
    assert_eq!(MockDiscountSource::new().describe(), "mock");
}
