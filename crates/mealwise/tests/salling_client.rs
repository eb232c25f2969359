use std::time::Duration;

use httpmock::prelude::*;
use mealwise::discounts::{
    CachedDiscountSource, DiscountSource, DiscountSourceError, SallingFoodWasteClient,
};
use mealwise::geo::Location;
use serde_json::json;

fn copenhagen() -> Location {
    Location::new(55.6761, 12.5683)
}

fn client(server: &MockServer) -> SallingFoodWasteClient {
    SallingFoodWasteClient::new(server.base_url(), "secret", Duration::from_secs(5))
        .expect("client builds")
}

fn food_waste_body() -> serde_json::Value {
    json!([
        {
            "store": {
                "id": "store-1",
                "name": "Føtex Vesterbro",
                "brand": "foetex",
                "address": {"street": "Vesterbrogade 55", "zip": "1620", "city": "København V"},
                "coordinates": [12.5554, 55.6713]
            },
            "clearances": [
                {
                    "offer": {
                        "currency": "DKK",
                        "newPrice": 12.0,
                        "originalPrice": 20.0,
                        "percentDiscount": 40.0,
                        "stock": 4,
                        "endTime": "2030-01-01T20:00:00Z"
                    },
                    "product": {"description": "Økologisk spinat 100g"}
                }
            ]
        }
    ])
}

#[tokio::test]
async fn fetch_sends_bearer_token_and_geo_query() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/food-waste/")
                .query_param("geo", "55.6761,12.5683")
                .query_param("radius", "5")
                .header("authorization", "Bearer secret");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(food_waste_body());
        })
        .await;

    let items = client(&server)
        .fetch(copenhagen(), 5.0)
        .await
        .expect("fetch succeeds");

    mock.assert_async().await;
    assert_eq!(items.len(), 1);
    let spinach = &items[0];
    assert!(spinach.organic);
    assert_eq!(spinach.discount_price, 12.0);
    assert_eq!(spinach.store.location, Location::new(55.6713, 12.5554));
    assert!(spinach.store.name.starts_with("Føtex Vesterbro"));
}

#[tokio::test]
async fn rate_limiting_is_reported_distinctly() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/food-waste/");
            then.status(429);
        })
        .await;

    let err = client(&server)
        .fetch(copenhagen(), 5.0)
        .await
        .expect_err("429 is an error");
    assert!(matches!(err, DiscountSourceError::RateLimited));
}

#[tokio::test]
async fn server_errors_carry_the_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/food-waste/");
            then.status(502);
        })
        .await;

    let err = client(&server)
        .fetch(copenhagen(), 5.0)
        .await
        .expect_err("502 is an error");
    assert!(matches!(err, DiscountSourceError::Status(502)));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/food-waste/");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let err = client(&server)
        .fetch(copenhagen(), 5.0)
        .await
        .expect_err("html is not json");
    assert!(matches!(err, DiscountSourceError::Decode(_)));
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/food-waste/");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!([]));
        })
        .await;

    let client = SallingFoodWasteClient::new(server.base_url(), "secret", Duration::from_millis(50))
        .expect("client builds");
    let err = client
        .fetch(copenhagen(), 5.0)
        .await
        .expect_err("request times out");
    assert!(matches!(err, DiscountSourceError::Timeout));
}

#[tokio::test]
async fn cache_serves_repeat_lookups_without_calling_the_api() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/food-waste/");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(food_waste_body());
        })
        .await;

    let cached = CachedDiscountSource::new(client(&server), Duration::from_secs(24 * 60 * 60));
    let first = cached.fetch(copenhagen(), 5.0).await.expect("first fetch");
    let second = cached.fetch(copenhagen(), 5.0).await.expect("cached fetch");

    assert_eq!(first, second);
    assert_eq!(mock.hits_async().await, 1);
    assert_eq!(cached.cache().len(), 1);
}
