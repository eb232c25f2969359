use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use crate::discounts::{DiscountItem, DiscountSource, DiscountSourceError, Store};
use crate::geo::Location;
use crate::meals::{MealContext, MealSuggester, MealSuggestion, MealSuggestionError};
use crate::planner::{MealPlanService, OptimizeRequest};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn home() -> Location {
    Location::new(55.6761, 12.5683)
}

pub(super) fn offer(
    product: &str,
    store: &str,
    location: Location,
    original_price: f64,
    discount_price: f64,
    expires_in_hours: i64,
) -> DiscountItem {
    DiscountItem {
        product_name: product.to_string(),
        category: None,
        store: Store {
            id: store.to_lowercase().replace(' ', "-"),
            name: store.to_string(),
            address: format!("{store} street 1"),
            location,
        },
        original_price,
        discount_price,
        percent_discount: (original_price - discount_price) / original_price * 100.0,
        currency: "DKK".to_string(),
        expires_at: now() + Duration::hours(expires_in_hours),
        organic: product.to_lowercase().contains("organic"),
        stock: Some(5.0),
        distance_km: None,
    }
}

pub(super) fn neighbourhood_offers() -> Vec<DiscountItem> {
    let corner = Location::new(55.6770, 12.5690);
    let market = Location::new(55.6850, 12.5600);
    let far_away = Location::new(56.1540, 10.2072);
    vec![
        offer("Organic milk", "Corner Shop", corner, 15.0, 9.0, 20),
        offer("Chicken thighs", "Corner Shop", corner, 40.0, 20.0, 30),
        offer("Sourdough bread", "Market Hall", market, 30.0, 15.0, 12),
        offer("Cherry tomatoes", "Market Hall", market, 18.0, 9.0, 40),
        offer("Expired yoghurt", "Corner Shop", corner, 20.0, 5.0, -2),
        offer("Organic carrots", "Aarhus Store", far_away, 15.0, 5.0, 50),
    ]
}

pub(super) fn request(meals: &[&str]) -> OptimizeRequest {
    serde_json::from_value(json!({
        "location": {"latitude": home().latitude, "longitude": home().longitude},
        "meals": meals,
    }))
    .expect("request deserializes")
}

/// Serves a fixed list of offers and counts calls.
#[derive(Default)]
pub(super) struct StaticSource {
    pub(super) items: Vec<DiscountItem>,
    pub(super) calls: AtomicUsize,
}

impl StaticSource {
    pub(super) fn new(items: Vec<DiscountItem>) -> Self {
        Self {
            items,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscountSource for StaticSource {
    async fn fetch(
        &self,
        _origin: Location,
        _radius_km: f64,
    ) -> Result<Vec<DiscountItem>, DiscountSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.clone())
    }

    fn describe(&self) -> &'static str {
        "static"
    }
}

pub(super) struct RateLimitedSource;

#[async_trait]
impl DiscountSource for RateLimitedSource {
    async fn fetch(
        &self,
        _origin: Location,
        _radius_km: f64,
    ) -> Result<Vec<DiscountItem>, DiscountSourceError> {
        Err(DiscountSourceError::RateLimited)
    }

    fn describe(&self) -> &'static str {
        "rate-limited"
    }
}

/// Suggester returning a canned reply, or failing when `reply` is `None`.
pub(super) struct CannedSuggester {
    pub(super) reply: Option<Vec<MealSuggestion>>,
    pub(super) seen: std::sync::Mutex<Vec<MealContext>>,
}

impl CannedSuggester {
    pub(super) fn replying(reply: Vec<MealSuggestion>) -> Self {
        Self {
            reply: Some(reply),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing() -> Self {
        Self {
            reply: None,
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MealSuggester for CannedSuggester {
    async fn suggest(
        &self,
        context: &MealContext,
    ) -> Result<Vec<MealSuggestion>, MealSuggestionError> {
        self.seen
            .lock()
            .expect("context mutex poisoned")
            .push(context.clone());
        self.reply.clone().ok_or(MealSuggestionError::Unparseable)
    }

    fn describe(&self) -> &'static str {
        "generative"
    }
}

pub(super) fn build_service(items: Vec<DiscountItem>) -> (MealPlanService<StaticSource>, Arc<StaticSource>) {
    let source = Arc::new(StaticSource::new(items));
    (MealPlanService::new(source.clone(), 5.0), source)
}
