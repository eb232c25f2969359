use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::domain::{looks_organic, percent_off, DiscountItem, Store};
use super::source::{DiscountSource, DiscountSourceError};
use crate::config::DiscountConfig;
use crate::geo::Location;

/// Client for the Salling Group food-waste API: one GET per lookup, bearer
/// token authentication, results grouped by store.
#[derive(Debug, Clone)]
pub struct SallingFoodWasteClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SallingFoodWasteClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DiscountSourceError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mealwise/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DiscountSourceError::from)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &DiscountConfig) -> Result<Self, DiscountSourceError> {
        let api_key = config.api_key.clone().unwrap_or_default();
        Self::new(&config.api_base_url, api_key, config.request_timeout)
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/food-waste/", self.base_url)
    }
}

#[async_trait]
impl DiscountSource for SallingFoodWasteClient {
    async fn fetch(
        &self,
        origin: Location,
        radius_km: f64,
    ) -> Result<Vec<DiscountItem>, DiscountSourceError> {
        let geo = format!("{},{}", origin.latitude, origin.longitude);
        let radius = format!("{radius_km}");
        tracing::debug!(endpoint = %self.endpoint(), %geo, %radius, "requesting food-waste offers");

        let response = self
            .http
            .get(self.endpoint())
            .bearer_auth(&self.api_key)
            .query(&[("geo", geo.as_str()), ("radius", radius.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("food-waste API rate limit hit");
            return Err(DiscountSourceError::RateLimited);
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "food-waste API request failed");
            return Err(DiscountSourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let stores = parse_food_waste(&body)?;
        let items = flatten(stores);
        tracing::info!(count = items.len(), "fetched food-waste offers");
        Ok(items)
    }

    fn describe(&self) -> &'static str {
        "salling"
    }
}

#[derive(Debug, Deserialize)]
struct StoreClearances {
    store: ApiStore,
    #[serde(default)]
    clearances: Vec<Clearance>,
}

#[derive(Debug, Deserialize)]
struct ApiStore {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    address: Option<ApiAddress>,
    /// GeoJSON order: longitude first.
    #[serde(default)]
    coordinates: Option<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct ApiAddress {
    #[serde(default)]
    street: Option<String>,
    #[serde(default)]
    zip: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Clearance {
    offer: Offer,
    product: Product,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Offer {
    #[serde(default = "default_currency")]
    currency: String,
    new_price: f64,
    original_price: f64,
    #[serde(default)]
    percent_discount: Option<f64>,
    #[serde(default)]
    stock: Option<f64>,
    end_time: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct Product {
    description: String,
    #[serde(default)]
    categories: Option<Categories>,
}

#[derive(Debug, Deserialize)]
struct Categories {
    #[serde(default)]
    en: Option<String>,
    #[serde(default)]
    da: Option<String>,
}

fn default_currency() -> String {
    "DKK".to_string()
}

fn parse_food_waste(body: &str) -> Result<Vec<StoreClearances>, DiscountSourceError> {
    serde_json::from_str(body).map_err(|err| DiscountSourceError::Decode(err.to_string()))
}

fn flatten(stores: Vec<StoreClearances>) -> Vec<DiscountItem> {
    stores
        .into_iter()
        .filter_map(|entry| {
            let Some(store) = entry.store.into_store() else {
                tracing::warn!(
                    skipped = entry.clearances.len(),
                    "store without coordinates, skipping its offers"
                );
                return None;
            };
            Some((store, entry.clearances))
        })
        .flat_map(|(store, clearances)| {
            clearances
                .into_iter()
                .map(move |clearance| clearance.into_item(store.clone()))
        })
        .collect()
}

impl ApiStore {
    fn into_store(self) -> Option<Store> {
        let [longitude, latitude] = self.coordinates?;
        let address = self
            .address
            .map(|address| {
                let locality = [address.zip, address.city]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                [address.street, Some(locality)]
                    .into_iter()
                    .flatten()
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        let name = match self.brand {
            Some(brand) if !self.name.to_lowercase().contains(&brand.to_lowercase()) => {
                format!("{} ({})", self.name, brand)
            }
            _ => self.name,
        };

        Some(Store {
            id: self.id,
            name,
            address,
            location: Location::new(latitude, longitude),
        })
    }
}

impl Clearance {
    fn into_item(self, store: Store) -> DiscountItem {
        let Clearance { offer, product } = self;
        let category = product.categories.and_then(|categories| {
            categories
                .en
                .or(categories.da)
                .map(|path| path.rsplit('>').next().unwrap_or_default().trim().to_string())
                .filter(|leaf| !leaf.is_empty())
        });
        let percent_discount = offer
            .percent_discount
            .unwrap_or_else(|| percent_off(offer.original_price, offer.new_price));

        DiscountItem {
            organic: looks_organic(&product.description),
            product_name: product.description,
            category,
            store,
            original_price: offer.original_price,
            discount_price: offer.new_price,
            percent_discount,
            currency: offer.currency,
            expires_at: offer.end_time,
            stock: offer.stock,
            distance_km: None,
        }
    }
}
