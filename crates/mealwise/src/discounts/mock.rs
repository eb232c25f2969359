use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::domain::{percent_off, DiscountItem, Store};
use super::source::{DiscountSource, DiscountSourceError};
use crate::geo::Location;

struct StoreSeed {
    id: &'static str,
    name: &'static str,
    address: &'static str,
    latitude: f64,
    longitude: f64,
}

struct OfferSeed {
    store: usize,
    product: &'static str,
    category: &'static str,
    original_price: f64,
    discount_price: f64,
    expires_in_hours: i64,
    organic: bool,
    stock: f64,
}

const STORES: [StoreSeed; 4] = [
    StoreSeed {
        id: "netto-norrebro",
        name: "Netto Nørrebro",
        address: "Nørrebrogade 52, 2200 København N",
        latitude: 55.6889,
        longitude: 12.5521,
    },
    StoreSeed {
        id: "foetex-vesterbro",
        name: "Føtex Vesterbro",
        address: "Vesterbrogade 55, 1620 København V",
        latitude: 55.6713,
        longitude: 12.5554,
    },
    StoreSeed {
        id: "bilka-amager",
        name: "Bilka Amager",
        address: "Ørestads Boulevard 114, 2300 København S",
        latitude: 55.6304,
        longitude: 12.5789,
    },
    StoreSeed {
        id: "salling-aarhus",
        name: "Salling Aarhus",
        address: "Søndergade 27, 8000 Aarhus C",
        latitude: 56.1540,
        longitude: 10.2072,
    },
];

const OFFERS: [OfferSeed; 12] = [
    OfferSeed {
        store: 0,
        product: "Organic whole milk 1L",
        category: "Dairy",
        original_price: 14.95,
        discount_price: 8.95,
        expires_in_hours: 20,
        organic: true,
        stock: 12.0,
    },
    OfferSeed {
        store: 0,
        product: "Chicken breast fillet 500g",
        category: "Meat",
        original_price: 49.95,
        discount_price: 29.95,
        expires_in_hours: 30,
        organic: false,
        stock: 6.0,
    },
    OfferSeed {
        store: 0,
        product: "Rye bread",
        category: "Bakery",
        original_price: 22.0,
        discount_price: 11.0,
        expires_in_hours: 14,
        organic: false,
        stock: 8.0,
    },
    OfferSeed {
        store: 1,
        product: "Cherry tomatoes 250g",
        category: "Vegetables",
        original_price: 18.0,
        discount_price: 9.0,
        expires_in_hours: 40,
        organic: false,
        stock: 15.0,
    },
    OfferSeed {
        store: 1,
        product: "Salmon fillet 300g",
        category: "Fish",
        original_price: 69.95,
        discount_price: 39.95,
        expires_in_hours: 22,
        organic: false,
        stock: 4.0,
    },
    OfferSeed {
        store: 1,
        product: "Organic baby spinach 100g",
        category: "Vegetables",
        original_price: 20.0,
        discount_price: 12.0,
        expires_in_hours: 36,
        organic: true,
        stock: 10.0,
    },
    OfferSeed {
        store: 1,
        product: "Greek yoghurt 1kg",
        category: "Dairy",
        original_price: 32.0,
        discount_price: 19.0,
        expires_in_hours: 60,
        organic: false,
        stock: 9.0,
    },
    OfferSeed {
        store: 2,
        product: "Organic free-range eggs 10 pcs",
        category: "Eggs",
        original_price: 38.0,
        discount_price: 26.0,
        expires_in_hours: 72,
        organic: true,
        stock: 20.0,
    },
    OfferSeed {
        store: 2,
        product: "Fresh pasta tagliatelle 400g",
        category: "Pasta",
        original_price: 28.0,
        discount_price: 14.0,
        expires_in_hours: 48,
        organic: false,
        stock: 11.0,
    },
    OfferSeed {
        store: 2,
        product: "Minced beef 8-12% 500g",
        category: "Meat",
        original_price: 45.0,
        discount_price: 27.0,
        expires_in_hours: 18,
        organic: false,
        stock: 7.0,
    },
    OfferSeed {
        store: 2,
        product: "Bananas 1kg",
        category: "Fruit",
        original_price: 16.0,
        discount_price: 10.0,
        expires_in_hours: 50,
        organic: false,
        stock: 25.0,
    },
    OfferSeed {
        store: 3,
        product: "Organic carrots 1kg",
        category: "Vegetables",
        original_price: 15.0,
        discount_price: 9.0,
        expires_in_hours: 70,
        organic: true,
        stock: 14.0,
    },
];

/// Fixed catalog of Copenhagen and Aarhus clearance offers, used when no
/// retailer API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockDiscountSource;

impl MockDiscountSource {
    pub fn new() -> Self {
        Self
    }

    /// The full catalog with expirations anchored at `now`.
    pub fn catalog_at(&self, now: DateTime<Utc>) -> Vec<DiscountItem> {
        OFFERS
            .iter()
            .map(|offer| {
                let seed = &STORES[offer.store];
                DiscountItem {
                    product_name: offer.product.to_string(),
                    category: Some(offer.category.to_string()),
                    store: Store {
                        id: seed.id.to_string(),
                        name: seed.name.to_string(),
                        address: seed.address.to_string(),
                        location: Location::new(seed.latitude, seed.longitude),
                    },
                    original_price: offer.original_price,
                    discount_price: offer.discount_price,
                    percent_discount: percent_off(offer.original_price, offer.discount_price),
                    currency: "DKK".to_string(),
                    expires_at: now + Duration::hours(offer.expires_in_hours),
                    organic: offer.organic,
                    stock: Some(offer.stock),
                    distance_km: None,
                }
            })
            .collect()
    }
}

#[async_trait]
impl DiscountSource for MockDiscountSource {
    async fn fetch(
        &self,
        origin: Location,
        radius_km: f64,
    ) -> Result<Vec<DiscountItem>, DiscountSourceError> {
        let items: Vec<DiscountItem> = self
            .catalog_at(Utc::now())
            .into_iter()
            .filter(|item| item.store.location.distance_km(&origin) <= radius_km)
            .collect();
        tracing::debug!(count = items.len(), radius_km, "served mock discounts");
        Ok(items)
    }

    fn describe(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_limits_catalog_to_radius() {
        let source = MockDiscountSource::new();
        let city_hall = Location::new(55.6759, 12.5655);

        let nearby = source.fetch(city_hall, 5.0).await.expect("mock never fails");
        assert!(!nearby.is_empty());
        assert!(nearby
            .iter()
            .all(|item| item.store.name != "Salling Aarhus"));

        let everywhere = source.fetch(city_hall, 500.0).await.expect("mock never fails");
        assert_eq!(everywhere.len(), OFFERS.len());
    }

    #[tokio::test]
    async fn fetch_far_from_any_store_is_empty() {
        let source = MockDiscountSource::new();
        let items = source
            .fetch(Location::new(-33.8688, 151.2093), 10.0)
            .await
            .expect("mock never fails");
        assert!(items.is_empty());
    }

    #[test]
    fn catalog_expirations_are_in_the_future() {
        let now = Utc::now();
        let catalog = MockDiscountSource::new().catalog_at(now);
        assert!(catalog.iter().all(|item| !item.is_expired(now)));
        assert!(catalog.iter().all(|item| item.percent_discount > 0.0));
    }
}
