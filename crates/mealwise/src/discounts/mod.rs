//! Discount records: where they come from and which ones fit a request.

mod cached;
pub mod domain;
mod matcher;
mod mock;
mod salling;
mod source;

use async_trait::async_trait;
use serde::Serialize;

pub use cached::{CachedDiscountSource, LookupKey};
pub use domain::{DiscountItem, Store};
pub use matcher::{DiscountMatcher, MatchCriteria};
pub use mock::MockDiscountSource;
pub use salling::SallingFoodWasteClient;
pub use source::{DiscountSource, DiscountSourceError};

use crate::config::{DiscountConfig, DiscountSourceKind};
use crate::geo::Location;

/// The source selected by configuration. Only the retailer API is cached.
pub enum DiscountProvider {
    Mock(MockDiscountSource),
    Salling(CachedDiscountSource<SallingFoodWasteClient>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub ttl_secs: u64,
}

impl DiscountProvider {
    pub fn from_config(config: &DiscountConfig) -> Result<Self, DiscountSourceError> {
        match config.source {
            DiscountSourceKind::Mock => Ok(Self::Mock(MockDiscountSource::new())),
            DiscountSourceKind::Salling => {
                let client = SallingFoodWasteClient::from_config(config)?;
                Ok(Self::Salling(CachedDiscountSource::new(
                    client,
                    config.cache_ttl,
                )))
            }
        }
    }

    /// Live cache entries; expired ones are purged before counting.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        match self {
            Self::Mock(_) => None,
            Self::Salling(source) => {
                let purged = source.cache().purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "dropped expired discount lookups");
                }
                Some(CacheStats {
                    entries: source.cache().len(),
                    ttl_secs: source.cache().ttl().as_secs(),
                })
            }
        }
    }
}

#[async_trait]
impl DiscountSource for DiscountProvider {
    async fn fetch(
        &self,
        origin: Location,
        radius_km: f64,
    ) -> Result<Vec<DiscountItem>, DiscountSourceError> {
        match self {
            Self::Mock(source) => source.fetch(origin, radius_km).await,
            Self::Salling(source) => source.fetch(origin, radius_km).await,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Mock(source) => source.describe(),
            Self::Salling(source) => source.describe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_selects_uncached_mock() {
        let provider = DiscountProvider::from_config(&DiscountConfig::default())
            .expect("mock provider builds");
        assert_eq!(provider.describe(), "mock");
        assert!(provider.cache_stats().is_none());
    }

    #[test]
    fn salling_config_reports_cache_stats() {
        let config = DiscountConfig {
            source: DiscountSourceKind::Salling,
            api_key: Some("token".to_string()),
            ..DiscountConfig::default()
        };
        let provider = DiscountProvider::from_config(&config).expect("client builds");
        assert_eq!(provider.describe(), "salling");
        assert_eq!(
            provider.cache_stats(),
            Some(CacheStats {
                entries: 0,
                ttl_secs: 86_400
            })
        );
    }

    #[test]
    fn cache_stats_skip_expired_lookups() {
        let config = DiscountConfig {
            source: DiscountSourceKind::Salling,
            api_key: Some("token".to_string()),
            ..DiscountConfig::default()
        };
        let provider = DiscountProvider::from_config(&config).expect("client builds");
        let DiscountProvider::Salling(source) = &provider else {
            panic!("salling config builds the cached client");
        };

        let origin = Location::new(55.6761, 12.5683);
        let two_days_ago = chrono::Utc::now() - chrono::Duration::days(2);
        source
            .cache()
            .insert(LookupKey::new(origin, 10.0), Vec::new());
        source
            .cache()
            .insert_at(LookupKey::new(origin, 5.0), Vec::new(), two_days_ago);
        assert_eq!(source.cache().len(), 2);

        assert_eq!(provider.cache_stats().map(|stats| stats.entries), Some(1));
        assert_eq!(source.cache().len(), 1);
    }
}
