use std::time::Duration;

use async_trait::async_trait;

use super::domain::DiscountItem;
use super::source::{DiscountSource, DiscountSourceError};
use crate::cache::TtlCache;
use crate::geo::Location;

/// Cache key: coordinates rounded to two decimals (roughly 1 km) and the
/// radius rounded to 100 m, so nearby lookups share one upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookupKey {
    latitude_centi: i32,
    longitude_centi: i32,
    radius_hectometers: u32,
}

impl LookupKey {
    pub fn new(origin: Location, radius_km: f64) -> Self {
        Self {
            latitude_centi: (origin.latitude * 100.0).round() as i32,
            longitude_centi: (origin.longitude * 100.0).round() as i32,
            radius_hectometers: (radius_km * 10.0).round().max(0.0) as u32,
        }
    }
}

/// Wraps a source with the TTL cache. Failed lookups are never cached.
pub struct CachedDiscountSource<S> {
    inner: S,
    cache: TtlCache<LookupKey, Vec<DiscountItem>>,
}

impl<S> CachedDiscountSource<S>
where
    S: DiscountSource,
{
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn cache(&self) -> &TtlCache<LookupKey, Vec<DiscountItem>> {
        &self.cache
    }
}

#[async_trait]
impl<S> DiscountSource for CachedDiscountSource<S>
where
    S: DiscountSource,
{
    async fn fetch(
        &self,
        origin: Location,
        radius_km: f64,
    ) -> Result<Vec<DiscountItem>, DiscountSourceError> {
        let key = LookupKey::new(origin, radius_km);
        if let Some(items) = self.cache.get(&key) {
            tracing::debug!(?key, count = items.len(), "discount cache hit");
            return Ok(items);
        }

        let items = self.inner.fetch(origin, radius_km).await?;
        tracing::debug!(?key, count = items.len(), "discount cache miss, stored");
        self.cache.insert(key, items.clone());
        Ok(items)
    }

    fn describe(&self) -> &'static str {
        self.inner.describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingSource {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl DiscountSource for CountingSource {
        async fn fetch(
            &self,
            _origin: Location,
            _radius_km: f64,
        ) -> Result<Vec<DiscountItem>, DiscountSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DiscountSourceError::RateLimited)
            } else {
                Ok(Vec::new())
            }
        }

        fn describe(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn nearby_lookups_share_one_upstream_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CachedDiscountSource::new(
            CountingSource {
                calls: calls.clone(),
                fail: false,
            },
            Duration::from_secs(60),
        );

        source
            .fetch(Location::new(55.6761, 12.5683), 5.0)
            .await
            .expect("fetch succeeds");
        source
            .fetch(Location::new(55.6758, 12.5679), 5.0)
            .await
            .expect("fetch succeeds");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.cache().len(), 1);
        assert_eq!(source.describe(), "counting");
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CachedDiscountSource::new(
            CountingSource {
                calls: calls.clone(),
                fail: true,
            },
            Duration::from_secs(60),
        );
        let origin = Location::new(55.6761, 12.5683);

        assert!(source.fetch(origin, 5.0).await.is_err());
        assert!(source.fetch(origin, 5.0).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(source.cache().is_empty());
    }

    #[test]
    fn radius_is_part_of_the_key() {
        let origin = Location::new(55.6761, 12.5683);
        assert_ne!(LookupKey::new(origin, 5.0), LookupKey::new(origin, 10.0));
        assert_eq!(LookupKey::new(origin, 5.0), LookupKey::new(origin, 5.04));
    }
}
