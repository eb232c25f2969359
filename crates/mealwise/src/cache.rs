//! Time-to-live cache shared across request handlers.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Each entry is valid until `inserted_at + ttl`. Expired entries read as
/// missing and are only dropped on the next write or a purge.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: chrono::Duration,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl.to_std().unwrap_or(Duration::MAX)
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let guard = self.entries.lock().expect("cache mutex poisoned");
        guard
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Utc::now());
    }

    pub fn insert_at(&self, key: K, value: V, now: DateTime<Utc>) {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut guard = self.entries.lock().expect("cache mutex poisoned");
        guard.retain(|_, entry| now < entry.expires_at);
        guard.insert(key, CacheEntry { value, expires_at });
    }

    /// Number of stored entries, including any that expired but were not yet purged.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut guard = self.entries.lock().expect("cache mutex poisoned");
        let before = guard.len();
        guard.retain(|_, entry| now < entry.expires_at);
        before - guard.len()
    }
}
