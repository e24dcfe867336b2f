//! In-memory TTL cache for analytics payloads.
//!
//! Uses DashMap for concurrent access with per-key sharding.
//! Expired entries are discarded lazily, on the next lookup of their key.

use crate::key::CacheKeyBuilder;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default time-to-live for methods without a registered TTL (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache entry with its expiry deadline.
///
/// A TTL too large to represent as an `Instant` has no deadline.
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        CacheEntry {
            value,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| Instant::now() >= expires_at)
    }
}

/// Thread-safe TTL cache keyed by [`CacheKeyBuilder`] strings.
///
/// Every operation is total: a missing or expired key is a silent miss.
/// Clones share the same store.
///
/// # Example
///
/// ```
/// use analytics_kit::cache::CacheManager;
/// use std::time::Duration;
///
/// let cache = CacheManager::new();
/// cache.set("getAnalyticsOverview:[\"c1\"]", 42, Duration::from_secs(120));
/// assert_eq!(cache.get("getAnalyticsOverview:[\"c1\"]"), Some(42));
/// assert_eq!(cache.get("missing"), None);
/// ```
#[derive(Clone)]
pub struct CacheManager<V: Clone> {
    store: Arc<DashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> CacheManager<V> {
    /// Create a cache using [`DEFAULT_TTL`] as the fallback TTL.
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    /// Create a cache with a custom fallback TTL.
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        CacheManager {
            store: Arc::new(DashMap::new()),
            default_ttl,
        }
    }

    /// Look up a live entry. Expired entries are removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        if let Some(entry) = self.store.get(key) {
            if !entry.is_expired() {
                debug!("✓ Cache GET {} -> HIT", key);
                return Some(entry.value.clone());
            }
        }

        // Only drop the entry if it is still the expired one
        self.store.remove_if(key, |_, entry| entry.is_expired());
        debug!("✓ Cache GET {} -> MISS", key);
        None
    }

    /// Store a value for `ttl`, replacing any existing entry for the key.
    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        self.store
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        debug!("✓ Cache SET {} (TTL: {:?})", key, ttl);
    }

    /// Remove one entry, or every entry when `key` is `None`.
    pub fn clear(&self, key: Option<&str>) {
        match key {
            Some(key) => {
                self.store.remove(key);
                debug!("✓ Cache DELETE {}", key);
            }
            None => {
                let removed = self.store.len();
                self.store.clear();
                warn!("⚠ Cache CLEAR_ALL executed - {} entries dropped", removed);
            }
        }
    }

    /// Fallback TTL used when no method-specific TTL is registered.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Diagnostic snapshot. Does not evict anything.
    pub fn stats(&self) -> CacheStats {
        let mut keys = Vec::with_capacity(self.store.len());
        let mut expired_entries = 0;
        let mut entries_by_method: BTreeMap<String, usize> = BTreeMap::new();

        for entry in self.store.iter() {
            if entry.value().is_expired() {
                expired_entries += 1;
            }
            *entries_by_method
                .entry(CacheKeyBuilder::method_of(entry.key()).to_string())
                .or_default() += 1;
            keys.push(entry.key().clone());
        }
        keys.sort();

        CacheStats {
            size: keys.len(),
            expired_entries,
            entries_by_method,
            keys,
            default_ttl_ms: self.default_ttl.as_millis() as u64,
        }
    }
}

impl<V: Clone> Default for CacheManager<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CacheStats {
    /// Stored entries, including expired ones not yet evicted.
    pub size: usize,
    pub expired_entries: usize,
    pub entries_by_method: BTreeMap<String, usize>,
    pub keys: Vec<String>,
    pub default_ttl_ms: u64,
}
