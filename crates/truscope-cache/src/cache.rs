//! Shared response cache
//!
//! Entries live in an `RwLock` map of `Arc`s. A read of a live entry takes
//! the read lock and bumps the entry's atomic `last_accessed`; inserts,
//! removals and evictions take the write lock, so writes are serialized.

use crate::clock::{Clock, SystemClock};
use crate::metrics::Counters;
use crate::{CacheConfig, CacheKey, CacheMetrics, OperationClass};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug)]
pub(crate) struct CacheEntry {
    pub(crate) class: OperationClass,
    pub(crate) value: Value,
    pub(crate) created_at: u64,
    pub(crate) expires_at: u64,
    pub(crate) last_accessed: AtomicU64,
}

impl CacheEntry {
    pub(crate) fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}

/// Content-addressed, TTL- and capacity-bounded store of provider responses
///
/// # Examples
///
/// ```
/// use truscope_cache::{CacheConfig, OperationClass, ResponseCache};
/// use serde_json::json;
///
/// let cache = ResponseCache::new(CacheConfig::default());
/// cache.insert(OperationClass::WebSearch, "Moon landing", json!([{"title": "Apollo 11"}]));
///
/// // Queries are normalized before hashing
/// assert!(cache.get(OperationClass::WebSearch, "  moon LANDING").is_some());
/// assert!(cache.get(OperationClass::News, "moon landing").is_none());
/// ```
pub struct ResponseCache {
    pub(crate) config: CacheConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) entries: RwLock<HashMap<CacheKey, Arc<CacheEntry>>>,
    pub(crate) counters: Counters,
}

impl ResponseCache {
    /// Create a cache using the system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache with an explicit clock
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            entries: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, Arc<CacheEntry>>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, Arc<CacheEntry>>> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Live value for `query`, if any
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&self, class: OperationClass, query: &str) -> Option<Value> {
        let key = CacheKey::new(class, query);
        let now = self.clock.now_millis();

        let entry = self.read().get(&key).cloned();
        match entry {
            Some(entry) if !entry.is_expired(now) => {
                entry.last_accessed.store(now, Ordering::Relaxed);
                self.counters.hit();
                Some(entry.value.clone())
            }
            Some(_) => {
                let mut entries = self.write();
                if entries.get(&key).is_some_and(|e| e.is_expired(now)) {
                    entries.remove(&key);
                    self.counters.expired(1);
                    debug!(class = %class, key = %key, "Expired cache entry purged on read");
                }
                self.counters.miss();
                None
            }
            None => {
                self.counters.miss();
                None
            }
        }
    }

    /// Store `value` for `query` with the class TTL
    ///
    /// When the cache is full, expired entries are purged first, then the
    /// least recently accessed entries are evicted.
    pub fn insert(&self, class: OperationClass, query: &str, value: Value) {
        let key = CacheKey::new(class, query);
        let now = self.clock.now_millis();
        let ttl = self.config.ttl_for(class).as_millis() as u64;

        let entry = Arc::new(CacheEntry {
            class,
            value,
            created_at: now,
            expires_at: now.saturating_add(ttl),
            last_accessed: AtomicU64::new(now),
        });

        let mut entries = self.write();
        if !entries.contains_key(&key) && entries.len() >= self.config.max_entries {
            self.make_room(&mut entries, now);
        }
        entries.insert(key, entry);
        self.counters.insert();
    }

    /// Cached value for `query`, or the result of `fetch` (cached on success)
    ///
    /// Errors from `fetch` are returned unchanged and never cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, class: OperationClass, query: &str, fetch: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(value) = self.get(class, query) {
            return Ok(value);
        }
        let value = fetch().await?;
        self.insert(class, query, value.clone());
        Ok(value)
    }

    /// Drop the entry for `query`; returns whether one existed
    pub fn invalidate(&self, class: OperationClass, query: &str) -> bool {
        self.write().remove(&CacheKey::new(class, query)).is_some()
    }

    /// Remove every expired entry; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let mut entries = self.write();
        let removed = purge_expired_locked(&mut entries, now);
        self.counters.expired(removed);
        removed
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of stored entries, live or not yet purged
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Current statistics
    pub fn metrics(&self) -> CacheMetrics {
        self.counters.snapshot(self.len())
    }

    /// Reset hit/miss/eviction counters
    pub fn reset_metrics(&self) {
        self.counters.reset();
    }

    fn make_room(&self, entries: &mut HashMap<CacheKey, Arc<CacheEntry>>, now: u64) {
        let expired = purge_expired_locked(entries, now);
        self.counters.expired(expired);

        let capacity = self.config.max_entries;
        if entries.len() < capacity {
            return;
        }

        let overflow = entries.len() + 1 - capacity;
        let mut by_recency: Vec<(u64, CacheKey)> = entries
            .iter()
            .map(|(k, e)| (e.last_accessed.load(Ordering::Relaxed), k.clone()))
            .collect();
        by_recency.sort_unstable();

        for (_, key) in by_recency.into_iter().take(overflow) {
            entries.remove(&key);
        }
        self.counters.evicted(overflow);
        debug!(evicted = overflow, capacity, "Evicted least recently accessed cache entries");
    }
}

pub(crate) fn purge_expired_locked(entries: &mut HashMap<CacheKey, Arc<CacheEntry>>, now: u64) -> usize {
    let before = entries.len();
    entries.retain(|_, e| !e.is_expired(now));
    before - entries.len()
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("config", &self.config)
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;
    use std::time::Duration;

    fn cache_with(max_entries: usize) -> (ResponseCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let config = CacheConfig {
            max_entries,
            ..CacheConfig::default()
        };
        (ResponseCache::with_clock(config, clock.clone()), clock)
    }

    #[test]
    fn test_round_trip_within_ttl() {
        let (cache, clock) = cache_with(10);
        cache.insert(OperationClass::WebSearch, "q", json!({"a": 1}));
        clock.advance(Duration::from_secs(59 * 60));
        assert_eq!(cache.get(OperationClass::WebSearch, "q"), Some(json!({"a": 1})));
    }

    #[test]
    fn test_absent_after_ttl() {
        let (cache, clock) = cache_with(10);
        cache.insert(OperationClass::WebSearch, "q", json!(1));
        clock.advance(Duration::from_secs(60 * 60));
        assert_eq!(cache.get(OperationClass::WebSearch, "q"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.metrics().expirations, 1);
    }

    #[test]
    fn test_ttl_depends_on_class() {
        let (cache, clock) = cache_with(10);
        cache.insert(OperationClass::WebSearch, "q", json!(1));
        cache.insert(OperationClass::ClaimReview, "q", json!(2));
        clock.advance(Duration::from_secs(2 * 3600));
        assert_eq!(cache.get(OperationClass::WebSearch, "q"), None);
        assert_eq!(cache.get(OperationClass::ClaimReview, "q"), Some(json!(2)));
    }

    #[test]
    fn test_lru_eviction_uses_last_access() {
        let (cache, clock) = cache_with(2);
        cache.insert(OperationClass::WebSearch, "a", json!("a"));
        clock.advance(Duration::from_millis(10));
        cache.insert(OperationClass::WebSearch, "b", json!("b"));
        clock.advance(Duration::from_millis(10));

        // Touch "a" so "b" becomes least recently used
        assert!(cache.get(OperationClass::WebSearch, "a").is_some());
        clock.advance(Duration::from_millis(10));
        cache.insert(OperationClass::WebSearch, "c", json!("c"));

        assert!(cache.get(OperationClass::WebSearch, "a").is_some());
        assert!(cache.get(OperationClass::WebSearch, "b").is_none());
        assert!(cache.get(OperationClass::WebSearch, "c").is_some());
        assert_eq!(cache.metrics().evictions, 1);
    }

    #[test]
    fn test_overflow_purges_expired_before_evicting() {
        let (cache, clock) = cache_with(2);
        cache.insert(OperationClass::WebSearch, "old", json!(1));
        cache.insert(OperationClass::ClaimReview, "keep", json!(2));
        clock.advance(Duration::from_secs(2 * 3600));

        cache.insert(OperationClass::WebSearch, "new", json!(3));
        let metrics = cache.metrics();
        assert_eq!(metrics.evictions, 0);
        assert_eq!(metrics.expirations, 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let (cache, _) = cache_with(1);
        cache.insert(OperationClass::News, "q", json!(1));
        cache.insert(OperationClass::News, "q", json!(2));
        assert_eq!(cache.get(OperationClass::News, "q"), Some(json!(2)));
        assert_eq!(cache.metrics().evictions, 0);
    }

    #[test]
    fn test_hit_and_miss_counters() {
        let (cache, _) = cache_with(10);
        assert!(cache.get(OperationClass::News, "missing").is_none());
        cache.insert(OperationClass::News, "q", json!(1));
        assert!(cache.get(OperationClass::News, "q").is_some());

        let metrics = cache.metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.inserts, 1);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let (cache, _) = cache_with(10);
        cache.insert(OperationClass::News, "a", json!(1));
        cache.insert(OperationClass::News, "b", json!(2));
        assert!(cache.invalidate(OperationClass::News, "a"));
        assert!(!cache.invalidate(OperationClass::News, "a"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_get_or_fetch_caches_success_only() {
        let (cache, _) = cache_with(10);

        let failed: Result<Value, &str> = cache.get_or_fetch(OperationClass::WebSearch, "q", || async { Err("down") }).await;
        assert!(failed.is_err());
        assert!(cache.is_empty());

        let first: Result<Value, &str> = cache.get_or_fetch(OperationClass::WebSearch, "q", || async { Ok(json!(1)) }).await;
        let second: Result<Value, &str> = cache.get_or_fetch(OperationClass::WebSearch, "q", || async { Ok(json!(2)) }).await;
        assert_eq!(first.unwrap(), json!(1));
        assert_eq!(second.unwrap(), json!(1));
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let cache = Arc::new(ResponseCache::new(CacheConfig {
            max_entries: 50,
            ..CacheConfig::default()
        }));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let q = format!("q{}", (t * 7 + i) % 80);
                        if cache.get(OperationClass::WebSearch, &q).is_none() {
                            cache.insert(OperationClass::WebSearch, &q, json!(i));
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert!(cache.len() <= 50);
    }
}
