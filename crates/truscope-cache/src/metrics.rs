//! Metrics collection for cache operations

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters updated by the cache
#[derive(Debug, Default)]
pub(crate) struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl Counters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn evicted(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn expired(&self, count: usize) {
        self.expirations.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entries: usize) -> CacheMetrics {
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            entries,
        }
    }

    pub(crate) fn reset(&self) {
        for counter in [&self.hits, &self.misses, &self.inserts, &self.evictions, &self.expirations] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    /// Reads served from a live entry
    pub hits: u64,
    /// Reads that found nothing live
    pub misses: u64,
    /// Entries written
    pub inserts: u64,
    /// Entries removed to respect capacity
    pub evictions: u64,
    /// Entries removed after their TTL
    pub expirations: u64,
    /// Entries currently stored
    pub entries: usize,
}

impl CacheMetrics {
    /// Share of reads that hit, in `[0, 1]`
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let lines = [
            "Cache Metrics Summary".to_string(),
            "=====================".to_string(),
            format!("Entries: {}", self.entries),
            format!("Hits: {}", self.hits),
            format!("Misses: {}", self.misses),
            format!("Hit rate: {:.1}%", self.hit_rate() * 100.0),
            format!("Inserts: {}", self.inserts),
            format!("Evictions: {}", self.evictions),
            format!("Expirations: {}", self.expirations),
        ];
        lines.join("\n")
    }
}
