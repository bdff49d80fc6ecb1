//! Snapshot save/restore through durable persistence
//!
//! The stored value is `{ "version", "checksum", "payload" }` where `payload`
//! is the JSON-encoded entry list and `checksum` its SHA-256. A snapshot that
//! fails to parse or verify clears the cache and reports `Corruption`.

use crate::cache::{purge_expired_locked, CacheEntry};
use crate::{CacheError, CacheKey, OperationClass, ResponseCache};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use truscope_domain::{DurablePersistence, PersistenceError};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    key: CacheKey,
    class: OperationClass,
    value: Value,
    created_at: u64,
    expires_at: u64,
    last_accessed: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEnvelope {
    version: u32,
    checksum: String,
    payload: String,
}

fn checksum(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl ResponseCache {
    /// Write all live entries to `persistence`; returns how many were saved
    pub async fn save_snapshot(&self, persistence: &dyn DurablePersistence) -> Result<usize, CacheError> {
        let now = self.clock.now_millis();
        let entries: Vec<SnapshotEntry> = self
            .read()
            .iter()
            .filter(|(_, e)| !e.is_expired(now))
            .map(|(k, e)| SnapshotEntry {
                key: k.clone(),
                class: e.class,
                value: e.value.clone(),
                created_at: e.created_at,
                expires_at: e.expires_at,
                last_accessed: e.last_accessed.load(Ordering::Relaxed),
            })
            .collect();

        let payload = serde_json::to_string(&entries)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        let envelope = SnapshotEnvelope {
            version: SNAPSHOT_VERSION,
            checksum: checksum(&payload),
            payload,
        };
        let value = serde_json::to_value(&envelope)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;

        persistence.save(&self.config.snapshot_key, value).await?;
        info!(entries = entries.len(), key = %self.config.snapshot_key, "Saved cache snapshot");
        Ok(entries.len())
    }

    /// Replace the cache contents with the stored snapshot
    ///
    /// Returns the number of live entries restored, or 0 when no snapshot
    /// exists. Expired entries are skipped. On `Corruption` the cache is left
    /// empty.
    pub async fn restore_snapshot(&self, persistence: &dyn DurablePersistence) -> Result<usize, CacheError> {
        let Some(stored) = persistence.load(&self.config.snapshot_key).await? else {
            return Ok(0);
        };

        let entries = match decode(stored) {
            Ok(entries) => entries,
            Err(reason) => {
                self.clear();
                warn!(key = %self.config.snapshot_key, "Discarding corrupt cache snapshot: {}", reason);
                return Err(CacheError::Corruption(reason));
            }
        };

        let now = self.clock.now_millis();
        let mut map = self.write();
        map.clear();
        for e in entries {
            map.insert(
                e.key,
                Arc::new(CacheEntry {
                    class: e.class,
                    value: e.value,
                    created_at: e.created_at,
                    expires_at: e.expires_at,
                    last_accessed: AtomicU64::new(e.last_accessed),
                }),
            );
        }
        purge_expired_locked(&mut map, now);

        // Oldest-accessed entries go first if the snapshot exceeds capacity
        if map.len() > self.config.max_entries {
            let mut by_recency: Vec<(u64, CacheKey)> = map
                .iter()
                .map(|(k, e)| (e.last_accessed.load(Ordering::Relaxed), k.clone()))
                .collect();
            by_recency.sort_unstable();
            let overflow = map.len() - self.config.max_entries;
            for (_, key) in by_recency.into_iter().take(overflow) {
                map.remove(&key);
            }
        }

        let restored = map.len();
        info!(entries = restored, key = %self.config.snapshot_key, "Restored cache snapshot");
        Ok(restored)
    }
}

fn decode(stored: Value) -> Result<Vec<SnapshotEntry>, String> {
    let envelope: SnapshotEnvelope =
        serde_json::from_value(stored).map_err(|e| format!("invalid envelope: {}", e))?;
    if envelope.version != SNAPSHOT_VERSION {
        return Err(format!("unsupported snapshot version {}", envelope.version));
    }
    if checksum(&envelope.payload) != envelope.checksum {
        return Err("checksum mismatch".to_string());
    }
    serde_json::from_str(&envelope.payload).map_err(|e| format!("invalid payload: {}", e))
}
