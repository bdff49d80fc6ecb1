//! `DurablePersistence` backends: in-memory and JSON files on disk

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;
use truscope_domain::{DurablePersistence, PersistenceError};

/// Process-local store, mainly for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryPersistence {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl DurablePersistence for MemoryPersistence {
    async fn save(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        Ok(self.values.read().await.get(key).cloned())
    }
}

/// One pretty-printed JSON file per key under a directory
///
/// Keys are mapped to file names by replacing anything outside
/// `[A-Za-z0-9._-]` with `_`, so `report:0191…` becomes `report_0191….json`.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    dir: PathBuf,
}

impl JsonFilePersistence {
    /// Store files under `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file))
    }
}

#[async_trait]
impl DurablePersistence for JsonFilePersistence {
    async fn save(&self, key: &str, value: Value) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PersistenceError::Storage(format!("Failed to create {}: {}", self.dir.display(), e)))?;

        let path = self.path_for(key);
        let body = serde_json::to_vec_pretty(&value)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;

        // Write-then-rename so readers never see a partial file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| PersistenceError::Storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| PersistenceError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        debug!(key, path = %path.display(), "Persisted value");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Value>, PersistenceError> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PersistenceError::Storage(format!("Failed to read {}: {}", path.display(), e)));
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| PersistenceError::Serialization(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_round_trip() {
        let store = MemoryPersistence::new();
        assert_eq!(store.load("k").await.unwrap(), None);
        store.save("k", json!({"a": 1})).await.unwrap();
        assert_eq!(store.load("k").await.unwrap(), Some(json!({"a": 1})));
        assert_eq!(store.keys().await, vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePersistence::new(dir.path().join("nested"));

        store.save("report:abc", json!({"verdict": "TRUE"})).await.unwrap();
        assert!(dir.path().join("nested").join("report_abc.json").exists());
        assert_eq!(store.load("report:abc").await.unwrap(), Some(json!({"verdict": "TRUE"})));
    }

    #[tokio::test]
    async fn test_file_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePersistence::new(dir.path());
        assert_eq!(store.load("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), b"{not json").unwrap();
        let store = JsonFilePersistence::new(dir.path());
        assert!(matches!(store.load("bad").await, Err(PersistenceError::Serialization(_))));
    }
}
