//! Error types for cache operations

use thiserror::Error;
use truscope_domain::PersistenceError;

/// Errors that can occur during cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Snapshot failed to parse or verify; the cache has been cleared
    #[error("Cache corruption: {0}")]
    Corruption(String),

    /// Durable persistence failed
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// Corruption is reported but never fatal to the caller
    pub fn is_corruption(&self) -> bool {
        matches!(self, CacheError::Corruption(_))
    }
}
