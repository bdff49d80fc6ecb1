//! Configuration for the response cache
//!
//! Defines per-class TTLs and the capacity bound.

use crate::{CacheError, OperationClass};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`ResponseCache`](crate::ResponseCache)
///
/// # Examples
///
/// ```
/// use truscope_cache::CacheConfig;
///
/// // Default configuration (balanced)
/// let config = CacheConfig::default();
/// assert_eq!(config.claim_review_ttl_minutes, 24 * 60);
///
/// // Short-lived entries, small footprint
/// let config = CacheConfig::aggressive();
/// assert_eq!(config.max_entries, 250);
///
/// // Long-lived entries
/// let config = CacheConfig::lenient();
/// assert_eq!(config.web_search_ttl_minutes, 4 * 60);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL for fact-check lookups (in minutes)
    /// Default: 24 hours; published reviews change rarely
    pub claim_review_ttl_minutes: u64,

    /// TTL for web search results (in minutes)
    /// Default: 1 hour
    pub web_search_ttl_minutes: u64,

    /// TTL for news and other time-sensitive results (in minutes)
    /// Default: 12 hours
    pub news_ttl_minutes: u64,

    /// TTL for synthesized verdicts (in minutes)
    /// Default: 6 hours
    pub synthesis_ttl_minutes: u64,

    /// Maximum number of live entries before LRU eviction
    /// Default: 1000
    pub max_entries: usize,

    /// Persistence key the snapshot is stored under
    pub snapshot_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            claim_review_ttl_minutes: 24 * 60,
            web_search_ttl_minutes: 60,
            news_ttl_minutes: 12 * 60,
            synthesis_ttl_minutes: 6 * 60,
            max_entries: 1000,
            snapshot_key: "cache:snapshot".to_string(),
        }
    }
}

impl CacheConfig {
    /// Shorter TTLs and a small footprint
    ///
    /// Suitable for memory-constrained deployments or rapidly changing topics.
    pub fn aggressive() -> Self {
        Self {
            claim_review_ttl_minutes: 6 * 60,
            web_search_ttl_minutes: 15,
            news_ttl_minutes: 3 * 60,
            synthesis_ttl_minutes: 60,
            max_entries: 250,
            ..Self::default()
        }
    }

    /// Longer TTLs and a larger footprint
    ///
    /// Suitable for development or offline replay where freshness matters less.
    pub fn lenient() -> Self {
        Self {
            claim_review_ttl_minutes: 72 * 60,
            web_search_ttl_minutes: 4 * 60,
            news_ttl_minutes: 24 * 60,
            synthesis_ttl_minutes: 24 * 60,
            max_entries: 5000,
            ..Self::default()
        }
    }

    /// TTL for an operation class
    pub fn ttl_for(&self, class: OperationClass) -> Duration {
        let minutes = match class {
            OperationClass::ClaimReview => self.claim_review_ttl_minutes,
            OperationClass::WebSearch => self.web_search_ttl_minutes,
            OperationClass::News => self.news_ttl_minutes,
            OperationClass::Synthesis => self.synthesis_ttl_minutes,
        };
        Duration::from_secs(minutes * 60)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.max_entries == 0 {
            return Err(CacheError::Config("max_entries must be at least 1".to_string()));
        }
        for class in OperationClass::ALL {
            if self.ttl_for(class).is_zero() {
                return Err(CacheError::Config(format!("TTL for {} must be positive", class)));
            }
        }
        if self.snapshot_key.trim().is_empty() {
            return Err(CacheError::Config("snapshot_key must not be empty".to_string()));
        }
        Ok(())
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, CacheError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| CacheError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, CacheError> {
        toml::to_string_pretty(self)
            .map_err(|e| CacheError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_for(OperationClass::ClaimReview), Duration::from_secs(24 * 3600));
        assert_eq!(config.ttl_for(OperationClass::WebSearch), Duration::from_secs(3600));
        assert_eq!(config.ttl_for(OperationClass::News), Duration::from_secs(12 * 3600));
        assert_eq!(config.ttl_for(OperationClass::Synthesis), Duration::from_secs(6 * 3600));
    }

    #[test]
    fn test_presets_are_ordered() {
        let aggressive = CacheConfig::aggressive();
        let default = CacheConfig::default();
        let lenient = CacheConfig::lenient();
        assert!(aggressive.web_search_ttl_minutes < default.web_search_ttl_minutes);
        assert!(default.web_search_ttl_minutes < lenient.web_search_ttl_minutes);
        assert!(aggressive.max_entries < lenient.max_entries);
        assert!(aggressive.validate().is_ok());
        assert!(lenient.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = CacheConfig {
            max_entries: 0,
            ..CacheConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let config = CacheConfig {
            news_ttl_minutes: 0,
            ..CacheConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial_uses_defaults() {
        let config = CacheConfig::from_toml("max_entries = 42\n").unwrap();
        assert_eq!(config.max_entries, 42);
        assert_eq!(config.web_search_ttl_minutes, 60);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CacheConfig::lenient();
        let parsed = CacheConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, parsed);
    }
}
