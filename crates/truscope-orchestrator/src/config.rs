//! Configuration for the tiered orchestrator

use crate::OrchestratorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use truscope_evidence::ConsensusConfig;

/// Retry behavior for provider calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, including the first
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds); later retries double it
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff delay (milliseconds)
    pub max_delay_ms: u64,

    /// Random extra delay as a fraction of the backoff, in `[0, 1]`
    pub jitter: f64,

    /// Timeout for one provider call attempt (milliseconds)
    pub call_timeout_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            jitter: 0.25,
            call_timeout_ms: 10_000,
        }
    }
}

impl RetryConfig {
    /// Get the base delay as Duration
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Get the maximum delay as Duration
    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Get the per-attempt timeout as Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

/// Configuration for [`TierOrchestrator`](crate::TierOrchestrator)
///
/// # Examples
///
/// ```
/// use truscope_orchestrator::OrchestratorConfig;
///
/// let config = OrchestratorConfig::default();
/// assert_eq!(config.direct_confidence_threshold, 80.0);
/// assert_eq!(config.batch_chunk_size, 5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Direct verification at or above this confidence ends the pipeline
    pub direct_confidence_threshold: f64,

    /// Web search at or above this confidence (with consensus) ends the pipeline
    pub web_confidence_threshold: f64,

    /// Minimum share of claim words a fact-check review must match
    pub claim_similarity_threshold: f64,

    /// Results requested from each provider call
    pub max_results: usize,

    /// Budget for a whole verification request (seconds)
    pub request_deadline_secs: u64,

    /// Budget for the language-model synthesizer (seconds)
    pub synthesis_timeout_secs: u64,

    /// How far back the news search looks (days)
    pub news_lookback_days: i64,

    /// Extra search queries for specialized analysis; `{claim}` is substituted
    pub alternate_queries: Vec<String>,

    /// Claims processed concurrently per batch chunk
    pub batch_chunk_size: usize,

    /// Pause between batch chunks (milliseconds)
    pub batch_delay_ms: u64,

    /// Save finished reports through durable persistence
    pub persist_reports: bool,

    /// Provider retry behavior
    pub retry: RetryConfig,

    /// Consensus thresholds gating escalation after web search
    pub consensus: ConsensusConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            direct_confidence_threshold: 80.0,
            web_confidence_threshold: 70.0,
            claim_similarity_threshold: 0.30,
            max_results: 10,
            request_deadline_secs: 60,
            synthesis_timeout_secs: 30,
            news_lookback_days: 30,
            alternate_queries: vec!["{claim} fact check".to_string(), "{claim} evidence".to_string()],
            batch_chunk_size: 5,
            batch_delay_ms: 1_000,
            persist_reports: true,
            retry: RetryConfig::default(),
            consensus: ConsensusConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Aggressive preset: tight budgets, fewer results, single retry
    pub fn aggressive() -> Self {
        Self {
            max_results: 5,
            request_deadline_secs: 20,
            synthesis_timeout_secs: 10,
            news_lookback_days: 7,
            retry: RetryConfig {
                max_attempts: 2,
                base_delay_ms: 250,
                max_delay_ms: 2_000,
                call_timeout_ms: 5_000,
                ..RetryConfig::default()
            },
            ..Self::default()
        }
    }

    /// Lenient preset: generous budgets and more results
    pub fn lenient() -> Self {
        Self {
            max_results: 20,
            request_deadline_secs: 180,
            synthesis_timeout_secs: 90,
            news_lookback_days: 90,
            retry: RetryConfig {
                max_attempts: 4,
                base_delay_ms: 1_000,
                max_delay_ms: 16_000,
                call_timeout_ms: 30_000,
                ..RetryConfig::default()
            },
            ..Self::default()
        }
    }

    /// Get the request deadline as Duration
    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }

    /// Get the synthesis timeout as Duration
    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    /// Get the inter-chunk batch delay as Duration
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Alternate queries for `claim`
    pub fn alternate_queries_for(&self, claim: &str) -> Vec<String> {
        self.alternate_queries
            .iter()
            .map(|template| template.replace("{claim}", claim))
            .collect()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.direct_confidence_threshold) || !in_range(self.web_confidence_threshold) {
            return Err(OrchestratorError::Config(
                "confidence thresholds must be within [0, 100]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.claim_similarity_threshold) {
            return Err(OrchestratorError::Config(
                "claim_similarity_threshold must be within [0, 1]".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(OrchestratorError::Config("max_results must be greater than 0".to_string()));
        }
        if self.request_deadline_secs == 0 || self.synthesis_timeout_secs == 0 {
            return Err(OrchestratorError::Config("timeouts must be greater than 0".to_string()));
        }
        if self.batch_chunk_size == 0 {
            return Err(OrchestratorError::Config("batch_chunk_size must be greater than 0".to_string()));
        }
        if self.news_lookback_days < 0 {
            return Err(OrchestratorError::Config("news_lookback_days must not be negative".to_string()));
        }
        if self.retry.max_attempts == 0 || self.retry.call_timeout_ms == 0 {
            return Err(OrchestratorError::Config(
                "retry.max_attempts and retry.call_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retry.jitter) {
            return Err(OrchestratorError::Config("retry.jitter must be within [0, 1]".to_string()));
        }
        self.consensus
            .validate()
            .map_err(|e| OrchestratorError::Config(e.to_string()))?;
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, OrchestratorError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| OrchestratorError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, OrchestratorError> {
        toml::to_string_pretty(self)
            .map_err(|e| OrchestratorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}
