//! Provider-facing types: provenance tags, queries and the error taxonomy

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Explicit tag naming the payload shape a provider returns
///
/// The normalizer selects its adapter from this tag instead of probing which
/// fields happen to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// `{link, title, snippet, source}`
    SearchResult,
    /// `{url, publisher, description, text}`
    Alternate,
    /// `{text, claimReview: [{publisher, url, reviewRating}]}`
    ClaimReview,
    /// `{link, title, description, pubDate, source_name}`
    NewsArticle,
}

impl Provenance {
    /// Stable kebab-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::SearchResult => "search-result",
            Provenance::Alternate => "alternate",
            Provenance::ClaimReview => "claim-review",
            Provenance::NewsArticle => "news-article",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Date-bounded news query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    /// Earliest publication date (inclusive)
    pub from_date: Option<NaiveDate>,
    /// Latest publication date (inclusive)
    pub to_date: Option<NaiveDate>,
    /// Maximum number of articles
    pub max_results: usize,
}

fn format_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

/// Errors reported by search, claim-review and news providers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Provider could not be reached or answered with a server error
    #[error("Provider '{provider}' unavailable{}: {message}", format_status(.status))]
    Unavailable {
        /// Provider name
        provider: String,
        /// HTTP status, when there was a response
        status: Option<u16>,
        /// Details
        message: String,
    },

    /// Credentials were rejected (401/403)
    #[error("Provider '{provider}' rejected credentials (HTTP {status})")]
    Auth {
        /// Provider name
        provider: String,
        /// HTTP status
        status: u16,
    },

    /// Provider did not answer within the call timeout
    #[error("Provider '{provider}' timed out after {after_ms}ms")]
    Timeout {
        /// Provider name
        provider: String,
        /// Timeout that elapsed
        after_ms: u64,
    },

    /// Response could not be parsed into the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Classify an HTTP status into the taxonomy
    ///
    /// ```
    /// use truscope_domain::ProviderError;
    ///
    /// assert!(ProviderError::from_status("search", 503, "busy").is_retryable());
    /// assert!(!ProviderError::from_status("search", 401, "nope").is_retryable());
    /// ```
    pub fn from_status(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        let provider = provider.into();
        match status {
            401 | 403 => ProviderError::Auth { provider, status },
            _ => ProviderError::Unavailable {
                provider,
                status: Some(status),
                message: message.into(),
            },
        }
    }

    /// Connection-level failure with no HTTP response
    pub fn connection(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ProviderError::Unavailable {
            provider: provider.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Whether the retry policy should try this call again
    ///
    /// Server errors, rate limiting, connection failures and timeouts are
    /// transient; credential rejections and malformed payloads are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Unavailable { status: None, .. } => true,
            ProviderError::Unavailable { status: Some(s), .. } => *s >= 500 || *s == 429,
            ProviderError::Timeout { .. } => true,
            ProviderError::Auth { .. } | ProviderError::MalformedResponse(_) => false,
        }
    }
}

/// Errors reported by a language-model synthesizer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SynthesisError {
    /// Synthesizer did not answer in time
    #[error("Synthesis timed out")]
    Timeout,

    /// Model refused to answer on safety grounds
    #[error("Synthesis blocked by safety filter: {0}")]
    SafetyBlocked(String),

    /// Output could not be parsed or failed validation
    #[error("Malformed synthesis response: {0}")]
    MalformedResponse(String),

    /// Synthesizer backend unreachable
    #[error("Synthesizer unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by durable persistence
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Underlying storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}
