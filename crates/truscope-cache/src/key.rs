//! Content-addressed cache keys

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Kind of cached operation; selects the TTL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationClass {
    /// Fact-check lookups
    ClaimReview,
    /// Web search
    WebSearch,
    /// News and other time-sensitive lookups
    News,
    /// Synthesized verdicts
    Synthesis,
}

impl OperationClass {
    /// Every class
    pub const ALL: [OperationClass; 4] = [
        OperationClass::ClaimReview,
        OperationClass::WebSearch,
        OperationClass::News,
        OperationClass::Synthesis,
    ];

    /// Stable kebab-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationClass::ClaimReview => "claim-review",
            OperationClass::WebSearch => "web-search",
            OperationClass::News => "news",
            OperationClass::Synthesis => "synthesis",
        }
    }
}

impl fmt::Display for OperationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowercase, trim and collapse internal whitespace
///
/// ```
/// use truscope_cache::normalize_query;
///
/// assert_eq!(normalize_query("  Vaccines   cause\tAUTISM "), "vaccines cause autism");
/// ```
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// SHA-256 digest of `(class, normalized query)`, hex encoded
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a query
    pub fn new(class: OperationClass, query: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(class.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(normalize_query(query).as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
