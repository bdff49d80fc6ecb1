//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the verification core and its
//! collaborators. Implementations are constructed once per process and
//! injected as `Arc<dyn Trait>`.

use crate::{Claim, Evidence, NewsQuery, PersistenceError, Provenance, ProviderError, SynthesisError, Tier};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// General web search
///
/// Returns raw provider records; the evidence normalizer parses them according
/// to [`SearchProvider::provenance`].
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name used in logs and warnings
    fn name(&self) -> &str;

    /// Shape of the records this provider returns
    fn provenance(&self) -> Provenance {
        Provenance::SearchResult
    }

    /// Search the web
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Value>, ProviderError>;
}

/// Published fact-check lookup
#[async_trait]
pub trait ClaimReviewProvider: Send + Sync {
    /// Provider name used in logs and warnings
    fn name(&self) -> &str;

    /// Find fact-check reviews matching a claim
    async fn search_claims(&self, claim: &str, max_results: usize) -> Result<Vec<Value>, ProviderError>;
}

/// Dated news search
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Provider name used in logs and warnings
    fn name(&self) -> &str;

    /// Search news articles in a date range
    async fn search_news(&self, query: &str, params: &NewsQuery) -> Result<Vec<Value>, ProviderError>;
}

/// Context passed to the synthesizer alongside claim and evidence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesisContext {
    /// Publishing context of the claim, if any
    pub publishing_context: Option<String>,
    /// Tiers executed before synthesis
    pub executed_tiers: Vec<Tier>,
    /// Warnings accumulated so far
    pub warnings: Vec<String>,
}

/// Evidence item proposed by the synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedEvidence {
    /// Publisher or source name
    pub publisher: String,
    /// Source URL, if any
    #[serde(default)]
    pub url: Option<String>,
    /// Quoted text
    pub quote: String,
    /// Credibility score; clamped when converted to [`Evidence`]
    pub score: f64,
}

/// Verdict proposed by the synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResponse {
    /// Score in `[0, 100]`
    pub score: f64,
    /// Verdict label
    pub verdict: String,
    /// Explanation
    pub reasoning: String,
    /// Additional evidence surfaced during synthesis
    #[serde(default)]
    pub evidence: Option<Vec<SynthesizedEvidence>>,
}

/// Language-model verdict synthesis
#[async_trait]
pub trait LanguageModelSynthesizer: Send + Sync {
    /// Model or backend name
    fn name(&self) -> &str;

    /// Compose a verdict from the claim and accumulated evidence
    async fn synthesize(
        &self,
        claim: &Claim,
        evidence: &[Evidence],
        context: &SynthesisContext,
    ) -> Result<SynthesisResponse, SynthesisError>;
}

/// Durable key/value persistence for reports and cache snapshots
///
/// Callers treat persistence as fire-and-forget: a failure is logged and never
/// fails a verification request.
#[async_trait]
pub trait DurablePersistence: Send + Sync {
    /// Store a value under `key`, replacing any previous value
    async fn save(&self, key: &str, value: Value) -> Result<(), PersistenceError>;

    /// Load the value stored under `key`
    async fn load(&self, key: &str) -> Result<Option<Value>, PersistenceError>;
}
