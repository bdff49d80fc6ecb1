//! Evidence module - normalized, scored, sourced facts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Lowest credibility score an evidence item can carry
pub const MIN_SCORE: f64 = 0.0;

/// Highest credibility score an evidence item can carry
pub const MAX_SCORE: f64 = 100.0;

/// Clamp a raw score into `[0, 100]`
///
/// NaN collapses to the minimum so a broken computation can never
/// masquerade as strong evidence.
///
/// ```
/// use truscope_domain::clamp_score;
///
/// assert_eq!(clamp_score(140.0), 100.0);
/// assert_eq!(clamp_score(-3.0), 0.0);
/// assert_eq!(clamp_score(f64::NAN), 0.0);
/// ```
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return MIN_SCORE;
    }
    score.clamp(MIN_SCORE, MAX_SCORE)
}

fn deserialize_clamped<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(clamp_score)
}

/// Unique identifier for an evidence item (UUIDv7, chronologically sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceId(uuid::Uuid);

impl EvidenceId {
    /// Generate a new identifier
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }
}

impl Default for EvidenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an evidence item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvidenceType {
    /// A published fact-check review of the claim
    ClaimReview,
    /// A general web search hit
    SearchResult,
    /// A dated news article
    News,
    /// Evidence contributed by specialized analysis or the synthesizer
    Specialized,
}

impl EvidenceType {
    /// Stable kebab-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceType::ClaimReview => "claim-review",
            EvidenceType::SearchResult => "search-result",
            EvidenceType::News => "news",
            EvidenceType::Specialized => "specialized",
        }
    }
}

/// One normalized, scored piece of evidence
///
/// The score is private so the `[0, 100]` invariant holds on every path:
/// construction, mutation and deserialization all clamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Unique identifier
    pub id: EvidenceId,

    /// Publisher or source name
    pub publisher: String,

    /// Source URL, when the provider supplied one
    pub url: Option<String>,

    /// Quoted text supporting or refuting the claim
    pub quote: String,

    #[serde(deserialize_with = "deserialize_clamped")]
    score: f64,

    /// Origin of the evidence
    #[serde(rename = "type")]
    pub evidence_type: EvidenceType,

    /// Publication timestamp, when known
    pub published_date: Option<DateTime<Utc>>,
}

impl Evidence {
    /// Create a new evidence item; `score` is clamped into `[0, 100]`
    pub fn new(
        publisher: impl Into<String>,
        url: Option<String>,
        quote: impl Into<String>,
        score: f64,
        evidence_type: EvidenceType,
    ) -> Self {
        Self {
            id: EvidenceId::new(),
            publisher: publisher.into(),
            url,
            quote: quote.into(),
            score: clamp_score(score),
            evidence_type,
            published_date: None,
        }
    }

    /// Attach a publication date
    pub fn with_published_date(mut self, date: DateTime<Utc>) -> Self {
        self.published_date = Some(date);
        self
    }

    /// Credibility score in `[0, 100]`
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Replace the score, clamping into `[0, 100]`
    pub fn set_score(&mut self, score: f64) {
        self.score = clamp_score(score);
    }
}
