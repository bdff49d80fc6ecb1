//! Tier module - stages of the escalation pipeline

use crate::DomainError;
use serde::{Deserialize, Serialize};

/// Tier in the verification pipeline
///
/// Tiers run in a fixed order, each more expensive than the last:
/// - DirectVerification: published fact-check lookups
/// - WebSearch: general web search
/// - SpecializedAnalysis: concurrent news and alternate-query searches
/// - Synthesis: final verdict composition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// Fact-check database lookup
    DirectVerification,

    /// General web search
    WebSearch,

    /// News and alternate-strategy fan-out
    SpecializedAnalysis,

    /// Verdict synthesis
    Synthesis,
}

impl Tier {
    /// The canonical execution order
    pub const ORDER: [Tier; 4] = [
        Tier::DirectVerification,
        Tier::WebSearch,
        Tier::SpecializedAnalysis,
        Tier::Synthesis,
    ];

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::DirectVerification => "direct-verification",
            Tier::WebSearch => "web-search",
            Tier::SpecializedAnalysis => "specialized-analysis",
            Tier::Synthesis => "synthesis",
        }
    }

    /// Parse a tier from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "direct-verification" => Some(Tier::DirectVerification),
            "web-search" => Some(Tier::WebSearch),
            "specialized-analysis" => Some(Tier::SpecializedAnalysis),
            "synthesis" => Some(Tier::Synthesis),
            _ => None,
        }
    }

    /// Get the next tier in the pipeline (for escalation)
    pub fn next(&self) -> Option<Self> {
        match self {
            Tier::DirectVerification => Some(Tier::WebSearch),
            Tier::WebSearch => Some(Tier::SpecializedAnalysis),
            Tier::SpecializedAnalysis => Some(Tier::Synthesis),
            Tier::Synthesis => None,
        }
    }

    /// Confidence recorded when this tier fails outright
    pub fn fallback_confidence(&self) -> f64 {
        match self {
            Tier::DirectVerification => 0.0,
            Tier::WebSearch => 30.0,
            Tier::SpecializedAnalysis => 40.0,
            Tier::Synthesis => 30.0,
        }
    }

    /// Whether `tiers` is a prefix of [`Tier::ORDER`]
    pub fn is_canonical_prefix(tiers: &[Tier]) -> bool {
        tiers.len() <= Self::ORDER.len() && tiers.iter().zip(Self::ORDER.iter()).all(|(a, b)| a == b)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::InvalidTier(s.to_string()))
    }
}
