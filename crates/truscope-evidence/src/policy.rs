//! Credibility policy table
//!
//! Every heuristic constant the scorer uses lives here so deployments can tune
//! them from TOML without touching scoring code.

use crate::{EvidenceError, ReviewScale};
use serde::{Deserialize, Serialize};

/// How a [`DomainTier`] entry matches a host name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainPattern {
    /// The host is this domain or a subdomain of it (`apnews.com`)
    Domain(String),
    /// The host ends with this suffix (`.gov`)
    Suffix(String),
    /// The host contains this substring (`news`)
    Contains(String),
}

impl DomainPattern {
    /// Whether `host` (lowercase, without `www.`) matches
    pub fn matches(&self, host: &str) -> bool {
        match self {
            DomainPattern::Domain(d) => host == d || host.ends_with(&format!(".{}", d)),
            DomainPattern::Suffix(s) => host.ends_with(s.as_str()),
            DomainPattern::Contains(c) => host.contains(c.as_str()),
        }
    }
}

/// One row of the ordered domain-credibility table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainTier {
    /// Human-readable tier name
    pub label: String,
    /// Additive score adjustment (negative for penalties)
    pub adjustment: f64,
    /// Hosts belonging to the tier
    pub patterns: Vec<DomainPattern>,
}

/// Recency bonus for news published within `max_age_days`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecencyBand {
    /// Inclusive upper bound on article age
    pub max_age_days: i64,
    /// Additive score adjustment
    pub adjustment: f64,
}

/// Tunable constants for credibility scoring
///
/// Domain tiers are evaluated in order and the first match wins, so specific
/// fact-check domains must precede broad patterns such as `Contains("news")`.
/// Fields missing from a TOML table keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredibilityPolicy {
    /// Starting score before adjustments
    pub base_score: f64,

    /// Ordered domain-credibility table
    pub domain_tiers: Vec<DomainTier>,

    /// Weight of claim/title token overlap
    pub title_relevance_weight: f64,

    /// Weight of claim/snippet token overlap
    pub snippet_relevance_weight: f64,

    /// Sensational or loaded phrases (lowercase)
    pub bias_keywords: Vec<String>,

    /// Penalty per bias keyword found in title or snippet
    pub bias_penalty: f64,

    /// News recency bands, checked in order
    pub recency_bands: Vec<RecencyBand>,

    /// News older than this many days is penalized
    pub stale_after_days: i64,

    /// Adjustment for stale news (negative)
    pub stale_adjustment: f64,

    /// Description length above which news earns the depth bonus
    pub depth_min_chars: usize,

    /// Depth bonus for long news descriptions
    pub depth_bonus: f64,

    /// Fact-check rating scale applied to claim reviews
    pub review_scale: ReviewScale,
}

fn tier(label: &str, adjustment: f64, patterns: Vec<DomainPattern>) -> DomainTier {
    DomainTier {
        label: label.to_string(),
        adjustment,
        patterns,
    }
}

fn domains(list: &[&str]) -> Vec<DomainPattern> {
    list.iter().map(|d| DomainPattern::Domain(d.to_string())).collect()
}

impl Default for CredibilityPolicy {
    fn default() -> Self {
        let mut wire_and_government = domains(&["reuters.com", "apnews.com", "who.int", "un.org", "europa.eu"]);
        wire_and_government.extend([
            DomainPattern::Suffix(".gov".to_string()),
            DomainPattern::Suffix(".mil".to_string()),
            DomainPattern::Suffix(".gov.uk".to_string()),
        ]);

        let mut academic = domains(&["nature.com", "science.org", "sciencedirect.com", "thelancet.com", "nejm.org"]);
        academic.push(DomainPattern::Suffix(".edu".to_string()));
        academic.push(DomainPattern::Suffix(".ac.uk".to_string()));

        Self {
            base_score: 50.0,
            domain_tiers: vec![
                tier(
                    "fact-check",
                    30.0,
                    domains(&[
                        "snopes.com",
                        "politifact.com",
                        "factcheck.org",
                        "fullfact.org",
                        "leadstories.com",
                        "checkyourfact.com",
                        "africacheck.org",
                    ]),
                ),
                tier("wire-and-government", 25.0, wire_and_government),
                tier("academic", 20.0, academic),
                tier(
                    "major-news",
                    15.0,
                    domains(&[
                        "bbc.com",
                        "bbc.co.uk",
                        "nytimes.com",
                        "washingtonpost.com",
                        "theguardian.com",
                        "npr.org",
                        "wsj.com",
                        "ft.com",
                        "economist.com",
                        "pbs.org",
                    ]),
                ),
                tier("reference", 5.0, domains(&["wikipedia.org", "britannica.com"])),
                tier(
                    "low-credibility",
                    -30.0,
                    domains(&["infowars.com", "naturalnews.com", "theonion.com", "babylonbee.com", "beforeitsnews.com"]),
                ),
                tier(
                    "social-and-ugc",
                    -15.0,
                    domains(&[
                        "facebook.com",
                        "twitter.com",
                        "x.com",
                        "reddit.com",
                        "tiktok.com",
                        "youtube.com",
                        "instagram.com",
                        "medium.com",
                        "blogspot.com",
                        "wordpress.com",
                        "substack.com",
                    ]),
                ),
                tier("generic-news", 5.0, vec![DomainPattern::Contains("news".to_string())]),
            ],
            title_relevance_weight: 20.0,
            snippet_relevance_weight: 15.0,
            bias_keywords: [
                "shocking",
                "unbelievable",
                "you won't believe",
                "bombshell",
                "hoax",
                "conspiracy",
                "exposed",
                "cover-up",
                "miracle",
                "destroys",
                "outrage",
                "slams",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            bias_penalty: 5.0,
            recency_bands: vec![
                RecencyBand { max_age_days: 2, adjustment: 15.0 },
                RecencyBand { max_age_days: 10, adjustment: 10.0 },
                RecencyBand { max_age_days: 45, adjustment: 5.0 },
            ],
            stale_after_days: 180,
            stale_adjustment: -10.0,
            depth_min_chars: 250,
            depth_bonus: 10.0,
            review_scale: ReviewScale::default(),
        }
    }
}

impl CredibilityPolicy {
    /// First domain tier matching `host`, if any
    pub fn domain_tier_for(&self, host: &str) -> Option<&DomainTier> {
        self.domain_tiers
            .iter()
            .find(|t| t.patterns.iter().any(|p| p.matches(host)))
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<(), EvidenceError> {
        let finite = |name: &str, value: f64| {
            if value.is_finite() {
                Ok(())
            } else {
                Err(EvidenceError::Policy(format!("{} must be finite", name)))
            }
        };

        finite("base_score", self.base_score)?;
        finite("title_relevance_weight", self.title_relevance_weight)?;
        finite("snippet_relevance_weight", self.snippet_relevance_weight)?;
        finite("bias_penalty", self.bias_penalty)?;
        finite("stale_adjustment", self.stale_adjustment)?;
        finite("depth_bonus", self.depth_bonus)?;
        for tier in &self.domain_tiers {
            finite(&format!("domain tier '{}' adjustment", tier.label), tier.adjustment)?;
        }
        for band in &self.recency_bands {
            finite("recency band adjustment", band.adjustment)?;
        }

        if self.title_relevance_weight < 0.0 || self.snippet_relevance_weight < 0.0 {
            return Err(EvidenceError::Policy("relevance weights must be non-negative".to_string()));
        }
        if self.bias_penalty < 0.0 {
            return Err(EvidenceError::Policy("bias_penalty must be non-negative".to_string()));
        }
        if self
            .recency_bands
            .windows(2)
            .any(|w| w[0].max_age_days >= w[1].max_age_days)
        {
            return Err(EvidenceError::Policy(
                "recency_bands must be sorted by increasing max_age_days".to_string(),
            ));
        }
        self.review_scale.validate()
    }

    /// Load a policy from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, EvidenceError> {
        let policy: Self = toml::from_str(toml_str)
            .map_err(|e| EvidenceError::Policy(format!("Failed to parse TOML: {}", e)))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Serialize the policy to a TOML string
    pub fn to_toml(&self) -> Result<String, EvidenceError> {
        toml::to_string_pretty(self)
            .map_err(|e| EvidenceError::Policy(format!("Failed to serialize to TOML: {}", e)))
    }
}
