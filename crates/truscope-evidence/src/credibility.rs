//! Heuristic credibility scoring

use crate::dedup::host_of;
use crate::normalizer::EvidenceCandidate;
use crate::text::{overlap_ratio, tokenize};
use crate::payload::ReviewRating;
use crate::{CredibilityPolicy, ReviewScale};
use chrono::{DateTime, Utc};
use std::sync::LazyLock;
use truscope_domain::{clamp_score, EvidenceType};

static DEFAULT_SCALE: LazyLock<ReviewScale> = LazyLock::new(ReviewScale::default);

/// Scores an evidence candidate against a claim
///
/// Implementations must be pure: identical inputs (including `now`) give
/// identical scores.
pub trait CredibilityModel: Send + Sync {
    /// Score in `[0, 100]`
    fn score(&self, candidate: &EvidenceCandidate, claim: &str, now: DateTime<Utc>) -> f64;

    /// Where a fact-check rating sits between false (0) and true (1)
    fn review_position(&self, rating: &ReviewRating) -> f64 {
        DEFAULT_SCALE.position(rating)
    }
}

/// Individual adjustments behind a credibility score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    /// Policy base score
    pub base: f64,
    /// Label of the matching domain tier
    pub domain_tier: Option<String>,
    /// Domain adjustment
    pub domain: f64,
    /// Title/snippet relevance bonus
    pub relevance: f64,
    /// Bias-lexicon penalty (non-positive)
    pub bias: f64,
    /// News recency adjustment
    pub recency: f64,
    /// News depth bonus
    pub depth: f64,
}

impl ScoreBreakdown {
    /// Sum of all components, clamped into `[0, 100]`
    pub fn total(&self) -> f64 {
        clamp_score(self.base + self.domain + self.relevance + self.bias + self.recency + self.depth)
    }
}

/// Default [`CredibilityModel`] driven by a [`CredibilityPolicy`]
#[derive(Debug, Clone, Default)]
pub struct CredibilityScorer {
    policy: CredibilityPolicy,
}

impl CredibilityScorer {
    /// Create a scorer with the given policy
    pub fn new(policy: CredibilityPolicy) -> Self {
        Self { policy }
    }

    /// The active policy
    pub fn policy(&self) -> &CredibilityPolicy {
        &self.policy
    }

    /// Score a candidate and return every adjustment that contributed
    pub fn explain(&self, candidate: &EvidenceCandidate, claim: &str, now: DateTime<Utc>) -> ScoreBreakdown {
        let policy = &self.policy;

        let tier = candidate
            .url
            .as_deref()
            .and_then(host_of)
            .and_then(|host| policy.domain_tier_for(&host));

        let claim_words = tokenize(claim);
        let relevance = overlap_ratio(&claim_words, &tokenize(&candidate.title)) * policy.title_relevance_weight
            + overlap_ratio(&claim_words, &tokenize(&candidate.snippet)) * policy.snippet_relevance_weight;

        let title = candidate.title.to_lowercase();
        let snippet = candidate.snippet.to_lowercase();
        let bias_hits = policy
            .bias_keywords
            .iter()
            .filter(|k| title.contains(k.as_str()) || snippet.contains(k.as_str()))
            .count();

        let (recency, depth) = if candidate.evidence_type == EvidenceType::News {
            (self.recency_adjustment(candidate.published_date, now), self.depth_adjustment(candidate))
        } else {
            (0.0, 0.0)
        };

        ScoreBreakdown {
            base: policy.base_score,
            domain_tier: tier.map(|t| t.label.clone()),
            domain: tier.map(|t| t.adjustment).unwrap_or(0.0),
            relevance,
            bias: -(bias_hits as f64) * policy.bias_penalty,
            recency,
            depth,
        }
    }

    fn recency_adjustment(&self, published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
        let Some(published) = published else {
            return 0.0;
        };

        let age_days = (now - published).num_days().max(0);
        if let Some(band) = self.policy.recency_bands.iter().find(|b| age_days <= b.max_age_days) {
            return band.adjustment;
        }
        if age_days > self.policy.stale_after_days {
            return self.policy.stale_adjustment;
        }
        0.0
    }

    fn depth_adjustment(&self, candidate: &EvidenceCandidate) -> f64 {
        if candidate.description_chars > self.policy.depth_min_chars {
            self.policy.depth_bonus
        } else {
            0.0
        }
    }
}

impl CredibilityModel for CredibilityScorer {
    fn score(&self, candidate: &EvidenceCandidate, claim: &str, now: DateTime<Utc>) -> f64 {
        self.explain(candidate, claim, now).total()
    }

    fn review_position(&self, rating: &ReviewRating) -> f64 {
        self.policy.review_scale.position(rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn candidate(url: &str, title: &str, snippet: &str, evidence_type: EvidenceType) -> EvidenceCandidate {
        EvidenceCandidate {
            evidence_type,
            publisher: "Test".to_string(),
            url: Some(url.to_string()),
            title: title.to_string(),
            snippet: snippet.to_string(),
            description_chars: snippet.chars().count(),
            published_date: None,
            review_rating: None,
        }
    }

    #[test]
    fn test_base_score_for_unknown_irrelevant_source() {
        let scorer = CredibilityScorer::default();
        let c = candidate("https://example.org/a", "Cooking tips", "Pasta recipes", EvidenceType::SearchResult);
        assert_eq!(scorer.score(&c, "Mars has two moons", now()), 50.0);
    }

    #[test]
    fn test_fact_check_domain_boost() {
        let scorer = CredibilityScorer::default();
        let c = candidate("https://www.snopes.com/fact-check/x", "Unrelated", "Unrelated", EvidenceType::ClaimReview);
        let b = scorer.explain(&c, "Mars has two moons", now());
        assert_eq!(b.domain_tier.as_deref(), Some("fact-check"));
        assert_eq!(b.total(), 80.0);
    }

    #[test]
    fn test_review_position_uses_policy_scale() {
        let mut policy = CredibilityPolicy::default();
        policy.review_scale.labels.push(crate::RatingLabel {
            label: "Four Pinocchios".to_string(),
            position: 0.0,
        });
        let scorer = CredibilityScorer::new(policy);
        let rating = ReviewRating {
            textual_rating: Some("Four Pinocchios".to_string()),
            ..ReviewRating::default()
        };
        assert_eq!(scorer.review_position(&rating), 0.0);
        assert_eq!(CredibilityScorer::default().review_position(&rating), 0.5);
    }

    #[test]
    fn test_social_penalty() {
        let scorer = CredibilityScorer::default();
        let c = candidate("https://www.reddit.com/r/x", "Unrelated", "Unrelated", EvidenceType::SearchResult);
        assert_eq!(scorer.score(&c, "Mars has two moons", now()), 35.0);
    }

    #[test]
    fn test_relevance_weights() {
        let scorer = CredibilityScorer::default();
        // "has" is a stopword, so the claim tokens are {mars, two, moons}
        let c = candidate("https://example.org/a", "Mars two moons", "Mars", EvidenceType::SearchResult);
        let b = scorer.explain(&c, "Mars has two moons", now());
        let expected = 20.0 + 15.0 / 3.0;
        assert!((b.relevance - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bias_penalty_per_keyword() {
        let scorer = CredibilityScorer::default();
        let c = candidate(
            "https://example.org/a",
            "SHOCKING bombshell",
            "the hoax exposed",
            EvidenceType::SearchResult,
        );
        let b = scorer.explain(&c, "Unrelated claim words", now());
        assert_eq!(b.bias, -20.0);
    }

    #[test]
    fn test_news_recency_bands() {
        let scorer = CredibilityScorer::default();
        let mut c = candidate("https://example.org/a", "x", "y", EvidenceType::News);

        let cases = [(1, 15.0), (2, 15.0), (7, 10.0), (30, 5.0), (100, 0.0), (200, -10.0)];
        for (days, expected) in cases {
            c.published_date = Some(now() - Duration::days(days));
            assert_eq!(scorer.explain(&c, "claim words", now()).recency, expected, "age {} days", days);
        }
    }

    #[test]
    fn test_recency_ignored_for_non_news() {
        let scorer = CredibilityScorer::default();
        let mut c = candidate("https://example.org/a", "x", "y", EvidenceType::SearchResult);
        c.published_date = Some(now() - Duration::days(1));
        assert_eq!(scorer.explain(&c, "claim words", now()).recency, 0.0);
    }

    #[test]
    fn test_news_depth_bonus() {
        let scorer = CredibilityScorer::default();
        let mut c = candidate("https://example.org/a", "x", "y", EvidenceType::News);
        c.description_chars = 251;
        assert_eq!(scorer.explain(&c, "claim", now()).depth, 10.0);
        c.description_chars = 250;
        assert_eq!(scorer.explain(&c, "claim", now()).depth, 0.0);
    }

    #[test]
    fn test_score_is_deterministic() {
        let scorer = CredibilityScorer::default();
        let c = candidate("https://apnews.com/a", "Biden signs bill", "infrastructure", EvidenceType::News);
        let a = scorer.score(&c, "Biden signed infrastructure bill", now());
        let b = scorer.score(&c, "Biden signed infrastructure bill", now());
        assert_eq!(a, b);
    }

    #[test]
    fn test_score_clamped_high() {
        let scorer = CredibilityScorer::default();
        let mut c = candidate(
            "https://www.snopes.com/a",
            "Mars two moons",
            "Mars two moons",
            EvidenceType::News,
        );
        c.published_date = Some(now());
        c.description_chars = 1000;
        assert_eq!(scorer.score(&c, "Mars two moons", now()), 100.0);
    }
}
