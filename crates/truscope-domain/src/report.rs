//! Tier results and the terminal verification report

use crate::{clamp_score, Evidence, Tier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict label for a fatal pipeline error
pub const ANALYSIS_ERROR_VERDICT: &str = "ANALYSIS ERROR";

/// Categorical verdict band derived from a 0–100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Score ≥ 85
    True,
    /// Score ≥ 70
    MostlyTrue,
    /// Score ≥ 50
    Mixed,
    /// Score ≥ 30
    MostlyFalse,
    /// Score < 30
    False,
}

impl Verdict {
    /// Map a score onto its verdict band
    ///
    /// ```
    /// use truscope_domain::Verdict;
    ///
    /// assert_eq!(Verdict::from_score(85.0), Verdict::True);
    /// assert_eq!(Verdict::from_score(78.0), Verdict::MostlyTrue);
    /// assert_eq!(Verdict::from_score(29.9), Verdict::False);
    /// ```
    pub fn from_score(score: f64) -> Self {
        let score = clamp_score(score);
        if score >= 85.0 {
            Verdict::True
        } else if score >= 70.0 {
            Verdict::MostlyTrue
        } else if score >= 50.0 {
            Verdict::Mixed
        } else if score >= 30.0 {
            Verdict::MostlyFalse
        } else {
            Verdict::False
        }
    }

    /// Display label
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::True => "TRUE",
            Verdict::MostlyTrue => "MOSTLY TRUE",
            Verdict::Mixed => "MIXED",
            Verdict::MostlyFalse => "MOSTLY FALSE",
            Verdict::False => "FALSE",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a tier, reported to progress observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierStatus {
    /// Tier started
    Active,
    /// Tier finished successfully
    Completed,
    /// Tier failed (the pipeline continues)
    Failed,
}

/// How the final score of a report was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SynthesisMethod {
    /// Language-model synthesis succeeded
    Ai,
    /// Weighted-statistics fallback
    Statistical,
    /// Pipeline stopped early; score is the deciding tier's confidence
    TierConfidence,
    /// No synthesis happened (fatal error)
    None,
}

/// Outcome of executing one tier
#[derive(Debug, Clone)]
pub struct TierResult {
    /// Which tier ran
    pub tier: Tier,
    /// Whether the tier's operation completed without error
    pub success: bool,
    /// Confidence in `[0, 100]`
    pub confidence: f64,
    /// Evidence gathered by this tier
    pub evidence: Vec<Evidence>,
    /// Whether the orchestrator should move on to the next tier
    pub should_escalate: bool,
    /// Wall-clock time spent in the tier
    pub processing_time_ms: u64,
    /// Error description when `success` is false
    pub error: Option<String>,
}

impl TierResult {
    /// A successful tier outcome
    pub fn success(tier: Tier, confidence: f64, evidence: Vec<Evidence>) -> Self {
        Self {
            tier,
            success: true,
            confidence: clamp_score(confidence),
            evidence,
            should_escalate: true,
            processing_time_ms: 0,
            error: None,
        }
    }

    /// A failed tier outcome carrying the tier's fallback confidence
    pub fn failure(tier: Tier, error: impl Into<String>) -> Self {
        Self {
            tier,
            success: false,
            confidence: tier.fallback_confidence(),
            evidence: Vec::new(),
            should_escalate: true,
            processing_time_ms: 0,
            error: Some(error.into()),
        }
    }

    /// Condense into the summary kept in the report
    pub fn summary(&self) -> TierResultSummary {
        TierResultSummary {
            tier: self.tier,
            success: self.success,
            confidence: self.confidence,
            evidence_count: self.evidence.len(),
            should_escalate: self.should_escalate,
            processing_time_ms: self.processing_time_ms,
            error: self.error.clone(),
        }
    }
}

/// Per-tier summary retained in the final report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierResultSummary {
    /// Which tier ran
    pub tier: Tier,
    /// Whether it succeeded
    pub success: bool,
    /// Confidence in `[0, 100]`
    pub confidence: f64,
    /// Number of evidence items the tier produced
    pub evidence_count: usize,
    /// Escalation decision taken after the tier
    pub should_escalate: bool,
    /// Wall-clock time spent in the tier
    pub processing_time_ms: u64,
    /// Error description, if any
    pub error: Option<String>,
}

/// Terminal output of one verification request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Report identifier (UUIDv7)
    pub id: uuid::Uuid,
    /// The claim text that was verified
    pub claim: String,
    /// Verdict label, e.g. `"MOSTLY TRUE — Well Supported"`
    pub verdict: String,
    /// Final score in `[0, 100]`
    pub score: u8,
    /// Deduplicated evidence from every executed tier
    pub evidence: Vec<Evidence>,
    /// One summary per executed tier, in execution order
    pub tier_breakdown: Vec<TierResultSummary>,
    /// Human-readable degradation notices
    pub warnings: Vec<String>,
    /// Explanation of the verdict
    pub reasoning: String,
    /// How the score was produced
    pub synthesis_method: SynthesisMethod,
    /// Total processing time
    pub processing_time_ms: u64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl VerificationReport {
    /// Round and clamp a 0–100 float into a report score
    pub fn score_from(value: f64) -> u8 {
        clamp_score(value).round() as u8
    }

    /// Report produced when an error escapes every tier boundary
    pub fn analysis_error(claim: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            id: uuid::Uuid::now_v7(),
            claim: claim.into(),
            verdict: ANALYSIS_ERROR_VERDICT.to_string(),
            score: 0,
            evidence: Vec::new(),
            tier_breakdown: Vec::new(),
            warnings: vec![format!("Verification could not be completed: {}", message)],
            reasoning: message,
            synthesis_method: SynthesisMethod::None,
            processing_time_ms: 0,
            created_at: Utc::now(),
        }
    }

    /// Tiers that executed, in order
    pub fn executed_tiers(&self) -> Vec<Tier> {
        self.tier_breakdown.iter().map(|s| s.tier).collect()
    }

    /// Whether this is a fatal-error report
    pub fn is_analysis_error(&self) -> bool {
        self.verdict == ANALYSIS_ERROR_VERDICT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EvidenceType;

    #[test]
    fn test_verdict_bands() {
        assert_eq!(Verdict::from_score(100.0), Verdict::True);
        assert_eq!(Verdict::from_score(84.99), Verdict::MostlyTrue);
        assert_eq!(Verdict::from_score(70.0), Verdict::MostlyTrue);
        assert_eq!(Verdict::from_score(50.0), Verdict::Mixed);
        assert_eq!(Verdict::from_score(30.0), Verdict::MostlyFalse);
        assert_eq!(Verdict::from_score(0.0), Verdict::False);
    }

    #[test]
    fn test_failure_uses_fallback_confidence() {
        let r = TierResult::failure(Tier::SpecializedAnalysis, "boom");
        assert!(!r.success);
        assert_eq!(r.confidence, 40.0);
        assert_eq!(r.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_summary_counts_evidence() {
        let evidence = vec![
            Evidence::new("a", None, "q", 70.0, EvidenceType::SearchResult),
            Evidence::new("b", None, "q", 20.0, EvidenceType::SearchResult),
        ];
        let r = TierResult::success(Tier::WebSearch, 45.0, evidence);
        let s = r.summary();
        assert_eq!(s.evidence_count, 2);
        assert_eq!(s.tier, Tier::WebSearch);
        assert!(s.success);
    }

    #[test]
    fn test_analysis_error_report() {
        let report = VerificationReport::analysis_error("claim", "exploded");
        assert!(report.is_analysis_error());
        assert_eq!(report.score, 0);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.executed_tiers().is_empty());
    }

    #[test]
    fn test_score_from_rounds_and_clamps() {
        assert_eq!(VerificationReport::score_from(77.6), 78);
        assert_eq!(VerificationReport::score_from(180.0), 100);
        assert_eq!(VerificationReport::score_from(-2.0), 0);
    }
}
