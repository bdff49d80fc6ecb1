//! Final verdict composition
//!
//! The engine asks the language-model synthesizer first and falls back to
//! weighted statistics on any failure. The fallback never fails.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use truscope_cache::{OperationClass, ResponseCache};
use truscope_domain::{
    clamp_score, Claim, Evidence, EvidenceType, LanguageModelSynthesizer, SynthesisContext, SynthesisError,
    SynthesisMethod, SynthesisResponse, Tier, TierResult, Verdict,
};

/// Evidence at or above this score counts as supporting the claim
pub const SUPPORTING_THRESHOLD: f64 = 60.0;

/// Evidence at or below this score counts as contradicting the claim
pub const CONTRADICTING_THRESHOLD: f64 = 40.0;

/// Score deducted when supporting and contradicting evidence coexist
pub const CONFLICT_PENALTY: f64 = 15.0;

/// Lowest score the statistical fallback produces
pub const FALLBACK_FLOOR: f64 = 30.0;

/// Result of the weighted-statistics fallback
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticalSynthesis {
    /// Score in `[30, 100]`
    pub score: f64,
    /// Verdict band of `score`
    pub verdict: Verdict,
    /// Evidence scored at or above [`SUPPORTING_THRESHOLD`]
    pub supporting: usize,
    /// Evidence scored at or below [`CONTRADICTING_THRESHOLD`]
    pub contradicting: usize,
}

impl StatisticalSynthesis {
    /// Whether the conflict penalty was applied
    pub fn conflicted(&self) -> bool {
        self.supporting > 0 && self.contradicting > 0
    }

    /// One-sentence explanation of the score
    pub fn reasoning(&self, evidence_count: usize) -> String {
        if evidence_count == 0 {
            return "No evidence was found; the claim could not be assessed.".to_string();
        }
        let mut text = format!(
            "Weighted average of {} evidence item(s): {} supporting, {} contradicting.",
            evidence_count, self.supporting, self.contradicting
        );
        if self.conflicted() {
            text.push_str(" Sources disagree, so the score was reduced.");
        }
        text
    }
}

fn weight(score: f64) -> f64 {
    if score >= 80.0 {
        3.0
    } else if score >= 50.0 {
        2.0
    } else {
        1.0
    }
}

/// Weighted-statistics verdict
///
/// High-scored evidence (≥80) weighs 3, medium (50–79) 2 and low (<50) 1.
/// With no evidence the score is 50.
///
/// ```
/// use truscope_orchestrator::statistical_synthesis;
/// use truscope_domain::Verdict;
///
/// let empty = statistical_synthesis(&[]);
/// assert_eq!(empty.score, 50.0);
/// assert_eq!(empty.verdict, Verdict::Mixed);
/// ```
pub fn statistical_synthesis(evidence: &[Evidence]) -> StatisticalSynthesis {
    let supporting = evidence.iter().filter(|e| e.score() >= SUPPORTING_THRESHOLD).count();
    let contradicting = evidence.iter().filter(|e| e.score() <= CONTRADICTING_THRESHOLD).count();

    let mut score = if evidence.is_empty() {
        50.0
    } else {
        let (weighted, total) = evidence.iter().fold((0.0, 0.0), |(sum, weights), e| {
            let w = weight(e.score());
            (sum + e.score() * w, weights + w)
        });
        weighted / total
    };

    if supporting > 0 && contradicting > 0 {
        score = (score - CONFLICT_PENALTY).max(FALLBACK_FLOOR);
    }
    let score = score.clamp(FALLBACK_FLOOR, 100.0);

    StatisticalSynthesis {
        score,
        verdict: Verdict::from_score(score),
        supporting,
        contradicting,
    }
}

/// Outcome of the synthesis tier
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    /// Tier result recorded in the breakdown
    pub result: TierResult,
    /// Final report score
    pub score: f64,
    /// Final verdict label
    pub verdict: String,
    /// Explanation
    pub reasoning: String,
    /// How the score was produced
    pub method: SynthesisMethod,
    /// Degradation notices
    pub warnings: Vec<String>,
}

impl SynthesisOutcome {
    /// Statistical outcome without touching a synthesizer
    pub fn statistical(evidence: &[Evidence]) -> Self {
        let stats = statistical_synthesis(evidence);
        Self {
            result: TierResult::success(Tier::Synthesis, stats.score, Vec::new()),
            score: stats.score,
            verdict: stats.verdict.as_str().to_string(),
            reasoning: stats.reasoning(evidence.len()),
            method: SynthesisMethod::Statistical,
            warnings: Vec::new(),
        }
    }
}

/// Composes the final verdict
#[derive(Clone)]
pub struct SynthesisEngine {
    synthesizer: Option<Arc<dyn LanguageModelSynthesizer>>,
    cache: Option<Arc<ResponseCache>>,
    timeout: Duration,
}

impl SynthesisEngine {
    /// Create an engine; `None` means statistical synthesis only
    pub fn new(synthesizer: Option<Arc<dyn LanguageModelSynthesizer>>, timeout: Duration) -> Self {
        Self {
            synthesizer,
            cache: None,
            timeout,
        }
    }

    /// Cache successful synthesizer responses
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Whether a synthesizer is configured
    pub fn has_synthesizer(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Produce the synthesis tier outcome
    ///
    /// A synthesizer failure is recorded as a failed tier and the report
    /// score comes from the statistical fallback.
    pub async fn synthesize(&self, claim: &Claim, evidence: &[Evidence], context: &SynthesisContext) -> SynthesisOutcome {
        let Some(synthesizer) = &self.synthesizer else {
            debug!("No synthesizer configured, using statistical synthesis");
            return SynthesisOutcome::statistical(evidence);
        };

        match self.ask(synthesizer.as_ref(), claim, evidence, context).await {
            Ok(response) => {
                info!(synthesizer = synthesizer.name(), score = response.score, "AI synthesis succeeded");
                let extra: Vec<Evidence> = response
                    .evidence
                    .unwrap_or_default()
                    .into_iter()
                    .map(|e| Evidence::new(e.publisher, e.url, e.quote, e.score, EvidenceType::Specialized))
                    .collect();
                SynthesisOutcome {
                    result: TierResult::success(Tier::Synthesis, response.score, extra),
                    score: clamp_score(response.score),
                    verdict: response.verdict.trim().to_string(),
                    reasoning: response.reasoning,
                    method: SynthesisMethod::Ai,
                    warnings: Vec::new(),
                }
            }
            Err(e) => {
                warn!(synthesizer = synthesizer.name(), error = %e, "AI synthesis failed, falling back to statistics");
                let mut outcome = SynthesisOutcome::statistical(evidence);
                outcome.result = TierResult::failure(Tier::Synthesis, e.to_string());
                outcome.warnings.push(format!("AI synthesis unavailable ({}); used statistical synthesis", e));
                outcome
            }
        }
    }

    async fn ask(
        &self,
        synthesizer: &dyn LanguageModelSynthesizer,
        claim: &Claim,
        evidence: &[Evidence],
        context: &SynthesisContext,
    ) -> Result<SynthesisResponse, SynthesisError> {
        let cache_query = fingerprint(synthesizer.name(), claim, evidence, context);
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(OperationClass::Synthesis, &cache_query)) {
            if let Ok(response) = serde_json::from_value::<SynthesisResponse>(cached) {
                debug!("Using cached synthesis response");
                return Ok(response);
            }
        }

        let response = tokio::time::timeout(self.timeout, synthesizer.synthesize(claim, evidence, context))
            .await
            .map_err(|_| SynthesisError::Timeout)??;
        validate(&response)?;

        if let Some(cache) = &self.cache {
            match serde_json::to_value(&response) {
                Ok(value) => cache.insert(OperationClass::Synthesis, &cache_query, value),
                Err(e) => debug!("Synthesis response not cached: {}", e),
            }
        }
        Ok(response)
    }
}

impl std::fmt::Debug for SynthesisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisEngine")
            .field("synthesizer", &self.synthesizer.as_ref().map(|s| s.name().to_string()))
            .field("cached", &self.cache.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn validate(response: &SynthesisResponse) -> Result<(), SynthesisError> {
    if !response.score.is_finite() || !(0.0..=100.0).contains(&response.score) {
        return Err(SynthesisError::MalformedResponse(format!(
            "score {} outside [0, 100]",
            response.score
        )));
    }
    if response.verdict.trim().is_empty() {
        return Err(SynthesisError::MalformedResponse("empty verdict".to_string()));
    }
    Ok(())
}

/// Cache query identifying a claim, its publishing context and the evidence
/// it was judged on
fn fingerprint(synthesizer: &str, claim: &Claim, evidence: &[Evidence], context: &SynthesisContext) -> String {
    let mut parts: Vec<String> = evidence
        .iter()
        .map(|e| format!("{}|{}@{:.0}", e.publisher, e.url.as_deref().unwrap_or_default(), e.score()))
        .collect();
    parts.sort();
    let publishing_context = context
        .publishing_context
        .as_deref()
        .or(claim.publishing_context())
        .unwrap_or_default();
    let value = Value::from(parts);
    format!("{}\n{}\n{}\n{}", synthesizer, claim.text(), publishing_context, value)
}
