//! Tiered verification orchestrator

use crate::config::OrchestratorConfig;
use crate::escalation::{EscalationPolicy, PipelineState};
use crate::synthesis::{SynthesisEngine, SynthesisOutcome};
use crate::tiers::{Providers, TierOutcome, TierRunner};
use crate::OrchestratorError;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use truscope_cache::ResponseCache;
use truscope_domain::{
    Claim, ClaimReviewProvider, DurablePersistence, Evidence, LanguageModelSynthesizer, NewsProvider, SearchProvider,
    SynthesisContext, SynthesisMethod, Tier, TierResult, TierStatus, Verdict, VerificationReport,
};
use truscope_evidence::{dedupe_by_url, ConsensusEvaluator, CredibilityModel, CredibilityScorer};

/// Observer notified at every tier boundary
pub type ProgressCallback = Arc<dyn Fn(Tier, TierStatus) + Send + Sync>;

/// Escalating claim verifier
///
/// Runs direct verification, web search, specialized analysis and synthesis
/// in order, stopping as soon as a tier is confident enough. Tier failures
/// degrade the report but never fail the request.
pub struct TierOrchestrator {
    config: OrchestratorConfig,
    tiers: TierRunner,
    synthesis: SynthesisEngine,
    consensus: ConsensusEvaluator,
    escalation: EscalationPolicy,
    cache: Option<Arc<ResponseCache>>,
    persistence: Option<Arc<dyn DurablePersistence>>,
}

/// Builder for [`TierOrchestrator`]
#[derive(Default)]
pub struct TierOrchestratorBuilder {
    config: OrchestratorConfig,
    providers: Providers,
    synthesizer: Option<Arc<dyn LanguageModelSynthesizer>>,
    persistence: Option<Arc<dyn DurablePersistence>>,
    cache: Option<Arc<ResponseCache>>,
    model: Option<Arc<dyn CredibilityModel>>,
}

impl TierOrchestratorBuilder {
    /// Set the configuration
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the fact-check review provider
    pub fn claim_review_provider(mut self, provider: Arc<dyn ClaimReviewProvider>) -> Self {
        self.providers.claim_review = Some(provider);
        self
    }

    /// Set the web search provider
    pub fn search_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.providers.search = Some(provider);
        self
    }

    /// Set the news provider
    pub fn news_provider(mut self, provider: Arc<dyn NewsProvider>) -> Self {
        self.providers.news = Some(provider);
        self
    }

    /// Set the language-model synthesizer
    pub fn synthesizer(mut self, synthesizer: Arc<dyn LanguageModelSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Set where finished reports are saved
    pub fn persistence(mut self, persistence: Arc<dyn DurablePersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Share a response cache across tiers and requests
    pub fn cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the default credibility scorer
    pub fn credibility_model(mut self, model: Arc<dyn CredibilityModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Validate the configuration and build the orchestrator
    pub fn build(self) -> Result<TierOrchestrator, OrchestratorError> {
        self.config.validate()?;

        let model = self
            .model
            .unwrap_or_else(|| Arc::new(CredibilityScorer::default()) as Arc<dyn CredibilityModel>);
        let mut synthesis = SynthesisEngine::new(self.synthesizer, self.config.synthesis_timeout());
        if let Some(cache) = &self.cache {
            synthesis = synthesis.with_cache(cache.clone());
        }

        Ok(TierOrchestrator {
            tiers: TierRunner::new(self.providers, self.cache.clone(), model, self.config.clone()),
            synthesis,
            consensus: ConsensusEvaluator::new(self.config.consensus.clone()),
            escalation: EscalationPolicy {
                direct_threshold: self.config.direct_confidence_threshold,
                web_threshold: self.config.web_confidence_threshold,
            },
            cache: self.cache,
            persistence: self.persistence,
            config: self.config,
        })
    }
}

/// Mutable state of one verification request
struct RequestState {
    evidence: Vec<Evidence>,
    results: Vec<TierResult>,
    warnings: Vec<String>,
}

impl RequestState {
    fn new() -> Self {
        Self {
            evidence: Vec::new(),
            results: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn executed_tiers(&self) -> Vec<Tier> {
        self.results.iter().map(|r| r.tier).collect()
    }

    fn record(&mut self, result: TierResult) {
        self.evidence.extend(result.evidence.iter().cloned());
        self.results.push(result);
    }

    fn deduped_evidence(&mut self) -> &[Evidence] {
        self.evidence = dedupe_by_url(std::mem::take(&mut self.evidence));
        &self.evidence
    }
}

/// How a request ended
enum Conclusion {
    /// Stopped early at an evidence tier
    Confident(Tier, f64),
    /// Synthesis ran (or fell back)
    Synthesized(SynthesisOutcome),
    /// Deadline elapsed before synthesis finished
    DeadlineExceeded,
}

impl TierOrchestrator {
    /// Start building an orchestrator
    pub fn builder() -> TierOrchestratorBuilder {
        TierOrchestratorBuilder::default()
    }

    /// Configuration in use
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Shared response cache, if any
    pub fn cache(&self) -> Option<&Arc<ResponseCache>> {
        self.cache.as_ref()
    }

    /// Verify one claim
    pub async fn perform_tiered_check(&self, claim_text: &str, publishing_context: Option<&str>) -> VerificationReport {
        self.run(claim_text, publishing_context, None).await
    }

    /// Verify one claim, reporting each tier boundary to `on_progress`
    pub async fn perform_tiered_check_with_progress(
        &self,
        claim_text: &str,
        publishing_context: Option<&str>,
        on_progress: ProgressCallback,
    ) -> VerificationReport {
        self.run(claim_text, publishing_context, Some(&on_progress)).await
    }

    /// Verify many claims in fixed-size concurrent chunks
    ///
    /// Reports are returned in input order.
    pub async fn check_batch(&self, claims: &[String]) -> Vec<VerificationReport> {
        let chunk_size = self.config.batch_chunk_size.max(1);
        let total_chunks = claims.len().div_ceil(chunk_size);
        let mut reports = Vec::with_capacity(claims.len());

        for (idx, chunk) in claims.chunks(chunk_size).enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.config.batch_delay()).await;
            }
            info!(chunk = idx + 1, total_chunks, claims = chunk.len(), "Processing batch chunk");
            let chunk_reports = join_all(chunk.iter().map(|claim| self.perform_tiered_check(claim, None))).await;
            reports.extend(chunk_reports);
        }

        reports
    }

    async fn run(
        &self,
        claim_text: &str,
        publishing_context: Option<&str>,
        on_progress: Option<&ProgressCallback>,
    ) -> VerificationReport {
        let started = Instant::now();

        let claim = match Claim::new(claim_text, publishing_context.map(str::to_string)) {
            Ok(claim) => claim,
            Err(e) => {
                let e = OrchestratorError::from(e);
                error!(error = %e, "Verification failed");
                let mut report = VerificationReport::analysis_error(claim_text, e.to_string());
                report.processing_time_ms = started.elapsed().as_millis() as u64;
                self.persist(&report).await;
                return report;
            }
        };

        info!(claim_chars = claim.text().len(), "Starting tiered verification");
        let notify = |tier: Tier, status: TierStatus| {
            if let Some(callback) = on_progress {
                callback(tier, status);
            }
        };

        let deadline = tokio::time::Instant::now() + self.config.request_deadline();
        let mut request = RequestState::new();
        let mut state = PipelineState::INITIAL;
        let mut conclusion = Conclusion::DeadlineExceeded;

        while let Some(tier) = state.tier() {
            notify(tier, TierStatus::Active);
            let tier_started = Instant::now();

            if tier == Tier::Synthesis {
                let context = SynthesisContext {
                    publishing_context: claim.publishing_context().map(str::to_string),
                    executed_tiers: request.executed_tiers(),
                    warnings: request.warnings.clone(),
                };
                let evidence = request.deduped_evidence().to_vec();
                match tokio::time::timeout_at(deadline, self.synthesis.synthesize(&claim, &evidence, &context)).await
                {
                    Ok(mut outcome) => {
                        outcome.result.processing_time_ms = tier_started.elapsed().as_millis() as u64;
                        outcome.result.should_escalate = false;
                        notify(tier, status_of(&outcome.result));
                        request.warnings.append(&mut outcome.warnings);
                        request.record(outcome.result.clone());
                        conclusion = Conclusion::Synthesized(outcome);
                    }
                    Err(_) => {
                        self.record_deadline(&mut request, tier, tier_started);
                        notify(tier, TierStatus::Failed);
                    }
                }
                break;
            }

            let outcome = match tokio::time::timeout_at(deadline, self.execute(tier, claim.text())).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    self.record_deadline(&mut request, tier, tier_started);
                    notify(tier, TierStatus::Failed);
                    break;
                }
            };

            let (mut result, has_consensus) = match outcome {
                Ok(TierOutcome {
                    evidence,
                    confidence,
                    warnings,
                }) => {
                    request.warnings.extend(warnings);
                    let has_consensus = tier == Tier::WebSearch && self.consensus.has_consensus(&evidence);
                    (TierResult::success(tier, confidence, evidence), has_consensus)
                }
                Err(e) => {
                    warn!(tier = %tier, error = %e, "Tier failed, escalating");
                    request.warnings.push(format!("{} failed: {}", tier, e));
                    (TierResult::failure(tier, e.to_string()), false)
                }
            };

            let next = self.escalation.next_state(&result, has_consensus);
            result.should_escalate = next != PipelineState::Done;
            result.processing_time_ms = tier_started.elapsed().as_millis() as u64;
            debug!(
                tier = %tier,
                success = result.success,
                confidence = result.confidence,
                evidence = result.evidence.len(),
                consensus = has_consensus,
                escalate = result.should_escalate,
                "Tier finished"
            );
            notify(tier, status_of(&result));

            let confidence = result.confidence;
            request.record(result);
            if next == PipelineState::Done {
                conclusion = Conclusion::Confident(tier, confidence);
            }
            state = next;
        }

        let report = self.conclude(&claim, request, conclusion, started);
        info!(
            verdict = %report.verdict,
            score = report.score,
            tiers = report.tier_breakdown.len(),
            warnings = report.warnings.len(),
            elapsed_ms = report.processing_time_ms,
            "Verification finished"
        );
        self.persist(&report).await;
        report
    }

    async fn execute(&self, tier: Tier, claim: &str) -> Result<TierOutcome, OrchestratorError> {
        match tier {
            Tier::DirectVerification => self.tiers.direct_verification(claim).await,
            Tier::WebSearch => self.tiers.web_search(claim).await,
            Tier::SpecializedAnalysis => self.tiers.specialized_analysis(claim).await,
            Tier::Synthesis => Ok(TierOutcome::default()),
        }
    }

    fn record_deadline(&self, request: &mut RequestState, tier: Tier, tier_started: Instant) {
        let e = OrchestratorError::PipelineDeadlineExceeded {
            after_ms: self.config.request_deadline().as_millis() as u64,
        };
        warn!(tier = %tier, "Request deadline exceeded");
        let mut result = TierResult::failure(tier, e.to_string());
        result.should_escalate = false;
        result.processing_time_ms = tier_started.elapsed().as_millis() as u64;
        request.record(result);
        request.warnings.push(format!("PipelineDeadlineExceeded: {} during {}", e, tier));
    }

    fn conclude(
        &self,
        claim: &Claim,
        mut request: RequestState,
        conclusion: Conclusion,
        started: Instant,
    ) -> VerificationReport {
        let evidence = request.deduped_evidence().to_vec();

        let (verdict, score, reasoning, method) = match conclusion {
            Conclusion::Confident(tier, confidence) => {
                let qualifier = match tier {
                    Tier::DirectVerification => "Verified by Fact-Checkers",
                    _ => "Well Supported",
                };
                (
                    format!("{} — {}", Verdict::from_score(confidence), qualifier),
                    confidence,
                    format!(
                        "Stopped after {} with confidence {:.0} from {} evidence item(s).",
                        tier,
                        confidence,
                        evidence.len()
                    ),
                    SynthesisMethod::TierConfidence,
                )
            }
            Conclusion::Synthesized(outcome) => (outcome.verdict, outcome.score, outcome.reasoning, outcome.method),
            Conclusion::DeadlineExceeded => {
                let fallback = SynthesisOutcome::statistical(&evidence);
                (
                    fallback.verdict,
                    fallback.score,
                    format!("{} Verification was cut short by the request deadline.", fallback.reasoning),
                    fallback.method,
                )
            }
        };

        VerificationReport {
            id: uuid::Uuid::now_v7(),
            claim: claim.text().to_string(),
            verdict,
            score: VerificationReport::score_from(score),
            evidence,
            tier_breakdown: request.results.iter().map(TierResult::summary).collect(),
            warnings: request.warnings,
            reasoning,
            synthesis_method: method,
            processing_time_ms: started.elapsed().as_millis() as u64,
            created_at: Utc::now(),
        }
    }

    async fn persist(&self, report: &VerificationReport) {
        if !self.config.persist_reports {
            return;
        }
        let Some(persistence) = &self.persistence else {
            return;
        };

        let key = format!("report:{}", report.id);
        let value = match serde_json::to_value(report) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to encode report");
                return;
            }
        };
        if let Err(e) = persistence.save(&key, value).await {
            warn!(key = %key, error = %e, "Failed to persist report");
        }
    }
}

impl std::fmt::Debug for TierOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TierOrchestrator")
            .field("providers", self.tiers.providers())
            .field("synthesis", &self.synthesis)
            .field("cached", &self.cache.is_some())
            .field("persisted", &self.persistence.is_some())
            .finish_non_exhaustive()
    }
}

fn status_of(result: &TierResult) -> TierStatus {
    if result.success {
        TierStatus::Completed
    } else {
        TierStatus::Failed
    }
}
