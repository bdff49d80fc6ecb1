//! Escalation state machine

use truscope_domain::{Tier, TierResult};

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Consulting fact-check reviews
    DirectVerification,
    /// General web search
    WebSearch,
    /// News and alternate-query fan-out
    SpecializedAnalysis,
    /// Final verdict composition
    Synthesis,
    /// Report produced
    Done,
    /// Fatal error; `ANALYSIS ERROR` report
    Failed,
}

impl PipelineState {
    /// Initial state of every request
    pub const INITIAL: PipelineState = PipelineState::DirectVerification;

    /// Tier executed in this state, if any
    pub fn tier(&self) -> Option<Tier> {
        match self {
            PipelineState::DirectVerification => Some(Tier::DirectVerification),
            PipelineState::WebSearch => Some(Tier::WebSearch),
            PipelineState::SpecializedAnalysis => Some(Tier::SpecializedAnalysis),
            PipelineState::Synthesis => Some(Tier::Synthesis),
            PipelineState::Done | PipelineState::Failed => None,
        }
    }

    /// Whether the state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    fn from_tier(tier: Tier) -> Self {
        match tier {
            Tier::DirectVerification => PipelineState::DirectVerification,
            Tier::WebSearch => PipelineState::WebSearch,
            Tier::SpecializedAnalysis => PipelineState::SpecializedAnalysis,
            Tier::Synthesis => PipelineState::Synthesis,
        }
    }
}

/// Decides after each tier whether the pipeline stops
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscalationPolicy {
    /// Direct verification at or above this confidence stops the pipeline
    pub direct_threshold: f64,
    /// Web search at or above this confidence (with consensus) stops the pipeline
    pub web_threshold: f64,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            direct_threshold: 80.0,
            web_threshold: 70.0,
        }
    }
}

impl EscalationPolicy {
    /// Whether the pipeline stops after `result`
    ///
    /// `has_consensus` is only consulted for web search. Failed tiers never
    /// stop the pipeline, except synthesis, which is always terminal.
    pub fn should_stop(&self, result: &TierResult, has_consensus: bool) -> bool {
        match result.tier {
            Tier::DirectVerification => result.success && result.confidence >= self.direct_threshold,
            Tier::WebSearch => result.success && has_consensus && result.confidence >= self.web_threshold,
            Tier::SpecializedAnalysis => false,
            Tier::Synthesis => true,
        }
    }

    /// State following `result`
    pub fn next_state(&self, result: &TierResult, has_consensus: bool) -> PipelineState {
        if self.should_stop(result, has_consensus) {
            return PipelineState::Done;
        }
        result
            .tier
            .next()
            .map(PipelineState::from_tier)
            .unwrap_or(PipelineState::Done)
    }
}
