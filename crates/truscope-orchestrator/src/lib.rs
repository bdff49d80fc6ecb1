//! TruScope Orchestrator
//!
//! The tiered verification pipeline: escalation state machine, tier
//! execution with retries and caching, and verdict synthesis.
//!
//! ```text
//! DirectVerification ──(success ∧ conf ≥ 80)──────────────► Done
//!        │
//!        ▼
//! WebSearch ──(success ∧ consensus ∧ conf ≥ 70)────────────► Done
//!        │
//!        ▼
//! SpecializedAnalysis ──► Synthesis ──────────────────────► Done
//! ```
//!
//! # Examples
//!
//! ```
//! use truscope_orchestrator::{OrchestratorConfig, TierOrchestrator};
//!
//! # tokio_test();
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn tokio_test() {
//! let orchestrator = TierOrchestrator::builder()
//!     .config(OrchestratorConfig::default())
//!     .build()
//!     .unwrap();
//!
//! // No providers configured: every evidence tier degrades, synthesis falls back
//! let report = orchestrator.perform_tiered_check("The Eiffel Tower is in Paris", None).await;
//! assert_eq!(report.score, 50);
//! assert!(!report.warnings.is_empty());
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod escalation;
mod orchestrator;
mod retry;
mod synthesis;
mod tiers;

pub use config::{OrchestratorConfig, RetryConfig};
pub use error::OrchestratorError;
pub use escalation::{EscalationPolicy, PipelineState};
pub use orchestrator::{ProgressCallback, TierOrchestrator, TierOrchestratorBuilder};
pub use retry::RetryPolicy;
pub use synthesis::{
    statistical_synthesis, StatisticalSynthesis, SynthesisEngine, SynthesisOutcome, CONFLICT_PENALTY,
    CONTRADICTING_THRESHOLD, FALLBACK_FLOOR, SUPPORTING_THRESHOLD,
};
pub use tiers::{mean_score, Providers};
