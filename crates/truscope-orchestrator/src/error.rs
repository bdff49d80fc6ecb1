//! Error types for the orchestrator

use thiserror::Error;
use truscope_domain::{DomainError, ProviderError};

/// Errors that can occur while running the verification pipeline
///
/// Tier-level errors are recorded in the report and never escape a
/// verification request; only an error escaping every tier boundary turns
/// into the fatal `ANALYSIS ERROR` report.
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// Claim could not be constructed
    #[error("Invalid claim: {0}")]
    InvalidClaim(#[from] DomainError),

    /// A provider call failed after retries
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// No provider is configured for a tier
    #[error("No {0} provider configured")]
    MissingProvider(&'static str),

    /// Every concurrent branch of a tier failed
    #[error("All {count} branches failed: {}", .errors.join("; "))]
    AllBranchesFailed {
        /// Number of branches attempted
        count: usize,
        /// One message per failed branch
        errors: Vec<String>,
    },

    /// The request deadline elapsed
    #[error("Pipeline deadline of {after_ms}ms exceeded")]
    PipelineDeadlineExceeded {
        /// Deadline that elapsed
        after_ms: u64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
