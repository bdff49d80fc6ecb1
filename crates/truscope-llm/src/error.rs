//! Error types for synthesizer backends

use thiserror::Error;
use truscope_domain::SynthesisError;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Model declined to answer
    #[error("Refused: {0}")]
    Refused(String),

    /// Request did not complete in time
    #[error("Request timed out")]
    Timeout,
}

impl From<LlmError> for SynthesisError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout => SynthesisError::Timeout,
            LlmError::Refused(reason) => SynthesisError::SafetyBlocked(reason),
            LlmError::InvalidResponse(reason) => SynthesisError::MalformedResponse(reason),
            other => SynthesisError::Unavailable(other.to_string()),
        }
    }
}
