//! Evidence error types

use thiserror::Error;
use truscope_domain::{Provenance, ProviderError};

/// Errors that can occur while normalizing or scoring evidence
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvidenceError {
    /// Payload could not yield well-formed evidence
    #[error("Malformed {provenance} payload: {reason}")]
    MalformedResponse {
        /// Shape the payload was parsed as
        provenance: Provenance,
        /// What was wrong with it
        reason: String,
    },

    /// Credibility policy could not be loaded
    #[error("Policy error: {0}")]
    Policy(String),
}

impl EvidenceError {
    pub(crate) fn malformed(provenance: Provenance, reason: impl Into<String>) -> Self {
        EvidenceError::MalformedResponse {
            provenance,
            reason: reason.into(),
        }
    }
}

impl From<EvidenceError> for ProviderError {
    fn from(e: EvidenceError) -> Self {
        ProviderError::MalformedResponse(e.to_string())
    }
}
