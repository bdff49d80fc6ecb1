//! Domain-level validation errors

use thiserror::Error;

/// Errors raised while constructing domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Claim text was empty or whitespace-only
    #[error("Claim text must not be empty")]
    EmptyClaim,

    /// Tier name could not be parsed
    #[error("Invalid tier: {0}")]
    InvalidTier(String),
}
