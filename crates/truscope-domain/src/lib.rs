//! TruScope Domain Layer
//!
//! Core value types and collaborator contracts for tiered claim verification.
//! Everything else in the workspace depends on this crate; it performs no I/O
//! of its own.
//!
//! ## Key Concepts
//!
//! - **Claim**: The text under verification, immutable once created
//! - **Evidence**: One normalized, scored, sourced fact relevant to a claim
//! - **Tier**: One stage of the escalation pipeline
//!   (direct-verification → web-search → specialized-analysis → synthesis)
//! - **VerificationReport**: The terminal output of one verification request
//!
//! ## Architecture
//!
//! - Pure value types plus trait definitions for every external interaction
//! - Provider, synthesizer and persistence implementations live in other crates
//!   (or in the embedding application) and are injected by reference

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod claim;
pub mod error;
pub mod evidence;
pub mod provider;
pub mod report;
pub mod tier;
pub mod traits;

// Re-exports for convenience
pub use claim::Claim;
pub use error::DomainError;
pub use evidence::{clamp_score, Evidence, EvidenceId, EvidenceType};
pub use provider::{NewsQuery, PersistenceError, Provenance, ProviderError, SynthesisError};
pub use report::{
    SynthesisMethod, TierResult, TierResultSummary, TierStatus, Verdict, VerificationReport,
};
pub use tier::Tier;
pub use traits::{
    ClaimReviewProvider, DurablePersistence, LanguageModelSynthesizer, NewsProvider, SearchProvider,
    SynthesisContext, SynthesisResponse, SynthesizedEvidence,
};
