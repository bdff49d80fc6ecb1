//! TruScope Evidence
//!
//! Turns raw provider payloads into scored, deduplicated [`Evidence`].
//!
//! The pipeline for one provider response is:
//!
//! ```text
//! raw JSON + Provenance → RawPayload (strict parse) → EvidenceCandidate(s)
//!     → CredibilityScorer → Evidence
//! ```
//!
//! - **EvidenceNormalizer**: one adapter per payload variant, selected by the
//!   provider's [`Provenance`](truscope_domain::Provenance) tag
//! - **CredibilityScorer**: pure 0–100 heuristic driven by a
//!   [`CredibilityPolicy`] table; claim reviews are further scaled by where
//!   the fact-checker's rating sits on the [`ReviewScale`]
//! - **ConsensusEvaluator**: lopsided-agreement test gating escalation
//! - **dedupe_by_url**: keeps the higher-scored item per normalized URL
//!
//! # Examples
//!
//! ```
//! use truscope_evidence::{CredibilityScorer, EvidenceNormalizer};
//! use truscope_domain::Provenance;
//! use chrono::Utc;
//! use std::sync::Arc;
//!
//! let normalizer = EvidenceNormalizer::new(Arc::new(CredibilityScorer::default()));
//! let raw = vec![serde_json::json!({
//!     "title": "Senate passes infrastructure bill",
//!     "link": "https://www.reuters.com/world/us/senate-infrastructure",
//!     "snippet": "The bipartisan infrastructure bill was signed in 2021.",
//!     "source": "Reuters"
//! })];
//!
//! let outcome = normalizer.normalize(Provenance::SearchResult, &raw, "Biden signed infrastructure bill", Utc::now());
//! assert_eq!(outcome.evidence.len(), 1);
//! assert!(outcome.rejected.is_empty());
//! ```
//!
//! [`Evidence`]: truscope_domain::Evidence

#![warn(missing_docs)]

mod consensus;
mod credibility;
mod dedup;
mod error;
mod normalizer;
mod payload;
mod policy;
mod rating;
mod text;

pub use consensus::{ConsensusConfig, ConsensusEvaluator, ConsensusReport};
pub use credibility::{CredibilityModel, CredibilityScorer, ScoreBreakdown};
pub use dedup::{dedupe_by_url, normalize_url};
pub use error::EvidenceError;
pub use normalizer::{EvidenceCandidate, EvidenceNormalizer, NormalizationOutcome};
pub use payload::{
    AlternateRecord, ClaimReviewRecord, NewsRecord, PublisherField, RawPayload, ReviewRating,
    ReviewRecord, SearchResultRecord,
};
pub use policy::{CredibilityPolicy, DomainPattern, DomainTier, RecencyBand};
pub use rating::{RatingLabel, ReviewScale};
pub use text::{overlap_ratio, tokenize};
