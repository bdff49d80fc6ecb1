//! Consensus evaluation over scored evidence

use crate::EvidenceError;
use serde::{Deserialize, Serialize};
use truscope_domain::Evidence;

/// Thresholds for the lopsided-agreement test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Scores at or above this count as high
    pub high_threshold: f64,
    /// Scores at or below this count as low
    pub low_threshold: f64,
    /// Minimum size of the dominant partition
    pub min_majority: usize,
    /// Maximum size of the opposing partition
    pub max_minority: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            high_threshold: 70.0,
            low_threshold: 40.0,
            min_majority: 5,
            max_minority: 1,
        }
    }
}

impl ConsensusConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), EvidenceError> {
        if self.low_threshold >= self.high_threshold {
            return Err(EvidenceError::Policy(
                "consensus low_threshold must be below high_threshold".to_string(),
            ));
        }
        if self.max_minority >= self.min_majority {
            return Err(EvidenceError::Policy(
                "consensus max_minority must be below min_majority".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partition counts behind a consensus decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusReport {
    /// Items scoring at or above the high threshold
    pub high_count: usize,
    /// Items scoring at or below the low threshold
    pub low_count: usize,
    /// Whether one side dominates
    pub consensus: bool,
}

/// Decides whether scored evidence agrees enough to stop escalating
#[derive(Debug, Clone, Default)]
pub struct ConsensusEvaluator {
    config: ConsensusConfig,
}

impl ConsensusEvaluator {
    /// Create an evaluator with the given thresholds
    pub fn new(config: ConsensusConfig) -> Self {
        Self { config }
    }

    /// Partition `evidence` and report whether one side dominates
    pub fn evaluate(&self, evidence: &[Evidence]) -> ConsensusReport {
        let high_count = evidence
            .iter()
            .filter(|e| e.score() >= self.config.high_threshold)
            .count();
        let low_count = evidence
            .iter()
            .filter(|e| e.score() <= self.config.low_threshold)
            .count();

        let dominates = |major: usize, minor: usize| {
            major >= self.config.min_majority && minor <= self.config.max_minority
        };

        ConsensusReport {
            high_count,
            low_count,
            consensus: dominates(high_count, low_count) || dominates(low_count, high_count),
        }
    }

    /// Shorthand for `evaluate(evidence).consensus`
    pub fn has_consensus(&self, evidence: &[Evidence]) -> bool {
        self.evaluate(evidence).consensus
    }
}
