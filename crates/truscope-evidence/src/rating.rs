//! Fact-check rating scale
//!
//! A review's rating is placed on a 0 (false) to 1 (true) scale. Numeric
//! ratings use `(value - worst) / (best - worst)`; otherwise the textual label
//! is looked up in a table, longest whole-word match first.

use crate::payload::ReviewRating;
use crate::EvidenceError;
use serde::{Deserialize, Serialize};

/// One row of the rating-label table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingLabel {
    /// Label as published, e.g. "Mostly False"
    pub label: String,
    /// Position on the false (0) to true (1) scale
    pub position: f64,
}

/// Maps fact-check ratings to a truth position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewScale {
    /// Known textual ratings
    pub labels: Vec<RatingLabel>,
    /// Position of a review whose rating is absent or unrecognized
    pub unrated_position: f64,
}

impl Default for ReviewScale {
    fn default() -> Self {
        let labels = [
            ("true", 1.0),
            ("correct", 1.0),
            ("accurate", 1.0),
            ("mostly true", 0.75),
            ("mostly correct", 0.75),
            ("mostly accurate", 0.75),
            ("half true", 0.5),
            ("mixture", 0.5),
            ("mixed", 0.5),
            ("partly false", 0.35),
            ("missing context", 0.35),
            ("misleading", 0.25),
            ("mostly false", 0.25),
            ("false", 0.0),
            ("not true", 0.0),
            ("untrue", 0.0),
            ("incorrect", 0.0),
            ("inaccurate", 0.0),
            ("fake", 0.0),
            ("pants on fire", 0.0),
        ];
        Self {
            labels: labels
                .iter()
                .map(|(label, position)| RatingLabel {
                    label: label.to_string(),
                    position: *position,
                })
                .collect(),
            unrated_position: 0.5,
        }
    }
}

/// Lowercase, punctuation to spaces, single-spaced
fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn numeric_position(rating: &ReviewRating) -> Option<f64> {
    let value = rating.rating_value.filter(|v| v.is_finite())?;
    let best = rating.best_rating.filter(|v| v.is_finite())?;
    let worst = rating.worst_rating.filter(|v| v.is_finite()).unwrap_or(0.0);
    if best <= worst {
        return None;
    }
    Some(((value - worst) / (best - worst)).clamp(0.0, 1.0))
}

impl ReviewScale {
    /// Position of `rating` in `[0, 1]`
    pub fn position(&self, rating: &ReviewRating) -> f64 {
        numeric_position(rating)
            .or_else(|| rating.textual_rating.as_deref().and_then(|l| self.label_position(l)))
            .unwrap_or(self.unrated_position)
    }

    /// Position of a textual rating, if the table knows it
    pub fn label_position(&self, label: &str) -> Option<f64> {
        let padded = format!(" {} ", normalize_label(label));
        self.labels
            .iter()
            .map(|row| (normalize_label(&row.label), row.position))
            .filter(|(known, _)| !known.is_empty() && padded.contains(&format!(" {} ", known)))
            .max_by_key(|(known, _)| known.len())
            .map(|(_, position)| position)
    }

    /// Validate the scale
    pub fn validate(&self) -> Result<(), EvidenceError> {
        let in_unit = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
        if !in_unit(self.unrated_position) {
            return Err(EvidenceError::Policy("unrated_position must be within [0, 1]".to_string()));
        }
        for row in &self.labels {
            if normalize_label(&row.label).is_empty() {
                return Err(EvidenceError::Policy("rating labels must not be empty".to_string()));
            }
            if !in_unit(row.position) {
                return Err(EvidenceError::Policy(format!(
                    "rating label '{}' position must be within [0, 1]",
                    row.label
                )));
            }
        }
        Ok(())
    }
}
