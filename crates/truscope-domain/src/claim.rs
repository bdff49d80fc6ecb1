//! Claim module - the text under verification

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A claim submitted for verification
///
/// Claims are created once per request and never mutated. The text is kept
/// exactly as submitted (minus surrounding whitespace); normalization for
/// matching and cache keys happens downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    text: String,
    publishing_context: Option<String>,
}

impl Claim {
    /// Create a new claim
    ///
    /// # Examples
    ///
    /// ```
    /// use truscope_domain::Claim;
    ///
    /// let claim = Claim::new("The Eiffel Tower is in Paris", Some("news".to_string())).unwrap();
    /// assert_eq!(claim.text(), "The Eiffel Tower is in Paris");
    /// assert!(Claim::new("   ", None).is_err());
    /// ```
    pub fn new(text: impl Into<String>, publishing_context: Option<String>) -> Result<Self, DomainError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(DomainError::EmptyClaim);
        }

        let publishing_context = publishing_context
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(Self {
            text,
            publishing_context,
        })
    }

    /// Raw claim text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Optional publishing context tag (e.g. "news", "social-media")
    pub fn publishing_context(&self) -> Option<&str> {
        self.publishing_context.as_deref()
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
