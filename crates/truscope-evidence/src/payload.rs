//! Raw provider record shapes
//!
//! Each provider shape is a separate struct; [`RawPayload::parse`] picks the
//! struct from the provider's provenance tag and fails with
//! `MalformedResponse` when the JSON does not fit it.

use crate::EvidenceError;
use serde::Deserialize;
use serde_json::Value;
use truscope_domain::Provenance;

/// Search-engine hit: `{link, title, snippet, source}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResultRecord {
    /// Result title
    pub title: Option<String>,
    /// Primary URL field
    pub link: Option<String>,
    /// Secondary URL field
    pub url: Option<String>,
    /// Tertiary URL field
    pub href: Option<String>,
    /// Primary text field
    pub snippet: Option<String>,
    /// Secondary text field
    pub description: Option<String>,
    /// Tertiary text field
    pub text: Option<String>,
    /// Primary publisher field
    pub source: Option<String>,
    /// Secondary publisher field
    pub publisher: Option<String>,
    /// Publication date, any common format
    #[serde(rename = "publishedDate", alias = "published_date", alias = "date")]
    pub published_date: Option<String>,
}

/// Alternate search shape: `{url, publisher, description, text}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlternateRecord {
    /// Primary URL field
    pub url: Option<String>,
    /// Secondary URL field
    pub link: Option<String>,
    /// Tertiary URL field
    pub href: Option<String>,
    /// Primary publisher field
    pub publisher: Option<String>,
    /// Secondary publisher field
    pub source: Option<String>,
    /// Optional title
    pub title: Option<String>,
    /// Primary text field
    pub description: Option<String>,
    /// Secondary text field
    pub text: Option<String>,
    /// Publication date, any common format
    #[serde(rename = "publishedDate", alias = "published_date", alias = "date")]
    pub published_date: Option<String>,
}

/// Review publisher: either a bare name or `{name, site}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PublisherField {
    /// Bare publisher name
    Name(String),
    /// Structured publisher
    Detailed {
        /// Publisher name
        name: Option<String>,
        /// Publisher site
        site: Option<String>,
    },
}

impl PublisherField {
    /// Best display name: `name → site`
    pub fn display_name(&self) -> Option<&str> {
        match self {
            PublisherField::Name(n) => Some(n.as_str()),
            PublisherField::Detailed { name, site } => name.as_deref().or(site.as_deref()),
        }
    }
}

/// Rating attached to a fact-check review
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRating {
    /// Numeric rating
    pub rating_value: Option<f64>,
    /// Rating label, e.g. "False" or "Mostly True"
    pub textual_rating: Option<String>,
    /// Best achievable numeric rating
    pub best_rating: Option<f64>,
    /// Worst achievable numeric rating
    pub worst_rating: Option<f64>,
}

/// One fact-check review
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    /// Reviewing organization
    pub publisher: Option<PublisherField>,
    /// Review URL
    pub url: Option<String>,
    /// Review headline
    pub title: Option<String>,
    /// Review date
    pub review_date: Option<String>,
    /// Rating
    pub review_rating: Option<ReviewRating>,
    /// Google Fact Check style rating label at review level
    pub textual_rating: Option<String>,
}

impl ReviewRecord {
    /// Rating label: `reviewRating.textualRating → textualRating`
    pub fn rating_label(&self) -> Option<&str> {
        self.review_rating
            .as_ref()
            .and_then(|r| r.textual_rating.as_deref())
            .or(self.textual_rating.as_deref())
    }

    /// Nested rating merged with the review-level label
    pub fn rating(&self) -> ReviewRating {
        let mut rating = self.review_rating.clone().unwrap_or_default();
        rating.textual_rating = self.rating_label().map(str::to_string);
        rating
    }
}

/// Claim-review lookup result: `{text, claimReview: [...]}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReviewRecord {
    /// The reviewed claim as worded by the fact-checker
    pub text: Option<String>,
    /// Who made the claim
    pub claimant: Option<String>,
    /// When the claim was made
    pub claim_date: Option<String>,
    /// Reviews of the claim
    #[serde(default)]
    pub claim_review: Vec<ReviewRecord>,
}

/// News article: `{link, title, description, pubDate, source_name}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewsRecord {
    /// Headline
    pub title: Option<String>,
    /// Primary URL field
    pub link: Option<String>,
    /// Secondary URL field
    pub url: Option<String>,
    /// Primary text field
    pub description: Option<String>,
    /// Secondary text field
    pub content: Option<String>,
    /// Publication date, any common format
    #[serde(rename = "pubDate", alias = "pub_date", alias = "publishedAt")]
    pub pub_date: Option<String>,
    /// Primary publisher field
    pub source_name: Option<String>,
    /// Secondary publisher field
    pub source_id: Option<String>,
}

/// A provider record tagged with its shape
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Search-engine hit
    SearchResult(SearchResultRecord),
    /// Alternate search shape
    Alternate(AlternateRecord),
    /// Claim-review lookup result
    ClaimReview(ClaimReviewRecord),
    /// News article
    NewsArticle(NewsRecord),
}

impl RawPayload {
    /// Strictly parse `value` as the shape named by `provenance`
    pub fn parse(provenance: Provenance, value: &Value) -> Result<Self, EvidenceError> {
        if !value.is_object() {
            return Err(EvidenceError::malformed(provenance, "record is not a JSON object"));
        }

        let parsed = match provenance {
            Provenance::SearchResult => serde_json::from_value(value.clone()).map(RawPayload::SearchResult),
            Provenance::Alternate => serde_json::from_value(value.clone()).map(RawPayload::Alternate),
            Provenance::ClaimReview => serde_json::from_value(value.clone()).map(RawPayload::ClaimReview),
            Provenance::NewsArticle => serde_json::from_value(value.clone()).map(RawPayload::NewsArticle),
        };

        parsed.map_err(|e| EvidenceError::malformed(provenance, e.to_string()))
    }

    /// Provenance tag of this payload
    pub fn provenance(&self) -> Provenance {
        match self {
            RawPayload::SearchResult(_) => Provenance::SearchResult,
            RawPayload::Alternate(_) => Provenance::Alternate,
            RawPayload::ClaimReview(_) => Provenance::ClaimReview,
            RawPayload::NewsArticle(_) => Provenance::NewsArticle,
        }
    }
}
