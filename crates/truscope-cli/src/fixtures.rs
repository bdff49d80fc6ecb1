//! Offline providers backed by a JSON file of raw payloads.
//!
//! The file holds one array of raw records per provider:
//!
//! ```json
//! {
//!   "claim_reviews": [{"text": "...", "claimReview": [{"publisher": {"name": "..."}, "url": "..."}]}],
//!   "search": [{"title": "...", "link": "...", "snippet": "...", "source": "..."}],
//!   "news": [{"title": "...", "link": "...", "description": "...", "pubDate": "...", "source_name": "..."}]
//! }
//! ```
//!
//! Every query gets the same records; the normalizer and scorer decide what
//! is relevant.

use crate::error::{CliError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use truscope_domain::{ClaimReviewProvider, NewsProvider, NewsQuery, Provenance, ProviderError, SearchProvider};

/// Raw provider payloads loaded from disk.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureSet {
    /// Fact-check review records
    #[serde(default)]
    pub claim_reviews: Vec<Value>,

    /// Web search records
    #[serde(default)]
    pub search: Vec<Value>,

    /// Shape of the search records (`search-result` or `alternate`)
    #[serde(default = "default_search_provenance")]
    pub search_provenance: Provenance,

    /// News article records
    #[serde(default)]
    pub news: Vec<Value>,
}

fn default_search_provenance() -> Provenance {
    Provenance::SearchResult
}

impl Default for FixtureSet {
    fn default() -> Self {
        Self {
            claim_reviews: Vec::new(),
            search: Vec::new(),
            search_provenance: default_search_provenance(),
            news: Vec::new(),
        }
    }
}

impl FixtureSet {
    /// Load a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let set: FixtureSet = serde_json::from_str(&contents)?;
        if !matches!(set.search_provenance, Provenance::SearchResult | Provenance::Alternate) {
            return Err(CliError::InvalidInput(format!(
                "search_provenance must be 'search-result' or 'alternate', got '{}'",
                set.search_provenance
            )));
        }
        Ok(set)
    }

    /// Wrap the fixtures in a provider usable for every tier.
    pub fn into_provider(self) -> Arc<FixtureProvider> {
        Arc::new(FixtureProvider { set: self })
    }
}

/// Serves [`FixtureSet`] records through every provider trait.
#[derive(Debug)]
pub struct FixtureProvider {
    set: FixtureSet,
}

fn take(records: &[Value], max_results: usize) -> Vec<Value> {
    records.iter().take(max_results).cloned().collect()
}

#[async_trait]
impl ClaimReviewProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixtures"
    }

    async fn search_claims(&self, _claim: &str, max_results: usize) -> std::result::Result<Vec<Value>, ProviderError> {
        Ok(take(&self.set.claim_reviews, max_results))
    }
}

#[async_trait]
impl SearchProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixtures"
    }

    fn provenance(&self) -> Provenance {
        self.set.search_provenance
    }

    async fn search(&self, _query: &str, max_results: usize) -> std::result::Result<Vec<Value>, ProviderError> {
        Ok(take(&self.set.search, max_results))
    }
}

#[async_trait]
impl NewsProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixtures"
    }

    async fn search_news(&self, _query: &str, params: &NewsQuery) -> std::result::Result<Vec<Value>, ProviderError> {
        Ok(take(&self.set.news, params.max_results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fx.json");
        fs::write(&path, r#"{"search": [{"title": "t", "link": "https://a.example"}]}"#).unwrap();

        let set = FixtureSet::load(&path).unwrap();
        assert_eq!(set.search.len(), 1);
        assert!(set.claim_reviews.is_empty());
        assert_eq!(set.search_provenance, Provenance::SearchResult);
    }

    #[test]
    fn test_rejects_non_search_provenance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fx.json");
        fs::write(&path, r#"{"search_provenance": "news-article"}"#).unwrap();
        assert!(matches!(FixtureSet::load(&path), Err(CliError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_provider_respects_max_results() {
        let set = FixtureSet {
            search: vec![Value::Null; 5],
            ..FixtureSet::default()
        };
        let provider = set.into_provider();
        assert_eq!(SearchProvider::search(provider.as_ref(), "q", 3).await.unwrap().len(), 3);
        assert!(provider.search_claims("q", 3).await.unwrap().is_empty());
    }
}
