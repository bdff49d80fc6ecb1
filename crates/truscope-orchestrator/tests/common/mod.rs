//! Fake collaborators shared by the pipeline tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use truscope_domain::{ClaimReviewProvider, NewsProvider, NewsQuery, ProviderError, SearchProvider};
use truscope_evidence::{CredibilityModel, EvidenceCandidate};

/// Scores evidence by URL, 50 for anything unknown
#[derive(Default)]
pub struct UrlScores(HashMap<String, f64>);

impl UrlScores {
    pub fn new(pairs: &[(&str, f64)]) -> Arc<Self> {
        Arc::new(Self(pairs.iter().map(|(u, s)| (u.to_string(), *s)).collect()))
    }
}

impl CredibilityModel for UrlScores {
    fn score(&self, candidate: &EvidenceCandidate, _claim: &str, _now: DateTime<Utc>) -> f64 {
        candidate
            .url
            .as_deref()
            .and_then(|u| self.0.get(u))
            .copied()
            .unwrap_or(50.0)
    }
}

/// What a fake provider does when called
#[derive(Clone)]
pub enum Behavior {
    Records(Vec<Value>),
    Status(u16),
    Stall(Duration),
}

impl Behavior {
    async fn respond(&self, name: &str) -> Result<Vec<Value>, ProviderError> {
        match self {
            Behavior::Records(records) => Ok(records.clone()),
            Behavior::Status(status) => Err(ProviderError::from_status(name, *status, "fake failure")),
            Behavior::Stall(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(Vec::new())
            }
        }
    }
}

/// One fake implementing every provider trait
pub struct FakeProvider {
    name: String,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(name: &str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn call(&self) -> Result<Vec<Value>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.behavior.respond(&self.name).await
    }
}

#[async_trait]
impl SearchProvider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<Value>, ProviderError> {
        self.call().await
    }
}

#[async_trait]
impl ClaimReviewProvider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search_claims(&self, _claim: &str, _max_results: usize) -> Result<Vec<Value>, ProviderError> {
        self.call().await
    }
}

#[async_trait]
impl NewsProvider for FakeProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search_news(&self, _query: &str, _params: &NewsQuery) -> Result<Vec<Value>, ProviderError> {
        self.call().await
    }
}

pub const BIDEN_CLAIM: &str = "Biden signed infrastructure bill in 2021";

pub fn claim_review(text: &str, url: &str, rating: &str) -> Value {
    json!({
        "text": text,
        "claimant": "Social media posts",
        "claimReview": [{
            "publisher": {"name": "PolitiFact", "site": "politifact.com"},
            "url": url,
            "title": "Fact check",
            "textualRating": rating
        }]
    })
}

pub fn search_result(url: &str, title: &str) -> Value {
    json!({"title": title, "link": url, "snippet": format!("{} (snippet)", title), "source": "Example"})
}

/// Two reviews rating the claim true, from sources scoring 40 and 50
pub fn biden_reviews() -> (Vec<Value>, Vec<(&'static str, f64)>) {
    let records = vec![
        claim_review(BIDEN_CLAIM, "https://factcheck.example/review-1", "True"),
        claim_review(
            "Biden signed the infrastructure bill into law in 2021",
            "https://factcheck.example/review-2",
            "True",
        ),
    ];
    let scores = vec![
        ("https://factcheck.example/review-1", 40.0),
        ("https://factcheck.example/review-2", 50.0),
    ];
    (records, scores)
}

/// Eight web results: six at or above 70, one at 40, one at 69; mean 78
pub fn biden_search() -> (Vec<Value>, Vec<(String, f64)>) {
    let scores = [80.0, 82.0, 85.0, 88.0, 90.0, 90.0, 40.0, 69.0];
    let mut records = Vec::new();
    let mut pairs = Vec::new();
    for (i, score) in scores.iter().enumerate() {
        let url = format!("https://news{}.example/infrastructure", i);
        records.push(search_result(&url, "Biden signs infrastructure bill"));
        pairs.push((url, *score));
    }
    (records, pairs)
}

/// Credibility model covering the Biden fixtures
pub fn biden_model() -> Arc<UrlScores> {
    let (_, review_scores) = biden_reviews();
    let (_, search_scores) = biden_search();
    let mut map: HashMap<String, f64> = review_scores.into_iter().map(|(u, s)| (u.to_string(), s)).collect();
    map.extend(search_scores);
    Arc::new(UrlScores(map))
}
