//! Evidence-gathering tiers
//!
//! Each tier fetches raw records (through the response cache when one is
//! configured, and always through the retry policy), normalizes them and
//! reports the mean evidence score as its confidence.

use crate::config::OrchestratorConfig;
use crate::retry::RetryPolicy;
use crate::OrchestratorError;
use chrono::{DateTime, Utc};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};
use truscope_cache::{OperationClass, ResponseCache};
use truscope_domain::{
    ClaimReviewProvider, Evidence, NewsProvider, NewsQuery, Provenance, ProviderError, SearchProvider,
};
use truscope_evidence::{dedupe_by_url, CredibilityModel, EvidenceNormalizer};

/// Evidence gathered by one tier before it becomes a `TierResult`
#[derive(Debug, Default)]
pub(crate) struct TierOutcome {
    pub evidence: Vec<Evidence>,
    pub confidence: f64,
    pub warnings: Vec<String>,
}

impl TierOutcome {
    fn from_evidence(evidence: Vec<Evidence>, warnings: Vec<String>) -> Self {
        let evidence = dedupe_by_url(evidence);
        Self {
            confidence: mean_score(&evidence),
            evidence,
            warnings,
        }
    }
}

/// Mean evidence score, 0 when there is none
pub fn mean_score(evidence: &[Evidence]) -> f64 {
    if evidence.is_empty() {
        return 0.0;
    }
    evidence.iter().map(Evidence::score).sum::<f64>() / evidence.len() as f64
}

/// Evidence and normalization warnings from one specialized-analysis branch
type BranchResult = Result<(Vec<Evidence>, Vec<String>), ProviderError>;

/// Injected providers; any of them may be absent
#[derive(Clone, Default)]
pub struct Providers {
    /// Fact-check review lookup (direct verification)
    pub claim_review: Option<Arc<dyn ClaimReviewProvider>>,
    /// General web search (web search and alternate queries)
    pub search: Option<Arc<dyn SearchProvider>>,
    /// Date-bounded news search (specialized analysis)
    pub news: Option<Arc<dyn NewsProvider>>,
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers")
            .field("claim_review", &self.claim_review.as_ref().map(|p| p.name().to_string()))
            .field("search", &self.search.as_ref().map(|p| p.name().to_string()))
            .field("news", &self.news.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}

/// Runs the three evidence-gathering tiers
pub(crate) struct TierRunner {
    providers: Providers,
    cache: Option<Arc<ResponseCache>>,
    retry: RetryPolicy,
    review_normalizer: EvidenceNormalizer,
    normalizer: EvidenceNormalizer,
    config: OrchestratorConfig,
}

impl TierRunner {
    pub fn new(
        providers: Providers,
        cache: Option<Arc<ResponseCache>>,
        model: Arc<dyn CredibilityModel>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            providers,
            cache,
            retry: RetryPolicy::new(config.retry.clone()),
            review_normalizer: EvidenceNormalizer::new(model.clone())
                .with_min_claim_similarity(config.claim_similarity_threshold),
            normalizer: EvidenceNormalizer::new(model),
            config,
        }
    }

    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    /// Fetch raw records, consulting the cache first; only successes are cached
    async fn fetch_records<F, Fut>(
        &self,
        class: OperationClass,
        cache_query: &str,
        provider: &str,
        call: F,
    ) -> Result<Vec<Value>, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Vec<Value>, ProviderError>>,
    {
        let retry = &self.retry;
        let fetch = move || async move { retry.run(provider, call).await.map(Value::Array) };

        let value = match &self.cache {
            Some(cache) => cache.get_or_fetch(class, cache_query, fetch).await?,
            None => fetch().await?,
        };

        match value {
            Value::Array(records) => Ok(records),
            other => Err(ProviderError::MalformedResponse(format!(
                "expected an array of records from '{}', got {}",
                provider,
                json_kind(&other)
            ))),
        }
    }

    fn normalize(
        normalizer: &EvidenceNormalizer,
        provenance: Provenance,
        records: &[Value],
        claim: &str,
        now: DateTime<Utc>,
        warnings: &mut Vec<String>,
    ) -> Vec<Evidence> {
        let outcome = normalizer.normalize(provenance, records, claim, now);
        if !outcome.rejected.is_empty() {
            warnings.push(format!(
                "Discarded {} malformed {} record(s)",
                outcome.rejected.len(),
                provenance
            ));
        }
        if outcome.filtered > 0 {
            debug!(provenance = %provenance, filtered = outcome.filtered, "Filtered unrelated records");
        }
        outcome.evidence
    }

    /// Direct verification: fact-check reviews matching the claim
    pub async fn direct_verification(&self, claim: &str) -> Result<TierOutcome, OrchestratorError> {
        let provider = self
            .providers
            .claim_review
            .as_ref()
            .ok_or(OrchestratorError::MissingProvider("claim review"))?;
        let max = self.config.max_results;

        let records = self
            .fetch_records(OperationClass::ClaimReview, claim, provider.name(), || {
                provider.search_claims(claim, max)
            })
            .await?;

        let mut warnings = Vec::new();
        let evidence = Self::normalize(
            &self.review_normalizer,
            Provenance::ClaimReview,
            &records,
            claim,
            Utc::now(),
            &mut warnings,
        );
        Ok(TierOutcome::from_evidence(evidence, warnings))
    }

    /// Web search over the claim text
    pub async fn web_search(&self, claim: &str) -> Result<TierOutcome, OrchestratorError> {
        let provider = self
            .providers
            .search
            .as_ref()
            .ok_or(OrchestratorError::MissingProvider("search"))?;
        let records = self.search_records(provider, claim).await?;

        let mut warnings = Vec::new();
        let evidence = Self::normalize(
            &self.normalizer,
            provider.provenance(),
            &records,
            claim,
            Utc::now(),
            &mut warnings,
        );
        Ok(TierOutcome::from_evidence(evidence, warnings))
    }

    async fn search_records(&self, provider: &Arc<dyn SearchProvider>, query: &str) -> Result<Vec<Value>, ProviderError> {
        let max = self.config.max_results;
        self.fetch_records(OperationClass::WebSearch, query, provider.name(), || provider.search(query, max))
            .await
    }

    async fn news_records(
        &self,
        provider: &Arc<dyn NewsProvider>,
        query: &str,
        params: &NewsQuery,
    ) -> Result<Vec<Value>, ProviderError> {
        let cache_query = format!(
            "{} {}..{}",
            query,
            params.from_date.map(|d| d.to_string()).unwrap_or_default(),
            params.to_date.map(|d| d.to_string()).unwrap_or_default()
        );
        self.fetch_records(OperationClass::News, &cache_query, provider.name(), || {
            provider.search_news(query, params)
        })
        .await
    }

    /// Specialized analysis: news plus alternate queries, run concurrently
    ///
    /// A failing branch contributes no evidence and a warning; the tier only
    /// fails when every branch fails.
    pub async fn specialized_analysis(&self, claim: &str) -> Result<TierOutcome, OrchestratorError> {
        let now = Utc::now();
        let mut branches: Vec<BoxFuture<'_, (String, BranchResult)>> = Vec::new();

        if let Some(news) = &self.providers.news {
            let to = now.date_naive();
            let params = NewsQuery {
                from_date: Some(to - chrono::Duration::days(self.config.news_lookback_days)),
                to_date: Some(to),
                max_results: self.config.max_results,
            };
            branches.push(
                async move {
                    let label = format!("News search ({})", news.name());
                    let result = self.news_records(news, claim, &params).await.map(|records| {
                        let mut notes = Vec::new();
                        let found =
                            Self::normalize(&self.normalizer, Provenance::NewsArticle, &records, claim, now, &mut notes);
                        (found, notes)
                    });
                    (label, result)
                }
                .boxed(),
            );
        }

        if let Some(search) = &self.providers.search {
            for query in self.config.alternate_queries_for(claim) {
                branches.push(
                    async move {
                        let label = format!("Alternate query '{}'", query);
                        let result = self.search_records(search, &query).await.map(|records| {
                            let mut notes = Vec::new();
                            let found =
                                Self::normalize(&self.normalizer, search.provenance(), &records, claim, now, &mut notes);
                            (found, notes)
                        });
                        (label, result)
                    }
                    .boxed(),
                );
            }
        }

        if branches.is_empty() {
            return Err(OrchestratorError::MissingProvider("news or search"));
        }

        let count = branches.len();
        let mut evidence = Vec::new();
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        for (label, result) in join_all(branches).await {
            match result {
                Ok((found, notes)) => {
                    evidence.extend(found);
                    warnings.extend(notes);
                }
                Err(e) => {
                    warn!(branch = %label, error = %e, "Specialized analysis branch failed");
                    warnings.push(format!("{} failed: {}", label, e));
                    errors.push(e.to_string());
                }
            }
        }

        if errors.len() == count {
            return Err(OrchestratorError::AllBranchesFailed { count, errors });
        }
        Ok(TierOutcome::from_evidence(evidence, warnings))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
