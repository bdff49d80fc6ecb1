//! Wiring of providers, synthesizer, cache and persistence for one CLI run.

use crate::config::Config;
use crate::error::Result;
use crate::fixtures::FixtureSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use truscope_cache::{JsonFilePersistence, ResponseCache};
use truscope_evidence::CredibilityScorer;
use truscope_llm::OllamaSynthesizer;
use truscope_orchestrator::TierOrchestrator;

/// Orchestrator plus the resources that outlive a single verification.
pub struct Session {
    orchestrator: TierOrchestrator,
    cache: Arc<ResponseCache>,
    persistence: Arc<JsonFilePersistence>,
}

impl Session {
    /// Build the orchestrator and restore the cache snapshot.
    ///
    /// Without fixtures no providers are configured and every evidence tier
    /// degrades; synthesis is statistical unless an Ollama model is set.
    pub async fn open(config: &Config, fixtures: Option<&Path>, ollama_model: Option<&str>) -> Result<Self> {
        let persistence = Arc::new(JsonFilePersistence::new(config.data_dir()?));
        let cache = Arc::new(ResponseCache::new(config.cache.clone()));

        match cache.restore_snapshot(persistence.as_ref()).await {
            Ok(restored) => debug!(restored, "Restored cache snapshot"),
            Err(e) => warn!(error = %e, "Cache snapshot not restored"),
        }

        let mut builder = TierOrchestrator::builder()
            .config(config.orchestrator.clone())
            .cache(cache.clone())
            .persistence(persistence.clone())
            .credibility_model(Arc::new(CredibilityScorer::new(config.credibility.clone())));

        match fixtures {
            Some(path) => {
                let provider = FixtureSet::load(path)?.into_provider();
                info!(path = %path.display(), "Using fixture providers");
                builder = builder
                    .claim_review_provider(provider.clone())
                    .search_provider(provider.clone())
                    .news_provider(provider);
            }
            None => warn!("No providers configured; pass --fixtures to supply evidence"),
        }

        if let Some(model) = ollama_model.or(config.ollama.model.as_deref()) {
            let synthesizer = OllamaSynthesizer::with_timeout(
                config.ollama.endpoint.as_str(),
                model,
                Duration::from_secs(config.ollama.timeout_secs),
            )?;
            info!(model, endpoint = %config.ollama.endpoint, "Using Ollama synthesizer");
            builder = builder.synthesizer(Arc::new(synthesizer));
        }

        Ok(Self {
            orchestrator: builder.build()?,
            cache,
            persistence,
        })
    }

    /// The configured orchestrator.
    pub fn orchestrator(&self) -> &TierOrchestrator {
        &self.orchestrator
    }

    /// Save the cache snapshot; failures are logged only.
    pub async fn close(self) {
        match self.cache.save_snapshot(self.persistence.as_ref()).await {
            Ok(saved) => debug!(saved, "Saved cache snapshot"),
            Err(e) => warn!(error = %e, "Cache snapshot not saved"),
        }
        let metrics = self.cache.metrics();
        debug!(
            hits = metrics.hits,
            misses = metrics.misses,
            entries = metrics.entries,
            hit_rate = metrics.hit_rate(),
            "Cache metrics"
        );
    }
}
