//! Deterministic synthesizer for tests and offline runs

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use truscope_domain::{
    Claim, Evidence, LanguageModelSynthesizer, SynthesisContext, SynthesisError, SynthesisResponse,
};

/// Mock synthesizer returning scripted results without any network calls
///
/// Scripted results are consumed in order; once the script is exhausted the
/// default outcome is returned. Clones share the script and call count.
///
/// # Examples
///
/// ```
/// use truscope_llm::MockSynthesizer;
/// use truscope_domain::{Claim, LanguageModelSynthesizer, SynthesisContext, SynthesisError};
///
/// # tokio_test_block_on(async {
/// let mock = MockSynthesizer::new(72.0, "MOSTLY TRUE");
/// mock.push_error(SynthesisError::Timeout);
///
/// let claim = Claim::new("Water boils at 100C at sea level", None).unwrap();
/// let ctx = SynthesisContext::default();
/// assert!(mock.synthesize(&claim, &[], &ctx).await.is_err());
/// assert_eq!(mock.synthesize(&claim, &[], &ctx).await.unwrap().score, 72.0);
/// assert_eq!(mock.call_count(), 2);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    default_outcome: Result<SynthesisResponse, SynthesisError>,
    script: Arc<Mutex<VecDeque<Result<SynthesisResponse, SynthesisError>>>>,
    call_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockSynthesizer {
    /// Always answer with `score` and `verdict`
    pub fn new(score: f64, verdict: impl Into<String>) -> Self {
        Self::with_response(SynthesisResponse {
            score,
            verdict: verdict.into(),
            reasoning: "Mock synthesis".to_string(),
            evidence: None,
        })
    }

    /// Always answer with `response`
    pub fn with_response(response: SynthesisResponse) -> Self {
        Self {
            default_outcome: Ok(response),
            script: Arc::new(Mutex::new(VecDeque::new())),
            call_count: Arc::new(Mutex::new(0)),
            delay: None,
        }
    }

    /// Always fail with `error`
    pub fn failing(error: SynthesisError) -> Self {
        Self {
            default_outcome: Err(error),
            ..Self::default()
        }
    }

    /// Sleep before answering (drives timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a response for the next call
    pub fn push_response(&self, response: SynthesisResponse) {
        lock(&self.script).push_back(Ok(response));
    }

    /// Queue an error for the next call
    pub fn push_error(&self, error: SynthesisError) {
        lock(&self.script).push_back(Err(error));
    }

    /// Get the number of times synthesize was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new(50.0, "MIXED")
    }
}

#[async_trait]
impl LanguageModelSynthesizer for MockSynthesizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn synthesize(
        &self,
        _claim: &Claim,
        _evidence: &[Evidence],
        _context: &SynthesisContext,
    ) -> Result<SynthesisResponse, SynthesisError> {
        *lock(&self.call_count) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = lock(&self.script).pop_front();
        next.unwrap_or_else(|| self.default_outcome.clone())
    }
}
