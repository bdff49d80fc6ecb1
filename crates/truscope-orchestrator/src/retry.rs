//! Bounded retry with exponential backoff for provider calls

use crate::config::RetryConfig;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use truscope_domain::ProviderError;

/// Per-call timeout plus bounded retries
///
/// Each attempt runs under the configured call timeout; an elapsed timeout
/// becomes [`ProviderError::Timeout`]. Retryable errors are tried again after
/// `base · 2^(attempt-1)` (capped at `max_delay`) plus random jitter.
/// Non-retryable errors are returned immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a policy from its configuration
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Backoff delay before retry number `attempt` (1-based), without jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let delay = self.config.base_delay().saturating_mul(1u32 << exp);
        delay.min(self.config.max_delay())
    }

    fn with_jitter(&self, delay: Duration) -> Duration {
        if self.config.jitter <= 0.0 {
            return delay;
        }
        delay + delay.mul_f64(self.config.jitter * fastrand::f64())
    }

    /// Run `call` until it succeeds, fails permanently, or attempts run out
    pub async fn run<T, F, Fut>(&self, provider: &str, mut call: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let timeout = self.config.call_timeout();
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let outcome = match tokio::time::timeout(timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout {
                    provider: provider.to_string(),
                    after_ms: timeout.as_millis() as u64,
                }),
            };

            let error = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(provider, attempt, "Provider call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if !error.is_retryable() || attempt >= max_attempts {
                return Err(error);
            }

            let backoff = self.with_jitter(self.backoff(attempt));
            warn!(
                provider,
                attempt,
                max_attempts,
                backoff_ms = backoff.as_millis() as u64,
                error = %error,
                "Provider call failed, retrying"
            );
            tokio::time::sleep(backoff).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
