//! Ollama synthesizer
//!
//! Sends the synthesis prompt to a local Ollama instance in JSON mode and
//! parses the reply.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama API
//! - Configurable endpoint, model and timeout
//! - Retry logic with exponential backoff for transient failures
//!
//! # Examples
//!
//! ```no_run
//! use truscope_llm::OllamaSynthesizer;
//!
//! let synthesizer = OllamaSynthesizer::new("http://localhost:11434", "llama3.1")
//!     .expect("HTTP client")
//!     .with_max_retries(2);
//! ```

use crate::parser::parse_synthesis_response;
use crate::prompt::build_synthesis_prompt;
use crate::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use truscope_domain::{
    Claim, Evidence, LanguageModelSynthesizer, SynthesisContext, SynthesisError, SynthesisResponse,
};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama-backed [`LanguageModelSynthesizer`]
#[derive(Debug, Clone)]
pub struct OllamaSynthesizer {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    max_retries: u32,
    backoff_base: Duration,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaSynthesizer {
    /// Create a synthesizer for `model` served at `endpoint`
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Communication`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a synthesizer with a custom per-request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: Duration::from_secs(1),
        })
    }

    /// Create a synthesizer against `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Set the first backoff delay; later delays double
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate text using the Ollama API
    ///
    /// Connection failures, timeouts, 429 and 5xx responses are retried with
    /// exponential backoff. A 404 means the model is not pulled and is not
    /// retried.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let request_body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(&request_body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<OllamaGenerateResponse>()
                            .await
                            .map(|r| r.response)
                            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)));
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else if status.is_server_error() {
                        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
                    } else {
                        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
                        return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
                    }
                }
                Err(e) if e.is_timeout() => {
                    last_error = Some(LlmError::Timeout);
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                let delay = self.backoff_base * 2u32.pow(attempts - 1);
                warn!(
                    model = %self.model,
                    attempt = attempts,
                    backoff_ms = delay.as_millis() as u64,
                    "Ollama request failed, retrying: {}",
                    last_error.as_ref().map(|e| e.to_string()).unwrap_or_default()
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}

#[async_trait]
impl LanguageModelSynthesizer for OllamaSynthesizer {
    fn name(&self) -> &str {
        &self.model
    }

    async fn synthesize(
        &self,
        claim: &Claim,
        evidence: &[Evidence],
        context: &SynthesisContext,
    ) -> Result<SynthesisResponse, SynthesisError> {
        let prompt = build_synthesis_prompt(claim, evidence, context);
        debug!(model = %self.model, evidence = evidence.len(), prompt_chars = prompt.len(), "Requesting synthesis");

        let raw = self.generate(&prompt).await?;
        Ok(parse_synthesis_response(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve canned HTTP responses in order, one per connection
    async fn serve(responses: Vec<(u16, String)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else { return };
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut socket).await;
                let reply = format!(
                    "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), hits)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    fn ok_body(inner: &str) -> String {
        serde_json::json!({"response": inner, "done": true}).to_string()
    }

    #[test]
    fn test_ollama_synthesizer_creation() {
        let s = OllamaSynthesizer::new("http://localhost:11434/", "llama3.1").unwrap();
        assert_eq!(s.endpoint, "http://localhost:11434");
        assert_eq!(s.model(), "llama3.1");
        assert_eq!(s.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_default_endpoint_and_retries() {
        let s = OllamaSynthesizer::default_endpoint("mistral").unwrap().with_max_retries(0);
        assert_eq!(s.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(s.max_retries, 1);
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        let s = OllamaSynthesizer::new("http://localhost:99999", "llama2").unwrap().with_max_retries(1);
        let result = s.generate("test").await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_succeeds() {
        let reply = r#"{"score": 77, "verdict": "MOSTLY TRUE", "reasoning": "ok"}"#;
        let (endpoint, hits) = serve(vec![(503, "{}".to_string()), (200, ok_body(reply))]).await;

        let s = OllamaSynthesizer::new(endpoint, "llama3.1")
            .unwrap()
            .with_backoff_base(Duration::from_millis(1));
        let claim = Claim::new("claim", None).unwrap();
        let r = s.synthesize(&claim, &[], &SynthesisContext::default()).await.unwrap();

        assert_eq!(r.score, 77.0);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_model_not_retried() {
        let (endpoint, hits) = serve(vec![(404, "{}".to_string()), (200, ok_body("{}"))]).await;
        let s = OllamaSynthesizer::new(endpoint, "absent")
            .unwrap()
            .with_backoff_base(Duration::from_millis(1));

        let err = s.generate("p").await.unwrap_err();
        assert_eq!(err, LlmError::ModelNotAvailable("absent".to_string()));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refusal_maps_to_safety_blocked() {
        let (endpoint, _) = serve(vec![(200, ok_body("I'm sorry, I can't help with that."))]).await;
        let s = OllamaSynthesizer::new(endpoint, "llama3.1").unwrap();
        let claim = Claim::new("claim", None).unwrap();

        let err = s.synthesize(&claim, &[], &SynthesisContext::default()).await.unwrap_err();
        assert!(matches!(err, SynthesisError::SafetyBlocked(_)));
    }

    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_synthesize_integration() {
        let s = OllamaSynthesizer::default_endpoint("llama3.1").unwrap();
        let claim = Claim::new("Water boils at 100 degrees Celsius at sea level", None).unwrap();
        if let Ok(r) = s.synthesize(&claim, &[], &SynthesisContext::default()).await {
            assert!(!r.verdict.is_empty());
        }
    }
}
