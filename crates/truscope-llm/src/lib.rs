//! TruScope LLM Synthesizer Layer
//!
//! Implementations of the `LanguageModelSynthesizer` trait from
//! `truscope-domain`.
//!
//! # Synthesizers
//!
//! - `MockSynthesizer`: scripted results for testing and offline runs
//! - `OllamaSynthesizer`: local Ollama API integration
//!
//! Both return `SynthesisError` on failure; the orchestrator's synthesis
//! engine falls back to statistical synthesis in that case.
//!
//! # Examples
//!
//! ```
//! use truscope_llm::{build_synthesis_prompt, parse_synthesis_response};
//! use truscope_domain::{Claim, SynthesisContext};
//!
//! let claim = Claim::new("The Great Wall is visible from space", None).unwrap();
//! let prompt = build_synthesis_prompt(&claim, &[], &SynthesisContext::default());
//! assert!(prompt.contains("The Great Wall is visible from space"));
//!
//! let reply = r#"{"score": 15, "verdict": "FALSE", "reasoning": "Astronauts report otherwise."}"#;
//! assert_eq!(parse_synthesis_response(reply).unwrap().verdict, "FALSE");
//! ```

#![warn(missing_docs)]

mod error;
mod mock;
pub mod ollama;
mod parser;
mod prompt;

pub use error::LlmError;
pub use mock::MockSynthesizer;
pub use ollama::OllamaSynthesizer;
pub use parser::parse_synthesis_response;
pub use prompt::{build_synthesis_prompt, MAX_PROMPT_EVIDENCE, MAX_QUOTE_CHARS};
