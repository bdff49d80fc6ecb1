//! Parse LLM output into a synthesis response

use crate::LlmError;
use serde_json::Value;
use tracing::warn;
use truscope_domain::{SynthesisResponse, SynthesizedEvidence};

const REFUSAL_MARKERS: &[&str] = &[
    "i can't help with",
    "i cannot help with",
    "i can't assist",
    "i cannot assist",
    "i'm unable to assist",
    "i am unable to assist",
    "i won't be able to",
    "against my guidelines",
    "content policy",
];

/// Parse a model reply into a [`SynthesisResponse`]
///
/// A reply with no JSON object that reads like a refusal becomes
/// [`LlmError::Refused`]; any other unparseable reply is
/// [`LlmError::InvalidResponse`]. Evidence entries that do not parse are
/// skipped.
pub fn parse_synthesis_response(response: &str) -> Result<SynthesisResponse, LlmError> {
    let json_str = match extract_json(response) {
        Some(s) => s,
        None if looks_like_refusal(response) => {
            return Err(LlmError::Refused(first_line(response)));
        }
        None => {
            return Err(LlmError::InvalidResponse("No JSON object in response".to_string()));
        }
    };

    let json: Value = serde_json::from_str(json_str)
        .map_err(|e| LlmError::InvalidResponse(format!("JSON parse error: {}", e)))?;
    let obj = json
        .as_object()
        .ok_or_else(|| LlmError::InvalidResponse("Expected JSON object".to_string()))?;

    let score = obj
        .get("score")
        .and_then(score_value)
        .ok_or_else(|| LlmError::InvalidResponse("Missing or invalid 'score'".to_string()))?;

    let verdict = obj
        .get("verdict")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| LlmError::InvalidResponse("Missing or invalid 'verdict'".to_string()))?;

    let reasoning = obj
        .get("reasoning")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .trim()
        .to_string();

    let evidence = obj.get("evidence").and_then(|v| v.as_array()).map(|items| {
        items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| match serde_json::from_value::<SynthesizedEvidence>(item.clone()) {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("Skipping synthesized evidence {}: {}", idx, e);
                    None
                }
            })
            .collect()
    });

    Ok(SynthesisResponse {
        score,
        verdict,
        reasoning,
        evidence,
    })
}

/// Models sometimes quote the score as a string
fn score_value(v: &Value) -> Option<f64> {
    v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Locate the JSON object in a reply, handling markdown code blocks and
/// surrounding prose
fn extract_json(response: &str) -> Option<&str> {
    let trimmed = response.trim();

    let body = if let Some(rest) = trimmed.strip_prefix("```") {
        // Skip the language tag line and the closing fence
        let rest = rest.split_once('\n').map(|(_, r)| r).unwrap_or("");
        rest.rsplit_once("```").map(|(body, _)| body).unwrap_or(rest)
    } else {
        trimmed
    };

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}

fn looks_like_refusal(response: &str) -> bool {
    let lower = response.to_lowercase();
    REFUSAL_MARKERS.iter().any(|m| lower.contains(m))
}

fn first_line(response: &str) -> String {
    response.trim().lines().next().unwrap_or_default().to_string()
}
