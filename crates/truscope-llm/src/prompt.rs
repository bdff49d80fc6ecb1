//! Prompt construction for verdict synthesis

use std::fmt::Write;
use truscope_domain::{Claim, Evidence, SynthesisContext};

/// Evidence items beyond this many are left out of the prompt
pub const MAX_PROMPT_EVIDENCE: usize = 25;

/// Quotes longer than this are truncated in the prompt
pub const MAX_QUOTE_CHARS: usize = 400;

/// Build the synthesis prompt
///
/// Evidence is listed highest score first so the most credible items survive
/// the [`MAX_PROMPT_EVIDENCE`] cut.
pub fn build_synthesis_prompt(claim: &Claim, evidence: &[Evidence], context: &SynthesisContext) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are a fact-checking analyst. Assess the claim below using only the evidence provided.\n\n",
    );
    let _ = writeln!(prompt, "CLAIM: {}", claim.text());
    if let Some(ctx) = claim.publishing_context().or(context.publishing_context.as_deref()) {
        let _ = writeln!(prompt, "PUBLISHING CONTEXT: {}", ctx);
    }
    prompt.push('\n');

    let mut ranked: Vec<&Evidence> = evidence.iter().collect();
    ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));

    if ranked.is_empty() {
        prompt.push_str("EVIDENCE: none was found.\n");
    } else {
        let _ = writeln!(
            prompt,
            "EVIDENCE ({} of {} items, credibility 0-100):",
            ranked.len().min(MAX_PROMPT_EVIDENCE),
            ranked.len()
        );
        for (i, e) in ranked.iter().take(MAX_PROMPT_EVIDENCE).enumerate() {
            let _ = writeln!(
                prompt,
                "{}. [{}] {} (credibility {:.0}){}\n   \"{}\"",
                i + 1,
                e.evidence_type.as_str(),
                e.publisher,
                e.score(),
                e.url.as_deref().map(|u| format!(" <{}>", u)).unwrap_or_default(),
                truncate(&e.quote, MAX_QUOTE_CHARS)
            );
        }
    }

    if !context.warnings.is_empty() {
        prompt.push_str("\nNOTES: some sources could not be consulted:\n");
        for w in &context.warnings {
            let _ = writeln!(prompt, "- {}", w);
        }
    }

    prompt.push_str(
        "\nRespond with a single JSON object and nothing else:\n\
         {\"score\": <0-100, how well the evidence supports the claim>,\n \
         \"verdict\": \"TRUE\" | \"MOSTLY TRUE\" | \"MIXED\" | \"MOSTLY FALSE\" | \"FALSE\",\n \
         \"reasoning\": \"<two to four sentences>\",\n \
         \"evidence\": [{\"publisher\": \"...\", \"url\": \"...\", \"quote\": \"...\", \"score\": <0-100>}]}\n\
         The \"evidence\" array is optional and should list only sources not already given above.\n",
    );

    prompt
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push('…');
    cut
}
