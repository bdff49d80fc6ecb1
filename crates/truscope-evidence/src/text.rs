//! Tokenization shared by relevance scoring and claim matching

use std::collections::BTreeSet;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "were", "that", "this", "with", "from", "has", "have",
    "had", "not", "but", "its", "his", "her", "they", "their", "been", "will", "would", "into",
    "than", "then", "there", "what", "when", "which", "who", "about",
];

/// Lowercased content words of `text`
///
/// Splits on anything that is not alphanumeric, drops words shorter than three
/// characters and common stopwords, and deduplicates.
///
/// ```
/// use truscope_evidence::tokenize;
///
/// let words = tokenize("Biden signed the infrastructure bill in 2021!");
/// assert!(words.contains("biden"));
/// assert!(words.contains("2021"));
/// assert!(!words.contains("the"));
/// assert!(!words.contains("in"));
/// ```
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 3)
        .map(|w| w.to_lowercase())
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Share of `reference` words that also occur in `candidate`, in `[0, 1]`
///
/// Returns 0 when `reference` is empty.
pub fn overlap_ratio(reference: &BTreeSet<String>, candidate: &BTreeSet<String>) -> f64 {
    if reference.is_empty() {
        return 0.0;
    }
    let matches = reference.iter().filter(|w| candidate.contains(*w)).count();
    matches as f64 / reference.len() as f64
}
