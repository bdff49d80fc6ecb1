//! URL-based evidence deduplication

use std::collections::HashMap;
use truscope_domain::Evidence;

/// Canonical form of a URL used as the deduplication key
///
/// Lowercases scheme and host, drops the query string and fragment, and
/// strips trailing slashes. The path keeps its case.
///
/// ```
/// use truscope_evidence::normalize_url;
///
/// assert_eq!(
///     normalize_url("HTTPS://WWW.Reuters.com/world/Story/?utm_source=x#top"),
///     "https://www.reuters.com/world/Story"
/// );
/// ```
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    let without_fragment = trimmed.split('#').next().unwrap_or(trimmed);
    let without_query = without_fragment.split('?').next().unwrap_or(without_fragment);

    let (scheme, rest) = match without_query.split_once("://") {
        Some((scheme, rest)) => (Some(scheme.to_lowercase()), rest),
        None => (None, without_query),
    };

    let (host, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    let mut normalized = String::with_capacity(without_query.len());
    if let Some(scheme) = scheme {
        normalized.push_str(&scheme);
        normalized.push_str("://");
    }
    normalized.push_str(&host.to_lowercase());
    normalized.push_str(path.trim_end_matches('/'));
    normalized
}

/// Lowercase host of `url` without `www.` or port
pub(crate) fn host_of(url: &str) -> Option<String> {
    let rest = url.trim().split_once("://").map(|(_, r)| r).unwrap_or(url.trim());
    let host = rest.split(['/', '?', '#']).next()?;
    let host = host.rsplit('@').next()?;
    let host = host.split(':').next()?.to_lowercase();
    let host = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Collapse evidence sharing a normalized URL, keeping the higher score
///
/// Items without a URL are never merged. Output keeps first-occurrence order;
/// on equal scores the earlier item wins.
pub fn dedupe_by_url(evidence: Vec<Evidence>) -> Vec<Evidence> {
    let mut kept: Vec<Evidence> = Vec::with_capacity(evidence.len());
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for item in evidence {
        let Some(key) = item.url.as_deref().map(normalize_url).filter(|k| !k.is_empty()) else {
            kept.push(item);
            continue;
        };

        match index_by_key.get(&key) {
            Some(&idx) => {
                if item.score() > kept[idx].score() {
                    kept[idx] = item;
                }
            }
            None => {
                index_by_key.insert(key, kept.len());
                kept.push(item);
            }
        }
    }

    kept
}
