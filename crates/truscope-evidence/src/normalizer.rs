//! Provider payload normalization
//!
//! One adapter per [`RawPayload`] variant turns a raw record into one or more
//! [`EvidenceCandidate`]s, which the credibility model then scores.

use crate::dedup::host_of;
use crate::payload::{
    AlternateRecord, ClaimReviewRecord, NewsRecord, RawPayload, ReviewRating, SearchResultRecord,
};
use crate::text::{overlap_ratio, tokenize};
use crate::{CredibilityModel, EvidenceError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use truscope_domain::{Evidence, EvidenceType, Provenance};

/// Unscored evidence extracted from one provider record
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceCandidate {
    /// Evidence type the candidate will carry
    pub evidence_type: EvidenceType,
    /// Publisher name (falls back to the URL host)
    pub publisher: String,
    /// Source URL
    pub url: Option<String>,
    /// Headline, possibly empty
    pub title: String,
    /// Body text, possibly empty
    pub snippet: String,
    /// Length of the full description in characters
    pub description_chars: usize,
    /// Parsed publication date
    pub published_date: Option<DateTime<Utc>>,
    /// Fact-checker's rating; set for claim reviews only
    pub review_rating: Option<ReviewRating>,
}

impl EvidenceCandidate {
    /// Quote shown in the report: the snippet, or the title when there is none
    pub fn quote(&self) -> &str {
        if self.snippet.is_empty() {
            &self.title
        } else {
            &self.snippet
        }
    }
}

/// Result of normalizing one provider response
#[derive(Debug, Default)]
pub struct NormalizationOutcome {
    /// Scored evidence, in record order
    pub evidence: Vec<Evidence>,
    /// One error per rejected record
    pub rejected: Vec<EvidenceError>,
    /// Claim-review records dropped for low claim similarity
    pub filtered: usize,
}

/// Maps provider payloads to scored [`Evidence`]
#[derive(Clone)]
pub struct EvidenceNormalizer {
    model: Arc<dyn CredibilityModel>,
    min_claim_similarity: f64,
}

impl EvidenceNormalizer {
    /// Create a normalizer that scores with `model`
    pub fn new(model: Arc<dyn CredibilityModel>) -> Self {
        Self {
            model,
            min_claim_similarity: 0.0,
        }
    }

    /// Drop claim-review records whose reviewed claim shares fewer than
    /// `threshold` of the request claim's words
    pub fn with_min_claim_similarity(mut self, threshold: f64) -> Self {
        self.min_claim_similarity = threshold.clamp(0.0, 1.0);
        self
    }

    /// Normalize and score every record of one provider response
    ///
    /// A malformed record contributes zero evidence and one entry in
    /// `rejected`; the rest of the batch is unaffected.
    pub fn normalize(
        &self,
        provenance: Provenance,
        records: &[Value],
        claim: &str,
        now: DateTime<Utc>,
    ) -> NormalizationOutcome {
        let mut outcome = NormalizationOutcome::default();
        let claim_words = tokenize(claim);

        for (idx, record) in records.iter().enumerate() {
            let payload = match RawPayload::parse(provenance, record) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(provenance = %provenance, record = idx, "Rejected record: {}", e);
                    outcome.rejected.push(e);
                    continue;
                }
            };

            if let RawPayload::ClaimReview(review) = &payload {
                if self.min_claim_similarity > 0.0 {
                    let reviewed = tokenize(review.text.as_deref().unwrap_or_default());
                    let similarity = overlap_ratio(&claim_words, &reviewed);
                    if similarity < self.min_claim_similarity {
                        debug!(record = idx, similarity, "Dropping unrelated claim review");
                        outcome.filtered += 1;
                        continue;
                    }
                }
            }

            match candidates(&payload) {
                Ok(found) => {
                    for candidate in found {
                        let score = self.score(&candidate, claim, now);
                        outcome.evidence.push(into_evidence(candidate, score));
                    }
                }
                Err(e) => {
                    warn!(provenance = %provenance, record = idx, "Rejected record: {}", e);
                    outcome.rejected.push(e);
                }
            }
        }

        outcome
    }

    /// Source credibility, scaled by the review's rating for claim reviews
    ///
    /// A review rating the claim false scores near 0 however credible the
    /// fact-checker is.
    fn score(&self, candidate: &EvidenceCandidate, claim: &str, now: DateTime<Utc>) -> f64 {
        let credibility = self.model.score(candidate, claim, now);
        match &candidate.review_rating {
            Some(rating) => credibility * self.model.review_position(rating).clamp(0.0, 1.0),
            None => credibility,
        }
    }
}

impl std::fmt::Debug for EvidenceNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceNormalizer")
            .field("min_claim_similarity", &self.min_claim_similarity)
            .finish_non_exhaustive()
    }
}

fn into_evidence(candidate: EvidenceCandidate, score: f64) -> Evidence {
    let quote = candidate.quote().to_string();
    let mut evidence = Evidence::new(
        candidate.publisher,
        candidate.url,
        quote,
        score,
        candidate.evidence_type,
    );
    evidence.published_date = candidate.published_date;
    evidence
}

/// Extract candidates from a parsed payload
pub(crate) fn candidates(payload: &RawPayload) -> Result<Vec<EvidenceCandidate>, EvidenceError> {
    match payload {
        RawPayload::SearchResult(r) => from_search_result(r).map(|c| vec![c]),
        RawPayload::Alternate(r) => from_alternate(r).map(|c| vec![c]),
        RawPayload::ClaimReview(r) => from_claim_review(r),
        RawPayload::NewsArticle(r) => from_news(r).map(|c| vec![c]),
    }
}

/// First non-blank value of a fallback chain
fn first_of<'a>(chain: &[Option<&'a str>]) -> Option<&'a str> {
    chain
        .iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
}

fn publisher_or_host(chain: &[Option<&str>], url: Option<&str>) -> String {
    first_of(chain)
        .map(str::to_string)
        .or_else(|| url.and_then(host_of))
        .unwrap_or_else(|| "Unknown".to_string())
}

fn require_text(
    provenance: Provenance,
    title: Option<&str>,
    snippet: Option<&str>,
) -> Result<(), EvidenceError> {
    if title.is_none() && snippet.is_none() {
        return Err(EvidenceError::malformed(provenance, "record has neither a title nor a quote"));
    }
    Ok(())
}

fn from_search_result(r: &SearchResultRecord) -> Result<EvidenceCandidate, EvidenceError> {
    let url = first_of(&[r.link.as_deref(), r.url.as_deref(), r.href.as_deref()]);
    let title = first_of(&[r.title.as_deref()]);
    let snippet = first_of(&[r.snippet.as_deref(), r.description.as_deref(), r.text.as_deref()]);
    require_text(Provenance::SearchResult, title, snippet)?;

    Ok(EvidenceCandidate {
        evidence_type: EvidenceType::SearchResult,
        publisher: publisher_or_host(&[r.source.as_deref(), r.publisher.as_deref()], url),
        url: url.map(str::to_string),
        title: title.unwrap_or_default().to_string(),
        snippet: snippet.unwrap_or_default().to_string(),
        description_chars: snippet.map(|s| s.chars().count()).unwrap_or(0),
        published_date: r.published_date.as_deref().and_then(parse_date),
        review_rating: None,
    })
}

fn from_alternate(r: &AlternateRecord) -> Result<EvidenceCandidate, EvidenceError> {
    let url = first_of(&[r.url.as_deref(), r.link.as_deref(), r.href.as_deref()]);
    let title = first_of(&[r.title.as_deref()]);
    let snippet = first_of(&[r.description.as_deref(), r.text.as_deref()]);
    require_text(Provenance::Alternate, title, snippet)?;

    Ok(EvidenceCandidate {
        evidence_type: EvidenceType::Specialized,
        publisher: publisher_or_host(&[r.publisher.as_deref(), r.source.as_deref()], url),
        url: url.map(str::to_string),
        title: title.unwrap_or_default().to_string(),
        snippet: snippet.unwrap_or_default().to_string(),
        description_chars: snippet.map(|s| s.chars().count()).unwrap_or(0),
        published_date: r.published_date.as_deref().and_then(parse_date),
        review_rating: None,
    })
}

fn from_claim_review(r: &ClaimReviewRecord) -> Result<Vec<EvidenceCandidate>, EvidenceError> {
    if r.claim_review.is_empty() {
        return Err(EvidenceError::malformed(Provenance::ClaimReview, "claimReview list is empty"));
    }

    let claim_text = first_of(&[r.text.as_deref()]).map(|text| {
        match (first_of(&[r.claimant.as_deref()]), first_of(&[r.claim_date.as_deref()])) {
            (Some(who), Some(when)) => format!("{} (claimed by {}, {})", text, who, when),
            (Some(who), None) => format!("{} (claimed by {})", text, who),
            (None, Some(when)) => format!("{} (claimed {})", text, when),
            (None, None) => text.to_string(),
        }
    });
    let mut out = Vec::with_capacity(r.claim_review.len());

    for review in &r.claim_review {
        let url = first_of(&[review.url.as_deref()]);
        let title = first_of(&[review.title.as_deref()]);
        let snippet = match (review.rating_label(), claim_text.as_deref()) {
            (Some(rating), Some(text)) => Some(format!("{}: {}", rating.trim(), text)),
            (Some(rating), None) => Some(rating.trim().to_string()),
            (None, Some(text)) => Some(text.to_string()),
            (None, None) => None,
        };
        require_text(Provenance::ClaimReview, title, snippet.as_deref())?;

        let publisher_name = review.publisher.as_ref().and_then(|p| p.display_name());
        let snippet = snippet.unwrap_or_default();

        out.push(EvidenceCandidate {
            evidence_type: EvidenceType::ClaimReview,
            publisher: publisher_or_host(&[publisher_name], url),
            url: url.map(str::to_string),
            title: title.unwrap_or_default().to_string(),
            description_chars: snippet.chars().count(),
            snippet,
            published_date: review.review_date.as_deref().and_then(parse_date),
            review_rating: Some(review.rating()),
        });
    }

    Ok(out)
}

fn from_news(r: &NewsRecord) -> Result<EvidenceCandidate, EvidenceError> {
    let url = first_of(&[r.link.as_deref(), r.url.as_deref()]);
    let title = first_of(&[r.title.as_deref()]);
    let snippet = first_of(&[r.description.as_deref(), r.content.as_deref()]);
    require_text(Provenance::NewsArticle, title, snippet)?;

    Ok(EvidenceCandidate {
        evidence_type: EvidenceType::News,
        publisher: publisher_or_host(&[r.source_name.as_deref(), r.source_id.as_deref()], url),
        url: url.map(str::to_string),
        title: title.unwrap_or_default().to_string(),
        snippet: snippet.unwrap_or_default().to_string(),
        description_chars: r.description.as_deref().map(|s| s.chars().count()).unwrap_or(0),
        published_date: r.pub_date.as_deref().and_then(parse_date),
        review_rating: None,
    })
}

/// Parse the date formats providers commonly emit
///
/// Accepts RFC 3339, RFC 2822, `YYYY-MM-DD HH:MM:SS` (UTC) and bare
/// `YYYY-MM-DD`. Anything else is treated as unknown.
pub(crate) fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CredibilityScorer;
    use chrono::TimeZone;
    use serde_json::json;

    /// Scores every candidate the same, so tests can check mapping only
    struct FixedModel(f64);

    impl CredibilityModel for FixedModel {
        fn score(&self, _: &EvidenceCandidate, _: &str, _: DateTime<Utc>) -> f64 {
            self.0
        }
    }

    fn fixed(score: f64) -> EvidenceNormalizer {
        EvidenceNormalizer::new(Arc::new(FixedModel(score)))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_search_result_fallback_chains() {
        let records = vec![json!({
            "title": "Infrastructure law signed",
            "href": "https://example.org/story",
            "text": "The law was signed in November 2021."
        })];

        let out = fixed(60.0).normalize(Provenance::SearchResult, &records, "claim", now());
        assert_eq!(out.evidence.len(), 1);
        let ev = &out.evidence[0];
        assert_eq!(ev.url.as_deref(), Some("https://example.org/story"));
        assert_eq!(ev.quote, "The law was signed in November 2021.");
        assert_eq!(ev.publisher, "example.org");
        assert_eq!(ev.evidence_type, EvidenceType::SearchResult);
        assert_eq!(ev.score(), 60.0);
    }

    #[test]
    fn test_link_preferred_over_url() {
        let records = vec![json!({
            "title": "t",
            "link": "https://first.example/a",
            "url": "https://second.example/b",
            "source": "First"
        })];
        let out = fixed(50.0).normalize(Provenance::SearchResult, &records, "claim", now());
        assert_eq!(out.evidence[0].url.as_deref(), Some("https://first.example/a"));
        assert_eq!(out.evidence[0].publisher, "First");
        assert_eq!(out.evidence[0].quote, "t");
    }

    #[test]
    fn test_alternate_shape() {
        let records = vec![json!({
            "url": "https://www.cdc.gov/x",
            "publisher": "CDC",
            "description": "Guidance on vaccines"
        })];
        let out = fixed(70.0).normalize(Provenance::Alternate, &records, "claim", now());
        assert_eq!(out.evidence[0].publisher, "CDC");
        assert_eq!(out.evidence[0].quote, "Guidance on vaccines");
        assert_eq!(out.evidence[0].evidence_type, EvidenceType::Specialized);
    }

    #[test]
    fn test_claim_review_yields_one_item_per_review() {
        let records = vec![json!({
            "text": "Biden signed the infrastructure bill in 2021",
            "claimReview": [
                {"publisher": {"name": "PolitiFact"}, "url": "https://www.politifact.com/a", "reviewRating": {"textualRating": "True"}},
                {"publisher": {"site": "factcheck.org"}, "url": "https://www.factcheck.org/b", "textualRating": "Accurate"}
            ]
        })];

        let out = fixed(80.0).normalize(Provenance::ClaimReview, &records, "claim", now());
        assert_eq!(out.evidence.len(), 2);
        assert_eq!(out.evidence[0].publisher, "PolitiFact");
        assert_eq!(out.evidence[0].quote, "True: Biden signed the infrastructure bill in 2021");
        assert_eq!(out.evidence[1].publisher, "factcheck.org");
        assert_eq!(out.evidence[1].evidence_type, EvidenceType::ClaimReview);
    }

    #[test]
    fn test_claim_review_score_follows_rating() {
        let records = vec![json!({
            "text": "Drinking bleach cures covid",
            "claimReview": [
                {"url": "https://www.politifact.com/a", "reviewRating": {"textualRating": "False", "ratingValue": 1, "bestRating": 6}},
                {"url": "https://www.snopes.com/b", "textualRating": "Pants on Fire"},
                {"url": "https://www.factcheck.org/c", "textualRating": "Half True"},
                {"url": "https://fullfact.org/d", "title": "Review without a verdict"}
            ]
        })];

        let out = fixed(90.0).normalize(Provenance::ClaimReview, &records, "claim", now());
        let scores: Vec<f64> = out.evidence.iter().map(Evidence::score).collect();
        assert_eq!(scores, vec![15.0, 0.0, 45.0, 45.0]);
    }

    #[test]
    fn test_claim_review_quote_names_claimant() {
        let records = vec![json!({
            "text": "The moon landing was staged",
            "claimant": "Viral video",
            "claimDate": "2019-07-20",
            "claimReview": [{"url": "https://www.snopes.com/x", "textualRating": "False"}]
        })];

        let out = fixed(80.0).normalize(Provenance::ClaimReview, &records, "claim", now());
        assert_eq!(
            out.evidence[0].quote,
            "False: The moon landing was staged (claimed by Viral video, 2019-07-20)"
        );
    }

    #[test]
    fn test_empty_claim_review_is_malformed() {
        let records = vec![json!({"text": "x", "claimReview": []})];
        let out = fixed(80.0).normalize(Provenance::ClaimReview, &records, "claim", now());
        assert!(out.evidence.is_empty());
        assert_eq!(out.rejected.len(), 1);
    }

    #[test]
    fn test_claim_similarity_filter() {
        let records = vec![
            json!({"text": "Biden signed infrastructure bill", "claimReview": [{"url": "https://a.com", "textualRating": "True"}]}),
            json!({"text": "Cats can fly over oceans", "claimReview": [{"url": "https://b.com", "textualRating": "False"}]}),
        ];

        let out = fixed(80.0)
            .with_min_claim_similarity(0.3)
            .normalize(Provenance::ClaimReview, &records, "Biden signed infrastructure bill in 2021", now());
        assert_eq!(out.evidence.len(), 1);
        assert_eq!(out.filtered, 1);
        assert_eq!(out.evidence[0].url.as_deref(), Some("https://a.com"));
    }

    #[test]
    fn test_news_fields_and_date() {
        let records = vec![json!({
            "title": "Bill signed",
            "link": "https://apnews.com/article/x",
            "description": "President signs bill",
            "pubDate": "2024-05-30 14:00:00",
            "source_id": "ap"
        })];
        let out = fixed(55.0).normalize(Provenance::NewsArticle, &records, "claim", now());
        let ev = &out.evidence[0];
        assert_eq!(ev.publisher, "ap");
        assert_eq!(ev.evidence_type, EvidenceType::News);
        assert_eq!(ev.published_date, Some(Utc.with_ymd_and_hms(2024, 5, 30, 14, 0, 0).unwrap()));
    }

    #[test]
    fn test_record_without_text_is_rejected() {
        let records = vec![
            json!({"link": "https://a.com"}),
            json!({"title": "ok", "link": "https://b.com"}),
        ];
        let out = fixed(50.0).normalize(Provenance::SearchResult, &records, "claim", now());
        assert_eq!(out.evidence.len(), 1);
        assert_eq!(out.rejected.len(), 1);
        assert!(matches!(out.rejected[0], EvidenceError::MalformedResponse { .. }));
    }

    #[test]
    fn test_blank_fields_fall_through() {
        let records = vec![json!({"title": "t", "snippet": "   ", "description": "real text", "link": "https://a.com"})];
        let out = fixed(50.0).normalize(Provenance::SearchResult, &records, "claim", now());
        assert_eq!(out.evidence[0].quote, "real text");
    }

    #[test]
    fn test_uses_credibility_model() {
        let normalizer = EvidenceNormalizer::new(Arc::new(CredibilityScorer::default()));
        let records = vec![json!({"title": "Unrelated", "link": "https://www.snopes.com/x", "snippet": "Unrelated"})];
        let out = normalizer.normalize(Provenance::SearchResult, &records, "Mars has two moons", now());
        assert_eq!(out.evidence[0].score(), 80.0);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = Utc.with_ymd_and_hms(2021, 11, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2021-11-15T00:00:00Z"), Some(expected));
        assert_eq!(parse_date("Mon, 15 Nov 2021 00:00:00 +0000"), Some(expected));
        assert_eq!(parse_date("2021-11-15 00:00:00"), Some(expected));
        assert_eq!(parse_date("2021-11-15"), Some(expected));
        assert_eq!(parse_date("last tuesday"), None);
    }
}
