mod common;

use common::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use truscope_cache::{CacheConfig, MemoryPersistence, ResponseCache};
use truscope_domain::{DurablePersistence, SynthesisMethod, Tier, TierStatus, VerificationReport};
use truscope_llm::MockSynthesizer;
use truscope_orchestrator::{OrchestratorConfig, TierOrchestrator};

#[tokio::test]
async fn test_biden_claim_stops_at_web_search() {
    let (reviews, _) = biden_reviews();
    let (results, _) = biden_search();
    let orchestrator = TierOrchestrator::builder()
        .claim_review_provider(FakeProvider::new("reviews", Behavior::Records(reviews)))
        .search_provider(FakeProvider::new("search", Behavior::Records(results)))
        .credibility_model(biden_model())
        .build()
        .unwrap();

    let report = orchestrator.perform_tiered_check(BIDEN_CLAIM, None).await;

    assert_eq!(report.verdict, "MOSTLY TRUE — Well Supported");
    assert_eq!(report.score, 78);
    assert_eq!(report.executed_tiers(), vec![Tier::DirectVerification, Tier::WebSearch]);
    assert_eq!(report.synthesis_method, SynthesisMethod::TierConfidence);
    assert_eq!(report.tier_breakdown[0].confidence, 45.0);
    assert!(report.tier_breakdown[0].should_escalate);
    assert!(!report.tier_breakdown[1].should_escalate);
    assert_eq!(report.evidence.len(), 10);
    assert!(report.warnings.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_all_providers_unavailable() {
    let down = FakeProvider::new("down", Behavior::Status(503));
    let orchestrator = TierOrchestrator::builder()
        .claim_review_provider(down.clone())
        .search_provider(down.clone())
        .news_provider(down.clone())
        .build()
        .unwrap();

    let report = orchestrator.perform_tiered_check("The moon is made of cheese", None).await;

    assert!(!report.is_analysis_error());
    assert!(report.score <= 50);
    assert!(!report.warnings.is_empty());
    assert_eq!(report.executed_tiers(), Tier::ORDER.to_vec());
    assert!(report.tier_breakdown[..3].iter().all(|t| !t.success));
    // direct, web, news and two alternate queries, three attempts each
    assert_eq!(down.calls(), 15);
}

#[tokio::test(start_paused = true)]
async fn test_auth_failure_is_not_retried() {
    let rejected = FakeProvider::new("rejected", Behavior::Status(401));
    let orchestrator = TierOrchestrator::builder()
        .claim_review_provider(rejected.clone())
        .build()
        .unwrap();

    let report = orchestrator.perform_tiered_check("Vaccines cause autism", None).await;

    assert_eq!(rejected.calls(), 1);
    assert!(report.warnings[0].contains("rejected credentials"));
    assert_eq!(report.tier_breakdown[0].confidence, 0.0);
}

#[tokio::test]
async fn test_confident_direct_verification_stops_pipeline() {
    let claim = "The Eiffel Tower is in Paris";
    let reviews = vec![
        claim_review(claim, "https://fc.example/a", "True"),
        claim_review(claim, "https://fc.example/b", "Correct"),
    ];
    let search = FakeProvider::new("search", Behavior::Records(Vec::new()));
    let orchestrator = TierOrchestrator::builder()
        .claim_review_provider(FakeProvider::new("reviews", Behavior::Records(reviews)))
        .search_provider(search.clone())
        .credibility_model(UrlScores::new(&[("https://fc.example/a", 90.0), ("https://fc.example/b", 85.0)]))
        .build()
        .unwrap();

    let report = orchestrator.perform_tiered_check(claim, None).await;

    assert_eq!(report.executed_tiers(), vec![Tier::DirectVerification]);
    assert_eq!(report.verdict, "TRUE — Verified by Fact-Checkers");
    assert_eq!(report.score, 88);
    assert_eq!(search.calls(), 0);
}

#[tokio::test]
async fn test_debunked_claim_is_not_verified() {
    let claim = "Drinking bleach cures covid";
    let reviews = vec![serde_json::json!({
        "text": claim,
        "claimReview": [
            {
                "publisher": {"name": "PolitiFact", "site": "politifact.com"},
                "url": "https://www.politifact.com/factchecks/2020/apr/24/bleach/",
                "reviewRating": {"textualRating": "False", "ratingValue": 1, "bestRating": 6}
            },
            {
                "publisher": {"name": "Snopes", "site": "snopes.com"},
                "url": "https://www.snopes.com/fact-check/bleach-covid/",
                "reviewRating": {"textualRating": "Pants on Fire", "ratingValue": 0, "bestRating": 6}
            }
        ]
    })];
    let orchestrator = TierOrchestrator::builder()
        .claim_review_provider(FakeProvider::new("reviews", Behavior::Records(reviews)))
        .build()
        .unwrap();

    let report = orchestrator.perform_tiered_check(claim, None).await;

    assert_eq!(report.tier_breakdown[0].evidence_count, 2);
    assert!(report.tier_breakdown[0].confidence < 20.0);
    assert!(report.tier_breakdown[0].should_escalate);
    assert_eq!(report.executed_tiers(), Tier::ORDER.to_vec());
    assert!(report.verdict.ends_with("FALSE"), "verdict was {}", report.verdict);
    assert!(report.score <= 30);
}

#[tokio::test]
async fn test_unrelated_reviews_are_ignored() {
    let reviews = vec![claim_review(
        "Aliens built the pyramids of Giza",
        "https://fc.example/pyramids",
        "False",
    )];
    let orchestrator = TierOrchestrator::builder()
        .claim_review_provider(FakeProvider::new("reviews", Behavior::Records(reviews)))
        .credibility_model(UrlScores::new(&[("https://fc.example/pyramids", 95.0)]))
        .build()
        .unwrap();

    let report = orchestrator.perform_tiered_check("Coffee reduces heart disease risk", None).await;

    assert!(report.tier_breakdown[0].success);
    assert_eq!(report.tier_breakdown[0].evidence_count, 0);
    assert_eq!(report.tier_breakdown[0].confidence, 0.0);
}

#[tokio::test]
async fn test_no_consensus_escalates_to_ai_synthesis() {
    let results = vec![
        search_result("https://a.example/1", "Claim disputed"),
        search_result("https://b.example/2", "Claim supported"),
    ];
    let news = vec![serde_json::json!({
        "title": "New study on the claim",
        "link": "https://news.example/study",
        "description": "Researchers published findings this week.",
        "pubDate": "2024-05-01T10:00:00Z",
        "source_name": "Example News"
    })];
    let synthesizer = Arc::new(MockSynthesizer::new(64.0, "MIXED"));
    let orchestrator = TierOrchestrator::builder()
        .search_provider(FakeProvider::new("search", Behavior::Records(results)))
        .news_provider(FakeProvider::new("news", Behavior::Records(news)))
        .synthesizer(synthesizer.clone())
        .credibility_model(UrlScores::new(&[("https://a.example/1", 90.0), ("https://b.example/2", 20.0)]))
        .build()
        .unwrap();

    let report = orchestrator.perform_tiered_check("Red wine is good for the heart", None).await;

    assert_eq!(report.executed_tiers(), Tier::ORDER.to_vec());
    assert_eq!(report.synthesis_method, SynthesisMethod::Ai);
    assert_eq!(report.score, 64);
    assert_eq!(report.verdict, "MIXED");
    assert_eq!(synthesizer.call_count(), 1);
    // two search results plus one news article; alternate queries repeat the search URLs
    assert_eq!(report.evidence.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_produces_partial_report() {
    let (reviews, _) = biden_reviews();
    let config = OrchestratorConfig {
        request_deadline_secs: 5,
        ..OrchestratorConfig::default()
    };
    let synthesizer = Arc::new(MockSynthesizer::new(95.0, "TRUE"));
    let orchestrator = TierOrchestrator::builder()
        .config(config)
        .claim_review_provider(FakeProvider::new("reviews", Behavior::Records(reviews)))
        .search_provider(FakeProvider::new("slow", Behavior::Stall(Duration::from_secs(8))))
        .synthesizer(synthesizer.clone())
        .credibility_model(biden_model())
        .build()
        .unwrap();

    let report = orchestrator.perform_tiered_check(BIDEN_CLAIM, None).await;

    assert_eq!(report.executed_tiers(), vec![Tier::DirectVerification, Tier::WebSearch]);
    assert!(!report.tier_breakdown[1].success);
    assert!(report.warnings.iter().any(|w| w.contains("PipelineDeadlineExceeded")));
    assert_eq!(report.synthesis_method, SynthesisMethod::Statistical);
    assert_eq!(synthesizer.call_count(), 0);
    // statistical fallback over the reviews: (40·1 + 50·2) / 3
    assert_eq!(report.score, 47);
}

#[tokio::test]
async fn test_progress_callback_sees_every_boundary() {
    let (reviews, _) = biden_reviews();
    let (results, _) = biden_search();
    let orchestrator = TierOrchestrator::builder()
        .claim_review_provider(FakeProvider::new("reviews", Behavior::Records(reviews)))
        .search_provider(FakeProvider::new("search", Behavior::Records(results)))
        .credibility_model(biden_model())
        .build()
        .unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    orchestrator
        .perform_tiered_check_with_progress(
            BIDEN_CLAIM,
            None,
            Arc::new(move |tier: Tier, status: TierStatus| sink.lock().unwrap().push((tier, status))),
        )
        .await;

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            (Tier::DirectVerification, TierStatus::Active),
            (Tier::DirectVerification, TierStatus::Completed),
            (Tier::WebSearch, TierStatus::Active),
            (Tier::WebSearch, TierStatus::Completed),
        ]
    );
}

#[tokio::test]
async fn test_report_is_persisted() {
    let persistence = Arc::new(MemoryPersistence::new());
    let orchestrator = TierOrchestrator::builder()
        .persistence(persistence.clone())
        .build()
        .unwrap();

    let report = orchestrator.perform_tiered_check("Honey never spoils", Some("blog post")).await;

    let stored = persistence.load(&format!("report:{}", report.id)).await.unwrap().unwrap();
    let restored: VerificationReport = serde_json::from_value(stored).unwrap();
    assert_eq!(restored, report);
}

#[tokio::test]
async fn test_shared_cache_avoids_repeat_calls() {
    let (reviews, _) = biden_reviews();
    let (results, _) = biden_search();
    let reviews_provider = FakeProvider::new("reviews", Behavior::Records(reviews));
    let search_provider = FakeProvider::new("search", Behavior::Records(results));
    let cache = Arc::new(ResponseCache::new(CacheConfig::default()));
    let orchestrator = TierOrchestrator::builder()
        .claim_review_provider(reviews_provider.clone())
        .search_provider(search_provider.clone())
        .credibility_model(biden_model())
        .cache(cache.clone())
        .build()
        .unwrap();

    let first = orchestrator.perform_tiered_check(BIDEN_CLAIM, None).await;
    let second = orchestrator.perform_tiered_check(BIDEN_CLAIM, None).await;

    assert_eq!(first.score, second.score);
    assert_eq!(reviews_provider.calls(), 1);
    assert_eq!(search_provider.calls(), 1);
    assert_eq!(cache.metrics().hits, 2);
}
