mod common;

use common::*;
use std::time::Duration;
use truscope_orchestrator::{OrchestratorConfig, TierOrchestrator};

#[tokio::test(start_paused = true)]
async fn test_batch_preserves_order_and_chunks() {
    let search = FakeProvider::new("search", Behavior::Records(vec![search_result("https://a.example", "x")]));
    let orchestrator = TierOrchestrator::builder()
        .search_provider(search.clone())
        .build()
        .unwrap();

    let claims: Vec<String> = (1..=7).map(|i| format!("Claim number {}", i)).collect();
    let started = tokio::time::Instant::now();
    let reports = orchestrator.check_batch(&claims).await;

    assert_eq!(reports.len(), 7);
    for (claim, report) in claims.iter().zip(&reports) {
        assert_eq!(&report.claim, claim);
    }
    // two chunks of five: one inter-chunk pause
    assert!(started.elapsed() >= Duration::from_millis(1_000));
    assert!(started.elapsed() < Duration::from_millis(2_000));
}

#[tokio::test]
async fn test_batch_keeps_invalid_claims_in_place() {
    let config = OrchestratorConfig {
        batch_delay_ms: 0,
        ..OrchestratorConfig::default()
    };
    let orchestrator = TierOrchestrator::builder().config(config).build().unwrap();

    let claims = vec!["Snow is white".to_string(), "   ".to_string(), "Grass is green".to_string()];
    let reports = orchestrator.check_batch(&claims).await;

    assert!(!reports[0].is_analysis_error());
    assert!(reports[1].is_analysis_error());
    assert!(!reports[2].is_analysis_error());
}

#[tokio::test]
async fn test_empty_batch() {
    let orchestrator = TierOrchestrator::builder().build().unwrap();
    assert!(orchestrator.check_batch(&[]).await.is_empty());
}
