// tests/metrics_run.rs
use anyhow::Result;
use async_trait::async_trait;

use investor_finder::ingest::types::SourceProvider;
use investor_finder::telemetry::Telemetry;
use investor_finder::{run, CandidateRecord, FinderConfig};

struct TwoOfTheSame;

#[async_trait]
impl SourceProvider for TwoOfTheSame {
    async fn fetch_latest(&self) -> Result<Vec<CandidateRecord>> {
        let mut r = CandidateRecord::new("Pear VC", "mock");
        r.snippet = Some("b2b saas pre-seed".into());
        Ok(vec![r.clone(), r])
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

#[tokio::test]
async fn counters_show_up_in_the_snapshot() {
    // one recorder per process; this file holds the only test
    let telemetry = Telemetry::install().expect("recorder");

    let providers: Vec<Box<dyn SourceProvider>> = vec![Box::new(TwoOfTheSame)];
    let report = run(&FinderConfig::default(), &providers, None, None).await;
    assert_eq!(report.qualified.len(), 1);

    let out = telemetry.snapshot();
    assert!(out.contains("finder_candidates_total 2"), "{out}");
    assert!(out.contains("finder_dedup_total 1"), "{out}");
    assert!(out.contains("finder_qualified_total 1"), "{out}");
}
