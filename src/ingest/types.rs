// src/ingest/types.rs
use anyhow::Result;

use crate::record::CandidateRecord;

/// Produces candidate records. A fresh call re-runs the search (or
/// re-returns the table); nothing is resumable mid-stream.
#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<CandidateRecord>>;
    fn name(&self) -> &'static str;
}

/// One hit from a keyword search.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}
