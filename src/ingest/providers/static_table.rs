// src/ingest/providers/static_table.rs
use anyhow::Result;
use async_trait::async_trait;

use crate::ingest::types::SourceProvider;
use crate::record::CandidateRecord;

pub const STATIC_SOURCE: &str = "Curated list";

struct Row {
    name: &'static str,
    location: &'static str,
    website: &'static str,
    linkedin: &'static str,
    email: &'static str,
    kind: &'static str,
    sectors: &'static [&'static str],
    stage: &'static str,
}

/// US SaaS/B2B seed investors.
const INVESTORS: &[Row] = &[
    Row {
        name: "Susa Ventures",
        location: "San Francisco, US",
        website: "https://susaventures.com",
        linkedin: "https://www.linkedin.com/company/susa-ventures",
        email: "info@susaventures.com",
        kind: "VC",
        sectors: &["B2B", "SaaS", "Fintech"],
        stage: "pre-seed, seed",
    },
    Row {
        name: "Uncork Capital",
        location: "Palo Alto, US",
        website: "https://uncorkcapital.com",
        linkedin: "https://www.linkedin.com/company/uncork-capital",
        email: "hello@uncorkcapital.com",
        kind: "VC",
        sectors: &["B2B", "SaaS", "Marketplaces"],
        stage: "pre-seed, seed",
    },
    Row {
        name: "Pear VC",
        location: "Palo Alto, US",
        website: "https://pear.vc",
        linkedin: "https://www.linkedin.com/company/pear-vc",
        email: "contact@pear.vc",
        kind: "VC",
        sectors: &["B2B", "SaaS", "Deeptech"],
        stage: "pre-seed, seed",
    },
    Row {
        name: "Homebrew",
        location: "San Francisco, US",
        website: "https://homebrew.vc",
        linkedin: "https://www.linkedin.com/company/homebrew-vc",
        email: "pitch@homebrew.vc",
        kind: "VC",
        sectors: &["B2B", "SaaS"],
        stage: "pre-seed",
    },
    Row {
        name: "Active Capital",
        location: "San Antonio, US",
        website: "https://www.activecapital.com",
        linkedin: "https://www.linkedin.com/company/active-capital",
        email: "",
        kind: "VC",
        sectors: &["B2B", "SaaS"],
        stage: "pre-seed",
    },
];

fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Hand-curated table; never fails, never touches the network.
#[derive(Debug, Default)]
pub struct StaticProvider;

impl StaticProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn records() -> Vec<CandidateRecord> {
        INVESTORS
            .iter()
            .map(|r| CandidateRecord {
                website: non_empty(r.website),
                linkedin: non_empty(r.linkedin),
                email: non_empty(r.email),
                kind: r.kind.to_string(),
                location: r.location.to_string(),
                stage: non_empty(r.stage),
                sectors: r.sectors.iter().map(|s| s.to_string()).collect(),
                ..CandidateRecord::new(r.name, STATIC_SOURCE)
            })
            .collect()
    }
}

#[async_trait]
impl SourceProvider for StaticProvider {
    async fn fetch_latest(&self) -> Result<Vec<CandidateRecord>> {
        Ok(Self::records())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_has_unique_named_records() {
        let recs = StaticProvider::records();
        assert!(!recs.is_empty());
        let names: HashSet<_> = recs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), recs.len());
        assert!(recs.iter().all(|r| r.source == STATIC_SOURCE && r.score == 0));
    }

    #[test]
    fn blank_email_becomes_none() {
        let recs = StaticProvider::records();
        let active = recs.iter().find(|r| r.name == "Active Capital").unwrap();
        assert_eq!(active.email, None);
    }
}
