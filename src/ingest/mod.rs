// src/ingest/mod.rs
pub mod backup;
pub mod providers;
pub mod scrape;
pub mod search;
pub mod types;

use crate::ingest::types::SourceProvider;
use crate::record::{dedup_by_name, CandidateRecord};
use crate::telemetry::describe_metrics;
use metrics::counter;
use once_cell::sync::OnceCell;

/// Normalize text: decode entities, strip tags, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Curly quotes to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (incl. nbsp)
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Strip trailing sentence punctuation
    while let Some(last) = out.chars().last() {
        if matches!(last, '!' | '?' | '.' | ',') {
            out.pop();
        } else {
            break;
        }
    }

    // 6) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Outcome of one gather pass.
#[derive(Debug, Default)]
pub struct Gathered {
    pub records: Vec<CandidateRecord>,
    pub raw_count: usize,
    pub dedup_count: usize,
    pub provider_errors: usize,
}

/// Run every provider in order, then dedup by exact name (first wins).
/// A failing provider is logged and contributes nothing.
pub async fn gather(providers: &[Box<dyn SourceProvider>]) -> Gathered {
    describe_metrics();

    let mut raw = Vec::new();
    let mut provider_errors = 0usize;
    for p in providers {
        match p.fetch_latest().await {
            Ok(mut v) => {
                tracing::info!(provider = p.name(), records = v.len(), "provider done");
                raw.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = p.name(), "provider error");
                counter!("finder_provider_errors_total").increment(1);
                provider_errors += 1;
            }
        }
    }

    let raw_count = raw.len();
    let (records, dedup_count) = dedup_by_name(raw);

    counter!("finder_candidates_total").increment(raw_count as u64);
    counter!("finder_dedup_total").increment(dedup_count as u64);

    Gathered {
        records,
        raw_count,
        dedup_count,
        provider_errors,
    }
}
