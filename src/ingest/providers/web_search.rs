// src/ingest/providers/web_search.rs
use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::analyze::LabelRules;
use crate::ingest::scrape::{extract_paragraph_text, PageFetcher};
use crate::ingest::search::SearchBackend;
use crate::ingest::types::{SearchHit, SourceProvider};
use crate::record::CandidateRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySettings {
    #[serde(default = "default_queries")]
    pub queries: Vec<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Hosts to skip (exact host or any subdomain of it).
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,
    #[serde(default = "default_suffixes")]
    pub non_html_suffixes: Vec<String>,
    #[serde(default = "default_true")]
    pub scrape: bool,
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
    /// Pause between external calls.
    #[serde(default = "default_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_queries() -> Vec<String> {
    [
        "pre-seed SaaS venture capital fund US",
        "B2B software seed investors San Francisco",
        "early stage SaaS VC portfolio ticket size",
        "angel investors B2B SaaS New York",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_max_results() -> usize {
    10
}

fn default_denylist() -> Vec<String> {
    [
        "reddit.com",
        "quora.com",
        "g2.com",
        "capterra.com",
        "youtube.com",
        "facebook.com",
        "twitter.com",
        "x.com",
        "medium.com",
        "wikipedia.org",
        "glassdoor.com",
        "indeed.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_suffixes() -> Vec<String> {
    [".pdf", ".doc", ".docx", ".ppt", ".pptx", ".xls", ".xlsx", ".zip"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_snippet_chars() -> usize {
    800
}

fn default_delay_ms() -> u64 {
    1500
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            queries: default_queries(),
            max_results: default_max_results(),
            denylist: default_denylist(),
            non_html_suffixes: default_suffixes(),
            scrape: default_true(),
            snippet_chars: default_snippet_chars(),
            request_delay_ms: default_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl QuerySettings {
    /// `false` for denylisted hosts, non-HTML documents and unparseable URLs.
    pub fn is_allowed(&self, raw_url: &str) -> bool {
        let Ok(url) = url::Url::parse(raw_url) else {
            return false;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let denied = self.denylist.iter().any(|d| {
            let d = d.trim().to_ascii_lowercase();
            !d.is_empty() && (host == d || host.ends_with(&format!(".{d}")))
        });
        if denied {
            return false;
        }
        let path = url.path().to_ascii_lowercase();
        !self
            .non_html_suffixes
            .iter()
            .any(|s| path.ends_with(&s.to_ascii_lowercase()))
    }
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

/// Search-and-scrape provider: one search per configured query, in order.
pub struct QueryProvider {
    settings: QuerySettings,
    backend: Box<dyn SearchBackend>,
    fetcher: Option<Box<dyn PageFetcher>>,
    type_rules: LabelRules,
    location_rules: LabelRules,
}

impl QueryProvider {
    pub fn new(settings: QuerySettings, backend: Box<dyn SearchBackend>) -> Self {
        Self {
            settings,
            backend,
            fetcher: None,
            type_rules: LabelRules::default_types(),
            location_rules: LabelRules::default_locations(),
        }
    }

    /// Enable the scrape step. Ignored when `settings.scrape` is off.
    pub fn with_fetcher(mut self, fetcher: Box<dyn PageFetcher>) -> Self {
        if self.settings.scrape {
            self.fetcher = Some(fetcher);
        }
        self
    }

    pub fn with_rules(mut self, type_rules: LabelRules, location_rules: LabelRules) -> Self {
        self.type_rules = type_rules;
        self.location_rules = location_rules;
        self
    }

    fn build_record(&self, query: &str, hit: &SearchHit, scraped: Option<String>) -> CandidateRecord {
        let snippet = scraped.or_else(|| {
            let s = hit.snippet.trim();
            (!s.is_empty()).then(|| s.to_string())
        });
        let text = format!("{} {}", hit.title, snippet.as_deref().unwrap_or_default());

        let mut rec = CandidateRecord::new(&hit.title, format!("Search: {query}"));
        let is_linkedin = url::Url::parse(&hit.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
            .is_some_and(|h| h == "linkedin.com" || h.ends_with(".linkedin.com"));
        if is_linkedin {
            rec.linkedin = Some(hit.url.clone());
        } else {
            rec.website = Some(hit.url.clone());
        }
        rec.email = EMAIL_RE.find(&text).map(|m| m.as_str().to_string());
        rec.kind = self.type_rules.classify(&text).to_string();
        match self.location_rules.matched(&text) {
            Some(label) => rec.location = label.to_string(),
            None => {
                rec.location = self.location_rules.fallback.clone();
                rec.location_is_default = true;
            }
        }
        let title = hit.title.trim();
        rec.title = (!title.is_empty()).then(|| title.to_string());
        rec.snippet = snippet;
        rec
    }
}

/// Sleeps before every external call except the first.
struct Pacer {
    delay: Duration,
    started: bool,
}

impl Pacer {
    fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            started: false,
        }
    }

    async fn wait(&mut self) {
        if self.started && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.started = true;
    }
}

#[async_trait]
impl SourceProvider for QueryProvider {
    async fn fetch_latest(&self) -> Result<Vec<CandidateRecord>> {
        let mut pacer = Pacer::new(self.settings.request_delay_ms);
        let mut out = Vec::new();

        for query in &self.settings.queries {
            pacer.wait().await;
            let hits = match self.backend.search(query, self.settings.max_results).await {
                Ok(h) => h,
                Err(e) => {
                    tracing::warn!(error = %e, query = %query, "search failed");
                    counter!("finder_provider_errors_total").increment(1);
                    continue;
                }
            };
            tracing::info!(query = %query, hits = hits.len(), "search done");

            for hit in hits {
                if !self.settings.is_allowed(&hit.url) {
                    tracing::debug!(url = %hit.url, "skipping low-quality or non-html hit");
                    continue;
                }

                let scraped = match &self.fetcher {
                    Some(fetcher) => {
                        pacer.wait().await;
                        match fetcher.fetch_html(&hit.url).await {
                            Ok(html) => extract_paragraph_text(&html, self.settings.snippet_chars),
                            Err(e) => {
                                tracing::warn!(error = ?e, url = %hit.url, "page fetch failed");
                                counter!("finder_provider_errors_total").increment(1);
                                None
                            }
                        }
                    }
                    None => None,
                };

                out.push(self.build_record(query, &hit, scraped));
            }
        }

        Ok(out)
    }

    fn name(&self) -> &'static str {
        "search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denylist_matches_host_and_subdomains() {
        let s = QuerySettings::default();
        assert!(!s.is_allowed("https://www.reddit.com/r/startups"));
        assert!(!s.is_allowed("https://reddit.com/"));
        assert!(!s.is_allowed("https://m.youtube.com/watch?v=1"));
        assert!(s.is_allowed("https://g2vp.com/"));
        assert!(s.is_allowed("https://susaventures.com/about"));
    }

    #[test]
    fn non_html_and_garbage_urls_are_rejected() {
        let s = QuerySettings::default();
        assert!(!s.is_allowed("https://fund.example/deck.PDF"));
        assert!(!s.is_allowed("not a url"));
        assert!(!s.is_allowed("ftp://fund.example/"));
        assert!(s.is_allowed("https://fund.example/pdf-guide"));
    }

    #[test]
    fn settings_parse_with_partial_toml() {
        let s: QuerySettings = toml::from_str("queries = [\"a\"]\nscrape = false").unwrap();
        assert_eq!(s.queries, vec!["a".to_string()]);
        assert!(!s.scrape);
        assert_eq!(s.max_results, 10);
        assert_eq!(s.snippet_chars, 800);
    }
}
