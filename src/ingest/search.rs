//! Keyword web search. The default backend scrapes DuckDuckGo's HTML endpoint.

use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use thiserror::Error;

use crate::ingest::normalize_text;
use crate::ingest::types::SearchHit;

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(String),
    #[error("search returned HTTP {0}")]
    Status(u16),
    #[error("could not parse search results: {0}")]
    Parse(String),
}

#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// Up to `max_results` hits for `query`, in engine order.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError>;
}

pub struct DuckDuckGoHtml {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoHtml {
    pub fn new(timeout_secs: u64) -> Result<Self, SearchError> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: DDG_HTML_URL.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl SearchBackend for DuckDuckGoHtml {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        let rsp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        if !rsp.status().is_success() {
            return Err(SearchError::Status(rsp.status().as_u16()));
        }
        let html = rsp
            .text()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        let hits = parse_results(&html, max_results);
        if hits.is_empty() && html.contains("anomaly") {
            return Err(SearchError::Parse("blocked by bot check".to_string()));
        }
        Ok(hits)
    }
}

static RESULT_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("div.result").unwrap());
static TITLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("a.result__a").unwrap());
static SNIPPET_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse(".result__snippet").unwrap());

/// Parse a DuckDuckGo HTML results page.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let doc = Html::parse_document(html);
    let mut out = Vec::new();
    for result in doc.select(&RESULT_SEL) {
        if out.len() >= max_results {
            break;
        }
        let Some(anchor) = result.select(&TITLE_SEL).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_redirect(href) else {
            continue;
        };
        let title = normalize_text(&anchor.text().collect::<String>());
        let snippet = result
            .select(&SNIPPET_SEL)
            .next()
            .map(|s| normalize_text(&s.text().collect::<String>()))
            .unwrap_or_default();
        out.push(SearchHit {
            title,
            url,
            snippet,
        });
    }
    out
}

/// DuckDuckGo wraps targets as `//duckduckgo.com/l/?uddg=<encoded>`; unwrap them.
fn resolve_redirect(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let parsed = url::Url::parse(&absolute).ok()?;
    if parsed.path().starts_with("/l/") {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned());
    }
    match parsed.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
<html><body>
<div class="result results_links">
  <h2><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fsusaventures.com%2F&amp;rut=abc">Susa Ventures - Seed VC</a></h2>
  <a class="result__snippet" href="#">We back <b>B2B</b> SaaS founders at pre-seed.</a>
</div>
<div class="result">
  <h2><a class="result__a" href="https://pear.vc/">Pear VC</a></h2>
</div>
<div class="result">
  <h2><a class="result__a" href="javascript:void(0)">Broken</a></h2>
</div>
<div class="result">
  <h2><a class="result__a" href="https://homebrew.vc/">Homebrew</a></h2>
</div>
</body></html>"##;

    #[test]
    fn parses_hits_and_unwraps_redirects() {
        let hits = parse_results(PAGE, 10);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].url, "https://susaventures.com/");
        assert_eq!(hits[0].title, "Susa Ventures - Seed VC");
        assert_eq!(hits[0].snippet, "We back B2B SaaS founders at pre-seed");
        assert_eq!(hits[1].url, "https://pear.vc/");
        assert_eq!(hits[1].snippet, "");
    }

    #[test]
    fn respects_max_results() {
        assert_eq!(parse_results(PAGE, 1).len(), 1);
        assert!(parse_results(PAGE, 0).is_empty());
    }
}
