//! Page fetch + paragraph extraction for search hits.

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::ingest::normalize_text;
use crate::ingest::search::BROWSER_USER_AGENT;

/// Snippets shorter than this carry no signal and are discarded.
pub const MIN_SNIPPET_CHARS: usize = 40;

#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Raw HTML body for `url`.
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("building page fetch client")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let rsp = self.client.get(url).send().await.context("page get()")?;
        let status = rsp.status();
        if !status.is_success() {
            return Err(anyhow!("page returned HTTP {}", status.as_u16()));
        }
        rsp.text().await.context("page .text()")
    }
}

static P_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Join the text of all `<p>` elements and keep the first `max_chars`.
/// Returns `None` when the result is too short to be useful.
pub fn extract_paragraph_text(html: &str, max_chars: usize) -> Option<String> {
    let doc = Html::parse_document(html);
    let mut joined = String::new();
    for p in doc.select(&P_SEL) {
        let text = p.text().collect::<Vec<_>>().join(" ");
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(text);
        if joined.chars().count() >= max_chars {
            break;
        }
    }
    let cleaned = normalize_text(&joined);
    let capped: String = cleaned.chars().take(max_chars).collect();
    let capped = capped.trim().to_string();
    if capped.chars().count() < MIN_SNIPPET_CHARS {
        None
    } else {
        Some(capped)
    }
}
