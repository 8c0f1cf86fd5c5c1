//! Candidate investor record shared by every stage of a run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Sentinel used when a provider cannot produce a usable name.
pub const UNKNOWN_INVESTOR: &str = "Unknown Investor";

const MAX_NAME_CHARS: usize = 60;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub name: String,
    /// Raw page or search title the name was cut from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Categorical label, e.g. "VC" or "Angel".
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    /// `location` is a rule fallback, not something the text named.
    #[serde(skip)]
    pub location_is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Always in [0, 100]. Written by the scorer only.
    pub score: i32,
    /// Which provider (or query) produced the record.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CandidateRecord {
    pub fn new(name: &str, source: impl Into<String>) -> Self {
        Self {
            name: display_name(name),
            source: source.into(),
            ..Default::default()
        }
    }
}

/// Turn a raw page/search title into a display name.
///
/// Empty titles become [`UNKNOWN_INVESTOR`]; titles carrying a site suffix
/// ("Acme Ventures - Seed Fund | Home") are cut at the first separator and
/// capped at 60 chars.
pub fn display_name(raw: &str) -> String {
    let mut name = raw.trim();
    for sep in [" | ", " - ", " – ", " — ", " :: "] {
        if let Some(idx) = name.find(sep) {
            let head = name[..idx].trim();
            if !head.is_empty() {
                name = head;
            }
        }
    }
    if name.is_empty() {
        return UNKNOWN_INVESTOR.to_string();
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return name.chars().take(MAX_NAME_CHARS).collect::<String>().trim_end().to_string();
    }
    name.to_string()
}

/// Keep the first record for every exact (case-sensitive) name.
/// Returns the unique records and the number dropped.
pub fn dedup_by_name(records: Vec<CandidateRecord>) -> (Vec<CandidateRecord>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(records.len());
    let mut dropped = 0usize;
    for rec in records {
        if !seen.insert(rec.name.clone()) {
            dropped += 1;
            continue;
        }
        keep.push(rec);
    }
    (keep, dropped)
}
