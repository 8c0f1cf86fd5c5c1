// src/ingest/backup.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::record::CandidateRecord;

#[async_trait::async_trait]
pub trait BackupSink: Send + Sync {
    /// Persist the qualified records; returns where they went.
    async fn store(&self, records: &[CandidateRecord]) -> Result<String>;
}

/// Writes `investors_backup_<YYYYMMDD_HHMMSS>.csv` into `dir`.
pub struct CsvFileSink {
    dir: PathBuf,
}

impl CsvFileSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, now: DateTime<Utc>) -> PathBuf {
        self.dir
            .join(format!("investors_backup_{}.csv", now.format("%Y%m%d_%H%M%S")))
    }
}

#[async_trait::async_trait]
impl BackupSink for CsvFileSink {
    async fn store(&self, records: &[CandidateRecord]) -> Result<String> {
        let path = self.path_for(Utc::now());
        let csv = records_to_csv(records)?;
        tokio::fs::write(&path, csv)
            .await
            .with_context(|| format!("writing backup to {}", path.display()))?;
        Ok(path.display().to_string())
    }
}

/// Back up the qualified set. Empty sets are skipped, failures only logged.
pub async fn backup_records(sink: &dyn BackupSink, records: &[CandidateRecord]) -> Option<String> {
    if records.is_empty() {
        tracing::info!("no qualified records; backup skipped");
        return None;
    }
    match sink.store(records).await {
        Ok(location) => {
            tracing::info!(records = records.len(), location = %location, "backup written");
            Some(location)
        }
        Err(e) => {
            tracing::warn!(error = ?e, "backup failed");
            None
        }
    }
}

/// CSV with a header built from the union of keys, in first-seen order.
pub fn records_to_csv(records: &[CandidateRecord]) -> Result<String> {
    let mut rows: Vec<serde_json::Map<String, Value>> = Vec::with_capacity(records.len());
    let mut header: Vec<String> = Vec::new();
    for rec in records {
        let Value::Object(obj) = serde_json::to_value(rec).context("serializing record")? else {
            continue;
        };
        for key in obj.keys() {
            if !header.iter().any(|h| h == key) {
                header.push(key.clone());
            }
        }
        rows.push(obj);
    }

    let mut csv = header
        .iter()
        .map(|h| escape_csv(h))
        .collect::<Vec<_>>()
        .join(",");
    csv.push('\n');
    for row in &rows {
        let line = header
            .iter()
            .map(|h| escape_csv(&cell(row.get(h))))
            .collect::<Vec<_>>()
            .join(",");
        csv.push_str(&line);
        csv.push('\n');
    }
    Ok(csv)
}

fn cell(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|i| cell(Some(i)))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
    }
}

fn escape_csv(s: &str) -> String {
    if s.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_union_in_first_seen_order() {
        let mut a = CandidateRecord::new("Pear VC", "static");
        a.score = 90;
        let mut b = CandidateRecord::new("Homebrew", "static");
        b.email = Some("pitch@homebrew.vc".into());
        b.sectors = vec!["B2B".into(), "SaaS".into()];
        let csv = records_to_csv(&[a, b]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "name,type,location,sectors,score,source,email"
        );
        assert_eq!(lines.next().unwrap(), "Pear VC,,,,90,static,");
        assert_eq!(lines.next().unwrap(), "Homebrew,,,B2B; SaaS,0,static,pitch@homebrew.vc");
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let mut a = CandidateRecord::new("A", "static");
        a.location = "San Francisco, US".into();
        a.notes = Some("say \"hi\"".into());
        let csv = records_to_csv(&[a]).unwrap();
        assert!(csv.contains("\"San Francisco, US\""));
        assert!(csv.contains("\"say \"\"hi\"\"\""));
    }

    #[test]
    fn line_breaks_are_quoted() {
        let mut a = CandidateRecord::new("A", "static");
        a.snippet = Some("line one\rline two".into());
        a.notes = Some("first\nsecond".into());
        let csv = records_to_csv(&[a]).unwrap();
        assert!(csv.contains("\"line one\rline two\""));
        assert!(csv.contains("\"first\nsecond\""));
    }

    #[test]
    fn file_name_embeds_timestamp() {
        use chrono::TimeZone;
        let sink = CsvFileSink::new("/tmp/x");
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 5, 7).unwrap();
        assert_eq!(
            sink.path_for(now),
            PathBuf::from("/tmp/x/investors_backup_20261016_090507.csv")
        );
    }
}
