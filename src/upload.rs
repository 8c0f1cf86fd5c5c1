//! Push qualified records onto the board.
//!
//! One `create_item` per record, optionally followed by one fire-and-forget
//! `create_update` carrying the details. Faults are logged and the record is
//! skipped; nothing is retried.

use metrics::counter;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::crm::encode::{encode_value, score_to_stars, FieldValue};
use crate::crm::{BoardApi, BoardTarget, ColumnMap, ColumnRole, ColumnType, CreateItem, CrmFault};
use crate::record::CandidateRecord;

#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Label written to the status column.
    pub status_label: String,
    pub attach_notes: bool,
    /// Pause between board calls.
    pub delay: Duration,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            status_label: "New Lead".to_string(),
            attach_notes: true,
            delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub created: usize,
    pub failed: usize,
    pub notes_attached: usize,
    pub notes_failed: usize,
}

/// The value a record offers for `role`, if any.
fn field_for(role: ColumnRole, rec: &CandidateRecord, kind: &ColumnType, opts: &UploadOptions) -> Option<FieldValue> {
    match role {
        ColumnRole::Website => rec.website.as_ref().map(|u| FieldValue::link(u.clone(), u.clone())),
        ColumnRole::Linkedin => rec
            .linkedin
            .as_ref()
            .map(|u| FieldValue::link(u.clone(), "LinkedIn")),
        // zero means "unscored" on the board; leave the column blank
        ColumnRole::Score if rec.score == 0 => None,
        ColumnRole::Score => Some(FieldValue::Number(match kind {
            ColumnType::Rating => score_to_stars(rec.score),
            _ => i64::from(rec.score),
        })),
        ColumnRole::Location => Some(FieldValue::text(rec.location.clone())),
        ColumnRole::Type => Some(FieldValue::text(rec.kind.clone())),
        ColumnRole::Source => Some(FieldValue::text(rec.source.clone())),
        ColumnRole::Email => rec.email.clone().map(FieldValue::Text),
        ColumnRole::Notes => rec.notes.clone().map(FieldValue::Text),
        ColumnRole::Status => Some(FieldValue::text(opts.status_label.clone())),
    }
}

/// Column-id → encoded value for every mapped role with a non-empty value.
pub fn build_column_values(rec: &CandidateRecord, map: &ColumnMap, opts: &UploadOptions) -> Map<String, Value> {
    let mut out = Map::new();
    for (role, col) in map.iter() {
        let Some(value) = field_for(role, rec, &col.kind, opts) else {
            continue;
        };
        if let Some(encoded) = encode_value(&value, &col.kind) {
            out.insert(col.id.clone(), encoded);
        }
    }
    out
}

/// Free-text body for the follow-up update.
pub fn note_body(rec: &CandidateRecord) -> String {
    let mut lines = vec![
        format!("Score: {}/100", rec.score),
        format!("Type: {}", rec.kind),
        format!("Location: {}", rec.location),
    ];
    if let Some(stage) = &rec.stage {
        lines.push(format!("Stage: {stage}"));
    }
    if !rec.sectors.is_empty() {
        lines.push(format!("Sectors: {}", rec.sectors.join(", ")));
    }
    lines.push(format!("Source: {}", rec.source));
    if let Some(notes) = &rec.notes {
        lines.push(notes.clone());
    }
    if let Some(snippet) = &rec.snippet {
        let short: String = snippet.chars().take(500).collect();
        lines.push(format!("About: {short}"));
    }
    lines.join("\n")
}

pub struct Uploader<'a> {
    api: &'a dyn BoardApi,
    target: BoardTarget,
    opts: UploadOptions,
}

impl<'a> Uploader<'a> {
    pub fn new(api: &'a dyn BoardApi, target: BoardTarget, opts: UploadOptions) -> Self {
        Self { api, target, opts }
    }

    /// Create one item. Returns the new item id.
    pub async fn upload(&self, rec: &CandidateRecord, map: &ColumnMap) -> Result<String, CrmFault> {
        let values = build_column_values(rec, map, &self.opts);
        let column_values = if values.is_empty() {
            None
        } else {
            Some(Value::Object(values).to_string())
        };
        let req = CreateItem {
            board_id: self.target.board_id,
            group_id: self.target.group_id.clone(),
            item_name: rec.name.clone(),
            column_values,
        };
        self.api.create_item(&req).await
    }

    pub async fn attach_note(&self, item_id: &str, text: &str) -> Result<String, CrmFault> {
        self.api.create_update(item_id, text).await
    }

    async fn pause(&self) {
        if !self.opts.delay.is_zero() {
            tokio::time::sleep(self.opts.delay).await;
        }
    }

    /// Upload every record in order; a failed record never stops the batch.
    pub async fn upload_all(&self, records: &[CandidateRecord], map: &ColumnMap) -> UploadSummary {
        let mut summary = UploadSummary::default();
        for (i, rec) in records.iter().enumerate() {
            if i > 0 {
                self.pause().await;
            }
            let item_id = match self.upload(rec, map).await {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(item = %rec.name, error = %e, "create item failed; skipping");
                    counter!("finder_upload_errors_total").increment(1);
                    summary.failed += 1;
                    continue;
                }
            };
            tracing::info!(item = %rec.name, item_id = %item_id, score = rec.score, "item created");
            counter!("finder_uploaded_total").increment(1);
            summary.created += 1;

            if self.opts.attach_notes {
                match self.attach_note(&item_id, &note_body(rec)).await {
                    Ok(_) => summary.notes_attached += 1,
                    Err(e) => {
                        tracing::warn!(item = %rec.name, item_id = %item_id, error = %e, "note failed");
                        summary.notes_failed += 1;
                    }
                }
            }
        }
        summary
    }
}
