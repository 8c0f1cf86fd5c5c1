//! # Run Pipeline
//! gather → dedup → score → threshold → map columns → upload → backup.
//!
//! Strictly sequential. Only a missing precondition (handled by the caller
//! before `run` is reached) stops a run; everything in here logs and moves on.

use metrics::counter;

use crate::analyze::Scorer;
use crate::config::FinderConfig;
use crate::crm::columns::resolve_column_map;
use crate::crm::{BoardApi, BoardTarget};
use crate::ingest::backup::{backup_records, BackupSink};
use crate::ingest::gather;
use crate::ingest::types::SourceProvider;
use crate::record::CandidateRecord;
use crate::upload::{UploadSummary, Uploader};

/// Destination board for a run.
pub struct Board<'a> {
    pub api: &'a dyn BoardApi,
    pub target: BoardTarget,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub gathered: usize,
    pub unique: usize,
    pub qualified: Vec<CandidateRecord>,
    pub mapped_columns: usize,
    pub upload: Option<UploadSummary>,
    pub backup_location: Option<String>,
    pub provider_errors: usize,
}

/// Score in place, then keep records at or above the threshold, best first.
pub fn score_and_filter(scorer: &Scorer, records: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
    let mut qualified: Vec<CandidateRecord> = records
        .into_iter()
        .map(|mut rec| {
            scorer.apply(&mut rec);
            rec
        })
        .filter(|rec| {
            let keep = scorer.is_qualified(rec);
            if !keep {
                tracing::debug!(name = %rec.name, score = rec.score, "below threshold");
            }
            keep
        })
        .collect();
    // stable: equal scores keep gather order
    qualified.sort_by(|a, b| b.score.cmp(&a.score));
    qualified
}

pub async fn run(
    cfg: &FinderConfig,
    providers: &[Box<dyn SourceProvider>],
    board: Option<Board<'_>>,
    backup: Option<&dyn BackupSink>,
) -> RunReport {
    let gathered = gather(providers).await;
    tracing::info!(
        raw = gathered.raw_count,
        unique = gathered.records.len(),
        duplicates = gathered.dedup_count,
        "candidates gathered"
    );

    let scorer = Scorer::new(cfg.scoring.clone());
    let unique = gathered.records.len();
    let qualified = score_and_filter(&scorer, gathered.records);
    counter!("finder_qualified_total").increment(qualified.len() as u64);
    tracing::info!(
        qualified = qualified.len(),
        min_score = cfg.scoring.min_score,
        "scoring done"
    );

    let mut report = RunReport {
        gathered: gathered.raw_count,
        unique,
        provider_errors: gathered.provider_errors,
        ..Default::default()
    };

    if let Some(board) = board {
        if qualified.is_empty() {
            tracing::info!("nothing qualified; skipping board sync");
        } else {
            let map = resolve_column_map(board.api, board.target.board_id, &cfg.columns).await;
            report.mapped_columns = map.len();
            let uploader = Uploader::new(board.api, board.target, cfg.upload.options());
            let summary = uploader.upload_all(&qualified, &map).await;
            tracing::info!(
                created = summary.created,
                failed = summary.failed,
                notes_failed = summary.notes_failed,
                "board sync done"
            );
            report.upload = Some(summary);
        }
    }

    if let Some(sink) = backup {
        report.backup_location = backup_records(sink, &qualified).await;
    }

    report.qualified = qualified;
    report
}
