//! Run counters: a process-wide Prometheus recorder and an end-of-run snapshot.

use anyhow::{Context, Result};
use metrics::describe_counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Telemetry {
    handle: PrometheusHandle,
}

impl Telemetry {
    /// Install the global recorder. Fails if one is already installed.
    pub fn install() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("installing metrics recorder")?;
        describe_metrics();
        Ok(Self { handle })
    }

    /// Prometheus text exposition of every counter touched so far.
    pub fn snapshot(&self) -> String {
        self.handle.render()
    }
}

/// One-time counter descriptions. Safe to call before or without a recorder.
pub fn describe_metrics() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "finder_candidates_total",
            "Records returned by source providers."
        );
        describe_counter!(
            "finder_dedup_total",
            "Records dropped because an earlier record had the same name."
        );
        describe_counter!(
            "finder_provider_errors_total",
            "Provider, search or page fetch errors."
        );
        describe_counter!(
            "finder_qualified_total",
            "Records at or above the score threshold."
        );
        describe_counter!("finder_uploaded_total", "Items created on the board.");
        describe_counter!(
            "finder_upload_errors_total",
            "Item creations rejected or failed."
        );
    });
}
