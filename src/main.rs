//! Investor finder: gather, score and sync investors to a monday.com board.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use investor_finder::crm::monday::MondayClient;
use investor_finder::ingest::backup::{BackupSink, CsvFileSink};
use investor_finder::ingest::providers::{QueryProvider, StaticProvider};
use investor_finder::ingest::scrape::HttpPageFetcher;
use investor_finder::ingest::search::DuckDuckGoHtml;
use investor_finder::ingest::types::SourceProvider;
use investor_finder::telemetry::Telemetry;
use investor_finder::{Board, Credentials, FinderConfig};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SourceKind {
    /// Curated table only
    Static,
    /// Keyword search (and scrape) only
    Search,
    /// Curated table, then search
    All,
}

#[derive(Parser)]
#[command(name = "investor-finder", about = "Find SaaS/B2B investors and sync them to monday.com")]
struct Cli {
    /// Which providers to run
    #[arg(short, long, value_enum, default_value = "static")]
    source: SourceKind,
    /// Config file (TOML or JSON); overrides FINDER_CONFIG_PATH
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override the qualification threshold
    #[arg(long)]
    min_score: Option<i32>,
    /// Skip the CSV backup
    #[arg(long)]
    no_backup: bool,
    /// Do not fetch result pages
    #[arg(long)]
    no_scrape: bool,
    /// Score and back up only; no board calls, no credentials needed
    #[arg(long)]
    dry_run: bool,
    /// Print the run counters (Prometheus text format) at the end
    #[arg(long)]
    print_metrics: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("investor_finder=info,warn"));
    let json = std::env::var("FINDER_LOG_JSON").ok().is_some_and(|v| v == "1");

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

fn build_providers(kind: SourceKind, cfg: &FinderConfig) -> Result<Vec<Box<dyn SourceProvider>>> {
    let mut providers: Vec<Box<dyn SourceProvider>> = Vec::new();
    if matches!(kind, SourceKind::Static | SourceKind::All) {
        providers.push(Box::new(StaticProvider::new()));
    }
    if matches!(kind, SourceKind::Search | SourceKind::All) {
        let backend = DuckDuckGoHtml::new(cfg.search.timeout_secs).context("building search client")?;
        let fetcher = HttpPageFetcher::new(cfg.search.timeout_secs)?;
        let provider = QueryProvider::new(cfg.search.clone(), Box::new(backend))
            .with_fetcher(Box::new(fetcher))
            .with_rules(cfg.type_rules.clone(), cfg.location_rules.clone());
        providers.push(Box::new(provider));
    }
    Ok(providers)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present; no-op otherwise.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let telemetry = match Telemetry::install() {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            None
        }
    };

    let mut cfg = match &cli.config {
        Some(path) => FinderConfig::load_from(path)?,
        None => FinderConfig::load_default()?,
    };
    if let Some(min) = cli.min_score {
        cfg.scoring.min_score = min;
    }
    if cli.no_backup {
        cfg.backup = false;
    }
    if cli.no_scrape {
        cfg.search.scrape = false;
    }

    // Credentials are checked before any network call.
    let creds = if cli.dry_run {
        None
    } else {
        Some(Credentials::from_env().context("missing monday.com credentials")?)
    };

    let providers = build_providers(cli.source, &cfg)?;

    let client = creds.as_ref().map(|c| {
        let client = MondayClient::new(c.api_key.clone()).with_timeout(cfg.upload.timeout_secs);
        match &c.api_url {
            Some(url) => client.with_api_url(url.clone()),
            None => client,
        }
    });
    let board = match (&client, &creds) {
        (Some(api), Some(c)) => Some(Board {
            api,
            target: c.target(),
        }),
        _ => None,
    };

    let sink = CsvFileSink::new(".");
    let backup: Option<&dyn BackupSink> = if cfg.backup { Some(&sink) } else { None };

    let report = investor_finder::run(&cfg, &providers, board, backup).await;

    tracing::info!(
        gathered = report.gathered,
        unique = report.unique,
        qualified = report.qualified.len(),
        provider_errors = report.provider_errors,
        "run finished"
    );
    if let Some(up) = &report.upload {
        println!(
            "Uploaded {} of {} qualified investors ({} failed, {} notes failed).",
            up.created,
            report.qualified.len(),
            up.failed,
            up.notes_failed
        );
    } else {
        println!("Qualified {} investors (no board sync).", report.qualified.len());
    }
    if let Some(path) = &report.backup_location {
        println!("Backup: {path}");
    }

    if let Some(t) = &telemetry {
        let snapshot = t.snapshot();
        tracing::debug!(metrics = %snapshot, "run counters");
        if cli.print_metrics {
            print!("{snapshot}");
        }
    }

    Ok(())
}
