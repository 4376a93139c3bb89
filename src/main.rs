//! word-query-reconciler - one reconciliation pass per invocation
//!
//! Meant to be run by a scheduler. Exits non-zero when the pass recorded
//! errors so the scheduler can alert.

#![allow(missing_docs)]

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use word_query_reconciler::config::Validate;
use word_query_reconciler::storage::{SeaOrmRecordStore, open_record_store};
use word_query_reconciler::utils::init_logging;
use word_query_reconciler::{
    BatchOutcome, Config, OpenAiBatchClient, PassReport, ReconcileError, ReconciliationEngine,
    Result, services,
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("RECONCILER_GIT_HASH"),
    ")"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "reconcile",
    version,
    long_version = LONG_VERSION,
    about = "Reconcile word-query batch jobs with the OpenAI Batch API"
)]
struct Cli {
    /// Path to a YAML config file; environment variables override it
    #[arg(short, long, env = "RECONCILER_CONFIG")]
    config: Option<PathBuf>,

    /// Report format printed to stdout after the pass
    #[arg(long, value_enum, default_value = "text")]
    report: ReportFormat,

    /// Apply database migrations and exit
    #[arg(long)]
    migrate_only: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    config.merge_env();

    init_logging(&config.logging)?;

    if cli.migrate_only {
        config.database.validate().map_err(ReconcileError::Config)?;
        // connecting applies pending migrations
        SeaOrmRecordStore::connect(&config.database).await?;
        info!("Migrations applied");
        return Ok(ExitCode::SUCCESS);
    }

    config.validate()?;

    let store = open_record_store(&config.database).await?;
    let batch_client = Arc::new(OpenAiBatchClient::new(&config.openai)?);
    let publisher = services::build_publisher(&config.queue).await?;

    let engine = ReconciliationEngine::new(store, batch_client, publisher, config.engine_config());
    let report = engine.run_pass().await;

    match cli.report {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => print!("{}", render_text(&report)),
    }

    Ok(if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn render_text(report: &PassReport) -> String {
    let summary = report.summary();
    let mut out = format!(
        "Pass {} finished in {}ms: {} batch(es), {} advanced, {} completed, {} skipped, {} word(s) resolved, {} missing, {} error(s)\n",
        report.pass_id,
        (report.finished_at - report.started_at).num_milliseconds(),
        summary.batches_seen,
        summary.batches_advanced,
        summary.batches_completed,
        summary.batches_skipped,
        summary.words_resolved,
        summary.words_missing,
        summary.errors
    );

    if let Some(e) = &report.scan_error {
        out.push_str(&format!("  scan failed: {}\n", e));
    }
    for row in &report.undecodable_records {
        out.push_str(&format!("  skipped active record {}: {}\n", row.id, row.reason));
    }

    for batch in &report.batches {
        let outcome = match &batch.outcome {
            BatchOutcome::Skipped { reason } => format!("skipped ({:?})", reason),
            BatchOutcome::Refreshed { status } => format!("refreshed to {}", status),
            BatchOutcome::Completed { status } => format!("completed as {}", status),
            BatchOutcome::Abandoned { age_hours } => {
                format!("abandoned after {}h not found", age_hours)
            }
            BatchOutcome::Aborted { reason } => format!("aborted: {}", reason),
        };
        out.push_str(&format!(
            "  {} ({} record(s)): {}\n",
            batch.batch_id, batch.record_count, outcome
        ));
        for failure in &batch.failures {
            out.push_str(&format!(
                "    {:?} failed for {}: {}\n",
                failure.stage,
                failure
                    .word
                    .as_deref()
                    .or(failure.record_id.as_deref())
                    .unwrap_or("batch"),
                failure.message
            ));
        }
    }

    out
}
