//! # LLM Timeline
//!
//! Turns an annual "year in LLMs" review article into a structured timeline
//! of discrete, categorized and ranked events, written as JSON for a
//! visualization layer to load.
//!
//! ## Usage
//!
//! ```sh
//! llm_timeline 2024 2025 -o ./data
//! ```
//!
//! ## Architecture
//!
//! Each requested year runs the same pipeline, one year at a time:
//! 1. **Fetching**: resolve the article URL for the year and download it
//! 2. **Normalizing**: reduce the HTML to ordered heading/paragraph/list blocks
//! 3. **Extracting**: segment blocks into candidates, categorize, score
//! 4. **Output**: write per-year datasets, the combined file and the index
//!
//! A year that fails is reported and skipped; the others still complete.

use chrono::{Datelike, Local, Utc};
use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod extract;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use config::PipelineConfig;
use extract::Engine;
use models::{YearDataset, YearReport};
use outputs::{index, json};
use scrapers::HttpSource;
use scrapers::verify::{links_to_verify, verify_links};
use utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main(flavor = "current_thread")]
#[instrument]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("llm_timeline starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.years, %args.output, ?args.config, "Parsed CLI arguments");

    // ---- Config & engine ----
    let config = PipelineConfig::load(args.config.as_deref())?;
    let engine = Engine::new(&config)?;
    let years = args.resolve_years(&config, Local::now().year())?;
    info!(?years, "Years to process");

    // Early check: ensure output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output).await {
        error!(
            path = %args.output,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let source = HttpSource::new(&config.source)?;

    // ---- Run the pipeline, one year at a time ----
    let results =
        pipeline::run_batch(&years, args.url.as_deref(), &config, &engine, &source).await;

    let mut reports = Vec::with_capacity(results.len());
    for (year, result) in results {
        match result {
            Ok(mut dataset) => {
                if args.verify_links {
                    let urls = links_to_verify(&dataset, config.source.verify_limit);
                    dataset.link_verification = Some(verify_links(&source, urls).await);
                }
                log_top_events(&dataset);
                if let Err(e) = json::write_year(&dataset, &args.output).await {
                    error!(year, error = %e, "Failed to write year dataset");
                    return Err(e);
                }
                reports.push(YearReport::success(&dataset));
            }
            Err(e) => reports.push(YearReport::failure(year, &e)),
        }
    }

    // ---- Combined file & index from everything emitted so far ----
    let datasets = json::load_years(&args.output).await?;
    if datasets.is_empty() {
        warn!(path = %args.output, "No datasets on disk; skipping combined file");
    } else {
        json::write_combined(&datasets, &args.output).await?;
    }
    let timeline_index = index::build_index(&datasets, reports.clone(), Utc::now().to_rfc3339());
    index::write_index(&timeline_index, &args.output).await?;
    if !timeline_index.stale_years.is_empty() {
        warn!(
            stale_years = ?timeline_index.stale_years,
            "Failed years still have datasets from an earlier run"
        );
    }

    // ---- Summary ----
    let failed = reports.iter().filter(|r| !r.ok).count();
    for report in &reports {
        match (&report.event_count, &report.error) {
            (Some(events), _) => info!(year = report.year, events, "Summary: ok"),
            (None, Some(err)) => warn!(
                year = report.year,
                kind = ?report.error_kind,
                error = %truncate_for_log(err, 300),
                "Summary: failed"
            ),
            (None, None) => {}
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        requested = reports.len(),
        failed,
        available_years = ?timeline_index.years,
        "Execution complete"
    );

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn log_top_events(dataset: &YearDataset) {
    for (rank, event) in dataset.ranked().into_iter().take(3).enumerate() {
        info!(
            year = dataset.year,
            rank = rank + 1,
            id = %event.id,
            category = %event.category,
            score = event.impact_score(),
            "Top event"
        );
    }
}
