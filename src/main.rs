//! Contact Harvester main entry point
//!
//! This is the command-line interface for the contact harvesting engine.

use clap::Parser;
use contact_harvester::config::{load_config_with_hash, Config};
use contact_harvester::crawler::{plan_jobs, Coordinator, RunOutcome};
use contact_harvester::output::{
    print_statistics, write_csv_report, write_markdown_summary, RunStatistics,
};
use contact_harvester::storage::{open_store, ProgressStore};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Contact Harvester: a resumable contact harvesting engine
///
/// Discovers pages through search engines, seed lists, or pagination chains,
/// and collects emails, phone numbers, and listings from them. Progress is
/// checkpointed per (keyword, engine); rerunning with the same configuration
/// resumes where the previous run stopped.
#[derive(Parser, Debug)]
#[command(name = "contact-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A resumable contact harvesting engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Delete any existing checkpoint before starting
    #[arg(long)]
    fresh: bool,

    /// Validate config and show the jobs and resume points without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_harvest(&config, &config_hash, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("contact_harvester=info,warn"),
            1 => EnvFilter::new("contact_harvester=debug,info"),
            2 => EnvFilter::new("contact_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the planned jobs and their resume points
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Contact Harvester Dry Run ===\n");

    println!("Harvest Configuration:");
    println!("  Mode: {:?}", config.harvest.mode);
    println!("  Extractor: {:?}", config.harvest.variant);
    println!("  Workers: {}", config.harvest.max_workers);
    match config.harvest.contact_limit {
        Some(limit) => println!("  Record ceiling: {}", limit),
        None => println!("  Record ceiling: none"),
    }
    println!("  Results per engine: {}", config.harvest.results_per_engine);
    println!("  Follow links: {}", config.harvest.follow_links);

    println!("\nOutput:");
    println!(
        "  Checkpoint: {} ({:?})",
        config.output.checkpoint_path, config.output.checkpoint_backend
    );
    println!("  Report: {}", config.output.report_path);
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary);
    }

    let store = open_store(
        config.output.checkpoint_backend,
        Path::new(&config.output.checkpoint_path),
    )?;
    let coordinator = Coordinator::from_config(config, store)?;
    let jobs = plan_jobs(config)?;

    println!("\nJobs ({}):", jobs.len());
    for job in &jobs {
        match coordinator.store().load(&job.key())? {
            Some(next) => println!("  - {} (resumes at index {})", job, next),
            None => println!("  - {}", job),
        }
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: &Config,
    config_hash: &str,
    fresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(
        config.output.checkpoint_backend,
        Path::new(&config.output.checkpoint_path),
    )?;

    if fresh {
        tracing::info!("Starting fresh harvest (deleting previous checkpoint)");
        store.delete_all()?;
    } else {
        tracing::info!("Starting harvest (will resume from checkpoint if present)");
    }

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            signal_token.cancel();
        }
    });

    let jobs = plan_jobs(config)?;
    let mut coordinator = Coordinator::from_config(config, store)?.with_cancellation(cancel);

    let report = match coordinator.run(&jobs).await {
        Ok(report) => report,
        Err(aborted) => {
            tracing::error!("Harvest failed: {}", aborted.error);
            let rows = write_csv_report(
                &aborted.result,
                Path::new(&config.output.report_path),
            )?;
            tracing::warn!("Saved {} rows collected before the failure", rows);
            return Err(aborted.error.into());
        }
    };

    write_csv_report(&report.result, Path::new(&config.output.report_path))?;

    if let Some(summary_path) = &config.output.summary_path {
        write_markdown_summary(&report, Some(config_hash), Path::new(summary_path))?;
        tracing::info!("Summary written to {}", summary_path);
    }

    print_statistics(&RunStatistics::from_report(&report));

    match report.outcome {
        RunOutcome::Completed => tracing::info!("Harvest completed"),
        RunOutcome::QuotaStopped => {
            tracing::info!("Record ceiling reached; rerun to continue from the checkpoint")
        }
        RunOutcome::Interrupted => {
            tracing::info!("Harvest interrupted; rerun to continue from the checkpoint")
        }
    }

    Ok(())
}
