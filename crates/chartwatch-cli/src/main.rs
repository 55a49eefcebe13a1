//! Command-line interface for chartwatch

use anyhow::Context;
use chartwatch_core::{Scheduler, TrendWatch, WatchConfig, load_symbols};
use chartwatch_utils::{LogOptions, init_tracing, load_env_file, sanitize_for_logging};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use std::path::PathBuf;
use tracing::info;

const DEFAULT_LOG_FILE: &str = "chartwatch.log";
const PREVIEW_CHARS: usize = 60;

#[derive(Parser, Debug)]
#[command(name = "chartwatch")]
#[command(about = "Multi-provider AI trend watch for stock chart screenshots", long_about = None)]
struct Cli {
    /// Environment file to load instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Log file (defaults to LOG_FILE or chartwatch.log)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze every symbol once
    Run {
        /// Symbol to analyze (repeatable); defaults to the configured list
        #[arg(short, long = "symbol")]
        symbols: Vec<String>,
    },
    /// Analyze on an interval during market hours
    Schedule,
    /// Send a short request to each enabled provider
    CheckProviders {
        /// Symbol whose screenshots are sent
        #[arg(short, long)]
        symbol: String,
    },
    /// Print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    load_env_file(cli.env_file.as_deref())?;

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| std::env::var_os("LOG_FILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    init_tracing(&LogOptions {
        verbose: cli.verbose,
        file: Some(log_file),
    })?;

    let config = WatchConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Commands::Run { symbols } => {
            let symbols = resolve_symbols(&config, symbols).await;
            let watch = TrendWatch::from_config(config)?;
            info!("Starting single run for {}", symbols.join(", "));
            let summary = watch.run_all(&symbols).await;
            println!(
                "Processed {}/{} symbols ({} alerts, {} emails sent, {} failed)",
                summary.processed,
                summary.total(),
                summary.alerts,
                summary.emails_sent,
                summary.failed
            );
        }
        Commands::Schedule => {
            let symbols = resolve_symbols(&config, Vec::new()).await;
            let scheduler = Scheduler::from_config(&config.schedule);
            let watch = TrendWatch::from_config(config)?;
            let runs = scheduler.run(&watch, &symbols).await;
            println!("Completed {runs} runs");
        }
        Commands::CheckProviders { symbol } => {
            let watch = TrendWatch::from_config(config)?;
            if watch.analyzer().is_empty() {
                anyhow::bail!("no LLM provider is enabled");
            }
            let checks = watch.check_providers(&symbol.to_uppercase()).await?;

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Provider", "Model", "Status", "Preview"]);
            for check in checks {
                let (status, preview) = match &check.result {
                    Ok(text) => ("OK", preview(text)),
                    Err(e) => ("FAILED", preview(e)),
                };
                table.add_row(vec![
                    check.provider.title().to_string(),
                    check.model,
                    status.to_string(),
                    preview,
                ]);
            }
            println!("{table}");
        }
        Commands::ShowConfig => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Setting", "Value"]);
            for (key, value) in config.display_rows() {
                table.add_row(vec![key, value]);
            }
            println!("{table}");
            println!(
                "Symbols: {}",
                load_symbols(&config.symbols_file, &config.symbols_fallback)
                    .await
                    .join(", ")
            );
        }
    }

    Ok(())
}

async fn resolve_symbols(config: &WatchConfig, requested: Vec<String>) -> Vec<String> {
    if requested.is_empty() {
        load_symbols(&config.symbols_file, &config.symbols_fallback).await
    } else {
        requested.iter().map(|s| s.trim().to_uppercase()).collect()
    }
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let short: String = flat.chars().take(PREVIEW_CHARS).collect();
    let short = if flat.chars().count() > PREVIEW_CHARS {
        format!("{short}...")
    } else {
        short
    };
    sanitize_for_logging(&short)
}
