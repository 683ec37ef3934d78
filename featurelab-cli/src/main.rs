//! FeatureLab CLI — fetch a ticker, build its feature table, report, and plot.
//!
//! Runs the whole pipeline once:
//! - loads `PipelineConfig` from `--config` (optional), then applies flag overrides
//! - fetches daily bars from Yahoo Finance, or from `--csv-dir` when given
//! - prints a summary and the first rows of the cleaned table
//! - optionally writes the table (`--output x.csv|x.parquet`) and plots it (`--plot`)
//!
//! This is the one place errors are caught: any failure prints `Error: ...`
//! and exits with status 1 without writing output or drawing charts.

mod chart;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use featurelab_core::{fetch_and_process, FeatureTable, PipelineConfig, ProviderKind};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "featurelab",
    about = "FeatureLab — daily price features (log returns, volatility, RSI, SMA distance)"
)]
struct Cli {
    /// Ticker symbol (e.g., BTC-USD, AAPL). Defaults to BTC-USD.
    ticker: Option<String>,

    /// Start date, inclusive (YYYY-MM-DD). Defaults to 2018-01-01.
    #[arg(long)]
    start: Option<String>,

    /// End date, exclusive (YYYY-MM-DD). Defaults to 2024-01-01.
    #[arg(long)]
    end: Option<String>,

    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read <TICKER>.csv files from this directory instead of Yahoo Finance.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Retry transient fetch failures this many times with exponential backoff.
    #[arg(long)]
    retries: Option<u32>,

    /// Number of rows to print.
    #[arg(long, default_value_t = 5)]
    head: usize,

    /// Write the feature table to this file (.csv or .parquet).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Plot price and volatility in the terminal.
    #[arg(long, default_value_t = false)]
    plot: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    config.validate()?;
    debug!(?config, "resolved configuration");

    let provider = config
        .provider
        .build()
        .context("failed to set up data provider")?;
    let request = config.request()?;

    let table = fetch_and_process(provider.as_ref(), &request, config.windows)?;

    print_summary(&config.ticker, &table, cli.head);

    if let Some(path) = &cli.output {
        table
            .write_to(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Features written to: {}", path.display());
    }

    if cli.plot {
        chart::draw_inline(&table, &config.ticker).context("failed to draw charts")?;
    }

    Ok(())
}

/// Config file (or defaults) with command-line overrides applied.
fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(ticker) = &cli.ticker {
        config.ticker = ticker.clone();
    }
    if let Some(start) = cli.start.as_deref() {
        config.start = parse_date(start, "--start")?;
    }
    if let Some(end) = cli.end.as_deref() {
        config.end = parse_date(end, "--end")?;
    }
    if let Some(dir) = &cli.csv_dir {
        config.provider.kind = ProviderKind::Csv;
        config.provider.csv_dir = dir.clone();
    }
    if let Some(retries) = cli.retries {
        config.provider.retries = retries;
    }

    Ok(config)
}

fn parse_date(s: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("{flag} expects YYYY-MM-DD, got '{s}'"))
}

fn print_summary(ticker: &str, table: &FeatureTable, head: usize) {
    println!();
    println!("=== Features: {ticker} ===");
    println!("Data ready:     {} rows", table.len());
    println!("Dropped:        {} rows with undefined values", table.dropped());
    if let (Some(first), Some(last)) = (table.first_date(), table.last_date()) {
        println!("Period:         {first} to {last}");
    }
    if head > 0 && !table.is_empty() {
        println!();
        print!("{}", table.render_head(head));
    }
    println!();
}
