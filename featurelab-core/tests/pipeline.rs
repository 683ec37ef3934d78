//! Integration tests for the fetch → features → clean pipeline.

use chrono::{Datelike, NaiveDate, Weekday};
use featurelab_core::data::{
    CsvProvider, DataError, DataProvider, DataSource, FetchRequest, FetchResult, RawBar,
};
use featurelab_core::features::volatility::sample_std;
use featurelab_core::{
    fetch_and_process, fetch_and_process_data, FeatureWindows, PipelineConfig, PipelineError,
    ProviderKind,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// In-memory provider that serves a frozen bar list and counts calls.
struct Frozen {
    bars: Vec<RawBar>,
    calls: AtomicU32,
}

impl Frozen {
    fn new(bars: Vec<RawBar>) -> Self {
        Self {
            bars,
            calls: AtomicU32::new(0),
        }
    }
}

impl DataProvider for Frozen {
    fn name(&self) -> &str {
        "frozen"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchResult {
            symbol: request.ticker.clone(),
            bars: self
                .bars
                .iter()
                .filter(|b| b.date >= request.start && b.date < request.end)
                .cloned()
                .collect(),
            source: DataSource::Synthetic,
        })
    }
}

/// Always fails the way a dropped connection does.
struct Offline;

impl DataProvider for Offline {
    fn name(&self) -> &str {
        "offline"
    }

    fn fetch(&self, _request: &FetchRequest) -> Result<FetchResult, DataError> {
        Err(DataError::NetworkUnreachable("connection refused".into()))
    }
}

/// Trading days only: weekdays starting 2024-01-01.
fn weekday_bars(prices: &[f64]) -> Vec<RawBar> {
    let mut date = d(2024, 1, 1);
    let mut out = Vec::with_capacity(prices.len());
    for &p in prices {
        while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            date = date.succ_opt().unwrap();
        }
        out.push(RawBar::from_price(date, p, 1_000_000.0));
        date = date.succ_opt().unwrap();
    }
    out
}

fn walk(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 * (1.0 + 0.02 * (i as f64 * 0.9).sin() + 0.001 * i as f64))
        .collect()
}

#[test]
fn csv_fixture_end_to_end() {
    let provider = CsvProvider::new(fixture_dir());
    let table = fetch_and_process_data(
        &provider,
        "SPY",
        d(2023, 1, 1),
        d(2024, 1, 1),
        FeatureWindows::default(),
    )
    .unwrap();

    // 80 fixture rows, 49 of warmup
    assert_eq!(table.len(), 31);
    assert_eq!(table.dropped(), 49);
    assert!(table.rows().iter().all(|r| r.is_defined()));
    assert!(table.rows().iter().all(|r| (0.0..=100.0).contains(&r.rsi)));
    assert_eq!(table.last_date(), Some(d(2023, 4, 24)));
}

#[test]
fn csv_fixture_uses_adjusted_close() {
    let raw = CsvProvider::read_file(&fixture_dir().join("SPY.csv")).unwrap();
    let provider = CsvProvider::new(fixture_dir());
    let table =
        fetch_and_process_data(&provider, "SPY", d(2023, 1, 1), d(2024, 1, 1), FeatureWindows::default())
            .unwrap();
    let first = table.rows()[0];
    let source = raw.iter().find(|b| b.date == first.date).unwrap();
    assert_eq!(first.price, source.adj_close);
    assert_ne!(first.price, source.close);
}

#[test]
fn unknown_ticker_is_no_data() {
    let provider = CsvProvider::new(fixture_dir());
    let err = fetch_and_process_data(
        &provider,
        "DOES-NOT-EXIST",
        d(2023, 1, 1),
        d(2024, 1, 1),
        FeatureWindows::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::NoData { .. }));
}

#[test]
fn empty_date_range_is_no_data() {
    let provider = Frozen::new(weekday_bars(&walk(100)));
    let err = fetch_and_process_data(
        &provider,
        "TEST",
        d(2030, 1, 1),
        d(2030, 1, 1),
        FeatureWindows::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::NoData { .. }));
}

#[test]
fn network_errors_pass_through_uninterpreted() {
    let err = fetch_and_process_data(
        &Offline,
        "SPY",
        d(2018, 1, 1),
        d(2024, 1, 1),
        FeatureWindows::default(),
    )
    .unwrap_err();
    match err {
        PipelineError::Provider(DataError::NetworkUnreachable(msg)) => {
            assert_eq!(msg, "connection refused")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn single_fetch_per_call() {
    let provider = Frozen::new(weekday_bars(&walk(120)));
    fetch_and_process_data(&provider, "T", d(2024, 1, 1), d(2025, 1, 1), FeatureWindows::default())
        .unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn idempotent_against_frozen_source() {
    let provider = Frozen::new(weekday_bars(&walk(200)));
    let a = fetch_and_process_data(&provider, "T", d(2024, 1, 1), d(2025, 1, 1), FeatureWindows::default())
        .unwrap();
    let b = fetch_and_process_data(&provider, "T", d(2024, 1, 1), d(2025, 1, 1), FeatureWindows::default())
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn retained_rows_match_definitions() {
    let prices = walk(150);
    let bars = weekday_bars(&prices);
    let provider = Frozen::new(bars.clone());
    let table =
        fetch_and_process_data(&provider, "T", d(2024, 1, 1), d(2025, 1, 1), FeatureWindows::default())
            .unwrap();
    assert_eq!(table.len(), prices.len() - 49);

    let log_returns: Vec<f64> = (0..prices.len())
        .map(|t| if t == 0 { f64::NAN } else { (prices[t] / prices[t - 1]).ln() })
        .collect();

    for (k, row) in table.rows().iter().enumerate() {
        let t = k + 49;
        assert_eq!(row.date, bars[t].date);
        assert_eq!(row.log_returns, (prices[t] / prices[t - 1]).ln());

        let vol = sample_std(&log_returns[t - 19..=t]);
        assert!((row.volatility - vol).abs() < 1e-12);

        let sma = prices[t - 49..=t].iter().sum::<f64>() / 50.0;
        assert!((row.dist_to_sma - (prices[t] - sma) / sma).abs() < 1e-10);
    }
}

#[test]
fn provider_gaps_shrink_the_table_beyond_warmup() {
    let mut bars = weekday_bars(&walk(120));
    bars[80].adj_close = f64::NAN;
    let provider = Frozen::new(bars);
    let table =
        fetch_and_process_data(&provider, "T", d(2024, 1, 1), d(2025, 1, 1), FeatureWindows::default())
            .unwrap();
    // One undefined price poisons every window that covers it.
    // Longest reach is the 50-bar SMA: rows 80..=129 clipped to 119.
    assert_eq!(table.len(), 120 - 49 - (120 - 80));
    assert!(table.rows().iter().all(|r| r.is_defined()));
}

#[test]
fn infinite_price_only_drops_covering_windows() {
    let mut bars = weekday_bars(&walk(200));
    bars[10].adj_close = f64::INFINITY;
    let provider = Frozen::new(bars);
    let table =
        fetch_and_process_data(&provider, "T", d(2024, 1, 1), d(2025, 1, 1), FeatureWindows::default())
            .unwrap();
    // The 50-bar SMA windows ending at 10..=59 cover it; everything after survives.
    assert_eq!(table.len(), 200 - 60);
    assert!(table.rows().iter().all(|r| r.is_defined()));
}

#[test]
fn negative_infinite_price_only_drops_covering_windows() {
    let mut bars = weekday_bars(&walk(200));
    bars[100].adj_close = f64::NEG_INFINITY;
    let provider = Frozen::new(bars);
    let table =
        fetch_and_process_data(&provider, "T", d(2024, 1, 1), d(2025, 1, 1), FeatureWindows::default())
            .unwrap();
    // Rows 49..=99 precede it, rows 150..=199 are past every window that covers it.
    assert_eq!(table.len(), 51 + 50);
    assert!(table.rows().iter().all(|r| r.is_defined()));
}

#[test]
fn blank_adjusted_close_in_csv_drops_the_row_instead_of_using_close() {
    let prices = walk(120);
    let bars = weekday_bars(&prices);
    let mut body = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for (i, bar) in bars.iter().enumerate() {
        let close = bar.adj_close * 2.0;
        let adj = if i == 55 { String::new() } else { bar.adj_close.to_string() };
        body.push_str(&format!("{},{close},{close},{close},{close},{adj},1000\n", bar.date));
    }
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("ADJ.csv"), body).unwrap();

    let provider = CsvProvider::new(tmp.path());
    let table =
        fetch_and_process_data(&provider, "ADJ", d(2024, 1, 1), d(2025, 1, 1), FeatureWindows::default())
            .unwrap();

    // Rows 49..=54 before the gap, rows 105..=119 after every covering window.
    assert_eq!(table.len(), 6 + 15);
    let gap = [bars[55].date, bars[56].date];
    assert!(table.rows().iter().all(|r| !gap.contains(&r.date)));
    // A return mixing Close and Adj Close would be about ln 2.
    assert!(table.rows().iter().all(|r| r.log_returns.abs() < 0.1));
}

#[test]
fn custom_windows_change_warmup() {
    let provider = Frozen::new(weekday_bars(&walk(100)));
    let windows = FeatureWindows {
        volatility: 10,
        rsi: 7,
        sma: 20,
    };
    let table = fetch_and_process_data(&provider, "T", d(2024, 1, 1), d(2025, 1, 1), windows).unwrap();
    assert_eq!(table.dropped(), 19);
}

#[test]
fn config_driven_run_over_csv() {
    let toml = format!(
        r#"
        ticker = "SPY"
        start = "2023-01-01"
        end = "2023-12-31"

        [provider]
        kind = "csv"
        csv_dir = "{}"
        "#,
        fixture_dir().display().to_string().replace('\\', "/")
    );
    let cfg = PipelineConfig::from_toml(&toml).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.provider.kind, ProviderKind::Csv);

    let provider = cfg.provider.build().unwrap();
    let table = fetch_and_process(provider.as_ref(), &cfg.request().unwrap(), cfg.windows).unwrap();
    assert_eq!(table.len(), 31);
}
