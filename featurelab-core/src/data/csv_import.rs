//! CSV import provider.
//!
//! Reads `<dir>/<TICKER>.csv` files in the layout Yahoo Finance exports:
//! `Date,Open,High,Low,Close,Adj Close,Volume`. Snake-case headers
//! (`date`, `adj_close`, ...) are accepted too. Cells that are empty or not
//! numbers (Yahoo writes `null`) become undefined values.
//!
//! Price is the adjusted close. Only a file with no adjusted-close column at
//! all falls back to `Close`; a blank cell in that column stays undefined.

use super::provider::{DataError, DataProvider, DataSource, FetchRequest, FetchResult, RawBar};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", alias = "date")]
    date: String,
    #[serde(rename = "Open", alias = "open", default, deserialize_with = "csv::invalid_option")]
    open: Option<f64>,
    #[serde(rename = "High", alias = "high", default, deserialize_with = "csv::invalid_option")]
    high: Option<f64>,
    #[serde(rename = "Low", alias = "low", default, deserialize_with = "csv::invalid_option")]
    low: Option<f64>,
    #[serde(rename = "Close", alias = "close", default, deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(
        rename = "Adj Close",
        alias = "adj_close",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    adj_close: Option<f64>,
    #[serde(rename = "Volume", alias = "volume", default, deserialize_with = "csv::invalid_option")]
    volume: Option<f64>,
}

/// Provider backed by a directory of per-ticker CSV files.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `ticker`.
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.csv"))
    }

    /// Read every bar in a CSV file, unfiltered.
    pub fn read_file(path: &Path) -> Result<Vec<RawBar>, DataError> {
        let import_err = |message: String| DataError::CsvImport {
            path: path.display().to_string(),
            message,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| import_err(e.to_string()))?;

        let has_adj_close = reader
            .headers()
            .map_err(|e| import_err(e.to_string()))?
            .iter()
            .any(|h| h == "Adj Close" || h == "adj_close");

        let mut bars = Vec::new();
        for (line, record) in reader.deserialize::<CsvRow>().enumerate() {
            let row = record.map_err(|e| import_err(e.to_string()))?;
            let date = parse_date(&row.date)
                .ok_or_else(|| import_err(format!("row {}: invalid date '{}'", line + 1, row.date)))?;

            let close = row.close.or(row.adj_close);
            let adj_close = if has_adj_close { row.adj_close } else { close };

            bars.push(RawBar {
                date,
                open: row.open.unwrap_or(f64::NAN),
                high: row.high.unwrap_or(f64::NAN),
                low: row.low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                adj_close: adj_close.unwrap_or(f64::NAN),
                volume: row.volume.unwrap_or(f64::NAN),
            });
        }

        Ok(bars)
    }
}

/// Accepts `YYYY-MM-DD` with an optional time suffix (`2024-01-02 00:00:00+00:00`).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError> {
        let path = self.path_for(&request.ticker);

        // An unknown ticker has no file; that is an empty result, not an I/O failure.
        let bars = if path.exists() {
            Self::read_file(&path)?
                .into_iter()
                .filter(|b| b.date >= request.start && b.date < request.end)
                .collect()
        } else {
            debug!(path = %path.display(), "no CSV file for ticker");
            Vec::new()
        };

        Ok(FetchResult {
            symbol: request.ticker.clone(),
            bars,
            source: DataSource::CsvImport,
        })
    }
}
