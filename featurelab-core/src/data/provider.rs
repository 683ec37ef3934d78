//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, CSV import)
//! so we can swap implementations and mock for tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw daily bar from a data provider (before canonicalization).
///
/// Missing provider values are carried as `f64::NAN` and dropped by the
/// cleaner once features are computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
}

impl RawBar {
    /// Bar carrying only the two fields the feature engine reads.
    pub fn from_price(date: NaiveDate, adj_close: f64, volume: f64) -> Self {
        Self {
            date,
            open: adj_close,
            high: adj_close,
            low: adj_close,
            close: adj_close,
            adj_close,
            volume,
        }
    }
}

/// Structured error types for data operations.
///
/// These are designed to be displayable in both library and CLI contexts.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status} for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("CSV import error in {path}: {message}")]
    CsvImport { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::NetworkUnreachable(_) | DataError::RateLimited { .. } => true,
            DataError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// A validated fetch request: one ticker over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchRequest {
    pub fn new(ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Self, DataError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(DataError::InvalidRequest("ticker must not be empty".into()));
        }
        if start > end {
            return Err(DataError::InvalidRequest(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self {
            ticker: ticker.to_string(),
            start,
            end,
        })
    }
}

/// Result of a fetch for a single ticker. `bars` may be empty.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<RawBar>,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Trait for data providers (Yahoo Finance, CSV import, etc).
///
/// A provider returns whatever rows the source has for the request, including
/// none at all. Deciding that an empty result is an error is the pipeline's job.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for one ticker over the request's date range.
    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError>;
}

impl<P: DataProvider + ?Sized> DataProvider for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError> {
        (**self).fetch(request)
    }
}

impl<P: DataProvider + ?Sized> DataProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, DataError> {
        (**self).fetch(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn request_trims_ticker() {
        let req = FetchRequest::new("  AAPL ", d(2020, 1, 1), d(2021, 1, 1)).unwrap();
        assert_eq!(req.ticker, "AAPL");
    }

    #[test]
    fn request_rejects_empty_ticker() {
        let err = FetchRequest::new("   ", d(2020, 1, 1), d(2021, 1, 1)).unwrap_err();
        assert!(matches!(err, DataError::InvalidRequest(_)));
    }

    #[test]
    fn request_rejects_inverted_range() {
        let err = FetchRequest::new("SPY", d(2021, 1, 1), d(2020, 1, 1)).unwrap_err();
        assert!(err.to_string().contains("after end date"));
    }

    #[test]
    fn request_allows_single_day_range() {
        assert!(FetchRequest::new("SPY", d(2021, 1, 1), d(2021, 1, 1)).is_ok());
    }

    #[test]
    fn transient_classification() {
        assert!(DataError::NetworkUnreachable("timeout".into()).is_transient());
        assert!(DataError::RateLimited { retry_after_secs: 5 }.is_transient());
        assert!(DataError::Http { status: 503, symbol: "SPY".into() }.is_transient());
        assert!(!DataError::Http { status: 404, symbol: "SPY".into() }.is_transient());
        assert!(!DataError::InvalidRequest("x".into()).is_transient());
    }
}
