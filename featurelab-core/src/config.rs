//! Pipeline configuration.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file) reproduces the standard run:
//!
//! ```toml
//! ticker = "BTC-USD"
//! start = "2018-01-01"
//! end = "2024-01-01"
//!
//! [windows]
//! volatility = 20
//! rsi = 14
//! sma = 50
//!
//! [provider]
//! kind = "yahoo"          # or "csv"
//! timeout_secs = 30
//! csv_dir = "data"
//! retries = 0
//! retry_base_delay_ms = 500
//! ```

use crate::data::{CsvProvider, DataError, DataProvider, FetchRequest, RetryingProvider, YahooProvider};
use crate::features::FeatureWindows;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// HTTP timeout for the single Yahoo request.
    pub timeout_secs: u64,
    /// Directory of `<TICKER>.csv` files for the CSV provider.
    pub csv_dir: PathBuf,
    /// Extra attempts on transient failures. 0 = fetch exactly once.
    pub retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            timeout_secs: 30,
            csv_dir: PathBuf::from("data"),
            retries: 0,
            retry_base_delay_ms: 500,
        }
    }
}

impl ProviderConfig {
    /// Build the configured provider, wrapped for retries when `retries > 0`.
    pub fn build(&self) -> Result<Box<dyn DataProvider>, DataError> {
        let base: Box<dyn DataProvider> = match self.kind {
            ProviderKind::Yahoo => Box::new(YahooProvider::new(Duration::from_secs(self.timeout_secs))?),
            ProviderKind::Csv => Box::new(CsvProvider::new(&self.csv_dir)),
        };

        if self.retries == 0 {
            return Ok(base);
        }
        Ok(Box::new(RetryingProvider::new(
            base,
            self.retries,
            Duration::from_millis(self.retry_base_delay_ms),
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ticker: String,
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
    pub windows: FeatureWindows,
    pub provider: ProviderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ticker: "BTC-USD".to_string(),
            start: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            windows: FeatureWindows::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticker.trim().is_empty() {
            return Err(ConfigError::Invalid("ticker must not be empty".into()));
        }
        if self.start > self.end {
            return Err(ConfigError::Invalid(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        if self.windows.volatility < 2 {
            return Err(ConfigError::Invalid(
                "windows.volatility must be >= 2 (sample standard deviation)".into(),
            ));
        }
        if self.windows.rsi == 0 {
            return Err(ConfigError::Invalid("windows.rsi must be >= 1".into()));
        }
        if self.windows.sma == 0 {
            return Err(ConfigError::Invalid("windows.sma must be >= 1".into()));
        }
        Ok(())
    }

    pub fn request(&self) -> Result<FetchRequest, DataError> {
        FetchRequest::new(&self.ticker, self.start, self.end)
    }
}
