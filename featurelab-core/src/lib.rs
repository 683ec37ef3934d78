//! FeatureLab Core — market data fetch, feature engineering, and cleaning.
//!
//! This crate contains the whole computational pipeline:
//! - Data providers (Yahoo Finance, CSV import) behind one trait, plus an
//!   opt-in retry wrapper
//! - Feature indicators: log returns, rolling volatility, RSI, distance to SMA
//! - Feature frame/table types with the cleaner between them
//! - The `fetch_and_process_data` pipeline and its configuration

pub mod config;
pub mod data;
pub mod features;
pub mod pipeline;
pub mod table;

pub use config::{ConfigError, PipelineConfig, ProviderConfig, ProviderKind};
pub use features::{FeatureEngine, FeatureWindows};
pub use pipeline::{fetch_and_process, fetch_and_process_data, process_bars, PipelineError};
pub use table::{ExportError, FeatureFrame, FeatureRow, FeatureTable};
