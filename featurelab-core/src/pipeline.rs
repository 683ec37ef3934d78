//! Fetch → validate → featurize → clean.
//!
//! The pipeline is one linear transformation with a single domain failure:
//! [`PipelineError::NoData`] when the provider returns zero rows. Provider
//! errors pass through untouched. A call either returns a complete, cleaned
//! table or an error; never a partial table.

use crate::data::{canonicalize, DataError, DataProvider, FetchRequest, RawBar};
use crate::features::{FeatureEngine, FeatureWindows};
use crate::table::FeatureTable;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no data returned for {ticker} between {start} and {end}; check the ticker or your connection")]
    NoData {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error(transparent)]
    Provider(#[from] DataError),
}

/// Download bars for `ticker` over `[start, end)` and build the cleaned feature table.
pub fn fetch_and_process_data(
    provider: &dyn DataProvider,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    windows: FeatureWindows,
) -> Result<FeatureTable, PipelineError> {
    let request = FetchRequest::new(ticker, start, end)?;
    fetch_and_process(provider, &request, windows)
}

/// Same as [`fetch_and_process_data`] with a pre-validated request.
pub fn fetch_and_process(
    provider: &dyn DataProvider,
    request: &FetchRequest,
    windows: FeatureWindows,
) -> Result<FeatureTable, PipelineError> {
    info!(
        ticker = %request.ticker,
        start = %request.start,
        end = %request.end,
        provider = provider.name(),
        "loading data"
    );

    let fetched = provider.fetch(request)?;
    if fetched.bars.is_empty() {
        return Err(PipelineError::NoData {
            ticker: request.ticker.clone(),
            start: request.start,
            end: request.end,
        });
    }

    let table = process_bars(fetched.bars, windows);
    info!(
        ticker = %request.ticker,
        rows = table.len(),
        dropped = table.dropped(),
        "features ready"
    );
    Ok(table)
}

/// Pure part of the pipeline: canonicalize, compute features, drop undefined rows.
pub fn process_bars(bars: Vec<RawBar>, windows: FeatureWindows) -> FeatureTable {
    let canonical = canonicalize(bars);
    if canonical.duplicates_removed > 0 {
        warn!(
            duplicates = canonical.duplicates_removed,
            "dropped bars with duplicate dates"
        );
    }

    let engine = FeatureEngine::new(windows);
    let raw_rows = canonical.bars.len();
    let table = engine.compute(&canonical.bars).drop_undefined();

    let warmup = engine.warmup().min(raw_rows);
    debug!(raw_rows, warmup, dropped = table.dropped(), "cleaned feature frame");
    if table.dropped() > warmup {
        warn!(
            extra = table.dropped() - warmup,
            "rows dropped beyond warmup due to undefined provider values"
        );
    }

    table
}
