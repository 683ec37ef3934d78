//! Feature frame (raw feature columns) and feature table (cleaned rows).
//!
//! The frame is what the feature engine produces: one value per column per
//! input bar, with `NaN` wherever a feature is undefined. The cleaner turns it
//! into a [`FeatureTable`], whose rows are all fully defined by construction.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Column names, in output order.
pub const COLUMNS: [&str; 7] = [
    "date",
    "price",
    "volume",
    "log_returns",
    "volatility",
    "rsi",
    "dist_to_sma",
];

/// Column-oriented features before cleaning. All columns have equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    pub dates: Vec<NaiveDate>,
    pub price: Vec<f64>,
    pub volume: Vec<f64>,
    pub log_returns: Vec<f64>,
    pub volatility: Vec<f64>,
    pub rsi: Vec<f64>,
    pub dist_to_sma: Vec<f64>,
}

impl FeatureFrame {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The row at `i`, if every field is defined.
    pub fn defined_row(&self, i: usize) -> Option<FeatureRow> {
        let row = FeatureRow {
            date: *self.dates.get(i)?,
            price: self.price[i],
            volume: self.volume[i],
            log_returns: self.log_returns[i],
            volatility: self.volatility[i],
            rsi: self.rsi[i],
            dist_to_sma: self.dist_to_sma[i],
        };
        row.is_defined().then_some(row)
    }

    /// Cleaner: keep only rows in which every field is defined, in order.
    pub fn drop_undefined(self) -> FeatureTable {
        let rows: Vec<FeatureRow> = (0..self.len()).filter_map(|i| self.defined_row(i)).collect();
        FeatureTable {
            dropped: self.len() - rows.len(),
            rows,
        }
    }
}

/// One fully defined row of the feature table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub price: f64,
    pub volume: f64,
    pub log_returns: f64,
    pub volatility: f64,
    pub rsi: f64,
    pub dist_to_sma: f64,
}

impl FeatureRow {
    /// Undefined means NaN or infinite.
    pub fn is_defined(&self) -> bool {
        [
            self.price,
            self.volume,
            self.log_returns,
            self.volatility,
            self.rsi,
            self.dist_to_sma,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("dataframe error: {0}")]
    Polars(String),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported output format '{0}' (expected .csv or .parquet)")]
    UnsupportedFormat(String),
}

/// Cleaned feature table. Every row has all fields defined.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
    dropped: usize,
}

impl FeatureTable {
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows removed by the cleaner.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn head(&self, n: usize) -> &[FeatureRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn price(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.price).collect()
    }

    pub fn volatility(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.volatility).collect()
    }

    /// Fixed-width text rendering of the first `n` rows.
    pub fn render_head(&self, n: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<10} {:>12} {:>14} {:>12} {:>11} {:>8} {:>12}",
            COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3], COLUMNS[4], COLUMNS[5], COLUMNS[6]
        );
        for r in self.head(n) {
            let _ = writeln!(
                out,
                "{:<10} {:>12.4} {:>14.0} {:>12.6} {:>11.6} {:>8.2} {:>12.6}",
                r.date.format("%Y-%m-%d"),
                r.price,
                r.volume,
                r.log_returns,
                r.volatility,
                r.rsi,
                r.dist_to_sma
            );
        }
        out
    }

    /// Convert to a Polars DataFrame with a `Date`-typed index column.
    pub fn to_dataframe(&self) -> Result<DataFrame, ExportError> {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
            .ok_or_else(|| ExportError::Polars("invalid epoch".into()))?;
        let days: Vec<i32> = self
            .rows
            .iter()
            .map(|r| (r.date - epoch).num_days() as i32)
            .collect();
        let col = |name: &str, f: fn(&FeatureRow) -> f64| {
            Column::new(name.into(), self.rows.iter().map(f).collect::<Vec<f64>>())
        };

        DataFrame::new(vec![
            Column::new("date".into(), days)
                .cast(&DataType::Date)
                .map_err(|e| ExportError::Polars(format!("date cast: {e}")))?,
            col("price", |r| r.price),
            col("volume", |r| r.volume),
            col("log_returns", |r| r.log_returns),
            col("volatility", |r| r.volatility),
            col("rsi", |r| r.rsi),
            col("dist_to_sma", |r| r.dist_to_sma),
        ])
        .map_err(|e| ExportError::Polars(format!("dataframe creation: {e}")))
    }

    /// CSV with a header row; floats at full precision.
    pub fn to_csv_string(&self) -> Result<String, ExportError> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(COLUMNS)?;
        for r in &self.rows {
            wtr.write_record([
                r.date.to_string(),
                r.price.to_string(),
                r.volume.to_string(),
                r.log_returns.to_string(),
                r.volatility.to_string(),
                r.rsi.to_string(),
                r.dist_to_sma.to_string(),
            ])?;
        }
        let data = wtr
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))?;
        String::from_utf8(data).map_err(|e| ExportError::Polars(format!("CSV output is not UTF-8: {e}")))
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), ExportError> {
        fs::write(path, self.to_csv_string()?)?;
        Ok(())
    }

    pub fn write_parquet(&self, path: &Path) -> Result<(), ExportError> {
        let mut df = self.to_dataframe()?;
        let file = fs::File::create(path)?;
        ParquetWriter::new(file)
            .finish(&mut df)
            .map_err(|e| ExportError::Polars(format!("write parquet: {e}")))?;
        Ok(())
    }

    /// Write by file extension: `.csv` or `.parquet`.
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => self.write_csv(path),
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => self.write_parquet(path),
            other => Err(ExportError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}
