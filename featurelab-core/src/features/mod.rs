//! Feature engineering over a single price/volume series.
//!
//! Every feature implements [`Indicator`]: a numeric series in, a series of the
//! same length out, with `f64::NAN` wherever the trailing window is not full yet
//! or contains an undefined input. Windows are explicit and fixed-size; nothing
//! is extrapolated or zero-filled.

pub mod distance;
pub mod log_returns;
pub mod rsi;
pub mod sma;
pub mod volatility;

pub use distance::DistanceToSma;
pub use log_returns::LogReturns;
pub use rsi::Rsi;
pub use sma::Sma;
pub use volatility::RollingStd;

use crate::data::RawBar;
use crate::table::FeatureFrame;
use serde::{Deserialize, Serialize};

/// Trait for series indicators.
///
/// `compute` returns a `Vec<f64>` of the same length as its input. The first
/// `lookback()` values are `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No output at index t may depend on input from index t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_50", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading outputs that are undefined on a fully defined input.
    fn lookback(&self) -> usize;

    fn compute(&self, values: &[f64]) -> Vec<f64>;
}

/// Window lengths for the windowed features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWindows {
    /// Observations of log returns in the rolling standard deviation.
    pub volatility: usize,
    /// RSI period.
    pub rsi: usize,
    /// Observations of price in the moving average.
    pub sma: usize,
}

impl Default for FeatureWindows {
    fn default() -> Self {
        Self {
            volatility: 20,
            rsi: 14,
            sma: 50,
        }
    }
}

/// Computes the full feature frame from canonical bars. Pure; no I/O.
#[derive(Debug, Clone)]
pub struct FeatureEngine {
    log_returns: LogReturns,
    volatility: RollingStd,
    rsi: Rsi,
    dist_to_sma: DistanceToSma,
}

impl FeatureEngine {
    /// Panics if a window is invalid; use `PipelineConfig::validate` first.
    pub fn new(windows: FeatureWindows) -> Self {
        Self {
            log_returns: LogReturns::new(),
            volatility: RollingStd::new(windows.volatility),
            rsi: Rsi::new(windows.rsi),
            dist_to_sma: DistanceToSma::new(windows.sma),
        }
    }

    /// Leading rows without a complete feature set, assuming a fully defined
    /// input series. This is the number of rows the cleaner drops.
    pub fn warmup(&self) -> usize {
        let volatility = self.log_returns.lookback() + self.volatility.lookback();
        volatility
            .max(self.log_returns.lookback())
            .max(self.rsi.lookback())
            .max(self.dist_to_sma.lookback())
    }

    pub fn compute(&self, bars: &[RawBar]) -> FeatureFrame {
        let price: Vec<f64> = bars.iter().map(|b| b.adj_close).collect();
        let log_returns = self.log_returns.compute(&price);
        let volatility = self.volatility.compute(&log_returns);
        let rsi = self.rsi.compute(&price);
        let dist_to_sma = self.dist_to_sma.compute(&price);

        FeatureFrame {
            dates: bars.iter().map(|b| b.date).collect(),
            volume: bars.iter().map(|b| b.volume).collect(),
            price,
            log_returns,
            volatility,
            rsi,
            dist_to_sma,
        }
    }
}

impl Default for FeatureEngine {
    fn default() -> Self {
        Self::new(FeatureWindows::default())
    }
}

/// Index of the first defined value, if any.
pub fn first_defined(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| v.is_finite())
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// Deterministic zig-zag price path starting `[100, 101, 99, 102, ...]`.
#[cfg(test)]
pub fn zigzag(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| match i {
            0 => 100.0,
            _ if i % 2 == 1 => 100.0 + ((i + 1) / 2) as f64,
            _ => 98.0 + (i / 2) as f64,
        })
        .collect()
}
