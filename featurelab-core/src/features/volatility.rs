//! Rolling sample standard deviation.
//!
//! Applied to log returns this is the volatility feature. Each output uses the
//! trailing `period` inputs (inclusive) and the N-1 denominator, computed
//! two-pass over the window so a long series does not accumulate drift.
//! Lookback: period - 1. Any undefined input in the window → NaN.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct RollingStd {
    period: usize,
    name: String,
}

impl RollingStd {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "rolling std period must be >= 2");
        Self {
            period,
            name: format!("std_{period}"),
        }
    }
}

impl Indicator for RollingStd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &values[(i + 1 - self.period)..=i];
            result[i] = sample_std(window);
        }

        result
    }
}

/// Sample standard deviation; NaN if the slice has an undefined value or fewer than 2 items.
pub fn sample_std(window: &[f64]) -> f64 {
    let len = window.len();
    if len < 2 || window.iter().any(|v| !v.is_finite()) {
        return f64::NAN;
    }
    let mean = window.iter().sum::<f64>() / len as f64;
    let ss: f64 = window.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (len - 1) as f64).sqrt()
}
