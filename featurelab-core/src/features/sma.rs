//! Simple Moving Average (SMA).
//!
//! Rolling mean over a fixed trailing window.
//! Lookback: period - 1 (first valid value at index period-1).
//! A window holding any non-finite value is undefined.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let mut result = vec![f64::NAN; values.len()];

        // Running sum of the finite values in the window, plus a count of the
        // non-finite ones. A window is defined only when that count is zero.
        let mut sum = 0.0;
        let mut undefined = 0usize;
        for (i, &entering) in values.iter().enumerate() {
            if entering.is_finite() {
                sum += entering;
            } else {
                undefined += 1;
            }

            if i >= self.period {
                let leaving = values[i - self.period];
                if leaving.is_finite() {
                    sum -= leaving;
                } else {
                    undefined -= 1;
                }
            }

            if i + 1 >= self.period && undefined == 0 {
                result[i] = sum / self.period as f64;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let result = Sma::new(5).compute(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_nan(), "expected NaN at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_identity() {
        let result = Sma::new(1).compute(&[100.0, 200.0, 300.0]);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn sma_nan_propagation() {
        let result = Sma::new(3).compute(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0]);
        // Every window touching index 2 is undefined
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        // Index 5 window [13,14,15] → 14.0
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_infinite_value_only_blanks_covering_windows() {
        let mut values: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        values[2] = f64::INFINITY;
        let result = Sma::new(3).compute(&values);
        assert!(result[2..=4].iter().all(|v| v.is_nan()));
        for t in 5..20 {
            let mean = values[t - 2..=t].iter().sum::<f64>() / 3.0;
            assert_approx(result[t], mean, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn sma_matches_direct_mean_on_long_series() {
        let values: Vec<f64> = (0..500).map(|i| 100.0 + (i as f64 * 0.37).sin() * 25.0).collect();
        let result = Sma::new(50).compute(&values);
        for t in 49..values.len() {
            let mean = values[t - 49..=t].iter().sum::<f64>() / 50.0;
            assert_approx(result[t], mean, 1e-9);
        }
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(50).lookback(), 49);
        assert_eq!(Sma::new(1).lookback(), 0);
    }

    #[test]
    fn sma_too_few_values() {
        let result = Sma::new(5).compute(&[10.0, 11.0]);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
