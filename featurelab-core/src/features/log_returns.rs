//! Log returns: ln(p[t] / p[t-1]).
//!
//! Lookback: 1. A non-positive or undefined price makes the two returns that
//! touch it non-finite.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct LogReturns {
    name: String,
}

impl LogReturns {
    pub fn new() -> Self {
        Self {
            name: "log_returns".to_string(),
        }
    }
}

impl Default for LogReturns {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for LogReturns {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let mut result = vec![f64::NAN; values.len()];
        for i in 1..values.len() {
            result[i] = (values[i] / values[i - 1]).ln();
        }
        result
    }
}
