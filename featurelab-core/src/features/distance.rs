//! Distance to moving average: (p - sma) / sma.
//!
//! A mean-reversion signal. Lookback: period - 1. Not clamped; a zero moving
//! average yields a non-finite value that the cleaner drops.

use super::{Indicator, Sma};

#[derive(Debug, Clone)]
pub struct DistanceToSma {
    sma: Sma,
    name: String,
}

impl DistanceToSma {
    pub fn new(period: usize) -> Self {
        Self {
            sma: Sma::new(period),
            name: format!("dist_to_sma_{period}"),
        }
    }
}

impl Indicator for DistanceToSma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.sma.lookback()
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        self.sma
            .compute(values)
            .into_iter()
            .zip(values)
            .map(|(sma, &p)| (p - sma) / sma)
            .collect()
    }
}
