//! Pooled summary statistics

use serde::{Deserialize, Serialize};

/// Mean, population standard deviation and sample count of one metric over
/// one parameter group.
///
/// Always computed over the pooled row-level observations of every
/// contributing file, never over per-file averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStat {
    mean: f64,
    std_dev: f64,
    count: usize,
}

impl AggregateStat {
    /// Summarize a pooled sample. Returns `None` for an empty sample.
    ///
    /// A single observation has a standard deviation of exactly zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let count = samples.len();
        let n = count as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let std_dev = if count == 1 {
            0.0
        } else {
            let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
            variance.sqrt()
        };
        Some(Self {
            mean,
            std_dev,
            count,
        })
    }

    /// Get the arithmetic mean.
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Get the population standard deviation.
    #[must_use]
    pub const fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Get the number of pooled observations.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }
}
