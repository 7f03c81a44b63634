//! Parameter values - the grouping key of a reduction

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A parsed numeric parameter value (tolerance, epsilon, damping, seed, size).
///
/// Values are compared numerically with a total order, never through their
/// rendered form, so `1e-5` and `0.00001` land in the same bucket. Negative
/// zero is folded into positive zero on construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct ParameterValue(f64);

impl ParameterValue {
    /// Wrap a parsed value.
    #[must_use]
    pub fn new(value: f64) -> Self {
        // -0.0 == 0.0 but total_cmp would separate them
        if value == 0.0 {
            Self(0.0)
        } else {
            Self(value)
        }
    }

    /// Get the raw value.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Render the value the way benchmark producers embed it in file names.
    #[must_use]
    pub fn render(self, format: ParameterFormat) -> String {
        match format {
            ParameterFormat::Plain => render_decimal(self.0),
            ParameterFormat::Integer => format!("{:.0}", self.0),
            ParameterFormat::Underscored => render_decimal(self.0).replace('.', "_"),
        }
    }
}

/// Shortest round-trip decimal, keeping a trailing `.0` on integral values.
fn render_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

impl PartialEq for ParameterValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParameterValue {}

impl PartialOrd for ParameterValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParameterValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for ParameterValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<ParameterValue> for f64 {
    fn from(value: ParameterValue) -> Self {
        value.0
    }
}

impl From<u64> for ParameterValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: u64) -> Self {
        Self::new(value as f64)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a parameter value is spelled inside result file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterFormat {
    /// Decimal form: `0.001`, `0.1`, `1.0`
    Plain,
    /// Whole number: `10`
    Integer,
    /// Decimal form with the point replaced: `0_85`, `1_0`
    Underscored,
}
