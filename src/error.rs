//! Error types for graphbench-stats
//!
//! Every variant names the experiment or file it concerns so a skipped unit in
//! the aggregation report can be traced back to the results directory.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// graphbench-stats error types
#[derive(Error, Debug)]
pub enum Error {
    /// Resolution produced an empty selection, or no row satisfied the reduction.
    ///
    /// Non-fatal: the caller skips that experiment and continues.
    #[error("no data found for experiment '{experiment}'")]
    NoDataFound {
        /// Experiment key that yielded nothing
        experiment: String,
    },

    /// A resolved file is not a valid result document
    #[error("malformed record {}: {reason}", path.display())]
    MalformedRecord {
        /// File that failed to parse
        path: PathBuf,
        /// Parser diagnostic
        reason: String,
    },

    /// A record's structure contradicts the active reduction
    #[error("schema mismatch in experiment '{experiment}': {detail}")]
    SchemaMismatch {
        /// Experiment being reduced
        experiment: String,
        /// What was expected and what was found
        detail: String,
    },

    /// Joint aggregates disagree on their parameter sets
    #[error("partial aggregate for experiment '{experiment}': parameters {missing:?} are not present in every aggregate")]
    PartialAggregate {
        /// Experiment being assembled
        experiment: String,
        /// Parameter values absent from at least one aggregate
        missing: Vec<f64>,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::NoDataFound`].
    pub fn no_data(experiment: impl Into<String>) -> Self {
        Self::NoDataFound {
            experiment: experiment.into(),
        }
    }

    /// True when the error only means "nothing to aggregate here".
    #[must_use]
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoDataFound { .. })
    }
}
