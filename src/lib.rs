//! # graphbench-stats: Statistics over PageRank Benchmark Results
//!
//! **Version**: 0.1.0
//!
//! Turns the JSON result files written by the PageRank / PPR / PUSH benchmark
//! suite into per-parameter statistics (mean, population standard deviation,
//! sample count), ready for a rendering layer.
//!
//! ## Architecture
//!
//! - **resolver**: which files back an experiment (repeated runs, canonical
//!   file, legacy locations, per graph size)
//! - **record**: typed decoding of one result file, with schema-version
//!   compatibility applied once at load time
//! - **reducer**: pooling of rows by exact parameter value
//! - **assembler**: comparison and multi-series views over several aggregates
//! - **pipeline**: every experiment family, isolated from each other
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use graphbench_stats::pipeline::{Aggregator, Unit};
//!
//! let aggregator = Aggregator::builder().results_root("results").build()?;
//! let report = aggregator.aggregate_all();
//!
//! if let Some(damping) = report.aggregate(Unit::Damping) {
//!     println!("{}", serde_json::to_string_pretty(damping).unwrap_or_default());
//! }
//! # Ok::<(), graphbench_stats::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod assembler;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod reducer;
pub mod resolver;

pub use assembler::{ComparisonAggregate, MismatchPolicy, SeriesAggregate};
pub use config::AggregationConfig;
pub use error::{Error, Result};
pub use pipeline::{AggregationReport, Aggregator, FamilyAggregate, Unit};
pub use record::{MetricRow, ParameterValue, RunRecord};
pub use reducer::{AggregateStat, ExperimentAggregate, GroupSummary, ReductionSpec};
pub use resolver::{ExperimentKey, SourceSelection};
