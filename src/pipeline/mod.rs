//! Aggregation pipeline - every experiment family over one results directory
//!
//! ```text
//! ExperimentKey ──resolve──> SourceSelection ──load──> SourcedRecord* ──reduce──> ExperimentAggregate
//!                                                                                       │
//!                                                       FamilyAggregate <──assemble─────┘
//! ```
//!
//! Families run one after another and in isolation: a family without data is
//! skipped, a family whose data cannot be aggregated fails, and neither stops
//! the families after it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use graphbench_stats::pipeline::Aggregator;
//!
//! let aggregator = Aggregator::builder().results_root("results").build()?;
//! let report = aggregator.aggregate_all();
//! println!("{report}");
//! # Ok::<(), graphbench_stats::Error>(())
//! ```

mod families;
mod report;

pub use families::{CommunityAggregate, ConvergenceAggregate, FamilyAggregate, ScalabilityAggregate};
pub use report::{AggregationReport, Unit, UnitOutcome, UnitStatus};

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::assembler::MismatchPolicy;
use crate::config::AggregationConfig;
use crate::record::{load_record, RecordSchema};
use crate::reducer::{reduce, ExperimentAggregate, ReductionSpec, SourcedRecord};
use crate::resolver::{resolve, ExperimentKey};
use crate::{Error, Result};

/// Aggregates the benchmark results found under one directory.
#[derive(Debug, Clone)]
pub struct Aggregator {
    root: PathBuf,
    config: AggregationConfig,
}

impl Aggregator {
    /// Create a new aggregator builder
    #[must_use]
    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::default()
    }

    /// Get the results root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Run every family and collect the outcomes.
    ///
    /// Never fails as a whole; per-family errors are recorded in the report.
    #[must_use]
    pub fn aggregate_all(&self) -> AggregationReport {
        let started_at = Utc::now();
        tracing::info!(root = %self.root.display(), "aggregating results");

        let outcomes = Unit::ALL
            .into_iter()
            .map(|unit| self.run_unit(unit))
            .collect();

        AggregationReport::new(self.root.clone(), started_at, Utc::now(), outcomes)
    }

    /// Run a single family.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDataFound`] if the family has no data, and any
    /// loading, shape or assembly error otherwise.
    pub fn aggregate(&self, unit: Unit) -> Result<FamilyAggregate> {
        match unit {
            Unit::Convergence => self.convergence().map(FamilyAggregate::Convergence),
            Unit::Communities => self.communities().map(FamilyAggregate::Communities),
            Unit::PushVsPpr => self.push_vs_ppr().map(FamilyAggregate::PushVsPpr),
            Unit::Damping => self.damping().map(FamilyAggregate::Damping),
            Unit::Scalability => self.scalability().map(FamilyAggregate::Scalability),
        }
    }

    fn run_unit(&self, unit: Unit) -> UnitOutcome {
        match self.aggregate(unit) {
            Ok(aggregate) => {
                tracing::info!(unit = unit.name(), "aggregated");
                UnitOutcome::succeeded(unit, aggregate)
            }
            Err(e) if e.is_no_data() => {
                tracing::info!(unit = unit.name(), reason = %e, "skipped");
                UnitOutcome::skipped(unit, e.to_string())
            }
            Err(e) => {
                tracing::warn!(unit = unit.name(), error = %e, "failed");
                UnitOutcome::failed(unit, e.to_string())
            }
        }
    }

    /// Resolve and load every file backing `key`.
    fn load_sources(&self, key: &ExperimentKey, schema: RecordSchema) -> Result<Vec<SourcedRecord>> {
        let selection = resolve(&self.root, key)?;
        if selection.is_empty() {
            return Err(Error::no_data(key.name()));
        }

        selection
            .paths()
            .iter()
            .map(|path| {
                let record = load_record(path, schema)?;
                Ok(SourcedRecord::new(path.clone(), selection.parameter(), record))
            })
            .collect()
    }

    /// Load several keys into one pool, skipping the keys without data.
    fn load_pooled<'a, I>(&self, keys: I, schema: RecordSchema) -> Result<Vec<SourcedRecord>>
    where
        I: IntoIterator<Item = &'a ExperimentKey>,
    {
        let mut pooled = Vec::new();
        for key in keys {
            match self.load_sources(key, schema) {
                Ok(records) => pooled.extend(records),
                Err(e) if e.is_no_data() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(pooled)
    }

    fn reduce_key(&self, key: &ExperimentKey, spec: &ReductionSpec) -> Result<ExperimentAggregate> {
        let records = self.load_sources(key, RecordSchema::Plain)?;
        reduce(&key.name(), &records, spec)
    }
}

/// Turn "no data" into `None`, keeping every other error.
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_no_data() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Builder for [`Aggregator`]
#[derive(Debug, Default)]
pub struct AggregatorBuilder {
    root: Option<PathBuf>,
    config: AggregationConfig,
}

impl AggregatorBuilder {
    /// Set the results directory (required).
    #[must_use]
    pub fn results_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: AggregationConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the comparison mismatch policy.
    #[must_use]
    pub fn mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.config.mismatch_policy = policy;
        self
    }

    /// Build the aggregator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no results root was set or the
    /// configuration is invalid.
    pub fn build(self) -> Result<Aggregator> {
        let root = self
            .root
            .ok_or_else(|| Error::Config("results_root is required".into()))?;
        self.config.validate()?;
        Ok(Aggregator {
            root,
            config: self.config,
        })
    }
}
