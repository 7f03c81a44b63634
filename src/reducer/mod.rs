//! Grouping Reducer - pooled per-parameter statistics
//!
//! ```text
//! SourcedRecord* ──flatten──> MetricRow* ──partition──> ParameterGroup* ──reduce──> ExperimentAggregate
//! ```
//!
//! - **Flatten**: rows come from bare lists, named nested lists, named
//!   objects or document scalars, per [`RowSource`].
//! - **Partition**: rows are bucketed by the parsed value of the parameter
//!   field. A row without the field takes the parameter its file was resolved
//!   for; a row with neither is excluded.
//! - **Reduce**: per bucket and metric, mean and population standard
//!   deviation over every pooled row carrying the metric. A row lacking one
//!   metric still counts for the others.
//! - **Order**: buckets ascend by parameter value.

mod aggregate;
mod spec;
mod stats;

pub use aggregate::{ExperimentAggregate, GroupSummary};
pub use spec::{ReductionSpec, RowSource};
pub use stats::AggregateStat;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::record::{MetricRow, ParameterValue, RunRecord};
use crate::{Error, Result};

/// A loaded record together with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcedRecord {
    path: PathBuf,
    parameter: Option<ParameterValue>,
    record: RunRecord,
}

impl SourcedRecord {
    /// Pair a record with its file and the parameter value the file was
    /// resolved for.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        parameter: Option<ParameterValue>,
        record: RunRecord,
    ) -> Self {
        Self {
            path: path.into(),
            parameter,
            record,
        }
    }

    /// Get the source file.
    #[must_use]
    pub const fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Get the parameter implied by the file name.
    #[must_use]
    pub const fn parameter(&self) -> Option<ParameterValue> {
        self.parameter
    }

    /// Get the record.
    #[must_use]
    pub const fn record(&self) -> &RunRecord {
        &self.record
    }
}

/// Rows sharing one parameter value, before reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGroup {
    parameter: Option<ParameterValue>,
    rows: Vec<MetricRow>,
}

impl ParameterGroup {
    /// Get the parameter value.
    #[must_use]
    pub const fn parameter(&self) -> Option<ParameterValue> {
        self.parameter
    }

    /// Get the pooled rows.
    #[must_use]
    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    /// Reduce the group over `metrics`.
    #[must_use]
    pub fn summarize(&self, metrics: &[String]) -> GroupSummary {
        let stats = metrics
            .iter()
            .filter_map(|metric| {
                let samples: Vec<f64> =
                    self.rows.iter().filter_map(|row| row.get(metric)).collect();
                AggregateStat::from_samples(&samples).map(|stat| (metric.clone(), stat))
            })
            .collect();
        GroupSummary::new(self.parameter, self.rows.len(), stats)
    }
}

/// Partition the rows of `records` by the reduction's parameter.
///
/// Rows that carry none of the requested metrics, or no parameter value, are
/// excluded.
///
/// # Errors
///
/// Returns [`Error::SchemaMismatch`] if a record's shape contradicts the
/// requested row source (e.g. the nested field is not a list of objects).
pub fn partition(
    experiment: &str,
    records: &[SourcedRecord],
    spec: &ReductionSpec,
) -> Result<Vec<ParameterGroup>> {
    let mut buckets: BTreeMap<Option<ParameterValue>, Vec<MetricRow>> = BTreeMap::new();
    let mut excluded = 0usize;

    for sourced in records {
        for row in flatten(experiment, sourced, spec)? {
            if let Some((field, value)) = spec.filter() {
                if row.get(field).map(ParameterValue::new) != Some(value) {
                    continue;
                }
            }

            let key = match spec.parameter() {
                None => None,
                Some(field) => {
                    match row.get(field).map(ParameterValue::new).or(sourced.parameter) {
                        Some(value) => Some(value),
                        None => {
                            excluded += 1;
                            continue;
                        }
                    }
                }
            };

            if !spec.metrics().iter().any(|metric| row.contains(metric)) {
                excluded += 1;
                continue;
            }

            buckets.entry(key).or_default().push(row);
        }
    }

    if excluded > 0 {
        tracing::debug!(experiment, excluded, "rows excluded from reduction");
    }

    Ok(buckets
        .into_iter()
        .map(|(parameter, rows)| ParameterGroup { parameter, rows })
        .collect())
}

/// Reduce `records` into a parameter-ordered aggregate.
///
/// # Errors
///
/// Returns [`Error::NoDataFound`] if no row satisfies the reduction, and
/// [`Error::SchemaMismatch`] if a record's shape contradicts it.
pub fn reduce(
    experiment: &str,
    records: &[SourcedRecord],
    spec: &ReductionSpec,
) -> Result<ExperimentAggregate> {
    let groups = partition(experiment, records, spec)?;
    if groups.is_empty() {
        return Err(Error::no_data(experiment));
    }

    let summaries = groups
        .iter()
        .map(|group| group.summarize(spec.metrics()))
        .collect();
    Ok(ExperimentAggregate::new(
        experiment,
        spec.parameter().map(str::to_string),
        summaries,
    ))
}

#[allow(clippy::cast_precision_loss)]
fn flatten(
    experiment: &str,
    sourced: &SourcedRecord,
    spec: &ReductionSpec,
) -> Result<Vec<MetricRow>> {
    let mismatch = |detail: String| Error::SchemaMismatch {
        experiment: experiment.to_string(),
        detail: format!("{detail} in {}", sourced.path.display()),
    };

    let rows: Vec<MetricRow> = match (spec.rows(), &sourced.record) {
        (RowSource::Rows | RowSource::Nested(_), RunRecord::Rows(rows)) => rows.clone(),
        (RowSource::Rows, RunRecord::Document(_)) => {
            return Err(mismatch("expected a list of rows, found an object".to_string()));
        }
        (RowSource::Nested(field), RunRecord::Document(document)) => {
            match (document.list(field), document.kind(field)) {
                (Some(rows), _) => rows.to_vec(),
                (None, Some(kind)) => {
                    return Err(mismatch(format!("field '{field}' is {kind:?}, not a list of rows")));
                }
                (None, None) => Vec::new(),
            }
        }
        (RowSource::Object(field), RunRecord::Document(document)) => {
            match (document.object(field), document.kind(field)) {
                (Some(row), _) => vec![row.clone()],
                (None, Some(kind)) => {
                    return Err(mismatch(format!("field '{field}' is {kind:?}, not an object")));
                }
                (None, None) => Vec::new(),
            }
        }
        (RowSource::Document, RunRecord::Document(document)) => vec![document.scalars().clone()],
        (RowSource::Object(_) | RowSource::Document, RunRecord::Rows(_)) => {
            return Err(mismatch("expected an object, found a list of rows".to_string()));
        }
    };

    let limit = spec.row_limit().unwrap_or(usize::MAX);
    Ok(rows
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(position, mut row)| {
            if let Some(rank) = spec.rank_field() {
                row.insert(rank, position as f64);
            }
            row
        })
        .collect())
}
