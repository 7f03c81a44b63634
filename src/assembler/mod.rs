//! Aggregate Assembler - joint views over independently reduced aggregates
//!
//! A comparison experiment reports a baseline algorithm once (PPR), a variant
//! per parameter value (PUSH per epsilon) and a derived ratio per parameter
//! value (speedup per epsilon). The rendering layer zips the variant and the
//! ratio positionally, so both must carry the same sorted parameter sequence.
//!
//! When they do not, [`MismatchPolicy`] decides: intersect to the common
//! values and record what was dropped, or fail with
//! [`Error::PartialAggregate`].

use serde::{Deserialize, Serialize};

use crate::record::ParameterValue;
use crate::reducer::{ExperimentAggregate, GroupSummary};
use crate::{Error, Result};

/// What to do when joint aggregates disagree on their parameter sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Keep the common parameter values and log the dropped ones.
    #[default]
    Intersect,
    /// Refuse to assemble.
    Fail,
}

/// Baseline, variant and ratio aggregates aligned on one parameter sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonAggregate {
    experiment: String,
    baseline: GroupSummary,
    variant: ExperimentAggregate,
    ratio: ExperimentAggregate,
    parameters: Vec<ParameterValue>,
    dropped: Vec<ParameterValue>,
}

impl ComparisonAggregate {
    /// Get the experiment name.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Get the baseline's single group.
    #[must_use]
    pub const fn baseline(&self) -> &GroupSummary {
        &self.baseline
    }

    /// Get the per-parameter variant aggregate.
    #[must_use]
    pub const fn variant(&self) -> &ExperimentAggregate {
        &self.variant
    }

    /// Get the per-parameter ratio aggregate.
    #[must_use]
    pub const fn ratio(&self) -> &ExperimentAggregate {
        &self.ratio
    }

    /// Get the shared parameter sequence.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterValue] {
        &self.parameters
    }

    /// Get the parameter values dropped by intersection.
    #[must_use]
    pub fn dropped(&self) -> &[ParameterValue] {
        &self.dropped
    }
}

/// Combine a baseline, a variant and a ratio aggregate.
///
/// # Errors
///
/// - [`Error::SchemaMismatch`] if the baseline does not hold exactly one group
/// - [`Error::PartialAggregate`] if parameter sets differ under
///   [`MismatchPolicy::Fail`], or if they share no value at all
pub fn assemble_comparison(
    experiment: &str,
    baseline: ExperimentAggregate,
    variant: ExperimentAggregate,
    ratio: ExperimentAggregate,
    policy: MismatchPolicy,
) -> Result<ComparisonAggregate> {
    let [baseline] = <[GroupSummary; 1]>::try_from(baseline.groups().to_vec()).map_err(|groups| {
        Error::SchemaMismatch {
            experiment: experiment.to_string(),
            detail: format!("baseline must reduce to one group, found {}", groups.len()),
        }
    })?;

    let variant_params = variant.parameters();
    let ratio_params = ratio.parameters();

    let common: Vec<ParameterValue> = variant_params
        .iter()
        .copied()
        .filter(|p| ratio_params.contains(p))
        .collect();
    let mut dropped: Vec<ParameterValue> = variant_params
        .iter()
        .chain(ratio_params.iter())
        .copied()
        .filter(|p| !common.contains(p))
        .collect();
    dropped.sort();
    dropped.dedup();

    let partial = || Error::PartialAggregate {
        experiment: experiment.to_string(),
        missing: dropped.iter().map(|p| p.get()).collect(),
    };

    if common.is_empty() {
        return Err(partial());
    }
    if !dropped.is_empty() {
        match policy {
            MismatchPolicy::Fail => return Err(partial()),
            MismatchPolicy::Intersect => {
                tracing::warn!(
                    experiment,
                    dropped = ?dropped.iter().map(|p| p.get()).collect::<Vec<_>>(),
                    "parameter sets differ, keeping the intersection"
                );
            }
        }
    }

    Ok(ComparisonAggregate {
        experiment: experiment.to_string(),
        baseline,
        variant: variant.restricted_to(&common),
        ratio: ratio.restricted_to(&common),
        parameters: common,
        dropped,
    })
}

/// One line of a multi-series view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    key: ParameterValue,
    aggregate: ExperimentAggregate,
}

impl Series {
    /// Get the value that distinguishes this series (tolerance, seed, ...).
    #[must_use]
    pub const fn key(&self) -> ParameterValue {
        self.key
    }

    /// Get the series' aggregate.
    #[must_use]
    pub const fn aggregate(&self) -> &ExperimentAggregate {
        &self.aggregate
    }
}

/// Aggregates of one experiment, one per series key, in key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesAggregate {
    name: String,
    series_parameter: String,
    series: Vec<Series>,
}

impl SeriesAggregate {
    /// Get the view's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the field that distinguishes series.
    #[must_use]
    pub fn series_parameter(&self) -> &str {
        &self.series_parameter
    }

    /// Get the series in ascending key order.
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Find the series of one key.
    #[must_use]
    pub fn get(&self, key: ParameterValue) -> Option<&ExperimentAggregate> {
        self.series
            .iter()
            .find(|s| s.key == key)
            .map(|s| &s.aggregate)
    }
}

/// Collect per-key reductions into a multi-series view.
///
/// Keys whose reduction found no data are skipped.
///
/// # Errors
///
/// Propagates the first error other than [`Error::NoDataFound`], and returns
/// [`Error::NoDataFound`] if every key was empty.
pub fn assemble_series<I>(name: &str, series_parameter: &str, reductions: I) -> Result<SeriesAggregate>
where
    I: IntoIterator<Item = (ParameterValue, Result<ExperimentAggregate>)>,
{
    let mut series = Vec::new();
    for (key, reduction) in reductions {
        match reduction {
            Ok(aggregate) => series.push(Series { key, aggregate }),
            Err(e) if e.is_no_data() => {
                tracing::debug!(name, key = key.get(), "series has no data, skipped");
            }
            Err(e) => return Err(e),
        }
    }

    if series.is_empty() {
        return Err(Error::no_data(name));
    }
    series.sort_by_key(|s| s.key);
    Ok(SeriesAggregate {
        name: name.to_string(),
        series_parameter: series_parameter.to_string(),
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RunRecord;
    use crate::reducer::{reduce, ReductionSpec, SourcedRecord};

    fn per_epsilon(metric: &str, epsilons: &[f64]) -> ExperimentAggregate {
        let rows: Vec<_> = epsilons
            .iter()
            .map(|e| serde_json::json!({"epsilon": e, metric: 1.0}))
            .collect();
        let record = RunRecord::from_value(&serde_json::Value::Array(rows)).unwrap();
        reduce(
            metric,
            &[SourcedRecord::new("mem.json", None, record)],
            &ReductionSpec::new([metric]).by("epsilon"),
        )
        .unwrap()
    }

    fn baseline() -> ExperimentAggregate {
        let record = RunRecord::from_value(&serde_json::json!({"ppr": {"iterations": 7}})).unwrap();
        reduce(
            "ppr",
            &[SourcedRecord::new("mem.json", None, record)],
            &ReductionSpec::new(["iterations"]).object("ppr"),
        )
        .unwrap()
    }

    #[test]
    fn test_matching_sets_assemble() {
        let joint = assemble_comparison(
            "compare",
            baseline(),
            per_epsilon("pushOperations", &[0.01, 0.001]),
            per_epsilon("speedupFactorTotal", &[0.001, 0.01]),
            MismatchPolicy::Fail,
        )
        .unwrap();
        assert_eq!(joint.parameters().len(), 2);
        assert!(joint.dropped().is_empty());
        assert_eq!(joint.baseline().mean("iterations"), Some(7.0));
    }

    #[test]
    fn test_intersect_drops_unshared_values() {
        let joint = assemble_comparison(
            "compare",
            baseline(),
            per_epsilon("pushOperations", &[0.1, 0.01, 0.001]),
            per_epsilon("speedupFactorTotal", &[0.01, 0.001]),
            MismatchPolicy::Intersect,
        )
        .unwrap();
        assert_eq!(joint.variant().parameters(), joint.ratio().parameters());
        assert_eq!(joint.dropped(), &[ParameterValue::new(0.1)]);
    }

    #[test]
    fn test_fail_policy_surfaces_partial() {
        let err = assemble_comparison(
            "compare",
            baseline(),
            per_epsilon("pushOperations", &[0.1, 0.01]),
            per_epsilon("speedupFactorTotal", &[0.01]),
            MismatchPolicy::Fail,
        )
        .unwrap_err();
        assert!(matches!(err, Error::PartialAggregate { .. }));
    }

    #[test]
    fn test_series_skips_empty_keys() {
        let view = assemble_series(
            "seeds",
            "seed",
            [
                (ParameterValue::new(10.0), Err(Error::no_data("seed_10"))),
                (ParameterValue::new(0.0), Ok(per_epsilon("score", &[0.5]))),
            ],
        )
        .unwrap();
        assert_eq!(view.series().len(), 1);
        assert!(view.get(ParameterValue::new(0.0)).is_some());
    }
}
