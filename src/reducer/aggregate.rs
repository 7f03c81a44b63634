//! Reduced groups and experiment aggregates

use std::collections::BTreeMap;

use serde::Serialize;

use super::AggregateStat;
use crate::record::ParameterValue;

/// Summary of one parameter group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    parameter: Option<ParameterValue>,
    rows: usize,
    stats: BTreeMap<String, AggregateStat>,
}

impl GroupSummary {
    pub(crate) const fn new(
        parameter: Option<ParameterValue>,
        rows: usize,
        stats: BTreeMap<String, AggregateStat>,
    ) -> Self {
        Self {
            parameter,
            rows,
            stats,
        }
    }

    /// Get the parameter value, `None` for an ungrouped reduction.
    #[must_use]
    pub const fn parameter(&self) -> Option<ParameterValue> {
        self.parameter
    }

    /// Get the number of pooled rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Get the statistic of one metric, absent if no row carried it.
    #[must_use]
    pub fn stat(&self, metric: &str) -> Option<&AggregateStat> {
        self.stats.get(metric)
    }

    /// Get the mean of one metric.
    #[must_use]
    pub fn mean(&self, metric: &str) -> Option<f64> {
        self.stat(metric).map(AggregateStat::mean)
    }

    /// Iterate over the metric statistics in name order.
    pub fn stats(&self) -> impl Iterator<Item = (&str, &AggregateStat)> {
        self.stats.iter().map(|(name, stat)| (name.as_str(), stat))
    }
}

/// Parameter-ordered summaries of one experiment and metric family.
///
/// Groups are sorted ascending by parameter value and built fresh on every
/// reduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentAggregate {
    experiment: String,
    parameter: Option<String>,
    groups: Vec<GroupSummary>,
}

impl ExperimentAggregate {
    pub(crate) fn new(
        experiment: impl Into<String>,
        parameter: Option<String>,
        groups: Vec<GroupSummary>,
    ) -> Self {
        Self {
            experiment: experiment.into(),
            parameter,
            groups,
        }
    }

    /// Get the experiment name.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Get the grouping parameter field.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// Get the groups in ascending parameter order.
    #[must_use]
    pub fn groups(&self) -> &[GroupSummary] {
        &self.groups
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Parameter values in group order (ungrouped reductions have none).
    #[must_use]
    pub fn parameters(&self) -> Vec<ParameterValue> {
        self.groups.iter().filter_map(GroupSummary::parameter).collect()
    }

    /// Find the group of a parameter value.
    #[must_use]
    pub fn group(&self, value: ParameterValue) -> Option<&GroupSummary> {
        self.groups
            .binary_search_by(|g| g.parameter.cmp(&Some(value)))
            .ok()
            .map(|index| &self.groups[index])
    }

    /// One entry per group: the metric's statistic, if the group has it.
    #[must_use]
    pub fn series(&self, metric: &str) -> Vec<Option<AggregateStat>> {
        self.groups.iter().map(|g| g.stat(metric).copied()).collect()
    }

    /// Keep only the groups whose parameter is in `keep`.
    #[must_use]
    pub fn restricted_to(mut self, keep: &[ParameterValue]) -> Self {
        self.groups
            .retain(|g| g.parameter.is_some_and(|p| keep.contains(&p)));
        self
    }
}
