//! Reduction specifications

use serde::Serialize;

use crate::record::ParameterValue;

/// Where a record's rows come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RowSource {
    /// The record is a bare list of rows.
    Rows,
    /// A named list inside a document. A bare list is accepted as-is, since
    /// older producers wrote the list without its enclosing object.
    Nested(String),
    /// A named object inside a document, as a single row.
    Object(String),
    /// The document's own top-level scalars, as a single row.
    Document,
}

/// What to group by and what to reduce.
///
/// ```rust
/// use graphbench_stats::reducer::ReductionSpec;
///
/// let spec = ReductionSpec::new(["pushOperations", "comparison.l1Distance"])
///     .by("epsilon")
///     .nested("push");
/// assert_eq!(spec.parameter(), Some("epsilon"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReductionSpec {
    parameter: Option<String>,
    metrics: Vec<String>,
    rows: RowSource,
    rank_field: Option<String>,
    limit: Option<usize>,
    filter: Option<(String, ParameterValue)>,
}

impl ReductionSpec {
    /// Reduce `metrics` over bare row lists, all rows in one group.
    #[must_use]
    pub fn new<I, S>(metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parameter: None,
            metrics: metrics.into_iter().map(Into::into).collect(),
            rows: RowSource::Rows,
            rank_field: None,
            limit: None,
            filter: None,
        }
    }

    /// Group by a parameter field.
    #[must_use]
    pub fn by(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    /// Take rows from a named list inside each document.
    #[must_use]
    pub fn nested(mut self, field: impl Into<String>) -> Self {
        self.rows = RowSource::Nested(field.into());
        self
    }

    /// Take one row from a named object inside each document.
    #[must_use]
    pub fn object(mut self, field: impl Into<String>) -> Self {
        self.rows = RowSource::Object(field.into());
        self
    }

    /// Take one row from each document's top-level scalars.
    #[must_use]
    pub fn document(mut self) -> Self {
        self.rows = RowSource::Document;
        self
    }

    /// Record each row's zero-based position within its list under `field`.
    #[must_use]
    pub fn ranked(mut self, field: impl Into<String>) -> Self {
        self.rank_field = Some(field.into());
        self
    }

    /// Keep only the first `n` rows of each list.
    #[must_use]
    pub const fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Keep only rows whose `field` equals `value`.
    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: ParameterValue) -> Self {
        self.filter = Some((field.into(), value));
        self
    }

    /// Get the grouping parameter field.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// Get the reduced metric fields.
    #[must_use]
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    /// Get the row source.
    #[must_use]
    pub const fn rows(&self) -> &RowSource {
        &self.rows
    }

    /// Get the rank field, if positions are recorded.
    #[must_use]
    pub fn rank_field(&self) -> Option<&str> {
        self.rank_field.as_deref()
    }

    /// Get the per-list row limit.
    #[must_use]
    pub const fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Get the row filter.
    #[must_use]
    pub fn filter(&self) -> Option<(&str, ParameterValue)> {
        self.filter.as_ref().map(|(field, value)| (field.as_str(), *value))
    }
}
