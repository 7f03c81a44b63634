//! Experiment keys - what the resolver is asked to find

use std::path::{Path, PathBuf};

use crate::record::{ParameterFormat, ParameterValue};

/// Identifies the result files of one experiment (and optionally one
/// parameter value or one graph size) under a results root.
///
/// File names are derived from the key:
///
/// - `<experiment>` is the base stem, e.g. `pr_convergence`
/// - a parameter appends `_<value>`, e.g. `community_threshold_0.01`
/// - a graph size on the flat layout appends `_<size>`, e.g. `pr_conv_1000`
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentKey {
    experiment: String,
    directory: PathBuf,
    parameter: Option<(ParameterValue, ParameterFormat)>,
    graph_size: Option<u64>,
    legacy: Vec<PathBuf>,
}

impl ExperimentKey {
    /// Create a key for `experiment` stored under `directory` (relative to
    /// the results root).
    #[must_use]
    pub fn new(experiment: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            experiment: experiment.into(),
            directory: directory.into(),
            parameter: None,
            graph_size: None,
            legacy: Vec::new(),
        }
    }

    /// Select one parameter value, spelled with `format` in file names.
    #[must_use]
    pub const fn with_parameter(mut self, value: ParameterValue, format: ParameterFormat) -> Self {
        self.parameter = Some((value, format));
        self
    }

    /// Select one graph size of a scalability experiment.
    #[must_use]
    pub const fn with_graph_size(mut self, size: u64) -> Self {
        self.graph_size = Some(size);
        self
    }

    /// Append a legacy location (relative to the results root), consulted in
    /// insertion order when nothing else matches.
    #[must_use]
    pub fn legacy_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.legacy.push(path.into());
        self
    }

    /// Get the base experiment stem.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Get the canonical directory, relative to the results root.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Get the selected parameter value.
    #[must_use]
    pub fn parameter(&self) -> Option<ParameterValue> {
        self.parameter.map(|(value, _)| value)
    }

    /// Parameter a file of this key implies for rows that do not state it:
    /// the selected parameter value, else the graph size.
    #[must_use]
    pub fn implied_parameter(&self) -> Option<ParameterValue> {
        self.parameter()
            .or_else(|| self.graph_size.map(ParameterValue::from))
    }

    /// Get the selected graph size.
    #[must_use]
    pub const fn graph_size(&self) -> Option<u64> {
        self.graph_size
    }

    /// Get the legacy locations in priority order.
    #[must_use]
    pub fn legacy(&self) -> &[PathBuf] {
        &self.legacy
    }

    /// Stem used inside a `size_<N>` directory (size not embedded).
    #[must_use]
    pub fn nested_stem(&self) -> String {
        match self.parameter {
            Some((value, format)) => format!("{}_{}", self.experiment, value.render(format)),
            None => self.experiment.clone(),
        }
    }

    /// Stem used in the experiment's own directory.
    #[must_use]
    pub fn flat_stem(&self) -> String {
        let stem = self.nested_stem();
        match self.graph_size {
            Some(size) => format!("{stem}_{size}"),
            None => stem,
        }
    }

    /// Human-readable name for logs and errors.
    #[must_use]
    pub fn name(&self) -> String {
        self.flat_stem()
    }
}
