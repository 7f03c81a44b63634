//! File Resolver - which result files back an experiment key
//!
//! Resolution is an ordered strategy chain:
//!
//! ```text
//! NestedSize ──> MultiRun ──> CanonicalFile ──> Legacy ──> (empty)
//! ```
//!
//! The first strategy that finds at least one file decides the selection.
//! In particular, once repeated-run files exist the single canonical file is
//! never consulted. An empty selection is not an error: it means "no data for
//! this key".

mod key;
mod strategy;

pub use key::ExperimentKey;
pub use strategy::Layout;

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::record::ParameterValue;
use crate::Result;
use strategy::STRATEGIES;

/// Resolved candidate files for one experiment key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSelection {
    experiment: String,
    parameter: Option<ParameterValue>,
    layout: Option<Layout>,
    paths: Vec<PathBuf>,
}

impl SourceSelection {
    /// Get the experiment name the selection was resolved for.
    #[must_use]
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Get the parameter value implied by the key, if any.
    #[must_use]
    pub const fn parameter(&self) -> Option<ParameterValue> {
        self.parameter
    }

    /// Get the layout convention that matched, `None` when empty.
    #[must_use]
    pub const fn layout(&self) -> Option<Layout> {
        self.layout
    }

    /// Get the files in read order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// True when no file matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Resolve the files backing `key` under `root`.
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if a directory exists but cannot be listed.
/// Missing directories and missing files yield an empty selection.
pub fn resolve(root: &Path, key: &ExperimentKey) -> Result<SourceSelection> {
    for (layout, strategy) in STRATEGIES {
        if let Some(paths) = strategy(root, key)? {
            if !paths.is_empty() {
                tracing::debug!(
                    experiment = %key.name(),
                    ?layout,
                    files = paths.len(),
                    "resolved sources"
                );
                return Ok(SourceSelection {
                    experiment: key.name(),
                    parameter: key.implied_parameter(),
                    layout: Some(layout),
                    paths,
                });
            }
        }
    }

    tracing::debug!(experiment = %key.name(), "no sources found");
    Ok(SourceSelection {
        experiment: key.name(),
        parameter: key.implied_parameter(),
        layout: None,
        paths: Vec::new(),
    })
}

/// Discover the graph sizes present in a scalability directory.
///
/// `size_<N>` subdirectories take precedence. Without them, sizes are read
/// from flat file names `<stem>_<N>.json` / `<stem>_<N>_run*.json` for each
/// of `stems`, plus the older `graph_<N>` naming.
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if the directory exists but cannot be listed.
pub fn discover_sizes(dir: &Path, stems: &[&str]) -> Result<Vec<u64>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries.collect::<io::Result<Vec<_>>>()?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut nested: BTreeSet<u64> = BTreeSet::new();
    let mut flat: BTreeSet<u64> = BTreeSet::new();
    for entry in &entries {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if entry.file_type()?.is_dir() {
            if let Some(size) = name.strip_prefix("size_").and_then(|s| s.parse().ok()) {
                nested.insert(size);
            }
        } else if let Some(size) = flat_size(name, stems) {
            flat.insert(size);
        }
    }

    let sizes = if nested.is_empty() { flat } else { nested };
    Ok(sizes.into_iter().collect())
}

fn flat_size(file_name: &str, stems: &[&str]) -> Option<u64> {
    let stem = file_name.strip_suffix(".json")?;
    stems.iter().copied().chain(["graph"]).find_map(|prefix| {
        let rest = stem.strip_prefix(prefix)?.strip_prefix('_')?;
        let (digits, tail) = rest.split_once('_').unwrap_or((rest, ""));
        if tail.is_empty() || tail.starts_with("run") {
            digits.parse().ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_size_parsing() {
        let stems = ["pr_conv", "compare"];
        assert_eq!(flat_size("pr_conv_1000.json", &stems), Some(1000));
        assert_eq!(flat_size("compare_500_run3.json", &stems), Some(500));
        assert_eq!(flat_size("graph_42_run1.json", &stems), Some(42));
        assert_eq!(flat_size("pr_conv_1000.txt", &stems), None);
        assert_eq!(flat_size("pr_conv_big.json", &stems), None);
        assert_eq!(flat_size("pr_conv_10_extra.json", &stems), None);
    }

    #[test]
    fn test_empty_selection_for_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let key = ExperimentKey::new("pr_convergence", "pagerank/convergence");
        let selection = resolve(&dir.path().join("missing"), &key).unwrap();
        assert!(selection.is_empty());
        assert!(selection.layout().is_none());
    }
}
