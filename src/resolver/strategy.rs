//! Resolution strategies, tried in order until one yields files

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::ExperimentKey;
use crate::Result;

/// Layout convention that produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Layout {
    /// `size_<N>/` subdirectory of a scalability experiment
    NestedSize,
    /// Repeated runs: `<stem>_run*.json`
    MultiRun,
    /// One authoritative file: `<stem>.json`
    CanonicalFile,
    /// Older flat layout or previous working file names
    Legacy,
}

/// A strategy maps a results root and a key to an optional file set.
pub(crate) type Strategy = fn(&Path, &ExperimentKey) -> Result<Option<Vec<PathBuf>>>;

/// The resolution chain. First non-empty match wins; results are never merged.
pub(crate) const STRATEGIES: [(Layout, Strategy); 4] = [
    (Layout::NestedSize, nested_size),
    (Layout::MultiRun, multi_run),
    (Layout::CanonicalFile, canonical_file),
    (Layout::Legacy, legacy),
];

fn nested_size(root: &Path, key: &ExperimentKey) -> Result<Option<Vec<PathBuf>>> {
    let Some(size) = key.graph_size() else {
        return Ok(None);
    };
    let dir = root.join(key.directory()).join(format!("size_{size}"));
    if !dir.is_dir() {
        return Ok(None);
    }

    let stem = key.nested_stem();
    let runs = list_runs(&dir, &stem)?;
    if !runs.is_empty() {
        return Ok(Some(runs));
    }
    Ok(existing_file(dir.join(format!("{stem}.json"))))
}

fn multi_run(root: &Path, key: &ExperimentKey) -> Result<Option<Vec<PathBuf>>> {
    let runs = list_runs(&root.join(key.directory()), &key.flat_stem())?;
    Ok(if runs.is_empty() { None } else { Some(runs) })
}

fn canonical_file(root: &Path, key: &ExperimentKey) -> Result<Option<Vec<PathBuf>>> {
    Ok(existing_file(
        root.join(key.directory())
            .join(format!("{}.json", key.flat_stem())),
    ))
}

fn legacy(root: &Path, key: &ExperimentKey) -> Result<Option<Vec<PathBuf>>> {
    Ok(key
        .legacy()
        .iter()
        .map(|path| root.join(path))
        .find(|path| path.is_file())
        .map(|path| vec![path]))
}

fn existing_file(path: PathBuf) -> Option<Vec<PathBuf>> {
    path.is_file().then(|| vec![path])
}

/// List `<stem>_run*.json` files in `dir`, sorted by name.
///
/// A missing directory lists as empty.
pub(crate) fn list_runs(dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    let prefix = format!("{stem}_run");
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut runs = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(&prefix)
            && name.ends_with(".json")
            && entry.file_type()?.is_file()
        {
            runs.push(entry.path());
        }
    }
    runs.sort();
    Ok(runs)
}
