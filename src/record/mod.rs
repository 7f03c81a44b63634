//! Record Loader - result documents as typed value trees
//!
//! ## Record Overview
//!
//! ```text
//! RunRecord ──┬── Rows(Vec<MetricRow>)            bare list of rows
//!             └── Document ──┬── scalars: MetricRow
//!                            ├── lists:   name -> Vec<MetricRow>
//!                            └── objects: name -> MetricRow
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use graphbench_stats::record::{load_record, RecordSchema};
//!
//! let record = load_record("results/push/compare_seed0_run1.json", RecordSchema::Comparison)?;
//! # Ok::<(), graphbench_stats::Error>(())
//! ```

mod metric_row;
mod parameter;
mod run_record;
mod schema;

pub use metric_row::MetricRow;
pub use parameter::{ParameterFormat, ParameterValue};
pub use run_record::{Document, FieldKind, RunRecord};
pub use schema::{RecordSchema, SchemaVersion};

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Load one result file.
///
/// The document is parsed, decoded into a [`RunRecord`] and normalized with
/// the family's [`RecordSchema`] in a single pass.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and
/// [`Error::MalformedRecord`] if its content is not a JSON object or array of
/// objects.
pub fn load_record<P: AsRef<Path>>(path: P, schema: RecordSchema) -> Result<RunRecord> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    let value: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| Error::MalformedRecord {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let record = RunRecord::from_value(&value).map_err(|reason| Error::MalformedRecord {
        path: path.to_path_buf(),
        reason,
    })?;

    tracing::debug!(path = %path.display(), ?schema, "loaded run record");
    Ok(schema.normalize(record))
}
