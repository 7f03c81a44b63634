//! Run Record - one loaded result document

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use super::MetricRow;

/// Run Record is the decoded content of one result file.
///
/// Benchmark producers write either a bare list of rows (convergence sweeps,
/// damping sweeps) or a single object with named sections (comparison runs,
/// community runs). Both shapes are decoded once, at load time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RunRecord {
    /// Top-level array of row objects.
    Rows(Vec<MetricRow>),
    /// Top-level object.
    Document(Document),
}

impl RunRecord {
    /// Decode a parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns a description of the offending shape if the value is neither
    /// an object nor an array of objects.
    pub fn from_value(value: &Value) -> std::result::Result<Self, String> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    item.as_object().map(MetricRow::from_json_object).ok_or_else(|| {
                        format!("element {index} of the top-level array is not an object")
                    })
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Self::Rows),
            Value::Object(object) => Ok(Self::Document(Document::from_json_object(object))),
            other => Err(format!(
                "expected an object or an array at top level, found {}",
                json_type_name(other)
            )),
        }
    }

    /// Number of rows a bare list holds, or `None` for documents.
    #[must_use]
    pub fn row_count(&self) -> Option<usize> {
        match self {
            Self::Rows(rows) => Some(rows.len()),
            Self::Document(_) => None,
        }
    }
}

/// Shape of a top-level document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    /// Numeric scalar
    Number,
    /// Array whose elements are all objects
    Rows,
    /// Nested object
    Object,
    /// Anything else (string, bool, null, array of non-objects)
    Other,
}

/// Structured result document with named sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    scalars: MetricRow,
    lists: BTreeMap<String, Vec<MetricRow>>,
    objects: BTreeMap<String, MetricRow>,
    kinds: BTreeMap<String, FieldKind>,
}

impl Document {
    /// Decode a JSON object.
    #[must_use]
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut document = Self::default();
        for (key, value) in object {
            let kind = match value {
                Value::Number(number) => {
                    if let Some(v) = number.as_f64() {
                        document.scalars.insert(key.clone(), v);
                    }
                    FieldKind::Number
                }
                Value::Object(inner) => {
                    document
                        .objects
                        .insert(key.clone(), MetricRow::from_json_object(inner));
                    FieldKind::Object
                }
                Value::Array(items) => {
                    let rows: Option<Vec<MetricRow>> = items
                        .iter()
                        .map(|item| item.as_object().map(MetricRow::from_json_object))
                        .collect();
                    match rows {
                        Some(rows) => {
                            document.lists.insert(key.clone(), rows);
                            FieldKind::Rows
                        }
                        None => FieldKind::Other,
                    }
                }
                _ => FieldKind::Other,
            };
            document.kinds.insert(key.clone(), kind);
        }
        document
    }

    /// Top-level numeric fields as one row.
    #[must_use]
    pub const fn scalars(&self) -> &MetricRow {
        &self.scalars
    }

    /// Get a nested list of rows.
    #[must_use]
    pub fn list(&self, field: &str) -> Option<&[MetricRow]> {
        self.lists.get(field).map(Vec::as_slice)
    }

    /// Get a nested list of rows for in-place rewriting.
    pub fn list_mut(&mut self, field: &str) -> Option<&mut Vec<MetricRow>> {
        self.lists.get_mut(field)
    }

    /// Get a nested object, flattened into a row.
    #[must_use]
    pub fn object(&self, field: &str) -> Option<&MetricRow> {
        self.objects.get(field)
    }

    /// Get a nested object for in-place rewriting.
    pub fn object_mut(&mut self, field: &str) -> Option<&mut MetricRow> {
        self.objects.get_mut(field)
    }

    /// Shape of a top-level field, if present.
    #[must_use]
    pub fn kind(&self, field: &str) -> Option<FieldKind> {
        self.kinds.get(field).copied()
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_list_decodes_to_rows() {
        let value = serde_json::json!([
            {"tolerance": 1e-3, "iterations": 12},
            {"tolerance": 1e-5, "iterations": 30}
        ]);
        let record = RunRecord::from_value(&value).unwrap();
        assert_eq!(record.row_count(), Some(2));
    }

    #[test]
    fn test_document_sections() {
        let value = serde_json::json!({
            "communitySize": 42,
            "ppr": {"iterations": 8, "executionTimeMs": 3.5},
            "push": [{"epsilon": 0.01, "pushOperations": 5}],
            "seed": "zero"
        });
        let RunRecord::Document(document) = RunRecord::from_value(&value).unwrap() else {
            panic!("expected a document");
        };

        assert_eq!(document.scalars().get("communitySize"), Some(42.0));
        assert_eq!(document.object("ppr").unwrap().get("iterations"), Some(8.0));
        assert_eq!(document.list("push").unwrap().len(), 1);
        assert_eq!(document.kind("seed"), Some(FieldKind::Other));
        assert_eq!(document.kind("push"), Some(FieldKind::Rows));
    }

    #[test]
    fn test_array_of_numbers_is_not_rows() {
        let value = serde_json::json!({"push": [1, 2, 3]});
        let RunRecord::Document(document) = RunRecord::from_value(&value).unwrap() else {
            panic!("expected a document");
        };
        assert!(document.list("push").is_none());
        assert_eq!(document.kind("push"), Some(FieldKind::Other));
    }

    #[test]
    fn test_scalar_top_level_rejected() {
        let err = RunRecord::from_value(&serde_json::json!(3)).unwrap_err();
        assert!(err.contains("a number"));
    }
}
