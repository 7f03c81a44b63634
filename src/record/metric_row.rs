//! Metric Row - one observation inside a run record

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metric Row maps field names to numeric values.
///
/// Parameter fields (tolerance, epsilon, ...) and metric fields (iterations,
/// executionTimeMs, ...) live side by side; which is which is decided by the
/// reduction that consumes the row.
///
/// ## Flattening
///
/// Rows are decoded from JSON objects. Nested objects are flattened with
/// dotted names, so `{"comparison": {"l1Distance": 0.2}}` yields the field
/// `comparison.l1Distance`. Strings, booleans, nulls and arrays are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    fields: BTreeMap<String, f64>,
}

impl MetricRow {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, consuming and returning the row.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.fields.insert(name.into(), value);
    }

    /// Get a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    /// Check whether the row carries a field.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the row has no numeric field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Decode a JSON object into a row.
    #[must_use]
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut row = Self::new();
        row.absorb("", object);
        row
    }

    fn absorb(&mut self, prefix: &str, object: &Map<String, Value>) {
        for (key, value) in object {
            let name = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                Value::Number(number) => {
                    if let Some(v) = number.as_f64() {
                        self.fields.insert(name, v);
                    }
                }
                Value::Object(inner) => self.absorb(&name, inner),
                _ => {}
            }
        }
    }
}
