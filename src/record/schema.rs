//! Record Schema - per-family decoding and schema-version compatibility
//!
//! Comparison documents exist in two generations:
//!
//! ```text
//! Legacy:  speedup[].speedupFactor               ppr/push: executionTimeMs only
//! Split:   speedup[].speedupFactorTotal
//!          speedup[].speedupFactorAlgorithmOnly  ppr/push: preprocessingTimeMs
//!                                                          algorithmTimeMs
//! ```
//!
//! The generation is detected once per document and the matching table below
//! fills in the newer field names. Nothing else is ever defaulted: a field
//! absent under the Split schema stays absent and is excluded from its mean.

use serde::Serialize;

use super::{Document, MetricRow, RunRecord};

/// Decoding rules for one experiment family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordSchema {
    /// Rows are taken as written.
    Plain,
    /// PPR baseline + PUSH variants + speedup ratios.
    Comparison,
}

/// Generation of a comparison document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchemaVersion {
    /// Single `speedupFactor`, no preprocessing/algorithm split.
    Legacy,
    /// Total and algorithm-only speedups, split timings.
    Split,
}

impl SchemaVersion {
    /// Detect the generation of a comparison document.
    ///
    /// A document is `Legacy` only when some speedup entry carries
    /// `speedupFactor` and none carries `speedupFactorTotal`.
    #[must_use]
    pub fn detect(document: &Document) -> Self {
        let Some(speedups) = document.list(SPEEDUP) else {
            return Self::Split;
        };
        let has_total = speedups.iter().any(|row| row.contains("speedupFactorTotal"));
        let has_legacy = speedups.iter().any(|row| row.contains("speedupFactor"));
        if has_legacy && !has_total {
            Self::Legacy
        } else {
            Self::Split
        }
    }
}

const SPEEDUP: &str = "speedup";
const PPR: &str = "ppr";
const PUSH: &str = "push";

/// Where a compatibility rule applies inside a document.
#[derive(Debug, Clone, Copy)]
enum Section {
    List(&'static str),
    Object(&'static str),
}

/// How a missing field is filled.
#[derive(Debug, Clone, Copy)]
enum FieldRule {
    /// Copy the value of an older field name.
    Alias {
        field: &'static str,
        from: &'static str,
    },
    /// The older schema guarantees the quantity and its value.
    Default { field: &'static str, value: f64 },
}

const LEGACY_COMPARISON: &[(Section, FieldRule)] = &[
    (
        Section::List(SPEEDUP),
        FieldRule::Alias {
            field: "speedupFactorTotal",
            from: "speedupFactor",
        },
    ),
    (
        Section::List(SPEEDUP),
        FieldRule::Alias {
            field: "speedupFactorAlgorithmOnly",
            from: "speedupFactor",
        },
    ),
    (
        Section::Object(PPR),
        FieldRule::Alias {
            field: "algorithmTimeMs",
            from: "executionTimeMs",
        },
    ),
    (
        Section::Object(PPR),
        FieldRule::Default {
            field: "preprocessingTimeMs",
            value: 0.0,
        },
    ),
    (
        Section::List(PUSH),
        FieldRule::Alias {
            field: "algorithmTimeMs",
            from: "executionTimeMs",
        },
    ),
    (
        Section::List(PUSH),
        FieldRule::Default {
            field: "preprocessingTimeMs",
            value: 0.0,
        },
    ),
];

impl FieldRule {
    fn apply(self, row: &mut MetricRow) {
        match self {
            Self::Alias { field, from } => {
                if !row.contains(field) {
                    if let Some(value) = row.get(from) {
                        row.insert(field, value);
                    }
                }
            }
            Self::Default { field, value } => {
                if !row.contains(field) {
                    row.insert(field, value);
                }
            }
        }
    }
}

impl RecordSchema {
    /// Apply this schema's compatibility rules to a freshly decoded record.
    #[must_use]
    pub fn normalize(self, record: RunRecord) -> RunRecord {
        match (self, record) {
            (Self::Comparison, RunRecord::Document(mut document)) => {
                if SchemaVersion::detect(&document) == SchemaVersion::Legacy {
                    apply_table(&mut document, LEGACY_COMPARISON);
                }
                RunRecord::Document(document)
            }
            (_, record) => record,
        }
    }
}

fn apply_table(document: &mut Document, table: &[(Section, FieldRule)]) {
    for (section, rule) in table {
        match *section {
            Section::List(name) => {
                if let Some(rows) = document.list_mut(name) {
                    rows.iter_mut().for_each(|row| rule.apply(row));
                }
            }
            Section::Object(name) => {
                if let Some(row) = document.object_mut(name) {
                    rule.apply(row);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(value: &serde_json::Value) -> Document {
        match RunRecord::from_value(value).unwrap() {
            RunRecord::Document(document) => document,
            RunRecord::Rows(_) => panic!("expected a document"),
        }
    }

    fn normalized(value: &serde_json::Value) -> Document {
        match RecordSchema::Comparison.normalize(RunRecord::Document(document(value))) {
            RunRecord::Document(document) => document,
            RunRecord::Rows(_) => panic!("expected a document"),
        }
    }

    #[test]
    fn test_legacy_detection() {
        let legacy = serde_json::json!({"speedup": [{"epsilon": 0.01, "speedupFactor": 3.0}]});
        let split = serde_json::json!({"speedup": [{"epsilon": 0.01, "speedupFactorTotal": 3.0}]});
        assert_eq!(SchemaVersion::detect(&document(&legacy)), SchemaVersion::Legacy);
        assert_eq!(SchemaVersion::detect(&document(&split)), SchemaVersion::Split);
    }

    #[test]
    fn test_legacy_table_fills_new_names() {
        let doc = normalized(&serde_json::json!({
            "ppr": {"executionTimeMs": 10.0},
            "push": [{"epsilon": 0.01, "executionTimeMs": 2.0}],
            "speedup": [{"epsilon": 0.01, "speedupFactor": 5.0}]
        }));

        let ppr = doc.object("ppr").unwrap();
        assert_eq!(ppr.get("algorithmTimeMs"), Some(10.0));
        assert_eq!(ppr.get("preprocessingTimeMs"), Some(0.0));

        let speedup = &doc.list("speedup").unwrap()[0];
        assert_eq!(speedup.get("speedupFactorTotal"), Some(5.0));
        assert_eq!(speedup.get("speedupFactorAlgorithmOnly"), Some(5.0));
    }

    #[test]
    fn test_split_schema_never_defaults() {
        let doc = normalized(&serde_json::json!({
            "ppr": {"executionTimeMs": 10.0},
            "push": [{"epsilon": 0.01, "executionTimeMs": 2.0}],
            "speedup": [{"epsilon": 0.01, "speedupFactorTotal": 5.0}]
        }));

        assert!(doc.object("ppr").unwrap().get("preprocessingTimeMs").is_none());
        assert!(doc.list("push").unwrap()[0].get("algorithmTimeMs").is_none());
        assert!(doc.list("speedup").unwrap()[0]
            .get("speedupFactorAlgorithmOnly")
            .is_none());
    }

    #[test]
    fn test_plain_schema_is_identity() {
        let record = RunRecord::from_value(&serde_json::json!([{"tolerance": 0.1}])).unwrap();
        assert_eq!(RecordSchema::Plain.normalize(record.clone()), record);
    }
}
