//! Aggregation configuration
//!
//! Defaults reproduce the layout written by the benchmark suite. Every field
//! can be overridden from JSON; omitted fields keep their defaults.
//!
//! ```rust
//! use graphbench_stats::config::AggregationConfig;
//!
//! let config = AggregationConfig::from_json_str(r#"{"parameters": {"community_top_n": 5}}"#)?;
//! assert_eq!(config.parameters.community_top_n, 5);
//! assert_eq!(config.parameters.community_seeds, vec![0, 10, 20, 30]);
//! # Ok::<(), graphbench_stats::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assembler::MismatchPolicy;
use crate::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Canonical directories, relative to the results root
    pub layout: ResultsLayout,
    /// Expected parameter values per family
    pub parameters: ParameterSets,
    /// Handling of mismatched comparison parameter sets
    pub mismatch_policy: MismatchPolicy,
}

impl AggregationConfig {
    /// Parse a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the JSON is invalid or fails validation.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| Error::Config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Config`]
    /// if its content is invalid.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check value sanity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let p = &self.parameters;
        if p.community_top_n == 0 {
            return Err(Error::Config("community_top_n must be at least 1".into()));
        }
        for (name, values) in [
            ("community_thresholds", &p.community_thresholds),
            ("damping_factors", &p.damping_factors),
            ("scalability_tolerances", &p.scalability_tolerances),
            ("scalability_epsilons", &p.scalability_epsilons),
        ] {
            if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(Error::Config(format!(
                    "{name} contains {bad}, expected finite non-negative values"
                )));
            }
        }
        Ok(())
    }
}

/// Canonical subdirectory of each experiment family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ResultsLayout {
    pub pagerank_convergence: PathBuf,
    pub pagerank_damping: PathBuf,
    pub ppr_convergence: PathBuf,
    pub ppr_community_threshold: PathBuf,
    pub ppr_community_seed: PathBuf,
    pub push: PathBuf,
    pub scalability: PathBuf,
}

impl Default for ResultsLayout {
    fn default() -> Self {
        Self {
            pagerank_convergence: "pagerank/convergence".into(),
            pagerank_damping: "pagerank/damping".into(),
            ppr_convergence: "ppr/convergence".into(),
            ppr_community_threshold: "ppr/community/threshold".into(),
            ppr_community_seed: "ppr/community/seed".into(),
            push: "push".into(),
            scalability: "scalability".into(),
        }
    }
}

/// Parameter values each family is expected to have been run with.
///
/// Pooling is keyed by the parsed numeric value, so these only select which
/// files are looked up and which series are reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSets {
    /// Community detection thresholds
    pub community_thresholds: Vec<f64>,
    /// PPR seed nodes for the community distribution
    pub community_seeds: Vec<u64>,
    /// Number of top-ranked community members reported per seed
    pub community_top_n: usize,
    /// PageRank damping factors
    pub damping_factors: Vec<f64>,
    /// Convergence tolerances reported in the scalability view
    pub scalability_tolerances: Vec<f64>,
    /// PUSH epsilons reported in the scalability view
    pub scalability_epsilons: Vec<f64>,
}

impl Default for ParameterSets {
    fn default() -> Self {
        Self {
            community_thresholds: vec![0.001, 0.005, 0.01, 0.02, 0.05, 0.1],
            community_seeds: vec![0, 10, 20, 30],
            community_top_n: 10,
            damping_factors: vec![0.10, 0.30, 0.50, 0.65, 0.75, 0.85, 0.90, 0.95, 1.0],
            scalability_tolerances: vec![1e-3, 1e-5, 1e-7],
            scalability_epsilons: vec![1e-2, 1e-3, 1e-4, 1e-5],
        }
    }
}
