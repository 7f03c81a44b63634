//! Experiment families and their reductions

use serde::Serialize;

use super::{optional, Aggregator};
use crate::assembler::{assemble_comparison, assemble_series, ComparisonAggregate, SeriesAggregate};
use crate::record::{ParameterFormat, ParameterValue, RecordSchema};
use crate::reducer::{reduce, ExperimentAggregate, ReductionSpec, SourcedRecord};
use crate::resolver::{discover_sizes, ExperimentKey};
use crate::{Error, Result};

const CONVERGENCE_METRICS: [&str; 2] = ["iterations", "executionTimeMs"];

const PPR_METRICS: [&str; 5] = [
    "iterations",
    "executionTimeMs",
    "preprocessingTimeMs",
    "algorithmTimeMs",
    "communitySize",
];

const PUSH_METRICS: [&str; 9] = [
    "pushOperations",
    "nodesProcessed",
    "executionTimeMs",
    "preprocessingTimeMs",
    "algorithmTimeMs",
    "communitySize",
    "comparison.l1Distance",
    "comparison.l2Distance",
    "comparison.correlation",
];

const SPEEDUP_METRICS: [&str; 2] = ["speedupFactorTotal", "speedupFactorAlgorithmOnly"];

/// Stems written by the scalability runner, one per algorithm.
const SCALABILITY_STEMS: [&str; 3] = ["pr_conv", "ppr_conv", "compare"];

/// Aggregate of one family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum FamilyAggregate {
    /// Convergence sweeps
    Convergence(ConvergenceAggregate),
    /// Community size and score distribution
    Communities(CommunityAggregate),
    /// PUSH against PPR
    PushVsPpr(ComparisonAggregate),
    /// Iterations per damping factor
    Damping(ExperimentAggregate),
    /// Per graph size series
    Scalability(ScalabilityAggregate),
}

/// Iterations and execution time per tolerance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceAggregate {
    /// PageRank
    pub pagerank: Option<ExperimentAggregate>,
    /// PPR from seed 0
    pub ppr_seed0: Option<ExperimentAggregate>,
    /// PPR from several seeds
    pub ppr_multi: Option<ExperimentAggregate>,
}

/// Community views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityAggregate {
    /// `communitySize` per threshold
    pub thresholds: Option<ExperimentAggregate>,
    /// `score` per rank, one series per seed
    pub seeds: Option<SeriesAggregate>,
}

/// Per graph size series, keyed by tolerance or epsilon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalabilityAggregate {
    /// Graph sizes found
    pub sizes: Vec<u64>,
    /// PageRank, one series per tolerance
    pub pagerank: Option<SeriesAggregate>,
    /// PPR, one series per tolerance
    pub ppr: Option<SeriesAggregate>,
    /// PUSH, one series per epsilon
    pub push: Option<SeriesAggregate>,
    /// Speedup, one series per epsilon
    pub speedup: Option<SeriesAggregate>,
}

impl Aggregator {
    /// PageRank and PPR convergence.
    ///
    /// # Errors
    ///
    /// [`Error::NoDataFound`] when none of the three sweeps has data.
    pub fn convergence(&self) -> Result<ConvergenceAggregate> {
        let layout = &self.config.layout;
        let spec = ReductionSpec::new(CONVERGENCE_METRICS).by("tolerance");

        let pagerank = ExperimentKey::new("pr_convergence", &layout.pagerank_convergence)
            .legacy_path("pr_convergence.json")
            .legacy_path("test_pr_conv.json");
        let ppr_seed0 = ExperimentKey::new("ppr_convergence_seed0", &layout.ppr_convergence)
            .legacy_path("ppr_convergence_seed0.json")
            .legacy_path("test_ppr_conv.json");
        let ppr_multi = ExperimentKey::new("ppr_convergence_multi", &layout.ppr_convergence)
            .legacy_path("ppr_convergence_multi.json");

        let aggregate = ConvergenceAggregate {
            pagerank: optional(self.reduce_key(&pagerank, &spec))?,
            ppr_seed0: optional(self.reduce_key(&ppr_seed0, &spec))?,
            ppr_multi: optional(self.reduce_key(&ppr_multi, &spec))?,
        };

        if aggregate.pagerank.is_none() && aggregate.ppr_seed0.is_none() && aggregate.ppr_multi.is_none() {
            return Err(Error::no_data("convergence"));
        }
        Ok(aggregate)
    }

    /// Community size per threshold and top-ranked scores per seed.
    ///
    /// # Errors
    ///
    /// [`Error::NoDataFound`] when neither view has data.
    pub fn communities(&self) -> Result<CommunityAggregate> {
        let layout = &self.config.layout;
        let params = &self.config.parameters;

        let keys: Vec<ExperimentKey> = params
            .community_thresholds
            .iter()
            .map(|&t| {
                ExperimentKey::new("community_threshold", &layout.ppr_community_threshold)
                    .with_parameter(ParameterValue::new(t), ParameterFormat::Plain)
            })
            .collect();
        let records = self.load_pooled(&keys, RecordSchema::Plain)?;
        let thresholds = optional(reduce(
            "community_threshold",
            &records,
            &ReductionSpec::new(["communitySize"]).by("threshold").document(),
        ))?;

        let spec = ReductionSpec::new(["score"])
            .by("rank")
            .nested("community")
            .ranked("rank")
            .limit(params.community_top_n);
        let per_seed = params.community_seeds.iter().map(|&seed| {
            let mut key = ExperimentKey::new("community_seed", &layout.ppr_community_seed)
                .with_parameter(ParameterValue::from(seed), ParameterFormat::Integer);
            if seed == 0 {
                key = key.legacy_path("test_community.json");
            }
            (ParameterValue::from(seed), self.reduce_key(&key, &spec))
        });
        let seeds = optional(assemble_series("community_seed", "seed", per_seed))?;

        if thresholds.is_none() && seeds.is_none() {
            return Err(Error::no_data("communities"));
        }
        Ok(CommunityAggregate { thresholds, seeds })
    }

    /// PUSH against PPR from seed 0, per epsilon.
    ///
    /// # Errors
    ///
    /// [`Error::NoDataFound`] without comparison files,
    /// [`Error::SchemaMismatch`] when the files lack one of the `ppr`,
    /// `push` or `speedup` sections, otherwise whatever
    /// [`assemble_comparison`] reports.
    pub fn push_vs_ppr(&self) -> Result<ComparisonAggregate> {
        let key = ExperimentKey::new("compare_seed0", &self.config.layout.push)
            .legacy_path("push_vs_ppr_seed0.json")
            .legacy_path("test_compare.json");
        let records = self.load_sources(&key, RecordSchema::Comparison)?;

        let section = |name: &str, spec: ReductionSpec| {
            reduce(name, &records, &spec).map_err(|e| required_section("push_vs_ppr", name, e))
        };
        let baseline = section("ppr", ReductionSpec::new(PPR_METRICS).object("ppr"))?;
        let variant = section("push", ReductionSpec::new(PUSH_METRICS).by("epsilon").nested("push"))?;
        let ratio = section(
            "speedup",
            ReductionSpec::new(SPEEDUP_METRICS).by("epsilon").nested("speedup"),
        )?;

        assemble_comparison(
            "push_vs_ppr",
            baseline,
            variant,
            ratio,
            self.config.mismatch_policy,
        )
    }

    /// PageRank iterations per damping factor.
    ///
    /// # Errors
    ///
    /// [`Error::NoDataFound`] when no damping file exists.
    pub fn damping(&self) -> Result<ExperimentAggregate> {
        let keys: Vec<ExperimentKey> = self
            .config
            .parameters
            .damping_factors
            .iter()
            .map(|&d| {
                ExperimentKey::new("pr_damping", &self.config.layout.pagerank_damping)
                    .with_parameter(ParameterValue::new(d), ParameterFormat::Underscored)
            })
            .collect();
        let records = self.load_pooled(&keys, RecordSchema::Plain)?;
        reduce("pr_damping", &records, &ReductionSpec::new(["iterations"]).by("damping"))
    }

    /// Series over graph size for every expected tolerance and epsilon.
    ///
    /// # Errors
    ///
    /// [`Error::NoDataFound`] when no graph size is found or none of the
    /// series has data.
    pub fn scalability(&self) -> Result<ScalabilityAggregate> {
        let dir = self.root.join(&self.config.layout.scalability);
        let sizes = discover_sizes(&dir, &SCALABILITY_STEMS)?;
        if sizes.is_empty() {
            return Err(Error::no_data("scalability"));
        }
        tracing::debug!(?sizes, "graph sizes discovered");

        let load = |stem: &str, schema: RecordSchema| {
            let keys: Vec<ExperimentKey> = sizes
                .iter()
                .map(|&n| ExperimentKey::new(stem, &self.config.layout.scalability).with_graph_size(n))
                .collect();
            self.load_pooled(&keys, schema)
        };
        let pagerank = load("pr_conv", RecordSchema::Plain)?;
        let ppr = load("ppr_conv", RecordSchema::Plain)?;
        let compare = load("compare", RecordSchema::Comparison)?;

        let params = &self.config.parameters;
        let aggregate = ScalabilityAggregate {
            pagerank: optional(size_series(
                "scalability_pr",
                "tolerance",
                &params.scalability_tolerances,
                &pagerank,
                &ReductionSpec::new(CONVERGENCE_METRICS).nested("results"),
            ))?,
            ppr: optional(size_series(
                "scalability_ppr",
                "tolerance",
                &params.scalability_tolerances,
                &ppr,
                &ReductionSpec::new(CONVERGENCE_METRICS).nested("results"),
            ))?,
            push: optional(size_series(
                "scalability_push",
                "epsilon",
                &params.scalability_epsilons,
                &compare,
                &ReductionSpec::new(["pushOperations", "executionTimeMs", "comparison.l1Distance"])
                    .nested("push"),
            ))?,
            speedup: optional(size_series(
                "scalability_speedup",
                "epsilon",
                &params.scalability_epsilons,
                &compare,
                &ReductionSpec::new(["speedupFactorTotal"]).nested("speedup"),
            ))?,
            sizes,
        };

        if aggregate.pagerank.is_none()
            && aggregate.ppr.is_none()
            && aggregate.push.is_none()
            && aggregate.speedup.is_none()
        {
            return Err(Error::no_data("scalability"));
        }
        Ok(aggregate)
    }
}

/// Files were found, so an empty section is a shape error, not missing data.
fn required_section(experiment: &str, section: &str, err: Error) -> Error {
    if err.is_no_data() {
        Error::SchemaMismatch {
            experiment: experiment.to_string(),
            detail: format!("no usable '{section}' section in the resolved files"),
        }
    } else {
        err
    }
}

/// One series per expected `series_field` value, each grouped by the graph
/// size its file was resolved for.
fn size_series(
    name: &str,
    series_field: &str,
    expected: &[f64],
    records: &[SourcedRecord],
    spec: &ReductionSpec,
) -> Result<SeriesAggregate> {
    let per_value = expected.iter().map(|&v| {
        let value = ParameterValue::new(v);
        let spec = spec.clone().by("graphSize").where_eq(series_field, value);
        (value, reduce(name, records, &spec))
    });
    assemble_series(name, series_field, per_value)
}
