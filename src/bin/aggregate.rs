//! Aggregate a benchmark results directory and print a summary.
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use graphbench_stats::{AggregationConfig, Aggregator};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "graphbench-aggregate",
    about = "Per-parameter statistics over PageRank / PPR / PUSH benchmark results",
    after_help = "Families without result files are reported as skipped; the run continues."
)]
struct Cli {
    #[arg(value_name = "RESULTS_DIR", help = "Results directory written by the benchmark suite")]
    results_dir: PathBuf,
    #[arg(long, value_name = "PATH", help = "Optional JSON configuration overriding layout and parameters")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if !cli.results_dir.is_dir() {
        bail!("results directory {} does not exist", cli.results_dir.display());
    }

    let config = match &cli.config {
        Some(path) => AggregationConfig::from_json_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => AggregationConfig::default(),
    };

    let aggregator = Aggregator::builder()
        .results_root(cli.results_dir)
        .config(config)
        .build()?;
    let report = aggregator.aggregate_all();

    print!("{report}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_root_and_config() {
        let cli = Cli::try_parse_from(["graphbench-aggregate", "results", "--config", "agg.json"]).unwrap();
        assert_eq!(cli.results_dir, PathBuf::from("results"));
        assert_eq!(cli.config, Some(PathBuf::from("agg.json")));
    }

    #[test]
    fn test_cli_requires_root() {
        assert!(Cli::try_parse_from(["graphbench-aggregate"]).is_err());
    }
}
