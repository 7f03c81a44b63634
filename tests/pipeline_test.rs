//! End-to-end aggregation over fixture result directories

use std::fs;
use std::path::Path;

use graphbench_stats::pipeline::{Aggregator, FamilyAggregate, Unit, UnitStatus};
use graphbench_stats::record::{load_record, RecordSchema};
use graphbench_stats::reducer::{reduce, SourcedRecord};
use graphbench_stats::{Error, MismatchPolicy, ParameterValue, ReductionSpec};

fn write(root: &Path, relative: &str, content: &serde_json::Value) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content.to_string()).unwrap();
}

fn aggregator(root: &Path) -> Aggregator {
    Aggregator::builder().results_root(root).build().unwrap()
}

#[test]
fn test_runs_are_pooled_not_averaged() {
    let dir = tempfile::tempdir().unwrap();
    for (run, iterations) in [(1, 10), (2, 20), (3, 30)] {
        write(
            dir.path(),
            &format!("pagerank/convergence/pr_convergence_run{run}.json"),
            &serde_json::json!([{"tolerance": 1e-5, "iterations": iterations}]),
        );
    }

    let convergence = aggregator(dir.path()).convergence().unwrap();
    let pagerank = convergence.pagerank.unwrap();
    assert_eq!(pagerank.len(), 1);

    let group = pagerank.group(ParameterValue::new(1e-5)).unwrap();
    let stat = group.stat("iterations").unwrap();
    assert!((stat.mean() - 20.0).abs() < 1e-12);
    assert!((stat.std_dev() - 8.164_965_809).abs() < 1e-6);
    assert_eq!(stat.count(), 3);
    assert!(convergence.ppr_seed0.is_none());
}

#[test]
fn test_push_list_is_flattened_per_epsilon() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "push/compare_seed0.json",
        &serde_json::json!({
            "ppr": {"iterations": 40, "executionTimeMs": 12.0},
            "push": [
                {"epsilon": 0.01, "pushOperations": 5},
                {"epsilon": 0.001, "pushOperations": 50}
            ],
            "speedup": [
                {"epsilon": 0.01, "speedupFactorTotal": 3.0},
                {"epsilon": 0.001, "speedupFactorTotal": 1.5}
            ]
        }),
    );

    let comparison = aggregator(dir.path()).push_vs_ppr().unwrap();
    let push = comparison.variant();
    assert_eq!(
        push.parameters(),
        vec![ParameterValue::new(0.001), ParameterValue::new(0.01)]
    );
    for group in push.groups() {
        assert_eq!(group.stat("pushOperations").unwrap().count(), 1);
    }
    assert_eq!(push.groups()[0].mean("pushOperations"), Some(50.0));
    assert_eq!(comparison.baseline().mean("iterations"), Some(40.0));
    assert!(comparison.dropped().is_empty());
}

#[test]
fn test_missing_metric_is_excluded_not_zeroed() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "push/compare_seed0.json",
        &serde_json::json!({
            "ppr": {"iterations": 40},
            "push": [
                {"epsilon": 1e-3, "pushOperations": 7, "preprocessingTimeMs": 2},
                {"epsilon": 1e-3, "pushOperations": 8},
                {"epsilon": 1e-3, "pushOperations": 9, "preprocessingTimeMs": 4}
            ],
            "speedup": [{"epsilon": 1e-3, "speedupFactorTotal": 2.0}]
        }),
    );

    let comparison = aggregator(dir.path()).push_vs_ppr().unwrap();
    let group = comparison.variant().group(ParameterValue::new(1e-3)).unwrap();
    let stat = group.stat("preprocessingTimeMs").unwrap();
    assert!((stat.mean() - 3.0).abs() < 1e-12);
    assert_eq!(stat.count(), 2);
    assert_eq!(group.stat("pushOperations").unwrap().count(), 3);
}

#[test]
fn test_legacy_comparison_documents_gain_split_fields() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "push_vs_ppr_seed0.json",
        &serde_json::json!({
            "ppr": {"iterations": 40, "executionTimeMs": 10.0},
            "push": [{"epsilon": 0.01, "pushOperations": 5, "executionTimeMs": 2.0}],
            "speedup": [{"epsilon": 0.01, "speedupFactor": 5.0}]
        }),
    );

    let comparison = aggregator(dir.path()).push_vs_ppr().unwrap();
    assert_eq!(comparison.baseline().mean("algorithmTimeMs"), Some(10.0));
    assert_eq!(comparison.baseline().mean("preprocessingTimeMs"), Some(0.0));

    let speedup = comparison.ratio().group(ParameterValue::new(0.01)).unwrap();
    assert_eq!(speedup.mean("speedupFactorTotal"), Some(5.0));
    assert_eq!(speedup.mean("speedupFactorAlgorithmOnly"), Some(5.0));
}

#[test]
fn test_mismatched_epsilons_follow_policy() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "push/compare_seed0.json",
        &serde_json::json!({
            "ppr": {"iterations": 40},
            "push": [
                {"epsilon": 0.1, "pushOperations": 1},
                {"epsilon": 0.01, "pushOperations": 5}
            ],
            "speedup": [{"epsilon": 0.01, "speedupFactorTotal": 3.0}]
        }),
    );

    let joint = aggregator(dir.path()).push_vs_ppr().unwrap();
    assert_eq!(joint.parameters(), &[ParameterValue::new(0.01)]);
    assert_eq!(joint.dropped(), &[ParameterValue::new(0.1)]);

    let strict = Aggregator::builder()
        .results_root(dir.path())
        .mismatch_policy(MismatchPolicy::Fail)
        .build()
        .unwrap();
    let err = strict.push_vs_ppr().unwrap_err();
    assert!(matches!(err, Error::PartialAggregate { .. }));
}

#[test]
fn test_empty_family_is_skipped_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "pagerank/damping/pr_damping_0_85_run1.json",
        &serde_json::json!([{"iterations": 50}, {"iterations": 52}]),
    );
    write(
        dir.path(),
        "pagerank/damping/pr_damping_0_5.json",
        &serde_json::json!([{"damping": 0.5, "iterations": 12}]),
    );

    let report = aggregator(dir.path()).aggregate_all();
    assert_eq!(report.outcome(Unit::Convergence).unwrap().status(), UnitStatus::Skipped);
    assert_eq!(report.outcome(Unit::PushVsPpr).unwrap().status(), UnitStatus::Skipped);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 0);

    let Some(FamilyAggregate::Damping(damping)) = report.aggregate(Unit::Damping) else {
        panic!("damping should have succeeded");
    };
    assert_eq!(
        damping.parameters(),
        vec![ParameterValue::new(0.5), ParameterValue::new(0.85)]
    );
    assert_eq!(damping.groups()[1].mean("iterations"), Some(51.0));
}

#[test]
fn test_malformed_record_fails_only_its_family() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("push")).unwrap();
    fs::write(dir.path().join("push/compare_seed0_run1.json"), "{\"ppr\": ").unwrap();
    write(
        dir.path(),
        "ppr/convergence/ppr_convergence_seed0.json",
        &serde_json::json!([{"tolerance": 1e-3, "iterations": 8, "executionTimeMs": 1.5}]),
    );

    let report = aggregator(dir.path()).aggregate_all();
    let push = report.outcome(Unit::PushVsPpr).unwrap();
    assert_eq!(push.status(), UnitStatus::Failed);
    assert!(push.reason().unwrap().contains("malformed record"));
    assert_eq!(report.outcome(Unit::Convergence).unwrap().status(), UnitStatus::Succeeded);
}

#[test]
fn test_wrong_nested_shape_is_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "push/compare_seed0.json",
        &serde_json::json!({"ppr": {"iterations": 1}, "push": {"epsilon": 0.01}}),
    );

    let err = aggregator(dir.path()).push_vs_ppr().unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }));
}

#[test]
fn test_communities_threshold_and_seed_views() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "ppr/community/threshold/community_threshold_0.01_run1.json",
        &serde_json::json!({"communitySize": 10}),
    );
    write(
        dir.path(),
        "ppr/community/threshold/community_threshold_0.01_run2.json",
        &serde_json::json!({"communitySize": 14}),
    );
    write(
        dir.path(),
        "ppr/community/seed/community_seed_10.json",
        &serde_json::json!({"community": [
            {"node": 10, "score": 0.4},
            {"node": 3, "score": 0.2}
        ]}),
    );
    write(
        dir.path(),
        "test_community.json",
        &serde_json::json!({"community": [{"node": 0, "score": 0.9}]}),
    );

    let communities = aggregator(dir.path()).communities().unwrap();
    let thresholds = communities.thresholds.unwrap();
    assert_eq!(thresholds.parameters(), vec![ParameterValue::new(0.01)]);
    assert_eq!(thresholds.groups()[0].mean("communitySize"), Some(12.0));

    let seeds = communities.seeds.unwrap();
    assert_eq!(seeds.series().len(), 2);
    let seed10 = seeds.get(ParameterValue::from(10u64)).unwrap();
    assert_eq!(seed10.len(), 2);
    assert_eq!(seed10.groups()[1].mean("score"), Some(0.2));
    assert_eq!(
        seeds.get(ParameterValue::from(0u64)).unwrap().groups()[0].mean("score"),
        Some(0.9)
    );
}

#[test]
fn test_scalability_series_by_graph_size() {
    let dir = tempfile::tempdir().unwrap();
    for (size, iterations) in [(100u64, 5), (1000, 9)] {
        write(
            dir.path(),
            &format!("scalability/size_{size}/pr_conv.json"),
            &serde_json::json!({"results": [
                {"tolerance": 1e-3, "iterations": iterations},
                {"tolerance": 1e-5, "iterations": iterations * 2}
            ]}),
        );
    }

    let scalability = aggregator(dir.path()).scalability().unwrap();
    assert_eq!(scalability.sizes, vec![100, 1000]);
    assert!(scalability.push.is_none());

    let pagerank = scalability.pagerank.unwrap();
    let tight = pagerank.get(ParameterValue::new(1e-5)).unwrap();
    assert_eq!(
        tight.parameters(),
        vec![ParameterValue::from(100u64), ParameterValue::from(1000u64)]
    );
    assert_eq!(tight.groups()[1].mean("iterations"), Some(18.0));
    assert!(pagerank.get(ParameterValue::new(1e-7)).is_none());
}

#[test]
fn test_missing_metric_in_row_list_is_excluded() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "pagerank/convergence/pr_convergence_run1.json",
        &serde_json::json!([
            {"tolerance": 1e-3, "iterations": 10, "preprocessingTimeMs": 2},
            {"tolerance": 1e-3, "iterations": 12}
        ]),
    );
    write(
        dir.path(),
        "pagerank/convergence/pr_convergence_run2.json",
        &serde_json::json!([{"tolerance": 1e-3, "iterations": 14, "preprocessingTimeMs": 4}]),
    );

    let aggregator = aggregator(dir.path());
    let spec = ReductionSpec::new(["iterations", "preprocessingTimeMs"]).by("tolerance");
    let records: Vec<_> = ["pr_convergence_run1.json", "pr_convergence_run2.json"]
        .iter()
        .map(|name| {
            let path = aggregator.root().join("pagerank/convergence").join(name);
            let record = load_record(&path, RecordSchema::Plain).unwrap();
            SourcedRecord::new(path, None, record)
        })
        .collect();

    let aggregate = reduce("pr_convergence", &records, &spec).unwrap();
    let group = aggregate.group(ParameterValue::new(1e-3)).unwrap();
    let stat = group.stat("preprocessingTimeMs").unwrap();
    assert!((stat.mean() - 3.0).abs() < 1e-12);
    assert_eq!(stat.count(), 2);
    assert_eq!(group.stat("iterations").unwrap().count(), 3);
}

#[test]
fn test_comparison_without_baseline_fails_loudly() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "push/compare_seed0.json",
        &serde_json::json!({
            "push": [{"epsilon": 0.01, "pushOperations": 5}],
            "speedup": [{"epsilon": 0.01, "speedupFactorTotal": 3.0}]
        }),
    );

    let err = aggregator(dir.path()).push_vs_ppr().unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }));
    assert!(err.to_string().contains("'ppr'"));

    let report = aggregator(dir.path()).aggregate_all();
    assert_eq!(report.outcome(Unit::PushVsPpr).unwrap().status(), UnitStatus::Failed);
}
