//! Baseline vs variant comparison over a whole tree

use crate::common::*;
use simstat::{summarize_improvements, ImprovementMetric};

#[test]
fn fir_read_miss_reduction() {
    let tree = ExperimentTree::new();
    tree.store("normal", "fir", run_fixture(2.0, 80.0, 20.0));
    tree.store("l1-prefetcher", "fir", run_fixture(2.0, 95.0, 5.0));

    let rows = tree.compare();
    assert_eq!(rows.len(), 1);
    let fir = &rows[0];
    assert!(fir.is_complete());

    let base = fir.baseline.as_ref().unwrap().cache("L1VCache").unwrap();
    let var = fir.variant.as_ref().unwrap().cache("L1VCache").unwrap();
    assert_eq!(base.miss_rate, Some(0.20));
    assert_eq!(var.miss_rate, Some(0.05));
    assert_eq!(base.read_misses, Some(20.0));
    assert_eq!(var.read_misses, Some(5.0));
    assert_eq!(fir.read_miss_reduction_pct("L1VCache"), Some(75.0));
    assert_eq!(fir.ipc_delta_pct, Some(0.0));
}

#[test]
fn accuracy_and_runtime_from_logs() {
    let tree = ExperimentTree::new();
    tree.store("normal", "fir", run_fixture(2.0, 80.0, 20.0));
    tree.store("l1-prefetcher", "fir", run_fixture(1.6, 95.0, 5.0));
    tree.log("normal", "fir", "Prefetch Accuracy: 10.0%\nreal\t1m0.0s\n");
    tree.log(
        "l1-prefetcher",
        "fir",
        "Prefetch Accuracy: 70.0%\nPrefetch Accuracy: 80.0%\nreal\t2m3.456s\nuser\t0m1.0s\n",
    );

    let rows = tree.compare();
    let fir = &rows[0];
    // Accuracy is a variant-side field only
    assert_eq!(fir.baseline.as_ref().unwrap().prefetch_accuracy, None);
    assert_eq!(fir.variant.as_ref().unwrap().prefetch_accuracy, Some(75.0));
    assert_close(fir.max_runtime_seconds, 123.456);
    // ipc 0.5 -> 0.625
    assert_close(fir.ipc_delta_pct, 25.0);
}

#[test]
fn one_sided_benchmark_still_gets_a_row() {
    let tree = ExperimentTree::new();
    tree.store("normal", "fir", run_fixture(2.0, 80.0, 20.0));
    tree.store("l1-prefetcher", "fir", run_fixture(2.0, 90.0, 10.0));
    tree.store("normal", "bfs", run_fixture(2.0, 50.0, 50.0));

    let rows = tree.compare();
    assert_eq!(rows.len(), 2);
    let bfs = &rows[0];
    assert_eq!(bfs.benchmark, "bfs");
    assert!(bfs.baseline.is_some());
    assert!(bfs.variant.is_none());
    assert!(!bfs.is_complete());
    assert_eq!(bfs.ipc_delta_pct, None);
    assert_eq!(bfs.read_miss_reduction_pct("L1VCache"), None);

    let summary = summarize_improvements(&rows, ImprovementMetric::ReadMissReduction("L1VCache".into()));
    assert_eq!(summary.valid, 1);
    assert_eq!(summary.best.as_ref().unwrap().benchmark, "fir");
    assert_eq!(summary.average_pct, Some(50.0));
}

#[test]
fn ranking_orders_benchmarks() {
    let tree = ExperimentTree::new();
    for (bench, base_miss, var_miss) in [("fir", 20.0, 5.0), ("fft", 40.0, 30.0), ("aes", 10.0, 12.0)] {
        tree.store("normal", bench, run_fixture(2.0, 100.0 - base_miss, base_miss));
        tree.store("l1-prefetcher", bench, run_fixture(2.0, 100.0 - var_miss, var_miss));
    }

    let rows = tree.compare();
    let summary = summarize_improvements(&rows, ImprovementMetric::ReadMissReduction("L1VCache".into()));
    let order: Vec<&str> = summary.ranked.iter().map(|r| r.benchmark.as_str()).collect();
    assert_eq!(order, vec!["fir", "fft", "aes"]);
    assert_eq!(summary.worst.as_ref().unwrap().benchmark, "aes");
    assert_close(Some(summary.ranked[2].improvement_pct), -20.0);
}

#[test]
fn rows_serialize_to_json() {
    let tree = ExperimentTree::new();
    tree.store("normal", "fir", run_fixture(2.0, 80.0, 20.0));

    let rows = tree.compare();
    let json = serde_json::to_value(&rows).unwrap();
    assert_eq!(json[0]["benchmark"], "fir");
    assert!(json[0]["variant"].is_null());
    assert!(json[0]["baseline"]["cpi"].is_number());
}
