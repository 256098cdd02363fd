//! Missing and malformed inputs degrade fields, never the run

use crate::common::*;
use rusqlite::Connection;
use simstat::core::{MetricRecord, RawValue};
use simstat::{aggregate_with, LocationNormalizer, SummaryBuilder, TelemetryStore};

#[test]
fn missing_logs_leave_log_fields_unavailable() {
    let tree = ExperimentTree::new();
    tree.store("normal", "fir", run_fixture(2.0, 80.0, 20.0));
    tree.store("l1-prefetcher", "fir", run_fixture(2.0, 95.0, 5.0));

    let rows = tree.compare();
    let fir = &rows[0];
    assert_eq!(fir.max_runtime_seconds, None);
    assert_eq!(fir.variant.as_ref().unwrap().prefetch_accuracy, None);
    // Store-derived fields are unaffected
    assert_eq!(fir.read_miss_reduction_pct("L1VCache"), Some(75.0));
}

#[test]
fn log_in_configuration_dir_is_shared() {
    let tree = ExperimentTree::new();
    tree.store("normal", "fir", run_fixture(2.0, 80.0, 20.0));
    tree.store("l1-prefetcher", "fir", run_fixture(2.0, 95.0, 5.0));
    std::fs::write(
        tree.root().join("l1-prefetcher").join("timing_report.txt"),
        "Prefetch Accuracy: 42.0%\nreal 0m30s\n",
    )
    .unwrap();

    let rows = tree.compare();
    assert_eq!(rows[0].variant.as_ref().unwrap().prefetch_accuracy, Some(42.0));
    assert_eq!(rows[0].max_runtime_seconds, Some(30.0));
}

#[test]
fn mshr_hits_count_as_accesses() {
    let tree = ExperimentTree::new();
    tree.store(
        "normal",
        "fir",
        run_fixture(2.0, 70.0, 20.0).metric("GPU[1].SA[0].L1VCache[0]", READ_MSHR_HIT, 10.0, "count"),
    );

    let summaries = tree.summaries(&["normal"], None);
    let stats = summaries[&RunId::new("normal", "fir")].cache_stats("L1VCache");
    assert_eq!(stats.read_mshr_hits, Some(10.0));
    // 20 / (70 + 20 + 10)
    assert_eq!(stats.miss_rate, Some(0.2));
    assert_eq!(stats.hit_rate, Some(0.7));
}

#[test]
fn corrupt_store_degrades_one_side() {
    let tree = ExperimentTree::new();
    tree.store("normal", "fir", run_fixture(2.0, 80.0, 20.0));
    let dir = tree.run_dir("l1-prefetcher", "fir");
    std::fs::write(dir.join("akita_sim_fir.sqlite3"), b"garbage").unwrap();

    let summaries = tree.summaries(&["normal", "l1-prefetcher"], Some("l1-prefetcher"));
    assert!(!summaries[&RunId::new("l1-prefetcher", "fir")].store_available);
    assert!(summaries[&RunId::new("normal", "fir")].store_available);

    let rows = tree.compare();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].ipc_delta_pct, None);
}

#[test]
fn tables_without_required_columns_are_skipped() {
    let tree = ExperimentTree::new();
    let path = tree.store("normal", "fir", run_fixture(2.0, 80.0, 20.0));
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute("CREATE TABLE kernel_trace (Start REAL, Finish REAL)", [])
            .unwrap();
        conn.execute("INSERT INTO kernel_trace VALUES (0.0, 1.0)", []).unwrap();
    }

    let store = TelemetryStore::open(&path).unwrap();
    assert_eq!(store.tables().unwrap().len(), 2);
    assert_eq!(store.metric_tables().unwrap().len(), 1);

    let (metrics, _) = SummaryBuilder::default().aggregate_store(&path).unwrap();
    assert_eq!(metrics.len(), 5);
}

#[test]
fn non_numeric_values_are_discarded() {
    let records = vec![
        MetricRecord::new("GPU[0].SA[0].L1VCache[0]", READ_HIT, 10.0, "count"),
        MetricRecord::new("GPU[0].SA[0].L1VCache[1]", READ_HIT, RawValue::Text("n/a".into()), "count"),
        MetricRecord::new("GPU[0].SA[0].L1VCache[2]", READ_HIT, RawValue::Null, "count"),
        MetricRecord::new("GPU[0].SA[0].L1VCache[3]", READ_HIT, RawValue::Text(" 30 ".into()), "count"),
    ];
    let (metrics, stats) = aggregate_with(LocationNormalizer::shared(), &records);
    let hit = metrics.get("GPU.SA.L1VCache", READ_HIT, "count").unwrap();
    assert_eq!(hit.sample_count, 2);
    assert_eq!(hit.mean, 20.0);
    assert_eq!(stats.discarded, 2);
}

#[test]
fn empty_tree_yields_no_rows() {
    let tree = ExperimentTree::new();
    std::fs::create_dir_all(tree.root().join("normal")).unwrap();
    assert!(tree.compare().is_empty());
}
