//! Sweep normalization against a baseline configuration

use crate::common::*;
use simstat::{discover_configurations, normalize_sweep, SweepMetric};

fn tlb_fixture(cpi: f64, hits: f64, misses: f64) -> StoreFixture {
    run_fixture(cpi, 90.0, 10.0)
        .metric("GPU[1].SA[0].L1VTLB[0]", TLB_HIT, hits, "count")
        .metric("GPU[1].SA[0].L1VTLB[0]", TLB_MISS, misses, "count")
}

#[test]
fn baseline_normalizes_to_one() {
    let tree = ExperimentTree::new();
    tree.store("tlb_64", "fir", tlb_fixture(2.0, 60.0, 40.0));
    tree.store("tlb_128", "fir", tlb_fixture(1.0, 80.0, 20.0));
    tree.store("tlb_256", "fir", tlb_fixture(0.5, 90.0, 10.0));

    let configs = discover_configurations(tree.root()).unwrap();
    assert_eq!(configs, vec!["tlb_128", "tlb_256", "tlb_64"]);
    let names: Vec<&str> = configs.iter().map(String::as_str).collect();
    let summaries = tree.summaries(&names, None);

    let points = normalize_sweep(&summaries, "tlb_64", &SweepMetric::Ipc);
    assert_eq!(points.len(), 3);
    let by_config = |c: &str| points.iter().find(|p| p.configuration == c).unwrap();
    assert_eq!(by_config("tlb_64").normalized, Some(1.0));
    assert_eq!(by_config("tlb_128").normalized, Some(2.0));
    assert_eq!(by_config("tlb_256").normalized, Some(4.0));

    let hit_rate = SweepMetric::TlbHitRate("L1VTLB".into());
    let points = normalize_sweep(&summaries, "tlb_64", &hit_rate);
    assert_close(points.iter().find(|p| p.configuration == "tlb_128").unwrap().normalized, 0.8 / 0.6);
}

#[test]
fn zero_or_missing_baseline_is_unavailable() {
    let tree = ExperimentTree::new();
    tree.store("tlb_64", "fir", tlb_fixture(2.0, 0.0, 0.0));
    tree.store("tlb_128", "fir", tlb_fixture(1.0, 80.0, 20.0));
    tree.store("tlb_128", "fft", tlb_fixture(1.0, 80.0, 20.0));

    let summaries = tree.summaries(&["tlb_64", "tlb_128"], None);
    let points = normalize_sweep(&summaries, "tlb_64", &SweepMetric::TlbHitRate("L1VTLB".into()));
    assert!(points.iter().all(|p| p.normalized.is_none()));
    assert_eq!(points.len(), 3);
    assert_eq!(points.iter().find(|p| p.configuration == "tlb_128" && p.benchmark == "fir").unwrap().value, Some(0.8));
}
