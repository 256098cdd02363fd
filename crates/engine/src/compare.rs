//! ComparisonEngine: pairing runs across two configurations
//!
//! [`compare`] joins the summaries of a baseline and a variant
//! configuration by benchmark name. Every benchmark present under either
//! configuration gets exactly one [`ComparisonRow`]; a side that has no
//! summary is `None` and every delta touching it is `None` as well.
//!
//! ## Deltas
//!
//! | Field | Formula |
//! |---|---|
//! | `ipc_delta_pct` | `(ipc_v - ipc_b) / ipc_b * 100` |
//! | `throughput_delta_pct` | `(tp_v - tp_b) / tp_b * 100` |
//! | `read_miss_reduction_pct` | `(miss_b - miss_v) / miss_b * 100` |
//!
//! A delta is only computed when both values are present and the baseline
//! value is non-zero. It is never NaN, infinite, or a zero standing in for
//! missing data.
//!
//! ## Ranking
//!
//! [`summarize_improvements`] picks the best and worst row for one metric.
//! Ties go to the row that comes first in the input, which for [`compare`]
//! output means the alphabetically first benchmark.

use crate::summary::{CacheStats, RunSummary};
use serde::{Deserialize, Serialize};
use simstat_core::names::{L1V_CACHE, L2_CACHE};
use simstat_core::RunId;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Signed relative change from `baseline` to `variant`, in percent
pub fn relative_delta(baseline: Option<f64>, variant: Option<f64>) -> Option<f64> {
    let (a, b) = (baseline?, variant?);
    if a == 0.0 {
        return None;
    }
    let delta = (b - a) / a * 100.0;
    delta.is_finite().then_some(delta)
}

/// Relative reduction from `baseline` to `variant`, in percent
///
/// Positive when the variant value is smaller.
pub fn relative_reduction(baseline: Option<f64>, variant: Option<f64>) -> Option<f64> {
    let (a, b) = (baseline?, variant?);
    if a == 0.0 {
        return None;
    }
    let reduction = (a - b) / a * 100.0;
    reduction.is_finite().then_some(reduction)
}

// ============================================================================
// Rows
// ============================================================================

/// Values for one side of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideMetrics {
    /// Configuration this side came from
    pub configuration: String,
    /// Read statistics per requested cache class
    pub caches: Vec<CacheStats>,
    /// Mean cycles per instruction
    pub cpi: Option<f64>,
    /// Instructions per cycle
    pub ipc: Option<f64>,
    /// Mean instructions retired per compute unit
    pub instruction_count: Option<f64>,
    /// Mean kernel time
    pub kernel_time: Option<f64>,
    /// Instructions per unit of kernel time
    pub throughput: Option<f64>,
    /// Wall-clock runtime from the run log
    pub runtime_seconds: Option<f64>,
    /// Prefetch accuracy; only filled for the variant side
    pub prefetch_accuracy: Option<f64>,
    /// Mean of the shared cache's read-hit, read-miss and read-mshr-hit
    pub l2_average_accesses: Option<f64>,
}

impl SideMetrics {
    /// Extract the compared values from a summary
    pub fn from_summary(summary: &RunSummary, cache_classes: &[String], with_accuracy: bool) -> Self {
        Self {
            configuration: summary.id.configuration.clone(),
            caches: cache_classes.iter().map(|c| summary.cache_stats(c)).collect(),
            cpi: summary.cpi,
            ipc: summary.ipc(),
            instruction_count: summary.instruction_count,
            kernel_time: summary.kernel_time,
            throughput: summary.throughput(),
            runtime_seconds: summary.runtime_seconds,
            prefetch_accuracy: if with_accuracy {
                summary.prefetch_accuracy
            } else {
                None
            },
            l2_average_accesses: summary.l2_average_accesses(),
        }
    }

    /// Statistics for one cache class, if it was requested
    pub fn cache(&self, class: &str) -> Option<&CacheStats> {
        self.caches.iter().find(|c| c.class == class)
    }
}

/// Per-class delta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheDelta {
    /// Cache class
    pub class: String,
    /// `(miss_b - miss_v) / miss_b * 100` on mean read misses
    pub read_miss_reduction_pct: Option<f64>,
    /// Variant miss rate minus baseline miss rate
    pub miss_rate_change: Option<f64>,
}

/// One benchmark compared across two configurations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Benchmark name
    pub benchmark: String,
    /// Baseline side, `None` when the benchmark was not run there
    pub baseline: Option<SideMetrics>,
    /// Variant side, `None` when the benchmark was not run there
    pub variant: Option<SideMetrics>,
    /// Relative IPC change in percent
    pub ipc_delta_pct: Option<f64>,
    /// Relative throughput change in percent
    pub throughput_delta_pct: Option<f64>,
    /// Per-class cache deltas, in requested class order
    pub cache_deltas: Vec<CacheDelta>,
    /// Larger of the two runtimes
    pub max_runtime_seconds: Option<f64>,
}

impl ComparisonRow {
    fn build(
        benchmark: &str,
        baseline: Option<SideMetrics>,
        variant: Option<SideMetrics>,
        cache_classes: &[String],
    ) -> Self {
        let pick = |side: &Option<SideMetrics>, f: fn(&SideMetrics) -> Option<f64>| {
            side.as_ref().and_then(f)
        };

        let cache_deltas = cache_classes
            .iter()
            .map(|class| {
                let stats = |side: &Option<SideMetrics>| {
                    side.as_ref().and_then(|s| s.cache(class)).cloned()
                };
                let (b, v) = (stats(&baseline), stats(&variant));
                let misses = |s: &Option<CacheStats>| s.as_ref().and_then(|s| s.read_misses);
                let rate = |s: &Option<CacheStats>| s.as_ref().and_then(|s| s.miss_rate);
                CacheDelta {
                    class: class.clone(),
                    read_miss_reduction_pct: relative_reduction(misses(&b), misses(&v)),
                    miss_rate_change: match (rate(&b), rate(&v)) {
                        (Some(b), Some(v)) => Some(v - b),
                        _ => None,
                    },
                }
            })
            .collect();

        let runtimes = [
            pick(&baseline, |s| s.runtime_seconds),
            pick(&variant, |s| s.runtime_seconds),
        ];
        let max_runtime_seconds = runtimes.iter().flatten().copied().reduce(f64::max);

        Self {
            benchmark: benchmark.to_string(),
            ipc_delta_pct: relative_delta(pick(&baseline, |s| s.ipc), pick(&variant, |s| s.ipc)),
            throughput_delta_pct: relative_delta(
                pick(&baseline, |s| s.throughput),
                pick(&variant, |s| s.throughput),
            ),
            cache_deltas,
            max_runtime_seconds,
            baseline,
            variant,
        }
    }

    /// Both sides present
    pub fn is_complete(&self) -> bool {
        self.baseline.is_some() && self.variant.is_some()
    }

    /// Delta entry for one cache class
    pub fn cache_delta(&self, class: &str) -> Option<&CacheDelta> {
        self.cache_deltas.iter().find(|d| d.class == class)
    }

    /// Read-miss reduction for one cache class
    pub fn read_miss_reduction_pct(&self, class: &str) -> Option<f64> {
        self.cache_delta(class).and_then(|d| d.read_miss_reduction_pct)
    }
}

/// Default cache classes compared per row
pub fn default_cache_classes() -> Vec<String> {
    vec![L1V_CACHE.to_string(), L2_CACHE.to_string()]
}

/// Compare two configurations over the default cache classes
pub fn compare(
    summaries: &BTreeMap<RunId, RunSummary>,
    baseline: &str,
    variant: &str,
) -> Vec<ComparisonRow> {
    compare_with(summaries, baseline, variant, &default_cache_classes())
}

/// Compare two configurations, one row per benchmark under either
///
/// Rows come out ordered by benchmark name. Prefetch accuracy is only
/// carried on the variant side.
pub fn compare_with(
    summaries: &BTreeMap<RunId, RunSummary>,
    baseline: &str,
    variant: &str,
    cache_classes: &[String],
) -> Vec<ComparisonRow> {
    let benchmarks: BTreeSet<&str> = summaries
        .keys()
        .filter(|id| id.configuration == baseline || id.configuration == variant)
        .map(|id| id.benchmark.as_str())
        .collect();

    let side = |configuration: &str, benchmark: &str, with_accuracy: bool| {
        summaries
            .get(&RunId::new(configuration, benchmark))
            .map(|s| SideMetrics::from_summary(s, cache_classes, with_accuracy))
    };

    let rows: Vec<ComparisonRow> = benchmarks
        .into_iter()
        .map(|benchmark| {
            ComparisonRow::build(
                benchmark,
                side(baseline, benchmark, false),
                side(variant, benchmark, true),
                cache_classes,
            )
        })
        .collect();

    debug!(
        target: "simstat::compare",
        baseline,
        variant,
        rows = rows.len(),
        complete = rows.iter().filter(|r| r.is_complete()).count(),
        "Comparison built"
    );
    rows
}

// ============================================================================
// Ranking
// ============================================================================

/// Metric used to rank comparison rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImprovementMetric {
    /// Relative IPC change
    Ipc,
    /// Relative throughput change
    Throughput,
    /// Relative read-miss reduction for a cache class
    ReadMissReduction(String),
}

impl ImprovementMetric {
    /// Value of this metric for a row
    pub fn value(&self, row: &ComparisonRow) -> Option<f64> {
        match self {
            ImprovementMetric::Ipc => row.ipc_delta_pct,
            ImprovementMetric::Throughput => row.throughput_delta_pct,
            ImprovementMetric::ReadMissReduction(class) => row.read_miss_reduction_pct(class),
        }
    }
}

impl fmt::Display for ImprovementMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImprovementMetric::Ipc => f.write_str("IPC change"),
            ImprovementMetric::Throughput => f.write_str("throughput change"),
            ImprovementMetric::ReadMissReduction(class) => write!(f, "{} read-miss reduction", class),
        }
    }
}

/// A row's improvement under one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedImprovement {
    /// Benchmark name
    pub benchmark: String,
    /// Improvement in percent
    pub improvement_pct: f64,
}

/// Aggregate view of one improvement metric across rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementSummary {
    /// Metric ranked
    pub metric: ImprovementMetric,
    /// Rows with a computable improvement
    pub valid: usize,
    /// Mean improvement over valid rows
    pub average_pct: Option<f64>,
    /// Largest improvement; first row wins ties
    pub best: Option<RankedImprovement>,
    /// Smallest improvement; first row wins ties
    pub worst: Option<RankedImprovement>,
    /// Valid rows sorted by improvement, largest first; ties keep input order
    pub ranked: Vec<RankedImprovement>,
}

/// Rank `rows` by `metric`
///
/// Rows whose improvement is unavailable are left out.
pub fn summarize_improvements(rows: &[ComparisonRow], metric: ImprovementMetric) -> ImprovementSummary {
    let valid: Vec<RankedImprovement> = rows
        .iter()
        .filter_map(|row| {
            metric.value(row).map(|v| RankedImprovement {
                benchmark: row.benchmark.clone(),
                improvement_pct: v,
            })
        })
        .collect();

    let average_pct = if valid.is_empty() {
        None
    } else {
        Some(valid.iter().map(|r| r.improvement_pct).sum::<f64>() / valid.len() as f64)
    };

    // Strict comparisons keep the earliest row on ties
    let mut best: Option<&RankedImprovement> = None;
    let mut worst: Option<&RankedImprovement> = None;
    for r in &valid {
        if best.map_or(true, |b| r.improvement_pct > b.improvement_pct) {
            best = Some(r);
        }
        if worst.map_or(true, |w| r.improvement_pct < w.improvement_pct) {
            worst = Some(r);
        }
    }
    let (best, worst) = (best.cloned(), worst.cloned());

    let mut ranked = valid;
    ranked.sort_by(|a, b| b.improvement_pct.total_cmp(&a.improvement_pct));

    ImprovementSummary {
        metric,
        valid: ranked.len(),
        average_pct,
        best,
        worst,
        ranked,
    }
}
