//! Per-run summaries
//!
//! A [`RunSummary`] bundles everything known about one benchmark under one
//! configuration: the aggregated metric set from its telemetry store, plus
//! scalar values pulled from the store (CPI, instruction count, kernel
//! time) and from the run log (runtime, prefetch accuracy).
//!
//! Building a summary never fails. A missing or broken store leaves the
//! metric set empty and `store_available == false`; a missing log leaves the
//! log-derived fields `None`. Either way, other runs are unaffected.

use crate::aggregate::{AggregationContext, AggregationStats};
use crate::normalize::LocationNormalizer;
use crate::scan::{AccuracyPolicy, ExtractionPattern, ReportScanner, DEFAULT_ACCURACY_LABEL};
use serde::{Deserialize, Serialize};
use simstat_core::names::{
    CU_CPI, CU_INST_COUNT, KERNEL_TIME, L2_CACHE, READ_HIT, READ_MISS, READ_MSHR_HIT, TLB_HIT,
    TLB_MISS,
};
use simstat_core::{MetricSet, PooledMean, Result, RunId};
use simstat_store::TelemetryStore;
use std::path::Path;
use tracing::{debug, warn};

// ============================================================================
// Derived cache and TLB statistics
// ============================================================================

/// Read behaviour of one cache class
///
/// The three counters are per-instance means. Rates are computed from the
/// pooled totals, so instances that reported more samples weigh more.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Cache class, e.g. `L1VCache`
    pub class: String,
    /// Mean `read-hit` per instance
    pub read_hits: Option<f64>,
    /// Mean `read-miss` per instance
    pub read_misses: Option<f64>,
    /// Mean `read-mshr-hit` per instance
    pub read_mshr_hits: Option<f64>,
    /// `misses / (hits + misses + mshr_hits)`; `None` when nothing was accessed
    pub miss_rate: Option<f64>,
    /// `hits / (hits + misses + mshr_hits)`; `None` when nothing was accessed
    pub hit_rate: Option<f64>,
}

impl CacheStats {
    /// Derive the statistics for `class` from an aggregated metric set
    pub fn from_metrics(metrics: &MetricSet, class: &str) -> Self {
        let hits = metrics.class_mean(class, READ_HIT);
        let misses = metrics.class_mean(class, READ_MISS);
        let mshr_hits = metrics.class_mean(class, READ_MSHR_HIT);

        let total = |p: Option<PooledMean>| p.map(|p| p.mean * p.sample_count as f64);
        let (hit_total, miss_total, mshr_total) = (total(hits), total(misses), total(mshr_hits));
        let accesses = [hit_total, miss_total, mshr_total]
            .iter()
            .flatten()
            .sum::<f64>();

        let rate = |part: Option<f64>| {
            if accesses > 0.0 {
                Some(part.unwrap_or(0.0) / accesses)
            } else {
                None
            }
        };

        Self {
            class: class.to_string(),
            read_hits: hits.map(|p| p.mean),
            read_misses: misses.map(|p| p.mean),
            read_mshr_hits: mshr_hits.map(|p| p.mean),
            miss_rate: rate(miss_total),
            hit_rate: rate(hit_total),
        }
    }

    /// Mean of the three per-instance read counters
    ///
    /// Absent counters count as zero; `None` only when all three are absent.
    pub fn average_accesses(&self) -> Option<f64> {
        let parts = [self.read_hits, self.read_misses, self.read_mshr_hits];
        if parts.iter().all(Option::is_none) {
            return None;
        }
        Some(parts.iter().flatten().sum::<f64>() / 3.0)
    }
}

/// Lookup behaviour of one TLB class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TlbStats {
    /// TLB class, e.g. `L1VTLB`
    pub class: String,
    /// Total hits over every instance
    pub hits: Option<f64>,
    /// Total misses over every instance
    pub misses: Option<f64>,
    /// `hits / (hits + misses)`; `None` when there were no lookups
    pub hit_rate: Option<f64>,
}

impl TlbStats {
    /// Derive the statistics for `class` from an aggregated metric set
    pub fn from_metrics(metrics: &MetricSet, class: &str) -> Self {
        let total = |name| {
            metrics
                .class_mean(class, name)
                .map(|p| p.mean * p.sample_count as f64)
        };
        let hits = total(TLB_HIT);
        let misses = total(TLB_MISS);
        let lookups = hits.unwrap_or(0.0) + misses.unwrap_or(0.0);
        Self {
            class: class.to_string(),
            hits,
            misses,
            hit_rate: (lookups > 0.0).then(|| hits.unwrap_or(0.0) / lookups),
        }
    }
}

// ============================================================================
// RunSummary
// ============================================================================

/// Everything known about one (configuration, benchmark) run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Which run this is
    pub id: RunId,
    /// Aggregated telemetry
    pub metrics: MetricSet,
    /// Wall-clock runtime from the run log
    pub runtime_seconds: Option<f64>,
    /// Prefetcher accuracy in percent, from the run log
    pub prefetch_accuracy: Option<f64>,
    /// Mean cycles per instruction over compute units
    pub cpi: Option<f64>,
    /// Mean instructions retired per compute unit
    pub instruction_count: Option<f64>,
    /// Mean kernel time
    pub kernel_time: Option<f64>,
    /// Whether the telemetry store could be read
    pub store_available: bool,
    /// Whether the run log could be read
    pub report_available: bool,
}

impl RunSummary {
    /// Summary over an aggregated metric set, without log-derived values
    pub fn from_metrics(id: RunId, metrics: MetricSet) -> Self {
        let mean = |name| metrics.metric_mean(name).map(|p| p.mean);
        let cpi = mean(CU_CPI);
        let instruction_count = mean(CU_INST_COUNT);
        let kernel_time = mean(KERNEL_TIME);
        Self {
            id,
            metrics,
            runtime_seconds: None,
            prefetch_accuracy: None,
            cpi,
            instruction_count,
            kernel_time,
            store_available: true,
            report_available: false,
        }
    }

    /// Summary for a run whose store could not be read
    pub fn unavailable(id: RunId) -> Self {
        Self {
            store_available: false,
            ..Self::from_metrics(id, MetricSet::new())
        }
    }

    /// Instructions per cycle, `1 / cpi`
    pub fn ipc(&self) -> Option<f64> {
        self.cpi.filter(|&c| c != 0.0).map(|c| 1.0 / c)
    }

    /// Instructions per unit of kernel time
    pub fn throughput(&self) -> Option<f64> {
        let kernel_time = self.kernel_time.filter(|&t| t != 0.0)?;
        Some(self.instruction_count? / kernel_time)
    }

    /// Read statistics for a cache class
    pub fn cache_stats(&self, class: &str) -> CacheStats {
        CacheStats::from_metrics(&self.metrics, class)
    }

    /// Lookup statistics for a TLB class
    pub fn tlb_stats(&self, class: &str) -> TlbStats {
        TlbStats::from_metrics(&self.metrics, class)
    }

    /// Mean accesses of the shared L2 cache
    pub fn l2_average_accesses(&self) -> Option<f64> {
        self.cache_stats(L2_CACHE).average_accesses()
    }
}

// ============================================================================
// SummaryBuilder
// ============================================================================

/// Builds [`RunSummary`] values from a store path and a log path
#[derive(Debug, Clone)]
pub struct SummaryBuilder<'n> {
    normalizer: &'n LocationNormalizer,
    scanner: ReportScanner,
    accuracy_label: String,
    accuracy_policy: AccuracyPolicy,
}

impl Default for SummaryBuilder<'static> {
    fn default() -> Self {
        Self::new(LocationNormalizer::shared())
    }
}

impl<'n> SummaryBuilder<'n> {
    /// Builder grouping locations with `normalizer`
    pub fn new(normalizer: &'n LocationNormalizer) -> Self {
        Self {
            normalizer,
            scanner: ReportScanner::default(),
            accuracy_label: DEFAULT_ACCURACY_LABEL.to_string(),
            accuracy_policy: AccuracyPolicy::default(),
        }
    }

    /// Scan logs with `scanner`
    pub fn scanner(mut self, scanner: ReportScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Label and policy for prefetch accuracy extraction
    pub fn accuracy(mut self, label: impl Into<String>, policy: AccuracyPolicy) -> Self {
        self.accuracy_label = label.into();
        self.accuracy_policy = policy;
        self
    }

    /// Aggregate every qualifying table of the store at `path`
    pub fn aggregate_store(&self, path: &Path) -> Result<(MetricSet, AggregationStats)> {
        let store = TelemetryStore::open(path)?;
        let mut ctx = AggregationContext::new(self.normalizer);
        store.for_each_record(|record| ctx.push(&record))?;
        Ok(ctx.finish())
    }

    /// Build the summary for `id`
    ///
    /// `with_accuracy` controls whether the prefetch accuracy is read from
    /// the log; only prefetching configurations print it.
    pub fn build(
        &self,
        id: RunId,
        store: Option<&Path>,
        report: Option<&Path>,
        with_accuracy: bool,
    ) -> RunSummary {
        let mut summary = match store {
            Some(path) => match self.aggregate_store(path) {
                Ok((metrics, _)) => RunSummary::from_metrics(id, metrics),
                Err(e) => {
                    warn!(
                        target: "simstat::summary",
                        run = %id,
                        path = %path.display(),
                        error = %e,
                        "Telemetry store unavailable"
                    );
                    RunSummary::unavailable(id)
                }
            },
            None => {
                warn!(target: "simstat::summary", run = %id, "No telemetry store found");
                RunSummary::unavailable(id)
            }
        };

        if let Some(path) = report {
            if let Some(text) = self.scanner.tail_text(path) {
                summary.report_available = true;
                summary.runtime_seconds = ExtractionPattern::duration()
                    .ok()
                    .and_then(|p| p.extract(&text).first().copied());
                if with_accuracy {
                    summary.prefetch_accuracy =
                        ExtractionPattern::percentage(&self.accuracy_label)
                            .ok()
                            .and_then(|p| self.accuracy_policy.apply(&p.extract(&text)));
                }
            }
        }
        if !summary.report_available {
            debug!(target: "simstat::summary", run = %summary.id, "Run log unavailable");
        }
        summary
    }
}
