//! Stats export and fixed-shape reports
//!
//! - [`write_stats`]: one `location, metric, mean, unit` line per aggregated
//!   metric, the format of `stats.log`
//! - [`cache_report`]: per-class means of the hit counters plus a pooled row
//! - [`query_metric`]: mean and count of one metric over one class

use serde::{Deserialize, Serialize};
use simstat_core::names::CACHE_REPORT_METRICS;
use simstat_core::{AggregatedMetric, MetricSet};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Default stats export file name, written next to the store
pub const STATS_FILE_NAME: &str = "stats.log";

/// `stats.log` line for one metric; the mean keeps ten decimals
pub fn stats_line(metric: &AggregatedMetric) -> String {
    format!(
        "{}, {}, {:.10}, {}",
        metric.key.location, metric.key.metric_name, metric.mean, metric.key.unit
    )
}

/// Write one line per metric, in key order; returns the line count
pub fn write_stats<W: Write>(metrics: &MetricSet, out: &mut W) -> io::Result<usize> {
    let mut lines = 0;
    for metric in metrics {
        writeln!(out, "{}", stats_line(metric))?;
        lines += 1;
    }
    Ok(lines)
}

/// Write `stats.log` (or any other path), replacing an existing file
pub fn write_stats_file(metrics: &MetricSet, path: &Path) -> io::Result<usize> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    let lines = write_stats(metrics, &mut out)?;
    out.flush()?;
    info!(target: "simstat::export", path = %path.display(), lines, "Stats written");
    Ok(lines)
}

// ============================================================================
// Reports
// ============================================================================

/// Mean and sample count of one metric; `mean` is `None` without data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricQuery {
    /// Class the metric was pooled over
    pub class: String,
    /// Metric name
    pub metric: String,
    /// Pooled mean
    pub mean: Option<f64>,
    /// Samples behind the mean
    pub sample_count: usize,
}

/// Pooled mean of `metric` over every location of `class`
pub fn query_metric(metrics: &MetricSet, class: &str, metric: &str) -> MetricQuery {
    let pooled = metrics.class_mean(class, metric);
    MetricQuery {
        class: class.to_string(),
        metric: metric.to_string(),
        mean: pooled.map(|p| p.mean),
        sample_count: pooled.map_or(0, |p| p.sample_count),
    }
}

/// Report section for one cache class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheReportSection {
    /// Cache class, or `Overall` for the pooled section
    pub class: String,
    /// One entry per reported metric
    pub entries: Vec<MetricQuery>,
}

impl CacheReportSection {
    /// True when no metric of this section had data
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.sample_count == 0)
    }
}

/// Hit-counter report over several cache classes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheReport {
    /// Per-class sections in requested order
    pub classes: Vec<CacheReportSection>,
    /// Every class pooled together
    pub overall: CacheReportSection,
}

/// Build the cache report for `classes`
pub fn cache_report<S: AsRef<str>>(metrics: &MetricSet, classes: &[S]) -> CacheReport {
    let sections: Vec<CacheReportSection> = classes
        .iter()
        .map(|class| CacheReportSection {
            class: class.as_ref().to_string(),
            entries: CACHE_REPORT_METRICS
                .iter()
                .map(|m| query_metric(metrics, class.as_ref(), m))
                .collect(),
        })
        .collect();

    let overall = CacheReportSection {
        class: "Overall".to_string(),
        entries: CACHE_REPORT_METRICS
            .iter()
            .enumerate()
            .map(|(i, metric)| {
                let (total, count) = sections
                    .iter()
                    .map(|s| &s.entries[i])
                    .filter_map(|e| e.mean.map(|m| (m * e.sample_count as f64, e.sample_count)))
                    .fold((0.0, 0), |(t, c), (et, ec)| (t + et, c + ec));
                MetricQuery {
                    class: "Overall".to_string(),
                    metric: metric.to_string(),
                    mean: (count > 0).then(|| total / count as f64),
                    sample_count: count,
                }
            })
            .collect(),
    };

    CacheReport {
        classes: sections,
        overall,
    }
}
