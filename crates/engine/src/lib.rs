//! Analysis engine for simstat
//!
//! This crate turns telemetry stores and run logs into comparable numbers:
//! - normalize: LocationNormalizer, instance paths to component classes
//! - aggregate: AggregationContext, grouped means per (location, metric, unit)
//! - scan: ReportScanner and the backward ReverseLineReader
//! - summary: RunSummary, CacheStats, TlbStats and the builder
//! - compare: paired ComparisonRows and improvement ranking
//! - sweep: normalization of a configuration family against a baseline
//! - discover: `<root>/<configuration>/<benchmark>/` layout discovery
//! - export: `stats.log` lines, cache report, single metric queries
//! - config: `simstat.toml`
//!
//! Everything is single-threaded and deterministic. Missing inputs degrade
//! individual fields to `None`; they never abort a whole comparison.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod compare;
pub mod config;
pub mod discover;
pub mod export;
pub mod normalize;
pub mod scan;
pub mod summary;
pub mod sweep;

pub use aggregate::{aggregate, aggregate_with, AggregationContext, AggregationStats};
pub use compare::{
    compare, compare_with, relative_delta, relative_reduction, summarize_improvements, CacheDelta,
    ComparisonRow, ImprovementMetric, ImprovementSummary, RankedImprovement, SideMetrics,
};
pub use config::{AnalysisConfig, CONFIG_FILE_NAME};
pub use discover::{discover_configurations, discover_runs, load_summaries, RunLocation};
pub use export::{cache_report, query_metric, write_stats, CacheReport, MetricQuery};
pub use normalize::{LocationNormalizer, LocationRule, DEFAULT_RULES};
pub use scan::{AccuracyPolicy, ExtractionPattern, ReportScanner, ReverseLineReader};
pub use summary::{CacheStats, RunSummary, SummaryBuilder, TlbStats};
pub use sweep::{normalize_sweep, SweepMetric, SweepPoint};

/// Summary builder configured from an [`AnalysisConfig`]
pub fn builder_for(config: &AnalysisConfig) -> SummaryBuilder<'static> {
    SummaryBuilder::default()
        .scanner(config.scanner())
        .accuracy(config.accuracy_label.clone(), config.accuracy_policy)
}
