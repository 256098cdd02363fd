//! simstat - telemetry aggregation and comparison for GPU simulator runs
//!
//! A simulator run leaves a SQLite telemetry store (one row per component
//! instance and metric) and a text run log. simstat collapses instance
//! paths such as `GPU[1].SA[3].L1VCache[2]` into component classes, averages
//! every metric per class, reads runtime and prefetch accuracy from the log
//! tail, and compares a baseline configuration against a variant across a
//! whole experiment tree.
//!
//! # Quick Start
//!
//! ```ignore
//! use simstat::{builder_for, compare_with, discover_runs, load_summaries, AnalysisConfig};
//!
//! let config = AnalysisConfig::default();
//! let runs = discover_runs(root, &[&config.baseline, &config.variant], &config)?;
//! let summaries = load_summaries(&runs, &builder_for(&config), Some(config.variant.as_str()));
//! let rows = compare_with(&summaries, &config.baseline, &config.variant, &config.cache_classes);
//! ```
//!
//! # Architecture
//!
//! - `simstat-core`: records, canonical locations, metric sets, errors
//! - `simstat-store`: read-only SQLite telemetry access
//! - `simstat-engine`: normalization, aggregation, log scanning, comparison
//!
//! The engine API is re-exported here; the lower crates are reachable as
//! [`core`] and [`store`].

pub use simstat_core as core;
pub use simstat_store as store;

pub use simstat_core::{
    AggregatedMetric, CanonicalLocation, Error, MetricKey, MetricRecord, MetricSet, Result, RunId,
};
pub use simstat_engine::*;
pub use simstat_store::TelemetryStore;
