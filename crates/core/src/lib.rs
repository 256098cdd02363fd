//! Core types for simstat
//!
//! This crate defines the foundational types used throughout the system:
//! - RunId: (configuration, benchmark) run identifier
//! - MetricRecord / RawValue: one telemetry row as read from a store
//! - CanonicalLocation / MetricKey: aggregation grouping
//! - AggregatedMetric / MetricSet: aggregation results
//! - names: metric and cache-class names emitted by the simulator
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod metric;
pub mod names;
pub mod types;

pub use error::{Error, Result};
pub use metric::{AggregatedMetric, MetricSet, PooledMean};
pub use types::{CanonicalLocation, MetricKey, MetricRecord, RawValue, RunId};
