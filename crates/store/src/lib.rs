//! Telemetry store access for simstat
//!
//! This crate reads the SQLite files the simulator's metrics collector
//! dumps at the end of a run:
//! - TelemetryStore: read-only handle, table enumeration, record streaming
//! - TableInfo / MetricTable: column-based table qualification
//! - testing: fixture writer for synthetic stores

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod sqlite;
pub mod testing;

pub use sqlite::{MetricTable, ScanStats, TableInfo, TelemetryStore};
