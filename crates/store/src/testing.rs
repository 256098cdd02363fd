//! Fixture writer for synthetic telemetry stores
//!
//! Tests and benches across the workspace need stores shaped like the ones
//! the simulator produces. This module writes them.
//!
//! # Example
//!
//! ```ignore
//! use simstat_store::testing::StoreFixture;
//!
//! let path = dir.path().join("akita_sim_fir.sqlite3");
//! StoreFixture::new()
//!     .metric("GPU[1].SA[0].L1VCache[0]", "read-hit", 80.0, "count")
//!     .metric("GPU[1].SA[0].L1VCache[0]", "read-miss", 20.0, "count")
//!     .write(&path)?;
//! ```

use crate::sqlite::quote_ident;
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use simstat_core::{Error, MetricRecord, RawValue, Result};
use std::path::Path;

/// Default table name used by the simulator's metrics dump
pub const DEFAULT_TABLE: &str = "mgpusim_metrics";

/// Builder for a synthetic telemetry store
#[derive(Debug, Clone)]
pub struct StoreFixture {
    table: String,
    with_unit: bool,
    records: Vec<MetricRecord>,
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreFixture {
    /// Empty fixture targeting [`DEFAULT_TABLE`] with a `Unit` column
    pub fn new() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            with_unit: true,
            records: Vec::new(),
        }
    }

    /// Write into a differently named table
    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = name.into();
        self
    }

    /// Omit the `Unit` column
    pub fn without_unit(mut self) -> Self {
        self.with_unit = false;
        self
    }

    /// Add a numeric record
    pub fn metric(mut self, location: &str, what: &str, value: f64, unit: &str) -> Self {
        self.records
            .push(MetricRecord::new(location, what, value, unit));
        self
    }

    /// Add an arbitrary record
    pub fn record(mut self, record: MetricRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Add many records
    pub fn records<I: IntoIterator<Item = MetricRecord>>(mut self, records: I) -> Self {
        self.records.extend(records);
        self
    }

    /// Create (or append to) the store at `path`
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut conn = Connection::open(path).map_err(Error::store)?;
        let table = quote_ident(&self.table);
        let create = if self.with_unit {
            format!(
                "CREATE TABLE IF NOT EXISTS {} (Location TEXT, What TEXT, Value, Unit TEXT)",
                table
            )
        } else {
            format!(
                "CREATE TABLE IF NOT EXISTS {} (Location TEXT, What TEXT, Value)",
                table
            )
        };
        conn.execute(&create, []).map_err(Error::store)?;

        let tx = conn.transaction().map_err(Error::store)?;
        {
            let insert = if self.with_unit {
                format!("INSERT INTO {} VALUES (?1, ?2, ?3, ?4)", table)
            } else {
                format!("INSERT INTO {} VALUES (?1, ?2, ?3)", table)
            };
            let mut stmt = tx.prepare(&insert).map_err(Error::store)?;
            for r in &self.records {
                let value = sql_value(&r.value);
                let inserted = if self.with_unit {
                    stmt.execute(params![r.location, r.metric_name, value, r.unit])
                } else {
                    stmt.execute(params![r.location, r.metric_name, value])
                };
                inserted.map_err(Error::store)?;
            }
        }
        tx.commit().map_err(Error::store)?;
        Ok(())
    }
}

fn sql_value(value: &RawValue) -> Value {
    match value {
        RawValue::Null => Value::Null,
        RawValue::Number(v) => Value::Real(*v),
        RawValue::Text(s) => Value::Text(s.clone()),
    }
}
