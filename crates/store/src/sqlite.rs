//! SQLite telemetry store
//!
//! The simulator dumps its metrics collector into a SQLite file. The table
//! name has changed between simulator versions, so the store is not read by
//! name: every table is enumerated and any table whose columns include
//! `Location`, `What` and `Value` is treated as a metric table. `Unit` is
//! optional.
//!
//! The file is opened read-only. A path that does not exist is reported as
//! [`Error::NotFound`] instead of silently creating an empty database.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use simstat_core::{Error, MetricRecord, RawValue, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Column holding the component path
pub const LOCATION_COLUMN: &str = "Location";
/// Column holding the metric name
pub const WHAT_COLUMN: &str = "What";
/// Column holding the metric value
pub const VALUE_COLUMN: &str = "Value";
/// Optional column holding the unit
pub const UNIT_COLUMN: &str = "Unit";

/// Name and column list of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    /// Table name
    pub name: String,
    /// Column names in declaration order
    pub columns: Vec<String>,
}

impl TableInfo {
    /// Metric-table view of this table, if it has the required columns
    pub fn as_metric_table(&self) -> Option<MetricTable> {
        let has = |col: &str| self.columns.iter().any(|c| c == col);
        if has(LOCATION_COLUMN) && has(WHAT_COLUMN) && has(VALUE_COLUMN) {
            Some(MetricTable {
                name: self.name.clone(),
                has_unit: has(UNIT_COLUMN),
            })
        } else {
            None
        }
    }
}

/// A table that qualifies as a source of metric records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricTable {
    /// Table name
    pub name: String,
    /// Whether the table carries a `Unit` column
    pub has_unit: bool,
}

/// Counters from one pass over a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Tables enumerated
    pub tables: usize,
    /// Tables that qualified and were read
    pub metric_tables: usize,
    /// Qualifying tables whose query failed
    pub failed_tables: usize,
    /// Rows delivered
    pub rows: usize,
}

/// Read-only handle to one telemetry store
pub struct TelemetryStore {
    path: PathBuf,
    conn: Connection,
}

impl std::fmt::Debug for TelemetryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryStore")
            .field("path", &self.path)
            .finish()
    }
}

impl TelemetryStore {
    /// Open a store for reading
    ///
    /// # Errors
    ///
    /// `NotFound` if the file does not exist, `Store` if SQLite refuses it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(Error::NotFound { path });
        }
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(Error::store)?;

        debug!(target: "simstat::store", path = %path.display(), "Opened telemetry store");
        Ok(Self { path, conn })
    }

    /// Path this store was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Enumerate every table with its columns
    pub fn tables(&self) -> Result<Vec<TableInfo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .map_err(Error::store)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(Error::store)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::store)?;

        names
            .into_iter()
            .map(|name| {
                let columns = self.columns(&name)?;
                Ok(TableInfo { name, columns })
            })
            .collect()
    }

    /// Tables that qualify as metric sources
    pub fn metric_tables(&self) -> Result<Vec<MetricTable>> {
        Ok(self
            .tables()?
            .iter()
            .filter_map(|t| {
                let table = t.as_metric_table();
                if table.is_none() {
                    debug!(target: "simstat::store", table = %t.name, "Skipping table without metric columns");
                }
                table
            })
            .collect())
    }

    /// Stream every record from every metric table
    ///
    /// A qualifying table whose query fails is logged and skipped; the other
    /// tables are still read. Only failing to enumerate tables at all is an
    /// error.
    pub fn for_each_record<F>(&self, mut f: F) -> Result<ScanStats>
    where
        F: FnMut(MetricRecord),
    {
        let tables = self.tables()?;
        let mut stats = ScanStats {
            tables: tables.len(),
            ..ScanStats::default()
        };

        for table in tables.iter().filter_map(TableInfo::as_metric_table) {
            match self.scan_table(&table, &mut f) {
                Ok(rows) => {
                    stats.metric_tables += 1;
                    stats.rows += rows;
                }
                Err(e) => {
                    stats.failed_tables += 1;
                    warn!(
                        target: "simstat::store",
                        path = %self.path.display(),
                        table = %table.name,
                        error = %e,
                        "Failed to read metric table"
                    );
                }
            }
        }

        debug!(
            target: "simstat::store",
            path = %self.path.display(),
            tables = stats.tables,
            metric_tables = stats.metric_tables,
            rows = stats.rows,
            "Scanned telemetry store"
        );
        Ok(stats)
    }

    /// Collect every record from every metric table
    pub fn records(&self) -> Result<Vec<MetricRecord>> {
        let mut records = Vec::new();
        self.for_each_record(|r| records.push(r))?;
        Ok(records)
    }

    fn columns(&self, table: &str) -> Result<Vec<String>> {
        let sql = format!("PRAGMA table_info({})", quote_ident(table));
        let mut stmt = self.conn.prepare(&sql).map_err(Error::store)?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .map_err(Error::store)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::store)?;
        Ok(columns)
    }

    fn scan_table<F>(&self, table: &MetricTable, f: &mut F) -> Result<usize>
    where
        F: FnMut(MetricRecord),
    {
        let unit = if table.has_unit {
            quote_ident(UNIT_COLUMN)
        } else {
            "''".to_string()
        };
        let sql = format!(
            "SELECT {}, {}, {}, {} FROM {}",
            quote_ident(LOCATION_COLUMN),
            quote_ident(WHAT_COLUMN),
            quote_ident(VALUE_COLUMN),
            unit,
            quote_ident(&table.name)
        );

        let mut stmt = self.conn.prepare(&sql).map_err(Error::store)?;
        let mut rows = stmt.query([]).map_err(Error::store)?;
        let mut count = 0;
        while let Some(row) = rows.next().map_err(Error::store)? {
            let record = MetricRecord {
                location: text_of(row.get_ref(0).map_err(Error::store)?),
                metric_name: text_of(row.get_ref(1).map_err(Error::store)?),
                value: raw_value_of(row.get_ref(2).map_err(Error::store)?),
                unit: text_of(row.get_ref(3).map_err(Error::store)?),
            };
            f(record);
            count += 1;
        }
        Ok(count)
    }
}

/// Quote an SQL identifier, doubling embedded quotes
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn text_of(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(r) => r.to_string(),
        ValueRef::Text(b) | ValueRef::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

fn raw_value_of(value: ValueRef<'_>) -> RawValue {
    match value {
        ValueRef::Null => RawValue::Null,
        ValueRef::Integer(i) => RawValue::Number(i as f64),
        ValueRef::Real(r) => RawValue::Number(r),
        ValueRef::Text(b) | ValueRef::Blob(b) => {
            RawValue::Text(String::from_utf8_lossy(b).into_owned())
        }
    }
}
