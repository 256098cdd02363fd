//! Core types for simstat
//!
//! This module defines the foundational types:
//! - RunId: (configuration, benchmark) identifier for one simulator run
//! - RawValue: Value column as stored, before numeric coercion
//! - MetricRecord: One telemetry row
//! - CanonicalLocation: Location string with per-instance indices stripped
//! - MetricKey: Grouping key used by aggregation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for one simulator run
///
/// Runs are addressed by the experiment configuration they were produced
/// under (e.g. `normal`, `l1-prefetcher`, `tlb_128`) and the benchmark name.
/// Ordering is configuration-major so a `BTreeMap<RunId, _>` groups runs of
/// one configuration together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId {
    /// Experiment configuration name
    pub configuration: String,
    /// Benchmark name
    pub benchmark: String,
}

impl RunId {
    /// Create a new RunId
    pub fn new(configuration: impl Into<String>, benchmark: impl Into<String>) -> Self {
        Self {
            configuration: configuration.into(),
            benchmark: benchmark.into(),
        }
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.configuration, self.benchmark)
    }
}

/// Value column of a telemetry row, as read from the store
///
/// The store's `Value` column is loosely typed: most rows carry a number,
/// some carry text, a few are NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    /// SQL NULL
    Null,
    /// Integer or real column value
    Number(f64),
    /// Text column value (may or may not parse as a number)
    Text(String),
}

impl RawValue {
    /// Numeric view of the value
    ///
    /// Text is trimmed and parsed as a float. Returns `None` for NULL,
    /// unparseable text, and non-finite numbers.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            RawValue::Null => return None,
            RawValue::Number(v) => *v,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<Option<f64>> for RawValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(RawValue::Null, RawValue::Number)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => write!(f, "NULL"),
            RawValue::Number(v) => write!(f, "{}", v),
            RawValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// One telemetry row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Component path, e.g. `GPU[1].SA[3].L1VCache[0]`
    pub location: String,
    /// Metric name (`What` column), e.g. `read-hit`
    pub metric_name: String,
    /// Raw value
    pub value: RawValue,
    /// Unit, empty when the store has no `Unit` column
    pub unit: String,
}

impl MetricRecord {
    /// Create a new record
    pub fn new(
        location: impl Into<String>,
        metric_name: impl Into<String>,
        value: impl Into<RawValue>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            metric_name: metric_name.into(),
            value: value.into(),
            unit: unit.into(),
        }
    }
}

/// Component class identifier with per-instance indices stripped
///
/// `GPU[2].SA[1].L1VCache[3]` and `GPU[0].SA[0].L1VCache[0]` share the
/// canonical location `GPU.SA.L1VCache`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalLocation(String);

impl CanonicalLocation {
    /// Wrap an already-canonical string
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Borrow the string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this location belongs to the given class
    ///
    /// Class matching is substring-based: `L1VCache` matches both
    /// `GPU.SA.L1VCache` and any location that no rule recognised but still
    /// names an L1VCache instance.
    pub fn is_class(&self, class: &str) -> bool {
        self.0.contains(class)
    }
}

impl fmt::Display for CanonicalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalLocation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Grouping key for aggregation: (canonical location, metric name, unit)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricKey {
    /// Canonical location
    pub location: CanonicalLocation,
    /// Metric name
    pub metric_name: String,
    /// Unit
    pub unit: String,
}

impl MetricKey {
    /// Create a new key
    pub fn new(
        location: CanonicalLocation,
        metric_name: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            location,
            metric_name: metric_name.into(),
            unit: unit.into(),
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.location, self.metric_name, self.unit)
    }
}
