//! ReportScanner: structured values from the tail of a run log
//!
//! Run logs are unstructured text that may grow without bound. Everything
//! of interest (the `real` timing line, the prefetcher's accuracy prints)
//! sits near the end, so the scanner only ever looks at the last
//! `max_lines` lines, read backward through [`ReverseLineReader`].
//!
//! A missing or unreadable log is never an error here: the scanner returns
//! "no value found" and the caller renders the field as unavailable.

pub mod pattern;
pub mod reverse;

pub use pattern::{parse_duration, ExtractionPattern, DEFAULT_ACCURACY_LABEL};
pub use reverse::{ReverseLineReader, TailWindow, DEFAULT_BLOCK_SIZE};

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Default number of tail lines inspected
pub const DEFAULT_TAIL_LINES: usize = 100;

/// How several matches of one percentage collapse into a single value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyPolicy {
    /// Arithmetic mean of every match
    #[default]
    Mean,
    /// First match in the window
    First,
    /// Last match in the window
    Last,
}

impl AccuracyPolicy {
    /// Collapse `values`; `None` when there are none
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        match self {
            AccuracyPolicy::Mean => {
                if values.is_empty() {
                    None
                } else {
                    Some(values.iter().sum::<f64>() / values.len() as f64)
                }
            }
            AccuracyPolicy::First => values.first().copied(),
            AccuracyPolicy::Last => values.last().copied(),
        }
    }

    /// Lowercase name as used in configuration files
    pub fn as_str(self) -> &'static str {
        match self {
            AccuracyPolicy::Mean => "mean",
            AccuracyPolicy::First => "first",
            AccuracyPolicy::Last => "last",
        }
    }
}

impl std::str::FromStr for AccuracyPolicy {
    type Err = simstat_core::Error;

    fn from_str(s: &str) -> simstat_core::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(AccuracyPolicy::Mean),
            "first" => Ok(AccuracyPolicy::First),
            "last" => Ok(AccuracyPolicy::Last),
            other => Err(simstat_core::Error::invalid_input(format!(
                "unknown accuracy policy '{}', expected mean, first or last",
                other
            ))),
        }
    }
}

/// Tail-of-log value extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportScanner {
    max_lines: usize,
    block_size: usize,
}

impl Default for ReportScanner {
    fn default() -> Self {
        Self::new(DEFAULT_TAIL_LINES)
    }
}

impl ReportScanner {
    /// Scanner over the last `max_lines` lines
    pub fn new(max_lines: usize) -> Self {
        Self {
            max_lines,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Override the backward-read block size
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Lines inspected per log
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Tail window of `path` joined with newlines, `None` if unreadable
    pub fn tail_text(&self, path: &Path) -> Option<String> {
        match self.read_tail(path) {
            Ok(window) => Some(window.text()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(target: "simstat::scan", path = %path.display(), "Run log not found");
                None
            }
            Err(e) => {
                warn!(
                    target: "simstat::scan",
                    path = %path.display(),
                    error = %e,
                    "Run log unreadable"
                );
                None
            }
        }
    }

    fn read_tail(&self, path: &Path) -> io::Result<TailWindow> {
        ReverseLineReader::open(path)?
            .with_block_size(self.block_size)
            .tail(self.max_lines)
    }

    /// Every match of `pattern` in the tail window, in order
    ///
    /// Empty when the log is missing or nothing matched.
    pub fn extract_values(&self, path: &Path, pattern: &ExtractionPattern) -> Vec<f64> {
        self.tail_text(path)
            .map(|text| pattern.extract(&text))
            .unwrap_or_default()
    }

    /// Wall-clock runtime in seconds from the first `real` line
    pub fn runtime_seconds(&self, path: &Path) -> Option<f64> {
        let pattern = ExtractionPattern::duration().ok()?;
        self.extract_values(path, &pattern).first().copied()
    }

    /// Percentage printed after `label`, collapsed with `policy`
    pub fn percentage(&self, path: &Path, label: &str, policy: AccuracyPolicy) -> Option<f64> {
        let pattern = ExtractionPattern::percentage(label).ok()?;
        policy.apply(&self.extract_values(path, &pattern))
    }
}
