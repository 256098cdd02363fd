//! Analysis configuration via `simstat.toml`
//!
//! Every knob has a default matching the simulator's usual experiment
//! layout, so an empty or missing file is a valid configuration. To change
//! settings, write `simstat.toml` next to the experiment root (or pass
//! `--config`) and edit it.

use crate::scan::{AccuracyPolicy, ReportScanner, DEFAULT_ACCURACY_LABEL, DEFAULT_BLOCK_SIZE, DEFAULT_TAIL_LINES};
use serde::{Deserialize, Serialize};
use simstat_core::names::{L1V_CACHE, L2_CACHE};
use simstat_core::{Error, Result};
use std::path::Path;

/// Config file name looked up in the experiment root
pub const CONFIG_FILE_NAME: &str = "simstat.toml";

/// Configuration for discovery, scanning and comparison
///
/// # Example
///
/// ```toml
/// baseline = "normal"
/// variant = "l1-prefetcher"
/// cache_classes = ["L1VCache", "L2Cache"]
/// tail_lines = 100
/// accuracy_policy = "mean"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Configuration directory used as the comparison baseline
    #[serde(default = "default_baseline")]
    pub baseline: String,
    /// Configuration directory compared against the baseline
    #[serde(default = "default_variant")]
    pub variant: String,
    /// Cache classes reported per row, matched as substrings of locations
    #[serde(default = "default_cache_classes")]
    pub cache_classes: Vec<String>,
    /// Lines inspected at the end of each run log
    #[serde(default = "default_tail_lines")]
    pub tail_lines: usize,
    /// Block size for backward log reads, in bytes
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    /// How repeated accuracy prints collapse into one value
    #[serde(default)]
    pub accuracy_policy: AccuracyPolicy,
    /// Literal label preceding the accuracy percentage
    #[serde(default = "default_accuracy_label")]
    pub accuracy_label: String,
    /// Run log file name
    #[serde(default = "default_report_file")]
    pub report_file: String,
    /// Telemetry store file extension, without the dot
    #[serde(default = "default_store_extension")]
    pub store_extension: String,
}

fn default_baseline() -> String {
    "normal".to_string()
}

fn default_variant() -> String {
    "l1-prefetcher".to_string()
}

fn default_cache_classes() -> Vec<String> {
    vec![L1V_CACHE.to_string(), L2_CACHE.to_string()]
}

fn default_tail_lines() -> usize {
    DEFAULT_TAIL_LINES
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_accuracy_label() -> String {
    DEFAULT_ACCURACY_LABEL.to_string()
}

fn default_report_file() -> String {
    "timing_report.txt".to_string()
}

fn default_store_extension() -> String {
    "sqlite3".to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            baseline: default_baseline(),
            variant: default_variant(),
            cache_classes: default_cache_classes(),
            tail_lines: default_tail_lines(),
            block_size: default_block_size(),
            accuracy_policy: AccuracyPolicy::default(),
            accuracy_label: default_accuracy_label(),
            report_file: default_report_file(),
            store_extension: default_store_extension(),
        }
    }
}

impl AnalysisConfig {
    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` on a zero line count or block size, identical
    /// baseline and variant, or an empty name field.
    pub fn validate(&self) -> Result<()> {
        if self.tail_lines == 0 {
            return Err(Error::config("tail_lines must be greater than 0"));
        }
        if self.block_size == 0 {
            return Err(Error::config("block_size must be greater than 0"));
        }
        if self.baseline.trim().is_empty() || self.variant.trim().is_empty() {
            return Err(Error::config("baseline and variant must be non-empty"));
        }
        if self.baseline == self.variant {
            return Err(Error::config(format!(
                "baseline and variant are both '{}'",
                self.baseline
            )));
        }
        if self.report_file.trim().is_empty() {
            return Err(Error::config("report_file must be non-empty"));
        }
        if self.cache_classes.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::config("cache_classes entries must be non-empty"));
        }
        Ok(())
    }

    /// Scanner honouring `tail_lines` and `block_size`
    pub fn scanner(&self) -> ReportScanner {
        ReportScanner::new(self.tail_lines).with_block_size(self.block_size)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# simstat analysis configuration
#
# Configuration directories compared by `simstat compare`
baseline = "normal"
variant = "l1-prefetcher"

# Cache classes reported per benchmark (substring of the canonical location)
cache_classes = ["L1VCache", "L2Cache"]

# Run log scanning: only the last `tail_lines` lines are read,
# backward in `block_size` byte blocks
report_file = "timing_report.txt"
tail_lines = 100
block_size = 4096

# Repeated accuracy prints: "mean" (default), "first" or "last"
accuracy_policy = "mean"
accuracy_label = "Prefetch Accuracy:"

# Telemetry store extension (without the dot)
store_extension = "sqlite3"
"#
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: AnalysisConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise the defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}
