//! Experiment discovery
//!
//! Experiments are laid out on disk as
//!
//! ```text
//! <root>/
//!   <configuration>/
//!     timing_report.txt          (optional, shared by the configuration)
//!     <benchmark>/
//!       akita_sim_<id>.sqlite3
//!       timing_report.txt        (optional, per benchmark)
//! ```
//!
//! Each benchmark directory becomes one [`RunLocation`]. The store is the
//! lexicographically first file with the store extension; the run log is
//! looked up in the benchmark directory first, then in the configuration
//! directory. Missing pieces are recorded as `None`, never as errors.

use crate::config::AnalysisConfig;
use crate::summary::{RunSummary, SummaryBuilder};
use simstat_core::{Error, Result, RunId};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where one run's inputs live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLocation {
    /// Which run this is
    pub id: RunId,
    /// Benchmark directory
    pub directory: PathBuf,
    /// Telemetry store, if one was found
    pub store: Option<PathBuf>,
    /// Run log, if one was found
    pub report: Option<PathBuf>,
}

/// Sorted names of the subdirectories of `dir`
fn subdirectories(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// First file in `dir` with the given extension, by name
pub fn find_store(dir: &Path, extension: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == extension))
        .min()
}

/// Configuration directories directly under `root`
///
/// # Errors
///
/// Returns `Error::NotFound` when `root` is not a directory.
pub fn discover_configurations(root: &Path) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(Error::NotFound {
            path: root.to_path_buf(),
        });
    }
    subdirectories(root)
}

/// Every benchmark run under the given configurations
///
/// A configuration directory that does not exist is reported and skipped,
/// so its benchmarks simply show up as one-sided in a comparison.
///
/// # Errors
///
/// Returns `Error::NotFound` when `root` is not a directory, or an I/O
/// error when a directory listing fails.
pub fn discover_runs<S: AsRef<str>>(
    root: &Path,
    configurations: &[S],
    config: &AnalysisConfig,
) -> Result<Vec<RunLocation>> {
    if !root.is_dir() {
        return Err(Error::NotFound {
            path: root.to_path_buf(),
        });
    }

    let mut runs = Vec::new();
    for configuration in configurations {
        let configuration = configuration.as_ref();
        let config_dir = root.join(configuration);
        if !config_dir.is_dir() {
            warn!(
                target: "simstat::discover",
                configuration,
                path = %config_dir.display(),
                "Configuration directory not found"
            );
            continue;
        }

        let shared_report = Some(config_dir.join(&config.report_file)).filter(|p| p.is_file());
        for benchmark in subdirectories(&config_dir)? {
            let directory = config_dir.join(&benchmark);
            let store = find_store(&directory, &config.store_extension);
            let report = Some(directory.join(&config.report_file))
                .filter(|p| p.is_file())
                .or_else(|| shared_report.clone());
            if store.is_none() {
                warn!(
                    target: "simstat::discover",
                    configuration,
                    benchmark = %benchmark,
                    "No telemetry store in benchmark directory"
                );
            }
            runs.push(RunLocation {
                id: RunId::new(configuration, benchmark),
                directory,
                store,
                report,
            });
        }
    }

    info!(
        target: "simstat::discover",
        root = %root.display(),
        runs = runs.len(),
        "Discovered runs"
    );
    Ok(runs)
}

/// Build a summary for every discovered run
///
/// Prefetch accuracy is only read for runs of `accuracy_configuration`.
pub fn load_summaries(
    runs: &[RunLocation],
    builder: &SummaryBuilder<'_>,
    accuracy_configuration: Option<&str>,
) -> BTreeMap<RunId, RunSummary> {
    runs.iter()
        .map(|run| {
            let with_accuracy = accuracy_configuration == Some(run.id.configuration.as_str());
            let summary = builder.build(
                run.id.clone(),
                run.store.as_deref(),
                run.report.as_deref(),
                with_accuracy,
            );
            (run.id.clone(), summary)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_discovers_layout() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("normal/fir/akita_sim_b.sqlite3"));
        touch(&root.join("normal/fir/akita_sim_a.sqlite3"));
        touch(&root.join("normal/fir/timing_report.txt"));
        touch(&root.join("normal/fft/notes.txt"));
        touch(&root.join("l1-prefetcher/fir/akita_sim_c.sqlite3"));
        touch(&root.join("l1-prefetcher/timing_report.txt"));

        let config = AnalysisConfig::default();
        let runs = discover_runs(root, &["normal", "l1-prefetcher"], &config).unwrap();
        assert_eq!(runs.len(), 3);

        let fft = &runs[0];
        assert_eq!(fft.id, RunId::new("normal", "fft"));
        assert!(fft.store.is_none());
        assert!(fft.report.is_none());

        let fir = &runs[1];
        assert_eq!(fir.store.as_deref(), Some(root.join("normal/fir/akita_sim_a.sqlite3").as_path()));
        assert_eq!(fir.report.as_deref(), Some(root.join("normal/fir/timing_report.txt").as_path()));

        let pf = &runs[2];
        assert_eq!(pf.id, RunId::new("l1-prefetcher", "fir"));
        assert_eq!(pf.report.as_deref(), Some(root.join("l1-prefetcher/timing_report.txt").as_path()));
    }

    #[test]
    fn test_missing_configuration_skipped() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("normal/fir/x.sqlite3"));
        let runs = discover_runs(dir.path(), &["normal", "absent"], &AnalysisConfig::default()).unwrap();
        assert_eq!(runs.len(), 1);
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = discover_runs(&missing, &["normal"], &AnalysisConfig::default()).unwrap_err();
        assert!(err.is_missing_resource());
        assert!(discover_configurations(&missing).is_err());
    }

    #[test]
    fn test_configurations_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["tlb_64", "tlb_128", "tlb_192"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        touch(&dir.path().join("simstat.toml"));
        assert_eq!(
            discover_configurations(dir.path()).unwrap(),
            vec!["tlb_128", "tlb_192", "tlb_64"]
        );
    }

    #[test]
    fn test_load_summaries_degrades() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("normal/fir")).unwrap();
        let runs = discover_runs(dir.path(), &["normal"], &AnalysisConfig::default()).unwrap();
        let summaries = load_summaries(&runs, &SummaryBuilder::default(), None);
        let fir = &summaries[&RunId::new("normal", "fir")];
        assert!(!fir.store_available);
        assert!(fir.metrics.is_empty());
    }
}
