//! CliAction execution.
//!
//! Every action resolves its inputs, calls into the engine and returns one
//! [`Output`]. Formatting and exit codes are left to the caller.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use simstat_core::{Error, MetricSet, Result};
use simstat_engine::export::{write_stats_file, STATS_FILE_NAME};
use simstat_engine::{
    builder_for, cache_report, compare_with, discover_configurations, discover_runs,
    load_summaries, normalize_sweep, query_metric, summarize_improvements, AccuracyPolicy,
    AnalysisConfig, CacheReport, ComparisonRow, ExtractionPattern, ImprovementSummary,
    LocationNormalizer, MetricQuery, ReportScanner, SweepMetric, SweepPoint, CONFIG_FILE_NAME,
};

use crate::parse::CliAction;
use crate::prompt::resolve_path;

/// Values read from the tail of one run log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub path: PathBuf,
    pub readable: bool,
    pub runtime_seconds: Option<f64>,
    pub accuracy: Option<f64>,
    pub accuracy_matches: usize,
    pub policy: AccuracyPolicy,
    pub pattern: Option<String>,
    pub custom: Vec<f64>,
}

/// Result of one action.
#[derive(Debug, Clone)]
pub enum Output {
    /// `(raw, canonical)` pairs.
    Normalized(Vec<(String, String)>),
    /// Aggregated metrics; `written` holds the file and line count when exported.
    Stats {
        written: Option<(PathBuf, usize)>,
        metrics: MetricSet,
    },
    Cache(CacheReport),
    Metric(MetricQuery),
    Scan(ScanReport),
    Comparison {
        rows: Vec<ComparisonRow>,
        summary: ImprovementSummary,
        classes: Vec<String>,
    },
    Sweep {
        metric: SweepMetric,
        baseline: String,
        points: Vec<SweepPoint>,
    },
    ConfigWritten {
        path: PathBuf,
        created: bool,
    },
    /// The operation found nothing to report.
    NoData(String),
}

/// Load the analysis config for `action`.
///
/// An explicit `--config` must exist. Otherwise `simstat.toml` is looked up
/// in the experiment root (tree commands) or the working directory, and the
/// defaults apply when it is absent.
pub fn load_config(explicit: Option<&Path>, action: &CliAction) -> Result<AnalysisConfig> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(Error::NotFound {
                path: path.to_path_buf(),
            });
        }
        return AnalysisConfig::from_file(path);
    }
    let dir = match action {
        CliAction::Init { .. } => return Ok(AnalysisConfig::default()),
        CliAction::Compare { root, .. } | CliAction::Sweep { root, .. } => root.as_path(),
        _ => Path::new("."),
    };
    AnalysisConfig::load_or_default(&dir.join(CONFIG_FILE_NAME))
}

/// Execute `action` under `config`.
pub fn execute(action: CliAction, config: &AnalysisConfig) -> Result<Output> {
    match action {
        CliAction::Normalize { locations } => {
            let normalizer = LocationNormalizer::shared();
            Ok(Output::Normalized(
                locations
                    .into_iter()
                    .map(|raw| {
                        let canonical = normalizer.normalize(&raw).as_str().to_string();
                        (raw, canonical)
                    })
                    .collect(),
            ))
        }
        CliAction::Stats {
            store,
            output,
            print,
        } => {
            let store = resolve_path(store, "telemetry store")?;
            let metrics = aggregate(&store, config)?;
            if metrics.is_empty() {
                return Ok(Output::NoData(format!(
                    "no metric rows in {}",
                    store.display()
                )));
            }
            let written = if print {
                None
            } else {
                let target = output.unwrap_or_else(|| {
                    store
                        .parent()
                        .unwrap_or_else(|| Path::new("."))
                        .join(STATS_FILE_NAME)
                });
                let lines = write_stats_file(&metrics, &target)?;
                Some((target, lines))
            };
            Ok(Output::Stats { written, metrics })
        }
        CliAction::Cache { store, classes } => {
            let store = resolve_path(store, "telemetry store")?;
            let metrics = aggregate(&store, config)?;
            let classes = if classes.is_empty() {
                config.cache_classes.clone()
            } else {
                classes
            };
            let report = cache_report(&metrics, &classes);
            if report.overall.is_empty() {
                return Ok(Output::NoData(format!(
                    "no cache statistics in {}",
                    store.display()
                )));
            }
            Ok(Output::Cache(report))
        }
        CliAction::Metric {
            store,
            class,
            metric,
        } => {
            let store = resolve_path(store, "telemetry store")?;
            let metrics = aggregate(&store, config)?;
            Ok(Output::Metric(query_metric(&metrics, &class, &metric)))
        }
        CliAction::Scan {
            log,
            label,
            policy,
            lines,
            pattern,
        } => {
            let custom = pattern.as_deref().map(ExtractionPattern::custom).transpose()?;
            let accuracy_pattern =
                ExtractionPattern::percentage(label.as_deref().unwrap_or(&config.accuracy_label))?;
            let duration = ExtractionPattern::duration()?;
            let log = resolve_path(log, "run log")?;
            let policy = policy.unwrap_or(config.accuracy_policy);
            let scanner = ReportScanner::new(lines.unwrap_or(config.tail_lines))
                .with_block_size(config.block_size);

            let mut report = ScanReport {
                path: log.clone(),
                readable: false,
                runtime_seconds: None,
                accuracy: None,
                accuracy_matches: 0,
                policy,
                pattern: custom.as_ref().map(|p| p.as_str().to_string()),
                custom: Vec::new(),
            };
            if let Some(text) = scanner.tail_text(&log) {
                let accuracy = accuracy_pattern.extract(&text);
                report.readable = true;
                report.runtime_seconds = duration.extract(&text).first().copied();
                report.accuracy = policy.apply(&accuracy);
                report.accuracy_matches = accuracy.len();
                report.custom = custom.map(|p| p.extract(&text)).unwrap_or_default();
            }
            Ok(Output::Scan(report))
        }
        CliAction::Compare {
            root,
            baseline,
            variant,
            rank,
        } => {
            let baseline = baseline.unwrap_or_else(|| config.baseline.clone());
            let variant = variant.unwrap_or_else(|| config.variant.clone());
            if baseline == variant {
                return Err(Error::invalid_input(format!(
                    "baseline and variant are both '{}'",
                    baseline
                )));
            }

            let runs = discover_runs(&root, &[&baseline, &variant], config)?;
            if runs.is_empty() {
                return Ok(Output::NoData(format!(
                    "no runs of '{}' or '{}' under {}",
                    baseline,
                    variant,
                    root.display()
                )));
            }
            let summaries = load_summaries(&runs, &builder_for(config), Some(variant.as_str()));
            let rows = compare_with(&summaries, &baseline, &variant, &config.cache_classes);
            let summary = summarize_improvements(&rows, rank.resolve(&config.cache_classes));
            info!(
                target: "simstat::cli",
                rows = rows.len(),
                valid = summary.valid,
                "Comparison complete"
            );
            Ok(Output::Comparison {
                rows,
                summary,
                classes: config.cache_classes.clone(),
            })
        }
        CliAction::Sweep {
            root,
            baseline,
            metric,
            configs,
        } => {
            let mut configs = if configs.is_empty() {
                discover_configurations(&root)?
            } else {
                configs
            };
            if !configs.contains(&baseline) {
                debug!(target: "simstat::cli", baseline = %baseline, "Adding baseline to sweep");
                configs.push(baseline.clone());
            }

            let runs = discover_runs(&root, &configs, config)?;
            let summaries = load_summaries(&runs, &builder_for(config), None);
            let points = normalize_sweep(&summaries, &baseline, &metric);
            if points.is_empty() {
                return Ok(Output::NoData(format!("no runs under {}", root.display())));
            }
            Ok(Output::Sweep {
                metric,
                baseline,
                points,
            })
        }
        CliAction::Init { root } => {
            let path = root.join(CONFIG_FILE_NAME);
            let created = !path.exists();
            AnalysisConfig::write_default_if_missing(&path)?;
            Ok(Output::ConfigWritten { path, created })
        }
    }
}

fn aggregate(store: &Path, config: &AnalysisConfig) -> Result<MetricSet> {
    let (metrics, stats) = builder_for(config).aggregate_store(store)?;
    debug!(target: "simstat::cli", ?stats, "Store aggregated");
    Ok(metrics)
}
