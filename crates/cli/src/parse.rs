//! ArgMatches → CliAction conversion.
//!
//! Translates clap's parsed arguments into one action per subcommand.
//! Paths that were omitted stay `None` here; the caller decides whether to
//! prompt for them.

use std::path::PathBuf;

use clap::ArgMatches;
use simstat_engine::{AccuracyPolicy, ImprovementMetric, SweepMetric};

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum CliAction {
    /// Canonical form of each location.
    Normalize { locations: Vec<String> },
    /// Aggregate a store into `stats.log` lines.
    Stats {
        store: Option<PathBuf>,
        output: Option<PathBuf>,
        print: bool,
    },
    /// Cache hit-counter report.
    Cache {
        store: Option<PathBuf>,
        classes: Vec<String>,
    },
    /// One metric over one class.
    Metric {
        store: Option<PathBuf>,
        class: String,
        metric: String,
    },
    /// Values from the tail of a run log.
    Scan {
        log: Option<PathBuf>,
        label: Option<String>,
        policy: Option<AccuracyPolicy>,
        lines: Option<usize>,
        pattern: Option<String>,
    },
    /// Baseline vs variant comparison over an experiment tree.
    Compare {
        root: PathBuf,
        baseline: Option<String>,
        variant: Option<String>,
        rank: RankSpec,
    },
    /// Sweep normalization over an experiment tree.
    Sweep {
        root: PathBuf,
        baseline: String,
        metric: SweepMetric,
        configs: Vec<String>,
    },
    /// Write the default config file.
    Init { root: PathBuf },
}

/// Improvement metric as typed on the command line
///
/// `read-miss` without a class resolves to the first configured cache
/// class, which is only known once the config is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankSpec {
    /// Fully specified metric.
    Metric(ImprovementMetric),
    /// Read-miss reduction on the first configured class.
    ReadMissDefault,
}

impl RankSpec {
    /// Resolve against the configured cache classes.
    pub fn resolve(&self, cache_classes: &[String]) -> ImprovementMetric {
        match self {
            RankSpec::Metric(m) => m.clone(),
            RankSpec::ReadMissDefault => ImprovementMetric::ReadMissReduction(
                cache_classes
                    .first()
                    .cloned()
                    .unwrap_or_else(|| simstat_core::names::L1V_CACHE.to_string()),
            ),
        }
    }
}

fn parse_rank(s: &str) -> Result<RankSpec, String> {
    match s.split_once(':') {
        None => match s {
            "ipc" => Ok(RankSpec::Metric(ImprovementMetric::Ipc)),
            "throughput" => Ok(RankSpec::Metric(ImprovementMetric::Throughput)),
            "read-miss" => Ok(RankSpec::ReadMissDefault),
            other => Err(format!(
                "Unknown rank metric '{}'. Expected ipc, throughput or read-miss[:class]",
                other
            )),
        },
        Some(("read-miss", class)) if !class.is_empty() => Ok(RankSpec::Metric(
            ImprovementMetric::ReadMissReduction(class.to_string()),
        )),
        Some(_) => Err(format!(
            "Unknown rank metric '{}'. Expected ipc, throughput or read-miss[:class]",
            s
        )),
    }
}

fn path(m: &ArgMatches, id: &str) -> Option<PathBuf> {
    m.get_one::<String>(id).map(PathBuf::from)
}

fn string(m: &ArgMatches, id: &str) -> Option<String> {
    m.get_one::<String>(id).cloned()
}

fn strings(m: &ArgMatches, id: &str) -> Vec<String> {
    m.get_many::<String>(id)
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default()
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, sub) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "normalize" => Ok(CliAction::Normalize {
            locations: strings(sub, "locations"),
        }),
        "stats" => Ok(CliAction::Stats {
            store: path(sub, "store"),
            output: path(sub, "output"),
            print: sub.get_flag("print"),
        }),
        "cache" => Ok(CliAction::Cache {
            store: path(sub, "store"),
            classes: strings(sub, "class"),
        }),
        "metric" => Ok(CliAction::Metric {
            store: path(sub, "store"),
            class: string(sub, "class").unwrap_or_default(),
            metric: string(sub, "metric").unwrap_or_default(),
        }),
        "scan" => Ok(CliAction::Scan {
            log: path(sub, "log"),
            label: string(sub, "label"),
            policy: string(sub, "policy")
                .map(|p| p.parse::<AccuracyPolicy>().map_err(|e| e.to_string()))
                .transpose()?,
            lines: sub.get_one::<usize>("lines").copied(),
            pattern: string(sub, "pattern"),
        }),
        "compare" => Ok(CliAction::Compare {
            root: path(sub, "root").unwrap_or_else(|| PathBuf::from(".")),
            baseline: string(sub, "baseline"),
            variant: string(sub, "variant"),
            rank: parse_rank(&string(sub, "rank").unwrap_or_else(|| "read-miss".to_string()))?,
        }),
        "sweep" => Ok(CliAction::Sweep {
            root: path(sub, "root").unwrap_or_else(|| PathBuf::from(".")),
            baseline: string(sub, "baseline").ok_or("--baseline is required")?,
            metric: string(sub, "metric")
                .unwrap_or_else(|| "ipc".to_string())
                .parse::<SweepMetric>()
                .map_err(|e| e.to_string())?,
            configs: strings(sub, "configs"),
        }),
        "init" => Ok(CliAction::Init {
            root: path(sub, "root").unwrap_or_else(|| PathBuf::from(".")),
        }),
        other => Err(format!("Unknown command '{}'", other)),
    }
}
