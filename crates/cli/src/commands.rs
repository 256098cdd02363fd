//! Clap command tree definition.
//!
//! Builds the full `clap::Command` tree for the `simstat` binary.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("simstat")
        .about("Telemetry aggregation and comparison for GPU simulator runs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .help("Config file (default: simstat.toml in the experiment root)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("raw")
                .global(true),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Raw output mode (tab-separated, no headers)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log more (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(build_normalize())
        .subcommand(build_stats())
        .subcommand(build_cache())
        .subcommand(build_metric())
        .subcommand(build_scan())
        .subcommand(build_compare())
        .subcommand(build_sweep())
        .subcommand(build_init())
}

// =========================================================================
// Single store / log
// =========================================================================

fn store_arg() -> Arg {
    Arg::new("store")
        .help("Telemetry store (.sqlite3); prompted for when omitted")
        .required(false)
}

fn build_normalize() -> Command {
    Command::new("normalize")
        .about("Print the canonical form of component locations")
        .arg(
            Arg::new("locations")
                .help("Locations such as GPU[1].SA[0].L1VCache[2]")
                .required(true)
                .num_args(1..),
        )
}

fn build_stats() -> Command {
    Command::new("stats")
        .about("Aggregate a store into one mean per (location, metric, unit)")
        .arg(store_arg())
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Write stats to this file (default: stats.log next to the store)"),
        )
        .arg(
            Arg::new("print")
                .long("print")
                .help("Print to stdout instead of writing a file")
                .action(ArgAction::SetTrue)
                .conflicts_with("output"),
        )
}

fn build_cache() -> Command {
    Command::new("cache")
        .about("Hit counters per cache class, with a pooled overall section")
        .arg(store_arg())
        .arg(
            Arg::new("class")
                .long("class")
                .help("Cache class to report (repeatable; default from config)")
                .action(ArgAction::Append),
        )
}

fn build_metric() -> Command {
    Command::new("metric")
        .about("Mean of one metric over one location class")
        .arg(store_arg())
        .arg(
            Arg::new("class")
                .long("class")
                .help("Location class substring")
                .default_value("L1VCache"),
        )
        .arg(
            Arg::new("metric")
                .long("metric")
                .help("Metric name")
                .default_value("read-miss"),
        )
}

fn build_scan() -> Command {
    Command::new("scan")
        .about("Extract runtime and accuracy from the tail of a run log")
        .arg(
            Arg::new("log")
                .help("Run log; prompted for when omitted")
                .required(false),
        )
        .arg(
            Arg::new("label")
                .long("label")
                .help("Label printed before the accuracy percentage"),
        )
        .arg(
            Arg::new("policy")
                .long("policy")
                .help("How repeated accuracy values collapse")
                .value_parser(["mean", "first", "last"]),
        )
        .arg(
            Arg::new("lines")
                .long("lines")
                .help("Tail lines to inspect")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("pattern")
                .long("pattern")
                .help("Extra regex whose first capture group is a number"),
        )
}

// =========================================================================
// Experiment tree
// =========================================================================

fn root_arg() -> Arg {
    Arg::new("root")
        .help("Experiment root holding one directory per configuration")
        .default_value(".")
}

fn build_compare() -> Command {
    Command::new("compare")
        .about("Compare every benchmark across a baseline and a variant configuration")
        .arg(root_arg())
        .arg(
            Arg::new("baseline")
                .long("baseline")
                .help("Baseline configuration directory (default from config)"),
        )
        .arg(
            Arg::new("variant")
                .long("variant")
                .help("Variant configuration directory (default from config)"),
        )
        .arg(
            Arg::new("rank")
                .long("rank")
                .help("Improvement to rank by: ipc, throughput or read-miss[:class]")
                .default_value("read-miss"),
        )
}

fn build_sweep() -> Command {
    Command::new("sweep")
        .about("Normalize a metric across configurations against a baseline")
        .arg(root_arg())
        .arg(
            Arg::new("baseline")
                .long("baseline")
                .help("Configuration every value is divided by")
                .required(true),
        )
        .arg(
            Arg::new("metric")
                .long("metric")
                .help("ipc, throughput, runtime, miss-rate[:class], hit-rate[:class], tlb-hit-rate[:class]")
                .default_value("ipc"),
        )
        .arg(
            Arg::new("configs")
                .long("configs")
                .help("Configurations to include (default: every directory under root)")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
}

fn build_init() -> Command {
    Command::new("init")
        .about("Write a default simstat.toml into the experiment root if none exists")
        .arg(root_arg())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn json_and_raw_conflict() {
        let res = build_cli().try_get_matches_from(["simstat", "--json", "--raw", "normalize", "x"]);
        assert!(res.is_err());
    }

    #[test]
    fn verbose_counts() {
        let m = build_cli()
            .try_get_matches_from(["simstat", "-vv", "normalize", "GPU[0].RDMA"])
            .unwrap();
        assert_eq!(m.get_count("verbose"), 2);
    }

    #[test]
    fn sweep_configs_split_on_comma() {
        let m = build_cli()
            .try_get_matches_from(["simstat", "sweep", "exp", "--baseline", "tlb_64", "--configs", "tlb_64,tlb_128"])
            .unwrap();
        let (_, sub) = m.subcommand().unwrap();
        let configs: Vec<&String> = sub.get_many::<String>("configs").unwrap().collect();
        assert_eq!(configs, vec!["tlb_64", "tlb_128"]);
    }
}
