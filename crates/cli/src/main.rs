//! simstat CLI: telemetry aggregation and comparison for GPU simulator runs.
//!
//! One command per invocation: `simstat [flags] COMMAND`. Store and log
//! paths left off the command line are prompted for when stdin is a TTY.
//!
//! Exit codes: 0 on success (including "no data found"), 1 on any error,
//! 2 on a usage error from clap.

mod commands;
mod format;
mod parse;
mod prompt;
mod run;

use std::path::PathBuf;
use std::process;

use tracing::level_filters::LevelFilter;

use commands::build_cli;
use format::{format_error, format_output, OutputMode};
use parse::matches_to_action;
use run::{execute, load_config};

fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_count("verbose"));

    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    };

    let exit_code = run_shell_mode(&matches, output_mode);
    process::exit(exit_code);
}

/// Install the fmt subscriber on stderr; stdout carries results only.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(verbosity > 1)
        .with_writer(std::io::stderr)
        .init();
}

fn run_shell_mode(matches: &clap::ArgMatches, mode: OutputMode) -> i32 {
    let action = match matches_to_action(matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("(error) {}", e);
            return 1;
        }
    };

    let explicit = matches.get_one::<String>("config").map(PathBuf::from);
    let config = match load_config(explicit.as_deref(), &action) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            return 1;
        }
    };

    match execute(action, &config) {
        Ok(output) => {
            let formatted = format_output(&output, mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            1
        }
    }
}
