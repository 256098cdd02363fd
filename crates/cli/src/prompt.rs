//! Interactive path prompt with rustyline.
//!
//! Store and log paths may be omitted on the command line. When stdin is a
//! terminal the user is asked for them; otherwise the command fails.

use std::io::IsTerminal;
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use simstat_core::{Error, Result};

/// Return `given`, or ask for a path to the `what`.
pub fn resolve_path(given: Option<PathBuf>, what: &str) -> Result<PathBuf> {
    if let Some(path) = given {
        return Ok(path);
    }
    if !std::io::stdin().is_terminal() {
        return Err(Error::invalid_input(format!(
            "no {} given and stdin is not a terminal",
            what
        )));
    }

    let mut rl = DefaultEditor::new()
        .map_err(|e| Error::invalid_input(format!("failed to start prompt: {}", e)))?;
    match rl.readline(&format!("Enter the path to the {}: ", what)) {
        Ok(line) => clean_input(&line)
            .map(PathBuf::from)
            .ok_or_else(|| Error::invalid_input(format!("no {} given", what))),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
            Err(Error::invalid_input("cancelled"))
        }
        Err(e) => Err(Error::invalid_input(format!(
            "failed to read {} path: {}",
            what, e
        ))),
    }
}

/// Trim whitespace and one pair of surrounding quotes.
fn clean_input(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed)
        .trim();
    (!unquoted.is_empty()).then_some(unquoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_path_is_returned() {
        let path = resolve_path(Some(PathBuf::from("a.sqlite3")), "telemetry store").unwrap();
        assert_eq!(path, PathBuf::from("a.sqlite3"));
    }

    #[test]
    fn input_cleanup() {
        assert_eq!(clean_input("  run/a.sqlite3 \n"), Some("run/a.sqlite3"));
        assert_eq!(clean_input("\"/tmp/my run/a.sqlite3\""), Some("/tmp/my run/a.sqlite3"));
        assert_eq!(clean_input("'x'"), Some("x"));
        assert_eq!(clean_input("   "), None);
        assert_eq!(clean_input("\"\""), None);
    }
}
