//! Output → human/json/raw string formatting.
//!
//! Three modes:
//! - **Human** (default): aligned tables, two decimals, `N/A` for unavailable
//! - **JSON** (`--json`): `serde_json::to_string_pretty`
//! - **Raw** (`--raw`): tab-separated values, no headers

use serde::Serialize;
use simstat_core::Error;
use simstat_engine::export::stats_line;
use simstat_engine::{CacheReport, ComparisonRow, ImprovementSummary, MetricQuery, SweepPoint};

use crate::run::{Output, ScanReport};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Raw,
}

/// Format a successful output.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match output {
        Output::Normalized(pairs) => format_normalized(pairs, mode),
        Output::Stats { written, metrics } => match (mode, written) {
            (OutputMode::Json, _) => to_json(metrics),
            (_, Some((path, lines))) => match mode {
                OutputMode::Raw => path.display().to_string(),
                _ => format!("Wrote {} lines to {}", lines, path.display()),
            },
            (_, None) => metrics.iter().map(stats_line).collect::<Vec<_>>().join("\n"),
        },
        Output::Cache(report) => format_cache_report(report, mode),
        Output::Metric(query) => format_metric_query(query, mode),
        Output::Scan(report) => format_scan(report, mode),
        Output::Comparison { rows, summary, classes } => {
            format_comparison(rows, summary, classes, mode)
        }
        Output::Sweep { metric, baseline, points } => {
            format_sweep(&metric.to_string(), baseline, points, mode)
        }
        Output::ConfigWritten { path, created } => match mode {
            OutputMode::Json => to_json(&serde_json::json!({ "path": path, "created": created })),
            OutputMode::Raw => path.display().to_string(),
            OutputMode::Human if *created => format!("Wrote default config to {}", path.display()),
            OutputMode::Human => format!("{} already exists, left unchanged", path.display()),
        },
        Output::NoData(what) => match mode {
            OutputMode::Json => to_json(&serde_json::json!({ "error": "no data found", "detail": what })),
            OutputMode::Raw => String::new(),
            OutputMode::Human => format!("No data found: {}", what),
        },
    }
}

/// Format an error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(&serde_json::json!({ "error": err.to_string() })),
        OutputMode::Raw => format!("{}", err),
        OutputMode::Human => format!("(error) {}", err),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize output: {}\"}}", e))
}

// =========================================================================
// Scalars
// =========================================================================

/// Fixed-precision number or `N/A`.
pub fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "N/A".to_string(),
    }
}

/// Signed percentage with one decimal, or `N/A`.
pub fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.1}%", v),
        None => "N/A".to_string(),
    }
}

/// Runtime as `HH:MM`, rounding up from 30 seconds.
pub fn runtime_to_hhmm(seconds: Option<f64>) -> String {
    let Some(seconds) = seconds.filter(|s| s.is_finite() && *s >= 0.0) else {
        return "N/A".to_string();
    };
    let total_minutes = (seconds / 60.0).floor() as u64;
    let remaining = seconds - total_minutes as f64 * 60.0;
    let mut hours = total_minutes / 60;
    let mut mins = total_minutes % 60;
    if remaining >= 30.0 {
        mins += 1;
        if mins == 60 {
            hours += 1;
            mins = 0;
        }
    }
    format!("{:02}:{:02}", hours, mins)
}

/// Left-aligned table with a header rule.
fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    let mut out = vec![line(headers), "=".repeat(total)];
    out.extend(rows.iter().map(|r| line(r)));
    out.join("\n")
}

fn raw_rows(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|r| r.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

// =========================================================================
// Per-command formatting
// =========================================================================

fn format_normalized(pairs: &[(String, String)], mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(
            &pairs
                .iter()
                .map(|(raw, canonical)| serde_json::json!({ "location": raw, "canonical": canonical }))
                .collect::<Vec<_>>(),
        ),
        OutputMode::Raw => pairs
            .iter()
            .map(|(_, c)| c.clone())
            .collect::<Vec<_>>()
            .join("\n"),
        OutputMode::Human => pairs
            .iter()
            .map(|(raw, c)| format!("{} -> {}", raw, c))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn format_cache_report(report: &CacheReport, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(report),
        OutputMode::Raw => raw_rows(
            &report
                .classes
                .iter()
                .chain(std::iter::once(&report.overall))
                .flat_map(|s| s.entries.iter())
                .map(|e| {
                    vec![
                        e.class.clone(),
                        e.metric.clone(),
                        fmt_opt(e.mean, 4),
                        e.sample_count.to_string(),
                    ]
                })
                .collect::<Vec<_>>(),
        ),
        OutputMode::Human => {
            let mut lines = vec!["=== Cache Statistics ===".to_string()];
            for section in report.classes.iter().chain(std::iter::once(&report.overall)) {
                lines.push(String::new());
                lines.push(format!("{} Statistics:", section.class));
                if section.is_empty() {
                    lines.push(format!("  No statistics found for {}", section.class));
                    continue;
                }
                for e in &section.entries {
                    match e.mean {
                        Some(mean) => lines.push(format!(
                            "  {}: {:.4} (from {} samples)",
                            e.metric, mean, e.sample_count
                        )),
                        None => lines.push(format!("  {}: No data found", e.metric)),
                    }
                }
            }
            lines.join("\n")
        }
    }
}

fn format_metric_query(query: &MetricQuery, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(query),
        OutputMode::Raw => format!("{}\t{}", fmt_opt(query.mean, 4), query.sample_count),
        OutputMode::Human => match query.mean {
            Some(mean) => format!(
                "Found {} {} {} values\nAverage {} {}: {:.2}",
                query.sample_count, query.class, query.metric, query.class, query.metric, mean
            ),
            None => format!("No {} {} values found", query.class, query.metric),
        },
    }
}

fn format_scan(report: &ScanReport, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(report),
        OutputMode::Raw => {
            let mut cells = vec![
                fmt_opt(report.runtime_seconds, 3),
                fmt_opt(report.accuracy, 2),
            ];
            cells.extend(report.custom.iter().map(|v| v.to_string()));
            cells.join("\t")
        }
        OutputMode::Human => {
            if !report.readable {
                return format!("Run log {} not found or unreadable", report.path.display());
            }
            let mut lines = vec![
                format!("Runtime:  {} s ({})", fmt_opt(report.runtime_seconds, 3), runtime_to_hhmm(report.runtime_seconds)),
                format!("Accuracy: {} ({} of {} matches)", report.accuracy.map_or("N/A".to_string(), |a| format!("{:.2}%", a)), report.policy.as_str(), report.accuracy_matches),
            ];
            if let Some(pattern) = &report.pattern {
                let values: Vec<String> = report.custom.iter().map(|v| v.to_string()).collect();
                lines.push(format!("{}: [{}]", pattern, values.join(", ")));
            }
            lines.join("\n")
        }
    }
}

/// Per-row table cells, in header order.
fn comparison_cells(row: &ComparisonRow, classes: &[String]) -> Vec<String> {
    let mut cells = vec![row.benchmark.clone()];
    for class in classes {
        let stats = |side: &Option<simstat_engine::SideMetrics>| {
            side.as_ref().and_then(|s| s.cache(class)).cloned()
        };
        let (b, v) = (stats(&row.baseline), stats(&row.variant));
        cells.push(fmt_opt(b.as_ref().and_then(|s| s.read_misses), 2));
        cells.push(fmt_opt(v.as_ref().and_then(|s| s.read_misses), 2));
        cells.push(fmt_opt(b.as_ref().and_then(|s| s.miss_rate), 4));
        cells.push(fmt_opt(v.as_ref().and_then(|s| s.miss_rate), 4));
        cells.push(fmt_pct(row.read_miss_reduction_pct(class)));
    }
    cells.push(runtime_to_hhmm(row.max_runtime_seconds));
    cells.push(fmt_pct(row.ipc_delta_pct));
    cells.push(fmt_pct(row.throughput_delta_pct));
    cells.push(
        row.variant
            .as_ref()
            .and_then(|s| s.prefetch_accuracy)
            .map_or("N/A".to_string(), |a| format!("{:.2}%", a)),
    );
    cells.push(fmt_opt(row.baseline.as_ref().and_then(|s| s.l2_average_accesses), 2));
    cells.push(fmt_opt(row.variant.as_ref().and_then(|s| s.l2_average_accesses), 2));
    cells
}

fn comparison_headers(classes: &[String]) -> Vec<String> {
    let mut headers = vec!["Benchmark".to_string()];
    for class in classes {
        headers.push(format!("{} Read Miss (base)", class));
        headers.push(format!("{} Read Miss (var)", class));
        headers.push(format!("{} Miss Rate (base)", class));
        headers.push(format!("{} Miss Rate (var)", class));
        headers.push(format!("{} Miss Reduction", class));
    }
    for h in [
        "Runtime (HH:MM)",
        "IPC Change",
        "Throughput Change",
        "Prefetch Accuracy",
        "L2 Accesses (base)",
        "L2 Accesses (var)",
    ] {
        headers.push(h.to_string());
    }
    headers
}

fn format_comparison(
    rows: &[ComparisonRow],
    summary: &ImprovementSummary,
    classes: &[String],
    mode: OutputMode,
) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(|r| comparison_cells(r, classes)).collect();
    match mode {
        OutputMode::Json => to_json(&serde_json::json!({ "rows": rows, "summary": summary })),
        OutputMode::Raw => raw_rows(&cells),
        OutputMode::Human => {
            let mut out = render_table(&comparison_headers(classes), &cells);
            out.push_str("\n\n");
            out.push_str(&format_improvements(summary));
            out
        }
    }
}

fn format_improvements(summary: &ImprovementSummary) -> String {
    let (Some(best), Some(worst)) = (&summary.best, &summary.worst) else {
        return format!("No valid comparison data for {}.", summary.metric);
    };
    let mut lines = vec![
        format!("Summary ({}):", summary.metric),
        format!("Benchmarks with valid data: {}", summary.valid),
        format!("Average improvement: {}", fmt_pct(summary.average_pct)),
        format!("Best improvement: {} ({})", best.benchmark, fmt_pct(Some(best.improvement_pct))),
        format!("Worst improvement: {} ({})", worst.benchmark, fmt_pct(Some(worst.improvement_pct))),
        String::new(),
        "Detailed results (sorted by improvement):".to_string(),
    ];
    lines.extend(
        summary
            .ranked
            .iter()
            .map(|r| format!("  {}: {}", r.benchmark, fmt_pct(Some(r.improvement_pct)))),
    );
    lines.join("\n")
}

fn format_sweep(metric: &str, baseline: &str, points: &[SweepPoint], mode: OutputMode) -> String {
    let cells: Vec<Vec<String>> = points
        .iter()
        .map(|p| {
            vec![
                p.benchmark.clone(),
                p.configuration.clone(),
                fmt_opt(p.value, 4),
                fmt_opt(p.normalized, 4),
            ]
        })
        .collect();
    match mode {
        OutputMode::Json => to_json(&serde_json::json!({
            "metric": metric,
            "baseline": baseline,
            "points": points,
        })),
        OutputMode::Raw => raw_rows(&cells),
        OutputMode::Human => {
            let headers = [
                "Benchmark".to_string(),
                "Configuration".to_string(),
                metric.to_string(),
                format!("Normalized (vs {})", baseline),
            ];
            render_table(&headers, &cells)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hhmm_rounds_up_from_thirty_seconds() {
        assert_eq!(runtime_to_hhmm(Some(123.456)), "00:02");
        assert_eq!(runtime_to_hhmm(Some(89.0)), "00:01");
        assert_eq!(runtime_to_hhmm(Some(90.0)), "00:02");
        assert_eq!(runtime_to_hhmm(Some(3599.0)), "01:00");
        assert_eq!(runtime_to_hhmm(Some(7260.0)), "02:01");
        assert_eq!(runtime_to_hhmm(None), "N/A");
    }

    #[test]
    fn optional_numbers() {
        assert_eq!(fmt_opt(Some(0.2), 2), "0.20");
        assert_eq!(fmt_opt(None, 2), "N/A");
        assert_eq!(fmt_pct(Some(75.0)), "+75.0%");
        assert_eq!(fmt_pct(Some(-3.24)), "-3.2%");
        assert_eq!(fmt_pct(None), "N/A");
    }

    #[test]
    fn table_columns_align() {
        let headers = vec!["A".to_string(), "Long header".to_string()];
        let rows = vec![vec!["value".to_string(), "x".to_string()]];
        let table = render_table(&headers, &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "A      Long header");
        assert_eq!(lines[1].len(), 5 + 2 + 11);
        assert_eq!(lines[2], "value  x");
    }

    #[test]
    fn error_modes() {
        let err = Error::invalid_input("bad");
        assert_eq!(format_error(&err, OutputMode::Human), "(error) invalid input: bad");
        assert!(format_error(&err, OutputMode::Json).contains("\"error\""));
    }

    #[test]
    fn no_data_message() {
        let out = format_output(&Output::NoData("no runs under exp".into()), OutputMode::Human);
        assert_eq!(out, "No data found: no runs under exp");
    }
}
