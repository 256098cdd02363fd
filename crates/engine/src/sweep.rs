//! Sweep normalization
//!
//! A sweep is a family of configurations that vary one structure parameter
//! (e.g. `tlb_64`, `tlb_128`, `tlb_256`). Each configuration's metric is
//! expressed relative to a designated baseline configuration for the same
//! benchmark: `value / baseline_value`.
//!
//! A baseline value of zero, or a missing one, makes every normalized value
//! for that benchmark unavailable. The baseline's own point is exactly
//! `1.0` whenever its value is usable.

use crate::summary::RunSummary;
use serde::{Deserialize, Serialize};
use simstat_core::names::{L1V_CACHE, L1V_TLB};
use simstat_core::{Error, RunId};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Metric normalized across a sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepMetric {
    /// Instructions per cycle
    Ipc,
    /// Instructions per unit of kernel time
    Throughput,
    /// Read miss rate of a cache class
    MissRate(String),
    /// Read hit rate of a cache class
    CacheHitRate(String),
    /// Hit rate of a TLB class
    TlbHitRate(String),
    /// Wall-clock runtime from the run log
    Runtime,
}

impl SweepMetric {
    /// Raw value of this metric for one run
    pub fn value(&self, summary: &RunSummary) -> Option<f64> {
        match self {
            SweepMetric::Ipc => summary.ipc(),
            SweepMetric::Throughput => summary.throughput(),
            SweepMetric::MissRate(class) => summary.cache_stats(class).miss_rate,
            SweepMetric::CacheHitRate(class) => summary.cache_stats(class).hit_rate,
            SweepMetric::TlbHitRate(class) => summary.tlb_stats(class).hit_rate,
            SweepMetric::Runtime => summary.runtime_seconds,
        }
    }
}

impl fmt::Display for SweepMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepMetric::Ipc => f.write_str("ipc"),
            SweepMetric::Throughput => f.write_str("throughput"),
            SweepMetric::MissRate(c) => write!(f, "miss-rate:{}", c),
            SweepMetric::CacheHitRate(c) => write!(f, "hit-rate:{}", c),
            SweepMetric::TlbHitRate(c) => write!(f, "tlb-hit-rate:{}", c),
            SweepMetric::Runtime => f.write_str("runtime"),
        }
    }
}

impl FromStr for SweepMetric {
    type Err = Error;

    /// Parse `ipc`, `throughput`, `runtime`, or `<rate>[:<class>]`
    /// where `<rate>` is `miss-rate`, `hit-rate` or `tlb-hit-rate`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, class) = match s.split_once(':') {
            Some((name, class)) => (name.trim(), Some(class.trim().to_string())),
            None => (s.trim(), None),
        };
        if class.as_deref() == Some("") {
            return Err(Error::invalid_input(format!("empty class in sweep metric '{}'", s)));
        }
        let cache = || class.clone().unwrap_or_else(|| L1V_CACHE.to_string());
        match (name, &class) {
            ("ipc", None) => Ok(SweepMetric::Ipc),
            ("throughput", None) => Ok(SweepMetric::Throughput),
            ("runtime", None) => Ok(SweepMetric::Runtime),
            ("miss-rate", _) => Ok(SweepMetric::MissRate(cache())),
            ("hit-rate", _) => Ok(SweepMetric::CacheHitRate(cache())),
            ("tlb-hit-rate", _) => Ok(SweepMetric::TlbHitRate(
                class.clone().unwrap_or_else(|| L1V_TLB.to_string()),
            )),
            _ => Err(Error::invalid_input(format!(
                "unknown sweep metric '{}', expected ipc, throughput, runtime, \
                 miss-rate[:class], hit-rate[:class] or tlb-hit-rate[:class]",
                s
            ))),
        }
    }
}

/// One (configuration, benchmark) point of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Configuration of this point
    pub configuration: String,
    /// Benchmark of this point
    pub benchmark: String,
    /// Raw metric value
    pub value: Option<f64>,
    /// `value / baseline_value`; `None` when either is unusable
    pub normalized: Option<f64>,
}

/// Normalize `metric` for every run against `baseline`
///
/// Points are ordered by benchmark, then configuration. Benchmarks that
/// have no baseline run still get points, all with `normalized == None`.
pub fn normalize_sweep(
    summaries: &BTreeMap<RunId, RunSummary>,
    baseline: &str,
    metric: &SweepMetric,
) -> Vec<SweepPoint> {
    let baseline_values: BTreeMap<&str, f64> = summaries
        .iter()
        .filter(|(id, _)| id.configuration == baseline)
        .filter_map(|(id, s)| metric.value(s).map(|v| (id.benchmark.as_str(), v)))
        .collect();

    let mut points: Vec<SweepPoint> = summaries
        .iter()
        .map(|(id, summary)| {
            let value = metric.value(summary);
            let reference = baseline_values
                .get(id.benchmark.as_str())
                .copied()
                .filter(|&b| b != 0.0);
            let normalized = match (value, reference) {
                (Some(v), Some(b)) => Some(v / b).filter(|n| n.is_finite()),
                _ => None,
            };
            SweepPoint {
                configuration: id.configuration.clone(),
                benchmark: id.benchmark.clone(),
                value,
                normalized,
            }
        })
        .collect();
    points.sort_by(|a, b| {
        (a.benchmark.as_str(), a.configuration.as_str())
            .cmp(&(b.benchmark.as_str(), b.configuration.as_str()))
    });

    debug!(
        target: "simstat::sweep",
        baseline,
        metric = %metric,
        points = points.len(),
        "Sweep normalized"
    );
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use simstat_core::names::{CU_CPI, TLB_HIT, TLB_MISS};
    use simstat_core::{AggregatedMetric, CanonicalLocation, MetricKey, MetricSet};

    fn run(cfg: &str, bench: &str, metrics: &[(&str, &str, f64)]) -> (RunId, RunSummary) {
        let set: MetricSet = metrics
            .iter()
            .map(|(loc, name, mean)| AggregatedMetric {
                key: MetricKey::new(CanonicalLocation::new(*loc), *name, "count"),
                mean: *mean,
                sample_count: 1,
            })
            .collect();
        let id = RunId::new(cfg, bench);
        (id.clone(), RunSummary::from_metrics(id, set))
    }

    fn point<'a>(points: &'a [SweepPoint], cfg: &str, bench: &str) -> &'a SweepPoint {
        points
            .iter()
            .find(|p| p.configuration == cfg && p.benchmark == bench)
            .unwrap()
    }

    #[test]
    fn test_baseline_is_exactly_one() {
        let summaries: BTreeMap<_, _> = vec![
            run("tlb_64", "fir", &[("GPU.SA.CU", CU_CPI, 3.0)]),
            run("tlb_128", "fir", &[("GPU.SA.CU", CU_CPI, 1.5)]),
        ]
        .into_iter()
        .collect();
        let points = normalize_sweep(&summaries, "tlb_64", &SweepMetric::Ipc);
        assert_eq!(point(&points, "tlb_64", "fir").normalized, Some(1.0));
        let other = point(&points, "tlb_128", "fir").normalized.unwrap();
        assert!((other - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_baseline_unavailable() {
        let summaries: BTreeMap<_, _> = vec![
            run("tlb_64", "fir", &[("GPU.SA.L1VTLB", TLB_HIT, 0.0), ("GPU.SA.L1VTLB", TLB_MISS, 10.0)]),
            run("tlb_128", "fir", &[("GPU.SA.L1VTLB", TLB_HIT, 5.0), ("GPU.SA.L1VTLB", TLB_MISS, 5.0)]),
        ]
        .into_iter()
        .collect();
        let metric = SweepMetric::TlbHitRate("L1VTLB".into());
        let points = normalize_sweep(&summaries, "tlb_64", &metric);
        assert_eq!(point(&points, "tlb_64", "fir").value, Some(0.0));
        assert_eq!(point(&points, "tlb_64", "fir").normalized, None);
        assert_eq!(point(&points, "tlb_128", "fir").value, Some(0.5));
        assert_eq!(point(&points, "tlb_128", "fir").normalized, None);
    }

    #[test]
    fn test_missing_baseline_run() {
        let summaries: BTreeMap<_, _> = vec![
            run("tlb_64", "fir", &[("GPU.SA.CU", CU_CPI, 2.0)]),
            run("tlb_128", "fft", &[("GPU.SA.CU", CU_CPI, 2.0)]),
        ]
        .into_iter()
        .collect();
        let points = normalize_sweep(&summaries, "tlb_64", &SweepMetric::Ipc);
        assert_eq!(points.len(), 2);
        assert_eq!(point(&points, "tlb_128", "fft").normalized, None);
        assert_eq!(points[0].benchmark, "fft");
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!("ipc".parse::<SweepMetric>().unwrap(), SweepMetric::Ipc);
        assert_eq!(
            "miss-rate".parse::<SweepMetric>().unwrap(),
            SweepMetric::MissRate("L1VCache".into())
        );
        assert_eq!(
            "hit-rate:L2Cache".parse::<SweepMetric>().unwrap(),
            SweepMetric::CacheHitRate("L2Cache".into())
        );
        assert_eq!(
            "tlb-hit-rate".parse::<SweepMetric>().unwrap(),
            SweepMetric::TlbHitRate("L1VTLB".into())
        );
        assert!("ipc:L2Cache".parse::<SweepMetric>().is_err());
        assert!("miss-rate:".parse::<SweepMetric>().is_err());
        assert!("latency".parse::<SweepMetric>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for m in [
            SweepMetric::Ipc,
            SweepMetric::Runtime,
            SweepMetric::MissRate("L2Cache".into()),
            SweepMetric::TlbHitRate("L1VTLB".into()),
        ] {
            assert_eq!(m.to_string().parse::<SweepMetric>().unwrap(), m);
        }
    }
}
