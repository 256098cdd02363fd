//! Metric aggregation
//!
//! Groups telemetry records by (canonical location, metric name, unit) and
//! reduces each group to its mean.
//!
//! ## Order independence
//!
//! Feeding the same records in any order yields an identical [`MetricSet`],
//! bit for bit. Groups live in a `BTreeMap`, and each group's samples are
//! summed in ascending order at finish time, so floating-point summation
//! never depends on arrival order.
//!
//! ## Discards
//!
//! Records whose value is NULL or not numeric are dropped with a warning.
//! A group whose every record was dropped is not emitted at all.

use crate::normalize::LocationNormalizer;
use simstat_core::{AggregatedMetric, MetricKey, MetricRecord, MetricSet};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Counters from one aggregation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationStats {
    /// Records offered
    pub records: usize,
    /// Records dropped for a missing or non-numeric value
    pub discarded: usize,
}

/// Accumulation state for one aggregation pass
///
/// Owned by a single call chain; nothing here is shared or global.
#[derive(Debug)]
pub struct AggregationContext<'n> {
    normalizer: &'n LocationNormalizer,
    groups: BTreeMap<MetricKey, Vec<f64>>,
    stats: AggregationStats,
}

impl<'n> AggregationContext<'n> {
    /// Empty context using `normalizer` for grouping
    pub fn new(normalizer: &'n LocationNormalizer) -> Self {
        Self {
            normalizer,
            groups: BTreeMap::new(),
            stats: AggregationStats::default(),
        }
    }

    /// Offer one record
    pub fn push(&mut self, record: &MetricRecord) {
        self.stats.records += 1;

        let Some(value) = record.value.as_number() else {
            self.stats.discarded += 1;
            warn!(
                target: "simstat::aggregate",
                location = %record.location,
                metric = %record.metric_name,
                value = %record.value,
                "Discarding non-numeric metric value"
            );
            return;
        };

        let key = MetricKey::new(
            self.normalizer.normalize(&record.location),
            record.metric_name.as_str(),
            record.unit.as_str(),
        );
        self.groups.entry(key).or_default().push(value);
    }

    /// Counters so far
    pub fn stats(&self) -> AggregationStats {
        self.stats
    }

    /// Reduce every group to its mean
    pub fn finish(self) -> (MetricSet, AggregationStats) {
        let metrics: MetricSet = self
            .groups
            .into_iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(key, mut values)| {
                values.sort_by(f64::total_cmp);
                let sum: f64 = values.iter().sum();
                AggregatedMetric {
                    key,
                    mean: sum / values.len() as f64,
                    sample_count: values.len(),
                }
            })
            .collect();

        debug!(
            target: "simstat::aggregate",
            records = self.stats.records,
            discarded = self.stats.discarded,
            groups = metrics.len(),
            "Aggregation finished"
        );
        (metrics, self.stats)
    }
}

/// Aggregate records with the default normalizer
pub fn aggregate<'a, I>(records: I) -> MetricSet
where
    I: IntoIterator<Item = &'a MetricRecord>,
{
    aggregate_with(LocationNormalizer::shared(), records).0
}

/// Aggregate records with a specific normalizer, returning counters too
pub fn aggregate_with<'a, I>(
    normalizer: &LocationNormalizer,
    records: I,
) -> (MetricSet, AggregationStats)
where
    I: IntoIterator<Item = &'a MetricRecord>,
{
    let mut ctx = AggregationContext::new(normalizer);
    for record in records {
        ctx.push(record);
    }
    ctx.finish()
}
