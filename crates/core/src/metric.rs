//! Aggregated metric types
//!
//! An [`AggregatedMetric`] is the mean of every valid sample that shared a
//! [`MetricKey`]. A [`MetricSet`] is the full aggregation result for one run,
//! ordered by key, with the lookups the comparison layer needs.

use crate::types::{CanonicalLocation, MetricKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean of one metric group
///
/// Invariant: `sample_count >= 1`. Groups that ended up with no valid
/// samples are never materialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetric {
    /// Grouping key
    pub key: MetricKey,
    /// Arithmetic mean of the group's samples
    pub mean: f64,
    /// Number of samples that contributed
    pub sample_count: usize,
}

impl AggregatedMetric {
    /// Sum of the samples this mean was computed from
    pub fn total(&self) -> f64 {
        self.mean * self.sample_count as f64
    }
}

/// Mean and count pooled over several aggregated groups
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PooledMean {
    /// Sample-weighted mean
    pub mean: f64,
    /// Total samples across the pooled groups
    pub sample_count: usize,
}

/// Aggregation result for one run, ordered by key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    metrics: BTreeMap<MetricKey, AggregatedMetric>,
}

impl MetricSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a metric, replacing any existing entry with the same key
    ///
    /// Metrics with `sample_count == 0` are rejected and `false` is returned.
    pub fn insert(&mut self, metric: AggregatedMetric) -> bool {
        if metric.sample_count == 0 {
            return false;
        }
        self.metrics.insert(metric.key.clone(), metric);
        true
    }

    /// Number of metric groups
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// True when no group survived aggregation
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Iterate in key order
    pub fn iter(&self) -> impl Iterator<Item = &AggregatedMetric> {
        self.metrics.values()
    }

    /// Exact lookup
    pub fn get(&self, location: &str, metric_name: &str, unit: &str) -> Option<&AggregatedMetric> {
        let key = MetricKey::new(CanonicalLocation::new(location), metric_name, unit);
        self.metrics.get(&key)
    }

    /// Pooled mean of `metric_name` over every location reporting it
    pub fn metric_mean(&self, metric_name: &str) -> Option<PooledMean> {
        self.pool(|m| m.key.metric_name == metric_name)
    }

    /// Pooled mean of `metric_name` over locations of a class
    ///
    /// See [`CanonicalLocation::is_class`] for the matching rule.
    pub fn class_mean(&self, class: &str, metric_name: &str) -> Option<PooledMean> {
        self.pool(|m| m.key.metric_name == metric_name && m.key.location.is_class(class))
    }

    // Sample weighting makes the pooled mean equal to the mean of the raw
    // samples behind every matched group.
    fn pool<F>(&self, mut pred: F) -> Option<PooledMean>
    where
        F: FnMut(&AggregatedMetric) -> bool,
    {
        let (total, count) = self
            .metrics
            .values()
            .filter(|m| pred(m))
            .fold((0.0_f64, 0_usize), |(t, c), m| (t + m.total(), c + m.sample_count));
        (count > 0).then(|| PooledMean {
            mean: total / count as f64,
            sample_count: count,
        })
    }
}

impl FromIterator<AggregatedMetric> for MetricSet {
    fn from_iter<I: IntoIterator<Item = AggregatedMetric>>(iter: I) -> Self {
        let mut set = MetricSet::new();
        for metric in iter {
            set.insert(metric);
        }
        set
    }
}

impl<'a> IntoIterator for &'a MetricSet {
    type Item = &'a AggregatedMetric;
    type IntoIter = std::collections::btree_map::Values<'a, MetricKey, AggregatedMetric>;

    fn into_iter(self) -> Self::IntoIter {
        self.metrics.values()
    }
}
