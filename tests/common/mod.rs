//! Shared test utilities for the end-to-end suites.
//!
//! Import via `mod common;` from a test's main.rs.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub use simstat::core::names::{
    CU_CPI, CU_INST_COUNT, KERNEL_TIME, READ_HIT, READ_MISS, READ_MSHR_HIT, TLB_HIT, TLB_MISS,
};
pub use simstat::store::testing::StoreFixture;
pub use simstat::{
    builder_for, compare_with, discover_runs, load_summaries, AnalysisConfig, ComparisonRow,
    RunId, RunSummary,
};
use tempfile::TempDir;

// ============================================================================
// ExperimentTree - `<root>/<configuration>/<benchmark>/` on disk
// ============================================================================

pub struct ExperimentTree {
    dir: TempDir,
    config: AnalysisConfig,
}

impl ExperimentTree {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run_dir(&self, configuration: &str, benchmark: &str) -> PathBuf {
        let dir = self.root().join(configuration).join(benchmark);
        fs::create_dir_all(&dir).expect("create run dir");
        dir
    }

    pub fn store(&self, configuration: &str, benchmark: &str, fixture: StoreFixture) -> PathBuf {
        let path = self
            .run_dir(configuration, benchmark)
            .join(format!("akita_sim_{}.sqlite3", benchmark));
        fixture.write(&path).expect("write store");
        path
    }

    pub fn log(&self, configuration: &str, benchmark: &str, text: &str) -> PathBuf {
        let path = self
            .run_dir(configuration, benchmark)
            .join(&self.config.report_file);
        fs::write(&path, text).expect("write log");
        path
    }

    /// Discover and summarize `configurations`, reading accuracy for `accuracy_of`.
    pub fn summaries(
        &self,
        configurations: &[&str],
        accuracy_of: Option<&str>,
    ) -> BTreeMap<RunId, RunSummary> {
        let runs = discover_runs(self.root(), configurations, &self.config).expect("discover");
        load_summaries(&runs, &builder_for(&self.config), accuracy_of)
    }

    /// Baseline vs variant rows under the configured names.
    pub fn compare(&self) -> Vec<ComparisonRow> {
        let c = &self.config;
        let summaries = self.summaries(&[&c.baseline, &c.variant], Some(c.variant.as_str()));
        compare_with(&summaries, &c.baseline, &c.variant, &c.cache_classes)
    }
}

/// Store with one L1V cache instance and the compute counters.
pub fn run_fixture(cpi: f64, l1_hits: f64, l1_misses: f64) -> StoreFixture {
    StoreFixture::new()
        .metric("GPU[1].SA[0].CU[0]", CU_CPI, cpi, "cycle")
        .metric("GPU[1].SA[0].CU[1]", CU_CPI, cpi, "cycle")
        .metric("GPU[1].SA[0].CU[0]", CU_INST_COUNT, 4000.0, "count")
        .metric("Driver", KERNEL_TIME, 0.5, "second")
        .metric("GPU[1].SA[0].L1VCache[0]", READ_HIT, l1_hits, "count")
        .metric("GPU[1].SA[0].L1VCache[0]", READ_MISS, l1_misses, "count")
}

pub fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value present");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
