//! End-to-end tests
//!
//! Synthetic experiment trees on disk, driven through the public facade:
//! - comparison: paired rows, deltas, ranking
//! - degradation: missing logs, broken stores, foreign tables, bad values
//! - sweep: normalization against a baseline configuration

#[path = "../common/mod.rs"]
mod common;

mod comparison;
mod degradation;
mod sweep;
