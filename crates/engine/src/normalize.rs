//! Location normalization
//!
//! The simulator names every component instance with bracketed indices,
//! e.g. `GPU[2].SA[1].L1VCache[3]`. For reporting, all instances of a
//! component class collapse into one canonical location (`GPU.SA.L1VCache`).
//!
//! Rules are an ordered list. Each pattern must match the *whole* location
//! string; the first rule that matches wins and its canonical form is
//! returned verbatim. Inputs no rule matches are returned unchanged.
//!
//! Order matters: several patterns overlap as prefixes of one another
//! (`...L1VCache[i]` and `...L1VCache`, `...L2ToDRAM[i]` and `...L2ToDRAM`).
//! Precedence is decided by position in [`DEFAULT_RULES`], not by which
//! pattern is more specific.

use once_cell::sync::Lazy;
use regex::Regex;
use simstat_core::{CanonicalLocation, Error, Result};

/// Default rule table, in precedence order: (pattern, canonical form)
pub const DEFAULT_RULES: &[(&str, &str)] = &[
    (r"GPU\[\d+\]\.CommandProcessor", "GPU.CommandProcessor"),
    (r"GPU\[\d+\]\.SA\[\d+\]\.CU\[\d+\]", "GPU.SA.CU"),
    (r"GPU\[\d+\]\.SA\[\d+\]\.L1VCache\[\d+\]", "GPU.SA.L1VCache"),
    (r"GPU\[\d+\]\.SA\[\d+\]\.L1SCache", "GPU.SA.L1SCache"),
    (r"GPU\[\d+\]\.SA\[\d+\]\.L1ICache", "GPU.SA.L1ICache"),
    (r"GPU\[\d+\]\.L2Cache\[\d+\]", "GPU.L2Cache"),
    (r"GPU\[\d+\]\.SA\[\d+\]\.L1VCache", "GPU.SA.L1VCache"),
    (r"GPU\[\d+\]\.SA\[\d+\]\.L1VTLB\[\d+\]", "GPU.SA.L1VTLB"),
    (r"GPU\[\d+\]\.SA\[\d+\]\.L1STLB", "GPU.SA.L1STLB"),
    (r"GPU\[\d+\]\.SA\[\d+\]\.L1ITLB", "GPU.SA.L1ITLB"),
    (r"GPU\[\d+\]\.DRAM\[\d+\]", "GPU.DRAM"),
    (r"GPU\[\d+\]\.L2ToDRAM\[\d+\]", "GPU.L2ToDRAM"),
    (r"GPU\[\d+\]\.L2TLB", "GPU.L2TLB"),
    (r"GPU\[\d+\]\.RDMA", "GPU.RDMA"),
    (r"GPU\[\d+\]\.L2ToDRAM", "GPU.L2ToDRAM"),
];

// Every entry of DEFAULT_RULES compiles; test_default_rules_compile guards it.
static DEFAULT_NORMALIZER: Lazy<LocationNormalizer> = Lazy::new(|| LocationNormalizer {
    rules: DEFAULT_RULES
        .iter()
        .filter_map(|(pattern, canonical)| LocationRule::new(pattern, canonical).ok())
        .collect(),
});

/// One (pattern, canonical form) rule
#[derive(Debug, Clone)]
pub struct LocationRule {
    source: String,
    anchored: Regex,
    canonical: String,
}

impl LocationRule {
    /// Compile a rule
    ///
    /// The pattern is anchored on both ends so it only ever matches a full
    /// location string.
    pub fn new(pattern: &str, canonical: &str) -> Result<Self> {
        let anchored = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: pattern.to_string(),
            anchored,
            canonical: canonical.to_string(),
        })
    }

    /// Pattern source as given
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// Canonical form returned on match
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Full-string match
    pub fn matches(&self, raw: &str) -> bool {
        self.anchored.is_match(raw)
    }
}

/// Ordered rule list mapping instance locations to component classes
#[derive(Debug, Clone)]
pub struct LocationNormalizer {
    rules: Vec<LocationRule>,
}

impl Default for LocationNormalizer {
    fn default() -> Self {
        DEFAULT_NORMALIZER.clone()
    }
}

impl LocationNormalizer {
    /// Normalizer over a custom rule list, in precedence order
    pub fn new(rules: Vec<LocationRule>) -> Self {
        Self { rules }
    }

    /// Compile a normalizer from (pattern, canonical) pairs
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let rules = pairs
            .into_iter()
            .map(|(p, c)| LocationRule::new(p, c))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Shared instance over [`DEFAULT_RULES`]
    pub fn shared() -> &'static LocationNormalizer {
        &DEFAULT_NORMALIZER
    }

    /// Rules in precedence order
    pub fn rules(&self) -> &[LocationRule] {
        &self.rules
    }

    /// Index of the rule that decides `raw`, if any
    pub fn matching_rule(&self, raw: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.matches(raw))
    }

    /// Canonical location for `raw`
    pub fn normalize(&self, raw: &str) -> CanonicalLocation {
        match self.matching_rule(raw) {
            Some(i) => CanonicalLocation::new(self.rules[i].canonical()),
            None => CanonicalLocation::new(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn norm(raw: &str) -> String {
        LocationNormalizer::shared().normalize(raw).as_str().to_string()
    }

    #[test]
    fn test_default_rules_compile() {
        assert_eq!(LocationNormalizer::shared().rules().len(), DEFAULT_RULES.len());
    }

    #[test]
    fn test_strips_indices() {
        assert_eq!(norm("GPU[3].SA[2].L1VCache[5]"), "GPU.SA.L1VCache");
        assert_eq!(norm("GPU[2].SA[1].L1VCache[3]"), "GPU.SA.L1VCache");
        assert_eq!(norm("GPU[1].L2Cache[7]"), "GPU.L2Cache");
        assert_eq!(norm("GPU[1].SA[15].CU[3]"), "GPU.SA.CU");
        assert_eq!(norm("GPU[4].CommandProcessor"), "GPU.CommandProcessor");
        assert_eq!(norm("GPU[1].SA[0].L1VTLB[2]"), "GPU.SA.L1VTLB");
        assert_eq!(norm("GPU[1].L2TLB"), "GPU.L2TLB");
        assert_eq!(norm("GPU[1].RDMA"), "GPU.RDMA");
    }

    #[test]
    fn test_unindexed_variants() {
        assert_eq!(norm("GPU[1].SA[0].L1VCache"), "GPU.SA.L1VCache");
        assert_eq!(norm("GPU[1].SA[0].L1SCache"), "GPU.SA.L1SCache");
        assert_eq!(norm("GPU[1].SA[0].L1ICache"), "GPU.SA.L1ICache");
        assert_eq!(norm("GPU[1].L2ToDRAM"), "GPU.L2ToDRAM");
        assert_eq!(norm("GPU[1].L2ToDRAM[3]"), "GPU.L2ToDRAM");
    }

    #[test]
    fn test_canonical_input_unchanged() {
        assert_eq!(norm("GPU.SA.L1VCache"), "GPU.SA.L1VCache");
        assert_eq!(norm("GPU.L2Cache"), "GPU.L2Cache");
    }

    #[test]
    fn test_unrelated_input_unchanged() {
        assert_eq!(norm("Driver"), "Driver");
        assert_eq!(norm(""), "");
        assert_eq!(norm("CPU[0].Core[1]"), "CPU[0].Core[1]");
    }

    #[test]
    fn test_full_match_required() {
        // Prefix of a rule match with trailing components is not a match
        assert_eq!(
            norm("GPU[1].SA[0].L1VCache[0].TopPort"),
            "GPU[1].SA[0].L1VCache[0].TopPort"
        );
        assert_eq!(norm("X.GPU[1].RDMA"), "X.GPU[1].RDMA");
    }

    #[test]
    fn test_first_match_wins_over_specificity() {
        let normalizer = LocationNormalizer::from_pairs(vec![
            (r"GPU\[\d+\]\..*", "GPU.Any"),
            (r"GPU\[\d+\]\.L2Cache\[\d+\]", "GPU.L2Cache"),
        ])
        .unwrap();
        assert_eq!(normalizer.normalize("GPU[0].L2Cache[1]").as_str(), "GPU.Any");
        assert_eq!(normalizer.matching_rule("GPU[0].L2Cache[1]"), Some(0));
    }

    #[test]
    fn test_default_precedence_is_table_order() {
        let normalizer = LocationNormalizer::shared();
        assert_eq!(normalizer.matching_rule("GPU[0].SA[0].L1VCache[0]"), Some(2));
        assert_eq!(normalizer.matching_rule("GPU[0].SA[0].L1VCache"), Some(6));
        assert_eq!(normalizer.matching_rule("GPU[0].L2ToDRAM[1]"), Some(11));
        assert_eq!(normalizer.matching_rule("GPU[0].L2ToDRAM"), Some(14));
        assert_eq!(normalizer.matching_rule("Driver"), None);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = LocationRule::new(r"GPU\[(\d+", "GPU").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    proptest! {
        #[test]
        fn prop_l1v_indices_always_collapse(gpu in 0u32..64, sa in 0u32..64, idx in 0u32..64) {
            let raw = format!("GPU[{}].SA[{}].L1VCache[{}]", gpu, sa, idx);
            prop_assert_eq!(norm(&raw), "GPU.SA.L1VCache");
        }

        #[test]
        fn prop_normalize_is_idempotent(raw in "[A-Za-z0-9\\[\\]\\.]{0,24}") {
            let once = norm(&raw);
            prop_assert_eq!(norm(&once), once.clone());
        }
    }
}
