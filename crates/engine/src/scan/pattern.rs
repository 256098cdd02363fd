//! Value extraction patterns for run logs
//!
//! Two shapes are recognised in simulator run logs:
//!
//! | Pattern | Example | Value |
//! |---|---|---|
//! | Duration | `real\t2m3.456s` | `2*60 + 3.456` seconds |
//! | Percentage | `Prefetch Accuracy: 87.50%` | `87.5` |
//!
//! A duration token has the grammar `(minutes "m")? seconds "s"`; seconds
//! may be fractional and minutes default to zero.

use once_cell::sync::Lazy;
use regex::Regex;
use simstat_core::{Error, Result};

/// Label printed before the prefetcher's accuracy percentage
pub const DEFAULT_ACCURACY_LABEL: &str = "Prefetch Accuracy:";

const DURATION: &str = r"real\s+(?:(\d+)m)?(\d+(?:\.\d+)?)s";

static DURATION_TOKEN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(?:(\d+)m)?(\d+(?:\.\d+)?)s$").ok());

#[derive(Debug, Clone)]
enum Kind {
    Duration,
    Percentage,
    Custom,
}

/// A compiled extraction pattern
#[derive(Debug, Clone)]
pub struct ExtractionPattern {
    kind: Kind,
    regex: Regex,
}

impl ExtractionPattern {
    /// `real` followed by whitespace and a duration token
    pub fn duration() -> Result<Self> {
        compile(Kind::Duration, DURATION)
    }

    /// `label` followed by whitespace and `<float>%`
    ///
    /// The label is matched literally.
    pub fn percentage(label: &str) -> Result<Self> {
        let source = format!(r"{}\s+(\d+(?:\.\d+)?)%", regex::escape(label));
        compile(Kind::Percentage, &source)
    }

    /// Arbitrary regex whose first capture group is a float
    pub fn custom(pattern: &str) -> Result<Self> {
        let compiled = compile(Kind::Custom, pattern)?;
        if compiled.regex.captures_len() < 2 {
            return Err(Error::InvalidPattern {
                pattern: pattern.to_string(),
                reason: "pattern needs a capture group for the value".to_string(),
            });
        }
        Ok(compiled)
    }

    /// Regex source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Every value in `text`, in order of appearance
    pub fn extract(&self, text: &str) -> Vec<f64> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| match self.kind {
                Kind::Duration => {
                    duration_seconds(caps.get(1).map(|m| m.as_str()), caps.get(2)?.as_str())
                }
                Kind::Percentage | Kind::Custom => caps.get(1)?.as_str().trim().parse().ok(),
            })
            .collect()
    }
}

fn compile(kind: Kind, source: &str) -> Result<ExtractionPattern> {
    let regex = Regex::new(source).map_err(|e| Error::InvalidPattern {
        pattern: source.to_string(),
        reason: e.to_string(),
    })?;
    Ok(ExtractionPattern { kind, regex })
}

/// Parse a standalone duration token such as `2m3.456s` or `0.5s`
pub fn parse_duration(token: &str) -> Option<f64> {
    let caps = DURATION_TOKEN.as_ref()?.captures(token.trim())?;
    duration_seconds(caps.get(1).map(|m| m.as_str()), caps.get(2)?.as_str())
}

fn duration_seconds(minutes: Option<&str>, seconds: &str) -> Option<f64> {
    let minutes: f64 = match minutes {
        Some(m) => m.parse::<u64>().ok()? as f64,
        None => 0.0,
    };
    let seconds: f64 = seconds.parse().ok()?;
    Some(minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_with_minutes() {
        let values = ExtractionPattern::duration().unwrap().extract("user 0m1.0s\nreal 2m3.456s\n");
        assert_eq!(values.len(), 1);
        assert!((values[0] - 123.456).abs() < 1e-9);
    }

    #[test]
    fn test_duration_without_minutes() {
        let values = ExtractionPattern::duration().unwrap().extract("real\t41.5s");
        assert_eq!(values, vec![41.5]);
    }

    #[test]
    fn test_duration_integer_seconds() {
        assert_eq!(ExtractionPattern::duration().unwrap().extract("real 1m7s"), vec![67.0]);
    }

    #[test]
    fn test_duration_requires_whitespace() {
        assert!(ExtractionPattern::duration().unwrap().extract("real2m3s").is_empty());
    }

    #[test]
    fn test_percentage_all_matches_in_order() {
        let text = "Prefetch Accuracy: 80.00%\nnoise\nPrefetch Accuracy: 90.0%\n";
        let values = ExtractionPattern::percentage(DEFAULT_ACCURACY_LABEL).unwrap().extract(text);
        assert_eq!(values, vec![80.0, 90.0]);
    }

    #[test]
    fn test_percentage_label_is_literal() {
        // '.' in the label must not act as a wildcard
        let p = ExtractionPattern::percentage("Hit.Rate:").unwrap();
        assert!(p.extract("HitXRate: 5%").is_empty());
        assert_eq!(p.extract("Hit.Rate: 5%"), vec![5.0]);
    }

    #[test]
    fn test_custom_pattern() {
        let p = ExtractionPattern::custom(r"kernel_time=(\d+(?:\.\d+)?)").unwrap();
        assert_eq!(p.extract("kernel_time=0.25 kernel_time=0.75"), vec![0.25, 0.75]);
    }

    #[test]
    fn test_custom_pattern_needs_group() {
        assert!(matches!(
            ExtractionPattern::custom(r"\d+"),
            Err(Error::InvalidPattern { .. })
        ));
        assert!(ExtractionPattern::custom(r"(").is_err());
    }

    #[test]
    fn test_parse_duration_token_regex_compiles() {
        assert!(DURATION_TOKEN.is_some());
    }

    #[test]
    fn test_parse_duration_token() {
        assert_eq!(parse_duration("2m3.5s"), Some(123.5));
        assert_eq!(parse_duration("0.5s"), Some(0.5));
        assert_eq!(parse_duration("3m"), None);
        assert_eq!(parse_duration("N/A"), None);
    }
}
