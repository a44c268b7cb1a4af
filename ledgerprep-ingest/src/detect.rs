//! Detection thresholds and the shape predicates detectors share.
//!
//! The thresholds are empirically tuned against a small set of real exports;
//! they are configuration, not derived values.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::lines::MAX_SAMPLE_LINES;

pub const ABSA_MIN_SCORE: usize = 3;
pub const FNB_MIN_HEADER_HITS: usize = 2;
pub const FNB_MIN_DATE_LED_LINES: usize = 5;
pub const STANDARD_HEADER_SCAN_LINES: usize = 20;
pub const STANDARD_LEGACY_MIN_COMPACT_DATES: usize = 2;
pub const STANDARD_LEGACY_MIN_SIGNED_AMOUNTS: usize = 2;
pub const STANDARD_LEGACY_MIN_QUOTED_LINES: usize = 3;

/// A quoted legacy row opens with a quote and carries at least this many.
pub const QUOTED_ROW_MIN_QUOTES: usize = 10;

static COMPACT_DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^20\d{6}$").unwrap());

static SIGNED_PADDED_AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]0+\d*(?:\.\d{1,2})?$").unwrap());

static SIGNED_NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[+-]?\(?\d[\d,]*\.\d{1,2}\)?-?|[+-]\d[\d,]*)$").unwrap()
});

/// Heuristic cut-offs used by the bank detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionThresholds {
    /// Lines read per sniff; clamped to [`MAX_SAMPLE_LINES`]
    pub sample_lines: usize,
    pub absa_min_score: usize,
    pub fnb_min_header_hits: usize,
    pub fnb_min_date_led_lines: usize,
    /// Lines searched for the new-layout Standard Bank header
    pub standard_header_scan_lines: usize,
    pub standard_legacy_min_compact_dates: usize,
    pub standard_legacy_min_signed_amounts: usize,
    pub standard_legacy_min_quoted_lines: usize,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            sample_lines: MAX_SAMPLE_LINES,
            absa_min_score: ABSA_MIN_SCORE,
            fnb_min_header_hits: FNB_MIN_HEADER_HITS,
            fnb_min_date_led_lines: FNB_MIN_DATE_LED_LINES,
            standard_header_scan_lines: STANDARD_HEADER_SCAN_LINES,
            standard_legacy_min_compact_dates: STANDARD_LEGACY_MIN_COMPACT_DATES,
            standard_legacy_min_signed_amounts: STANDARD_LEGACY_MIN_SIGNED_AMOUNTS,
            standard_legacy_min_quoted_lines: STANDARD_LEGACY_MIN_QUOTED_LINES,
        }
    }
}

impl DetectionThresholds {
    pub fn sample_size(&self) -> usize {
        self.sample_lines.clamp(1, MAX_SAMPLE_LINES)
    }
}

/// `20YYMMDD`
pub fn is_compact_date(token: &str) -> bool {
    COMPACT_DATE_RE.is_match(token.trim())
}

/// `+000000012345.67` style legacy amounts.
pub fn is_signed_padded_amount(token: &str) -> bool {
    SIGNED_PADDED_AMOUNT_RE.is_match(token.trim())
}

/// An amount that carries an explicit sign or a decimal fraction, so bare
/// integers (account numbers, sequence numbers) never qualify.
pub fn is_signed_numeric(token: &str) -> bool {
    SIGNED_NUMERIC_RE.is_match(token.trim())
}

pub fn is_heavily_quoted(line: &str) -> bool {
    line.trim_start().starts_with('"') && line.matches('"').count() >= QUOTED_ROW_MIN_QUOTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes() {
        assert!(is_compact_date("20240105"));
        assert!(!is_compact_date("19990105"));
        assert!(!is_compact_date("2024010"));

        assert!(is_signed_padded_amount("-000000150.00"));
        assert!(is_signed_padded_amount("+00012"));
        assert!(!is_signed_padded_amount("-150.00"));
        assert!(!is_signed_padded_amount("000150.00"));

        assert!(is_signed_numeric("-35.50"));
        assert!(is_signed_numeric("1,350.00"));
        assert!(is_signed_numeric("(12.00)"));
        assert!(is_signed_numeric("+75"));
        assert!(!is_signed_numeric("4071234567"));
        assert!(!is_signed_numeric("0001"));
    }

    #[test]
    fn test_sample_size_is_clamped() {
        let t = DetectionThresholds {
            sample_lines: 10_000,
            ..DetectionThresholds::default()
        };
        assert_eq!(t.sample_size(), MAX_SAMPLE_LINES);
        assert_eq!(DetectionThresholds::default().sample_size(), 50);
    }

    #[test]
    fn test_heavily_quoted() {
        assert!(is_heavily_quoted(r#""1","20240105","2","-0001.00","X""#));
        assert!(!is_heavily_quoted(r#""1","20240105""#));
        assert!(!is_heavily_quoted(r#"1,"a","b","c","d","e""#));
    }
}
