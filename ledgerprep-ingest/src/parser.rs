//! The parser handle handed to collaborators, and its parse result.

use std::path::Path;

use anyhow::Result;
use ledgerprep_core::CanonicalRecord;
use tracing::debug;

use crate::error::IngestError;

/// Result of parsing one file.
///
/// `Empty` is a well-formed file with no transactions in it; `NoData` means
/// the parser could not find the structure it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(Vec<CanonicalRecord>),
    Empty,
    NoData { reason: String },
}

impl ParseOutcome {
    pub fn from_records(records: Vec<CanonicalRecord>) -> Self {
        if records.is_empty() {
            Self::Empty
        } else {
            Self::Parsed(records)
        }
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        match self {
            Self::Parsed(records) => records,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Escalate `NoData` to an error; `Empty` becomes an empty sequence.
    pub fn into_records(
        self,
        parser: &'static str,
        path: &Path,
    ) -> Result<Vec<CanonicalRecord>, IngestError> {
        match self {
            Self::Parsed(records) => Ok(records),
            Self::Empty => Ok(Vec::new()),
            Self::NoData { .. } => Err(IngestError::NoData {
                parser,
                path: path.to_path_buf(),
            }),
        }
    }
}

/// One institution's detector and parser.
///
/// Implementations keep no state between calls; everything a parse needs is
/// built fresh inside `parse`.
pub trait StatementParser {
    fn display_name(&self) -> &'static str;

    /// Short code used for output file names and theming.
    fn short_token(&self) -> &'static str;

    /// Lower-case words that select this parser from a free-text bank hint.
    fn hint_keywords(&self) -> &'static [&'static str];

    /// Score a bounded sample of `path`.
    fn sniff(&self, path: &Path) -> Result<bool>;

    fn parse(&self, path: &Path) -> Result<ParseOutcome, IngestError>;

    /// [`sniff`](Self::sniff), with any failure read as "not mine".
    fn is_match(&self, path: &Path) -> bool {
        match self.sniff(path) {
            Ok(matched) => matched,
            Err(e) => {
                debug!(parser = self.short_token(), error = %e, "sniff failed; treating as no match");
                false
            }
        }
    }

    fn matches_hint(&self, hint: &str) -> bool {
        let hint = hint.to_lowercase();
        self.hint_keywords().iter().any(|k| hint.contains(k))
    }
}

/// 1-based row counter scoped to a single parse.
#[derive(Debug, Default)]
pub(crate) struct RowIds {
    issued: usize,
}

impl RowIds {
    pub(crate) fn next_id(&mut self) -> String {
        self.issued += 1;
        self.issued.to_string()
    }

    /// Prefer a non-blank file-provided ID; otherwise issue the next counter value.
    pub(crate) fn or_next(&mut self, provided: Option<&str>) -> String {
        match provided.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => self.next_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> CanonicalRecord {
        CanonicalRecord::new(id, "", "2024-01-05", "X", ("1.00".into(), "0.00".into()))
    }

    #[test]
    fn test_outcome_from_records() {
        assert_eq!(ParseOutcome::from_records(Vec::new()), ParseOutcome::Empty);
        assert_eq!(ParseOutcome::from_records(vec![record("1")]).len(), 1);
    }

    #[test]
    fn test_no_data_escalates() {
        let outcome = ParseOutcome::NoData {
            reason: "no header".into(),
        };
        let err = outcome.into_records("FNB", Path::new("x.csv")).unwrap_err();
        assert!(matches!(err, IngestError::NoData { parser: "FNB", .. }));

        let empty = ParseOutcome::Empty.into_records("FNB", Path::new("x.csv")).unwrap();
        assert!(empty.is_empty());
    }

    struct Unreadable;

    impl StatementParser for Unreadable {
        fn display_name(&self) -> &'static str {
            "Unreadable"
        }

        fn short_token(&self) -> &'static str {
            "UNR"
        }

        fn hint_keywords(&self) -> &'static [&'static str] {
            &["unreadable"]
        }

        fn sniff(&self, path: &Path) -> Result<bool> {
            anyhow::bail!("cannot read {}", path.display())
        }

        fn parse(&self, _path: &Path) -> Result<ParseOutcome, IngestError> {
            Ok(ParseOutcome::Empty)
        }
    }

    #[test]
    fn test_sniff_error_is_no_match() {
        let parser = Unreadable;
        assert!(parser.sniff(Path::new("x.csv")).is_err());
        assert!(!parser.is_match(Path::new("x.csv")));
        assert!(parser.matches_hint("Unreadable Bank"));
    }

    #[test]
    fn test_row_ids() {
        let mut ids = RowIds::default();
        assert_eq!(ids.next_id(), "1");
        assert_eq!(ids.or_next(Some(" 000123 ")), "000123");
        assert_eq!(ids.or_next(Some("")), "2");
        assert_eq!(ids.or_next(None), "3");
    }
}
