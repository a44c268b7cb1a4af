//! Fallback for files no institution detector claims.
//!
//! Columns are taken by position: `_, reference, date, description, amount`.
//! The delimiter is inferred once from the first line.

use std::path::Path;

use anyhow::Result;
use ledgerprep_core::CanonicalRecord;
use tracing::info;

use crate::error::IngestError;
use crate::lines::read_lines;
use crate::normalize::{clean_description, normalize_amount, normalize_date};
use crate::parser::{ParseOutcome, RowIds, StatementParser};
use crate::tokenize::{detect_delimiter, split_line};

const REFERENCE_COLUMN: usize = 1;
const DATE_COLUMN: usize = 2;
const DESCRIPTION_COLUMN: usize = 3;
const AMOUNT_COLUMN: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct GenericParser;

impl GenericParser {
    fn parse_row(tokens: &[String], ids: &mut RowIds) -> CanonicalRecord {
        let field = |i: usize| tokens.get(i).map(|t| t.trim()).unwrap_or("");
        CanonicalRecord::new(
            ids.next_id(),
            field(REFERENCE_COLUMN),
            normalize_date(field(DATE_COLUMN)),
            clean_description(field(DESCRIPTION_COLUMN)),
            normalize_amount(field(AMOUNT_COLUMN)),
        )
    }
}

impl StatementParser for GenericParser {
    fn display_name(&self) -> &'static str {
        "Generic"
    }

    fn short_token(&self) -> &'static str {
        "GEN"
    }

    fn hint_keywords(&self) -> &'static [&'static str] {
        &["generic"]
    }

    fn sniff(&self, _path: &Path) -> Result<bool> {
        Ok(true)
    }

    fn parse(&self, path: &Path) -> Result<ParseOutcome, IngestError> {
        let lines = read_lines(path, false)?;
        let delimiter = lines.first().map_or(',', |l| detect_delimiter(l));
        let mut ids = RowIds::default();

        let records: Vec<CanonicalRecord> = lines
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|l| Self::parse_row(&split_line(l, delimiter), &mut ids))
            .collect();

        info!(rows = records.len(), %delimiter, "Generic parse complete");
        Ok(ParseOutcome::from_records(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(line: &str, ids: &mut RowIds) -> CanonicalRecord {
        GenericParser::parse_row(&split_line(line, ','), ids)
    }

    #[test]
    fn test_positional_mapping() {
        let mut ids = RowIds::default();
        let rec = row("1,REF001,2023-05-01,Coffee,45.00", &mut ids);
        assert_eq!(rec.external_transaction_id, "1");
        assert_eq!(rec.external_reference, "REF001");
        assert_eq!(rec.transaction_date, "2023-05-01");
        assert_eq!(rec.description, "Coffee");
        assert_eq!(rec.receipt, "45.00");
        assert_eq!(rec.disbursement, "0.00");

        let rec = row("2,REF002,01/05/2023,Rent,-1200.00", &mut ids);
        assert_eq!(rec.external_transaction_id, "2");
        assert_eq!(rec.transaction_date, "2023-05-01");
        assert_eq!(rec.disbursement, "1200.00");
    }

    #[test]
    fn test_short_rows_omit_fields() {
        let mut ids = RowIds::default();
        let rec = row("9,REF9", &mut ids);
        assert_eq!(rec.external_reference, "REF9");
        assert_eq!(rec.transaction_date, "");
        assert_eq!(rec.description, "");
        assert!(rec.is_unpriced());
    }

    #[test]
    fn test_unreadable_date_kept_verbatim() {
        let mut ids = RowIds::default();
        let rec = row("1,R,sometime,Thing,abc", &mut ids);
        assert_eq!(rec.transaction_date, "sometime");
        assert_eq!(rec.receipt, "0.00");
        assert_eq!(rec.disbursement, "0.00");
    }
}
