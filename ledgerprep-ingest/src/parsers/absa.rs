//! ABSA statement exports.
//!
//! Headerless, comma or multi-space separated. The transaction date sits in
//! the third column as `YYYYMMDD` and debit/credit rows carry a `DT`/`CT`
//! transaction code followed by a `D`/`C` indicator:
//!   4071234567,0001,20240105,DT,D,150.00,ACB DEBIT ORDER,MULTICHOICE 12345678,1350.00

use std::path::Path;

use anyhow::Result;
use ledgerprep_core::CanonicalRecord;
use tracing::{debug, info};

use crate::detect::{DetectionThresholds, is_compact_date, is_signed_numeric};
use crate::error::IngestError;
use crate::lines::{read_lines, sample_lines};
use crate::normalize::{
    AmountNormalizer, clean_description, extract_reference, is_non_transaction,
    is_transaction_date, normalize_date, split_amount,
};
use crate::parser::{ParseOutcome, RowIds, StatementParser};
use crate::tokenize::tokenize;

/// Narration fragments that only appear in ABSA exports.
const KEYWORDS: &[&str] = &["ABSA", "ACB", "IBANK", "CASHSEND", "NOTIFIC", "DIGITAL PAYMENT"];

/// Column codes are short and purely alphabetic (`DT`, `D`, `FEE`, `ATM`).
const MAX_CODE_LEN: usize = 5;

const AMOUNTS: AmountNormalizer = AmountNormalizer {
    cr_dr_suffix: false,
    trailing_minus: true,
    comma_decimal: false,
};

#[derive(Debug, Clone, Default)]
pub struct AbsaParser {
    thresholds: DetectionThresholds,
}

/// How the amount of a row was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountSource {
    /// `DT|CT` + `D|C` + amount; the indicator decides the side
    Coded { index: usize, debit: bool },
    /// First signed numeric token after the date
    Signed { index: usize },
}

impl AbsaParser {
    pub fn new(thresholds: DetectionThresholds) -> Self {
        Self { thresholds }
    }

    fn line_score(tokens: &[String]) -> usize {
        let mut score = 0;
        if tokens.get(2).is_some_and(|t| is_compact_date(t)) {
            score += 1;
        }
        if tokens.iter().any(|t| t == "DT" || t == "CT") {
            score += 1;
        }
        if tokens.iter().any(|t| {
            let upper = t.to_uppercase();
            KEYWORDS.iter().any(|k| upper.contains(k))
        }) {
            score += 1;
        }
        score
    }

    fn locate_amount(tokens: &[String], date_index: usize) -> Option<AmountSource> {
        for i in 0..tokens.len().saturating_sub(2) {
            let code = tokens[i].as_str();
            let indicator = tokens[i + 1].as_str();
            if matches!(code, "DT" | "CT")
                && matches!(indicator, "D" | "C")
                && AMOUNTS.parse_signed(&tokens[i + 2]).is_some()
            {
                return Some(AmountSource::Coded {
                    index: i + 2,
                    debit: indicator == "D",
                });
            }
        }

        tokens
            .iter()
            .enumerate()
            .skip(date_index + 1)
            .find(|(_, t)| is_signed_numeric(t) && !is_transaction_date(t))
            .map(|(index, _)| AmountSource::Signed { index })
    }

    fn parse_row(tokens: &[String], ids: &mut RowIds) -> Option<CanonicalRecord> {
        let date_index = tokens.iter().position(|t| is_transaction_date(t))?;

        let source = Self::locate_amount(tokens, date_index);
        let (amount_index, amounts) = match source {
            Some(AmountSource::Coded { index, debit }) => {
                let value = AMOUNTS.parse_signed(&tokens[index]).map(|v| v.abs());
                let signed = if debit { value.map(|v| -v) } else { value };
                (Some(index), split_amount(signed))
            }
            Some(AmountSource::Signed { index }) => {
                (Some(index), split_amount(AMOUNTS.parse_signed(&tokens[index])))
            }
            None => (None, split_amount(None)),
        };

        let narration: Vec<&str> = tokens
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_index && Some(*i) != amount_index)
            .map(|(_, t)| t.as_str())
            .filter(|t| !t.is_empty())
            .filter(|t| !is_transaction_date(t))
            .filter(|t| !is_numeric(t))
            .filter(|t| !is_column_code(t))
            .collect();
        let description = clean_description(&narration.join(" "));
        if is_non_transaction(&description) {
            return None;
        }

        let reference = extract_reference(&description);
        Some(CanonicalRecord::new(
            ids.next_id(),
            reference,
            normalize_date(&tokens[date_index]),
            description,
            amounts,
        ))
    }
}

fn is_column_code(token: &str) -> bool {
    token.len() <= MAX_CODE_LEN && token.chars().all(|c| c.is_ascii_alphabetic())
}

// Account numbers, sequence numbers, running balances.
fn is_numeric(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
}

impl StatementParser for AbsaParser {
    fn display_name(&self) -> &'static str {
        "ABSA"
    }

    fn short_token(&self) -> &'static str {
        "ABSA"
    }

    fn hint_keywords(&self) -> &'static [&'static str] {
        &["absa"]
    }

    fn sniff(&self, path: &Path) -> Result<bool> {
        let sample = sample_lines(path, self.thresholds.sample_size())?;
        let score: usize = sample
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|l| Self::line_score(&tokenize(l)))
            .sum();
        debug!(score, min = self.thresholds.absa_min_score, "ABSA sniff");
        Ok(score >= self.thresholds.absa_min_score)
    }

    fn parse(&self, path: &Path) -> Result<ParseOutcome, IngestError> {
        let mut ids = RowIds::default();
        let mut out = Vec::new();

        for (n, line) in read_lines(path, false)?.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match Self::parse_row(&tokenize(line), &mut ids) {
                Some(rec) => out.push(rec),
                None => debug!(line = n + 1, "ABSA: skipped non-transaction row"),
            }
        }

        info!(rows = out.len(), "ABSA parse complete");
        Ok(ParseOutcome::from_records(out))
    }
}
