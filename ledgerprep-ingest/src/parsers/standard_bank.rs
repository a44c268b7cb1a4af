//! Standard Bank statement exports, in both layout generations.
//!
//! New layout: a few metadata lines, then a header naming Date, Amount and
//! Balance (plus optional Value Date, Description, Type, Originator,
//! Reference), then delimited rows.
//!
//! Legacy layout: headerless. Rows are either fully quoted
//!   "000123","20240105","4455667","-000000150.00","CARD PURCHASE CHECKERS"
//! or delimited/space separated
//!   20240105  4455667  -000000150.00  CARD PURCHASE CHECKERS
//!
//! These exports may start with a UTF-8 BOM.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use ledgerprep_core::CanonicalRecord;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::detect::{
    DetectionThresholds, is_compact_date, is_heavily_quoted, is_signed_padded_amount,
};
use crate::error::IngestError;
use crate::lines::{read_lines, sample_lines};
use crate::normalize::{
    AmountNormalizer, clean_description, extract_reference, is_non_transaction,
    is_transaction_date, normalize_date, reference_or_raw, split_amount,
};
use crate::parser::{ParseOutcome, RowIds, StatementParser};
use crate::tokenize::{detect_delimiter, split_line, split_quoted_line, tokenize};

const LEGACY_HEADER_KEYWORDS: &[&str] = &["DATE", "AMOUNT", "DESCRIPTION", "REFERENCE", "BALANCE"];

const AMOUNTS: AmountNormalizer = AmountNormalizer {
    cr_dr_suffix: true,
    trailing_minus: true,
    comma_decimal: false,
};

/// `DD/MM/YYYY` or `YYYYMMDD`, optionally followed by a time.
static NEW_LAYOUT_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d{1,2}/\d{1,2}/\d{4}|\d{8})(?:\s.*)?$").unwrap());

#[derive(Debug, Clone, Default)]
pub struct StandardBankParser {
    thresholds: DetectionThresholds,
}

/// Which generation of the export a file is, decided once per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    New { header_line: usize },
    Legacy,
}

/// Column positions bound from the new-layout header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NewLayoutColumns {
    date: usize,
    value_date: Option<usize>,
    description: Option<usize>,
    amount: Option<usize>,
    balance: Option<usize>,
    kind: Option<usize>,
    originator: Option<usize>,
    reference: Option<usize>,
}

impl NewLayoutColumns {
    fn from_header(tokens: &[String]) -> Option<Self> {
        let mut date = None;
        let mut cols = Self {
            date: 0,
            value_date: None,
            description: None,
            amount: None,
            balance: None,
            kind: None,
            originator: None,
            reference: None,
        };

        for (i, raw) in tokens.iter().enumerate() {
            let name = raw.trim().to_uppercase();
            let slot = if name.contains("DATE") && name.contains("VALUE") {
                &mut cols.value_date
            } else if name.contains("DATE") {
                &mut date
            } else if ["DESC", "NARRATIVE", "DETAIL"].iter().any(|k| name.contains(k)) {
                &mut cols.description
            } else if name.contains("AMOUNT") {
                &mut cols.amount
            } else if name.contains("BALANCE") {
                &mut cols.balance
            } else if name.contains("TYPE") {
                &mut cols.kind
            } else if ["ORIGINATOR", "BENEFICIARY", "PAYEE"].iter().any(|k| name.contains(k)) {
                &mut cols.originator
            } else if name.contains("REFERENCE") || name == "REF" {
                &mut cols.reference
            } else {
                continue;
            };
            if slot.is_none() {
                *slot = Some(i);
            }
        }

        cols.date = date?;
        Some(cols)
    }
}

fn has_new_header(line: &str) -> bool {
    let upper = line.to_uppercase();
    upper.contains("DATE") && upper.contains("AMOUNT") && upper.contains("BALANCE")
}

fn cell(tokens: &[String], index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| tokens.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

fn is_debit_type(kind: Option<&str>) -> bool {
    kind.map(|k| k.to_uppercase())
        .is_some_and(|k| k.contains("DEBIT") || k == "DR" || k == "D")
}

impl StandardBankParser {
    pub fn new(thresholds: DetectionThresholds) -> Self {
        Self { thresholds }
    }

    fn determine_layout(&self, lines: &[String]) -> Layout {
        lines
            .iter()
            .take(self.thresholds.standard_header_scan_lines)
            .position(|l| has_new_header(l))
            .map_or(Layout::Legacy, |header_line| Layout::New { header_line })
    }

    fn parse_new_row(
        tokens: &[String],
        cols: &NewLayoutColumns,
        ids: &mut RowIds,
    ) -> Option<CanonicalRecord> {
        let date = cell(tokens, Some(cols.date)).filter(|d| NEW_LAYOUT_DATE_RE.is_match(d))?;

        let mut description = clean_description(cell(tokens, cols.description).unwrap_or(""));
        if is_non_transaction(&description) {
            return None;
        }
        if let Some(originator) = cell(tokens, cols.originator) {
            if !description.contains(originator) {
                description = clean_description(&format!("{description} {originator}"));
            }
        }

        let raw_amount = cell(tokens, cols.amount);
        let mut amount = raw_amount.and_then(|raw| AMOUNTS.parse_signed(raw));
        // Unsigned amounts take their side from the Type column.
        if let (Some(v), Some(raw)) = (amount, raw_amount) {
            if v > Decimal::ZERO && !raw.contains('+') && is_debit_type(cell(tokens, cols.kind)) {
                amount = Some(-v);
            }
        }

        let reference = match cell(tokens, cols.reference) {
            Some(raw) => reference_or_raw(raw),
            None => extract_reference(&description),
        };

        Some(CanonicalRecord::new(
            ids.next_id(),
            reference,
            normalize_date(date),
            description,
            split_amount(amount),
        ))
    }

    fn parse_legacy_row(line: &str, ids: &mut RowIds) -> Option<CanonicalRecord> {
        let quoted = is_heavily_quoted(line);
        let tokens: Vec<String> = if quoted {
            split_quoted_line(line)
                .into_iter()
                .map(|t| t.trim().to_string())
                .collect()
        } else {
            let tokens = tokenize(line);
            if tokens.len() < 4 {
                line.split_whitespace().map(str::to_string).collect()
            } else {
                tokens
            }
        };

        // quoted: id, date, reference, amount, description
        // other:  date, reference, amount, description...
        let (id, offset) = if quoted {
            (tokens.first().map(String::as_str), 1)
        } else {
            (None, 0)
        };

        let date = tokens.get(offset).filter(|d| is_transaction_date(d))?;
        let reference = tokens.get(offset + 1).map(|r| r.trim()).unwrap_or("");
        let amount = tokens
            .get(offset + 2)
            .and_then(|a| AMOUNTS.parse_signed(a));
        let narration = if quoted {
            tokens.get(offset + 3).cloned().unwrap_or_default()
        } else {
            tokens.get(offset + 3..).map(|rest| rest.join(" ")).unwrap_or_default()
        };

        let description = clean_description(&narration);
        if is_non_transaction(&description) {
            return None;
        }

        Some(CanonicalRecord::new(
            ids.or_next(id),
            reference,
            normalize_date(date),
            description,
            split_amount(amount),
        ))
    }
}

impl StatementParser for StandardBankParser {
    fn display_name(&self) -> &'static str {
        "Standard Bank"
    }

    fn short_token(&self) -> &'static str {
        "SBSA"
    }

    fn hint_keywords(&self) -> &'static [&'static str] {
        &["standard", "stanbic", "sbsa"]
    }

    fn sniff(&self, path: &Path) -> Result<bool> {
        let sample = sample_lines(path, self.thresholds.sample_size())?;
        if sample.iter().any(|l| has_new_header(l)) {
            debug!("Standard Bank sniff: new-layout header");
            return Ok(true);
        }

        let (mut header_hits, mut compact_dates, mut signed_amounts, mut quoted) = (0, 0, 0, 0);
        for line in sample.iter().filter(|l| !l.trim().is_empty()) {
            let upper = line.to_uppercase();
            if LEGACY_HEADER_KEYWORDS.iter().any(|k| upper.contains(k)) {
                header_hits += 1;
            }
            let tokens = if is_heavily_quoted(line) {
                quoted += 1;
                split_quoted_line(line)
            } else {
                tokenize(line)
            };
            compact_dates += tokens.iter().filter(|t| is_compact_date(t)).count();
            signed_amounts += tokens.iter().filter(|t| is_signed_padded_amount(t)).count();
        }

        let t = &self.thresholds;
        debug!(header_hits, compact_dates, signed_amounts, quoted, "Standard Bank legacy sniff");
        Ok((header_hits >= 1
            && (compact_dates >= t.standard_legacy_min_compact_dates
                || signed_amounts >= t.standard_legacy_min_signed_amounts))
            || (quoted >= t.standard_legacy_min_quoted_lines
                && signed_amounts >= t.standard_legacy_min_signed_amounts))
    }

    fn parse(&self, path: &Path) -> Result<ParseOutcome, IngestError> {
        let lines = read_lines(path, true)?;
        let layout = self.determine_layout(&lines);
        let mut ids = RowIds::default();
        let mut out = Vec::new();

        match layout {
            Layout::New { header_line } => {
                let header = &lines[header_line];
                let delimiter = detect_delimiter(header);
                let header_tokens: Vec<String> = split_line(header, delimiter)
                    .into_iter()
                    .map(|t| t.trim().to_string())
                    .collect();
                let Some(cols) = NewLayoutColumns::from_header(&header_tokens) else {
                    return Ok(ParseOutcome::Empty);
                };
                debug!(header_line = header_line + 1, ?cols, "Standard Bank new layout");

                for (n, line) in lines.iter().enumerate().skip(header_line + 1) {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let tokens: Vec<String> = split_line(line, delimiter)
                        .into_iter()
                        .map(|t| t.trim().to_string())
                        .collect();
                    match Self::parse_new_row(&tokens, &cols, &mut ids) {
                        Some(rec) => out.push(rec),
                        None => debug!(line = n + 1, "Standard Bank: skipped row"),
                    }
                }
            }
            Layout::Legacy => {
                debug!("Standard Bank legacy layout");
                for (n, line) in lines.iter().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match Self::parse_legacy_row(line, &mut ids) {
                        Some(rec) => out.push(rec),
                        None => debug!(line = n + 1, "Standard Bank: skipped row"),
                    }
                }
            }
        }

        info!(rows = out.len(), ?layout, "Standard Bank parse complete");
        Ok(ParseOutcome::from_records(out))
    }
}
