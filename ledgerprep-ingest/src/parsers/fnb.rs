//! FNB statement exports.
//!
//! Most vintages carry a header row somewhere below a few lines of account
//! metadata, with either a single signed Amount column or split Debit/Credit
//! columns. Older exports are headerless and date-led:
//!   Date,Description,Reference,Amount,Balance
//!   2024/01/05,POS PURCHASE CHECKERS,,-150.00,1350.00

use std::path::Path;

use anyhow::Result;
use ledgerprep_core::CanonicalRecord;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::detect::DetectionThresholds;
use crate::error::IngestError;
use crate::lines::{read_lines, sample_lines};
use crate::normalize::{
    AmountNormalizer, ReferenceExtractor, clean_description, is_non_transaction,
    is_transaction_date, normalize_date, split_amount,
};
use crate::parser::{ParseOutcome, RowIds, StatementParser};
use crate::tokenize::{detect_delimiter, split_line, tokenize};

const REFERENCE_MARKERS: &[&str] = &["TRN", "PMT"];

/// Some FNB vintages write `150,00`.
const AMOUNTS: AmountNormalizer = AmountNormalizer {
    cr_dr_suffix: true,
    trailing_minus: true,
    comma_decimal: true,
};

#[derive(Debug, Clone, Default)]
pub struct FnbParser {
    thresholds: DetectionThresholds,
}

/// Column positions bound from a recognised header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ColumnBinding {
    date: Option<usize>,
    description: Option<usize>,
    amount: Option<usize>,
    debit: Option<usize>,
    credit: Option<usize>,
    balance: Option<usize>,
    reference: Option<usize>,
}

impl ColumnBinding {
    fn from_header(tokens: &[String]) -> Self {
        let mut b = Self::default();
        for (i, raw) in tokens.iter().enumerate() {
            let name = raw.trim().to_uppercase();
            let slot = if name.contains("DATE") {
                if name.contains("VALUE") { None } else { Some(&mut b.date) }
            } else if ["DESC", "NARRATION", "DETAIL", "PARTICULARS"]
                .iter()
                .any(|k| name.contains(k))
            {
                Some(&mut b.description)
            } else if name.contains("DEBIT") || name == "DR" {
                Some(&mut b.debit)
            } else if name.contains("CREDIT") || name == "CR" {
                Some(&mut b.credit)
            } else if name.contains("BALANCE") {
                Some(&mut b.balance)
            } else if name.contains("AMOUNT") {
                Some(&mut b.amount)
            } else if name.contains("REFERENCE") || name == "REF" {
                Some(&mut b.reference)
            } else {
                None
            };
            if let Some(slot) = slot {
                if slot.is_none() {
                    *slot = Some(i);
                }
            }
        }
        b
    }

    fn claimed(&self) -> [Option<usize>; 7] {
        [
            self.date,
            self.description,
            self.amount,
            self.debit,
            self.credit,
            self.balance,
            self.reference,
        ]
    }
}

/// Number of header keyword groups present among `tokens`: date,
/// description, amount and reference.
pub(crate) fn header_hits(tokens: &[String]) -> usize {
    let upper: Vec<String> = tokens.iter().map(|t| t.trim().to_uppercase()).collect();

    [
        any_token(&upper, |t| t.contains("DATE")),
        any_token(&upper, |t| {
            t.contains("DESC") || t.contains("NARRATION") || t.contains("DETAIL")
        }),
        any_token(&upper, |t| {
            t.contains("AMOUNT")
                || t.contains("DEBIT")
                || t.contains("CREDIT")
                || t == "DR"
                || t == "CR"
        }),
        any_token(&upper, |t| t.contains("REFERENCE") || t == "REF"),
    ]
    .into_iter()
    .filter(|hit| *hit)
    .count()
}

fn any_token(upper: &[String], pred: impl Fn(&str) -> bool) -> bool {
    upper.iter().any(|t| pred(t))
}

fn cell(tokens: &[String], index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| tokens.get(i))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

fn abs_amount(token: Option<&str>) -> Option<Decimal> {
    token
        .and_then(|t| AMOUNTS.parse_signed(t))
        .map(|v| v.abs())
}

impl FnbParser {
    pub fn new(thresholds: DetectionThresholds) -> Self {
        Self { thresholds }
    }

    /// A line is the header when it hits enough keyword groups and is not
    /// itself a dated row.
    fn is_header(&self, tokens: &[String]) -> bool {
        header_hits(tokens) >= self.thresholds.fnb_min_header_hits
            && !tokens.iter().any(|t| is_transaction_date(t))
    }

    /// The first line that reads as a header with a Date column, with the
    /// delimiter of that line and its column binding.
    fn locate_header(&self, lines: &[String]) -> Option<(usize, char, ColumnBinding)> {
        lines.iter().enumerate().find_map(|(n, line)| {
            let tokens = tokenize(line);
            if !self.is_header(&tokens) {
                return None;
            }
            let binding = ColumnBinding::from_header(&tokens);
            binding.date.map(|_| (n, detect_delimiter(line), binding))
        })
    }

    fn parse_bound_row(
        tokens: &[String],
        binding: &ColumnBinding,
        refs: &ReferenceExtractor,
        ids: &mut RowIds,
    ) -> Option<CanonicalRecord> {
        let date = cell(tokens, binding.date).filter(|d| is_transaction_date(d))?;

        let description = match binding.description {
            Some(_) => clean_description(cell(tokens, binding.description).unwrap_or("")),
            None => Self::leftover_description(tokens, &binding.claimed()),
        };
        if is_non_transaction(&description) {
            return None;
        }

        let debit = abs_amount(cell(tokens, binding.debit));
        let credit = abs_amount(cell(tokens, binding.credit));
        let amount = match (debit, credit) {
            (Some(d), _) if !d.is_zero() || credit.is_none() => Some(-d),
            (_, Some(c)) => Some(c),
            _ => match cell(tokens, binding.amount) {
                Some(raw) => AMOUNTS.parse_signed(raw),
                None => Self::infer_amount(tokens, &binding.claimed()).map(|(_, v)| v),
            },
        };

        let reference = match cell(tokens, binding.reference) {
            Some(raw) => refs.extract_or_raw(raw),
            None => refs.extract(&description),
        };

        Some(CanonicalRecord::new(
            ids.next_id(),
            reference,
            normalize_date(date),
            description,
            split_amount(amount),
        ))
    }

    fn parse_headerless_row(
        tokens: &[String],
        refs: &ReferenceExtractor,
        ids: &mut RowIds,
    ) -> Option<CanonicalRecord> {
        let date_index = tokens.iter().position(|t| is_transaction_date(t))?;
        let mut claimed = vec![Some(date_index)];

        let amount = Self::infer_amount(tokens, &claimed);
        if let Some((index, _)) = amount {
            claimed.push(Some(index));
        }

        let description = Self::leftover_description(tokens, &claimed);
        if is_non_transaction(&description) {
            return None;
        }
        let reference = refs.extract(&description);

        Some(CanonicalRecord::new(
            ids.next_id(),
            reference,
            normalize_date(&tokens[date_index]),
            description,
            split_amount(amount.map(|(_, v)| v)),
        ))
    }

    /// The amount token when no header names it: the only numeric token, or
    /// failing that the first one with a decimal fraction.
    fn infer_amount(tokens: &[String], claimed: &[Option<usize>]) -> Option<(usize, Decimal)> {
        let numeric: Vec<(usize, &str, Decimal)> = tokens
            .iter()
            .enumerate()
            .filter(|(i, _)| !claimed.contains(&Some(*i)))
            .filter(|(_, t)| !is_transaction_date(t))
            .filter_map(|(i, t)| AMOUNTS.parse_signed(t).map(|v| (i, t.as_str(), v)))
            .collect();

        if let [(i, _, v)] = numeric.as_slice() {
            return Some((*i, *v));
        }
        numeric
            .iter()
            .find(|(_, t, _)| t.contains('.'))
            .map(|(i, _, v)| (*i, *v))
    }

    /// Everything not bound to another role, minus decimal figures (running
    /// balances) that headerless rows carry.
    fn leftover_description(tokens: &[String], claimed: &[Option<usize>]) -> String {
        let parts: Vec<&str> = tokens
            .iter()
            .enumerate()
            .filter(|(i, _)| !claimed.contains(&Some(*i)))
            .map(|(_, t)| t.trim())
            .filter(|t| !t.is_empty())
            .filter(|t| !(t.contains('.') && AMOUNTS.parse_signed(t).is_some()))
            .collect();
        clean_description(&parts.join(" "))
    }
}

impl StatementParser for FnbParser {
    fn display_name(&self) -> &'static str {
        "First National Bank"
    }

    fn short_token(&self) -> &'static str {
        "FNB"
    }

    fn hint_keywords(&self) -> &'static [&'static str] {
        &["fnb", "first national"]
    }

    fn sniff(&self, path: &Path) -> Result<bool> {
        let sample = sample_lines(path, self.thresholds.sample_size())?;

        let mut best_header = 0;
        let mut date_led = 0;
        for line in sample.iter().filter(|l| !l.trim().is_empty()) {
            let tokens = tokenize(line);
            best_header = best_header.max(header_hits(&tokens));
            if tokens.first().is_some_and(|t| is_transaction_date(t)) {
                date_led += 1;
            }
        }

        debug!(best_header, date_led, "FNB sniff");
        Ok(best_header >= self.thresholds.fnb_min_header_hits
            || date_led >= self.thresholds.fnb_min_date_led_lines)
    }

    fn parse(&self, path: &Path) -> Result<ParseOutcome, IngestError> {
        let lines = read_lines(path, false)?;
        let refs = ReferenceExtractor::with_markers(REFERENCE_MARKERS);
        let mut ids = RowIds::default();
        let mut out = Vec::new();

        // Header binding, once per file. Everything above the header is
        // account metadata.
        let layout = self.locate_header(&lines);
        if let Some((header_line, _, binding)) = layout {
            debug!(line = header_line + 1, ?binding, "FNB header bound");
        }

        for (n, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let row = match layout {
                Some((header_line, _, _)) if n <= header_line => continue,
                Some((_, delimiter, binding)) => {
                    let tokens: Vec<String> = split_line(line, delimiter)
                        .into_iter()
                        .map(|t| t.trim().to_string())
                        .collect();
                    Self::parse_bound_row(&tokens, &binding, &refs, &mut ids)
                }
                None => Self::parse_headerless_row(&tokenize(line), &refs, &mut ids),
            };

            match row {
                Some(rec) => out.push(rec),
                None => debug!(line = n + 1, "FNB: skipped non-transaction row"),
            }
        }

        if out.is_empty() {
            warn!(path = %path.display(), "FNB: no transactional rows found");
            return Ok(ParseOutcome::NoData {
                reason: "no dated transaction rows found".to_string(),
            });
        }

        info!(rows = out.len(), header = layout.is_some(), "FNB parse complete");
        Ok(ParseOutcome::Parsed(out))
    }
}
