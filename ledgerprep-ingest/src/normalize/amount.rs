//! Signed-amount normalization into the receipt/disbursement pair.
//!
//! Banks encode sign as a leading `-`, a trailing `-`, accounting parentheses
//! or a `CR`/`DR` suffix. The per-bank differences are flags on
//! [`AmountNormalizer`] rather than separate code paths.

use std::str::FromStr;

use ledgerprep_core::ZERO_AMOUNT;
use rust_decimal::{Decimal, RoundingStrategy};

/// One amount-cleaning pipeline, parameterised by the sign conventions a
/// given export is allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountNormalizer {
    /// `150.00 DR` is a debit, `150.00 CR` a credit
    pub cr_dr_suffix: bool,
    /// `150.00-` is a debit
    pub trailing_minus: bool,
    /// A lone comma followed by one or two digits is a decimal separator
    pub comma_decimal: bool,
}

impl Default for AmountNormalizer {
    fn default() -> Self {
        Self {
            cr_dr_suffix: true,
            trailing_minus: true,
            comma_decimal: false,
        }
    }
}

impl AmountNormalizer {
    /// Parse `token` into a signed decimal, or `None` if it is not an amount.
    pub fn parse_signed(&self, token: &str) -> Option<Decimal> {
        let mut s = token.trim();
        if s.is_empty() {
            return None;
        }

        let mut negative = false;
        if self.cr_dr_suffix && s.len() >= 2 && s.is_char_boundary(s.len() - 2) {
            let tail = s[s.len() - 2..].to_ascii_uppercase();
            if tail == "DR" || tail == "CR" {
                negative = tail == "DR";
                s = s[..s.len() - 2].trim_end();
            }
        }

        let mut cleaned: String = s
            .chars()
            .filter(|c| !matches!(c, 'R' | 'r' | '$') && !c.is_whitespace())
            .collect();

        if cleaned.starts_with('(') && cleaned.ends_with(')') && cleaned.len() >= 2 {
            negative = true;
            cleaned = cleaned[1..cleaned.len() - 1].to_string();
        }
        if let Some(rest) = cleaned.strip_prefix('-') {
            negative = true;
            cleaned = rest.to_string();
        } else if let Some(rest) = cleaned.strip_prefix('+') {
            cleaned = rest.to_string();
        }
        if self.trailing_minus {
            if let Some(rest) = cleaned.strip_suffix('-') {
                negative = true;
                cleaned = rest.to_string();
            }
        }

        let cleaned = self.resolve_separators(&cleaned);
        let cleaned = strip_leading_zeros(&cleaned);

        let well_formed = cleaned.bytes().any(|b| b.is_ascii_digit())
            && cleaned.bytes().all(|b| b.is_ascii_digit() || b == b'.')
            && cleaned.matches('.').count() <= 1;
        if !well_formed {
            return None;
        }

        let value = Decimal::from_str(&cleaned).ok()?;
        Some(if negative { -value } else { value })
    }

    /// Route `token` to `(receipt, disbursement)`.
    pub fn normalize(&self, token: &str) -> (String, String) {
        split_amount(self.parse_signed(token))
    }

    fn resolve_separators(&self, s: &str) -> String {
        if s.contains(',') && s.contains('.') {
            return s.replace(',', "");
        }
        if self.comma_decimal && s.matches(',').count() == 1 {
            if let Some((_, frac)) = s.split_once(',') {
                if (1..=2).contains(&frac.len()) {
                    return s.replace(',', ".");
                }
            }
        }
        s.replace(',', "")
    }
}

fn strip_leading_zeros(s: &str) -> String {
    let (int, frac) = match s.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (s, None),
    };
    let int = int.trim_start_matches('0');
    let int = if int.is_empty() { "0" } else { int };
    match frac {
        Some(frac) => format!("{int}.{frac}"),
        None => int.to_string(),
    }
}

/// Absolute value with exactly two decimals.
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = value
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Non-negative amounts become receipts, negative ones disbursements; an
/// unparseable amount zeroes both sides.
pub fn split_amount(amount: Option<Decimal>) -> (String, String) {
    match amount {
        Some(v) if v < Decimal::ZERO => (ZERO_AMOUNT.to_string(), format_amount(v)),
        Some(v) => (format_amount(v), ZERO_AMOUNT.to_string()),
        None => (ZERO_AMOUNT.to_string(), ZERO_AMOUNT.to_string()),
    }
}

/// [`AmountNormalizer::normalize`] with the default conventions: sign
/// suffixes honoured, commas read as thousands separators.
pub fn normalize_amount(token: &str) -> (String, String) {
    AmountNormalizer::default().normalize(token)
}
