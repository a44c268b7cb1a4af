//! Canonical transaction record shared by every statement parser

use serde::{Deserialize, Serialize};

/// Literal used for the inactive side of a receipt/disbursement pair.
pub const ZERO_AMOUNT: &str = "0.00";

/// Column header labels, in output field order.
pub const COLUMN_LABELS: [&str; 6] = [
    "Ext. Tran. ID",
    "Ext. Ref. Nbr.",
    "Tran. Date",
    "Tran. Desc.",
    "Receipt",
    "Disbursement",
];

/// One normalized statement line, ready for ledger import.
///
/// All fields are strings because the downstream table is text: dates that
/// failed normalization are carried verbatim rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// File-provided row ID, or a 1-based counter scoped to the parse
    #[serde(rename = "Ext. Tran. ID")]
    pub external_transaction_id: String,
    /// Best-effort payment/customer reference; empty when none was found
    #[serde(rename = "Ext. Ref. Nbr.")]
    pub external_reference: String,
    /// `YYYY-MM-DD`, or the trimmed source token when normalization failed
    #[serde(rename = "Tran. Date")]
    pub transaction_date: String,
    #[serde(rename = "Tran. Desc.")]
    pub description: String,
    /// Non-negative, two decimals
    #[serde(rename = "Receipt")]
    pub receipt: String,
    /// Non-negative, two decimals
    #[serde(rename = "Disbursement")]
    pub disbursement: String,
}

impl CanonicalRecord {
    pub fn new(
        external_transaction_id: impl Into<String>,
        external_reference: impl Into<String>,
        transaction_date: impl Into<String>,
        description: impl Into<String>,
        (receipt, disbursement): (String, String),
    ) -> Self {
        Self {
            external_transaction_id: external_transaction_id.into(),
            external_reference: external_reference.into(),
            transaction_date: transaction_date.into(),
            description: description.into(),
            receipt,
            disbursement,
        }
    }

    /// True when the amount could not be parsed at all.
    pub fn is_unpriced(&self) -> bool {
        self.receipt == ZERO_AMOUNT && self.disbursement == ZERO_AMOUNT
    }

    /// Fields in output column order.
    pub fn fields(&self) -> [&str; 6] {
        [
            self.external_transaction_id.as_str(),
            self.external_reference.as_str(),
            self.transaction_date.as_str(),
            self.description.as_str(),
            self.receipt.as_str(),
            self.disbursement.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CanonicalRecord {
        CanonicalRecord::new(
            "1",
            "12345",
            "2024-01-05",
            "POS PURCHASE",
            ("0.00".to_string(), "150.00".to_string()),
        )
    }

    #[test]
    fn test_fields_follow_column_order() {
        let rec = sample();
        assert_eq!(
            rec.fields(),
            ["1", "12345", "2024-01-05", "POS PURCHASE", "0.00", "150.00"]
        );
    }

    #[test]
    fn test_unpriced_only_when_both_sides_zero() {
        assert!(!sample().is_unpriced());

        let mut rec = sample();
        rec.disbursement = ZERO_AMOUNT.to_string();
        assert!(rec.is_unpriced());
    }
}
