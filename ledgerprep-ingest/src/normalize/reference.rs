//! Best-effort payment/customer reference extraction from narration text.

use std::sync::LazyLock;

use regex::Regex;

const BASE_MARKERS: &[&str] = &["REFERENCE", "REF"];

static BASE: LazyLock<ReferenceExtractor> = LazyLock::new(ReferenceExtractor::new);

/// Ordered reference patterns; the first one that matches wins.
///
/// Order: explicit marker + digits, trailing run of five or more digits,
/// customer-number marker, digits after a closing parenthesis, any standalone
/// five-or-six digit run.
#[derive(Debug, Clone)]
pub struct ReferenceExtractor {
    patterns: Vec<Regex>,
}

impl Default for ReferenceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceExtractor {
    pub fn new() -> Self {
        Self::with_markers(&[])
    }

    /// Extend the explicit-marker vocabulary (e.g. `TRN`, `PMT`).
    ///
    /// Extra markers join the first pattern, so they keep its priority.
    pub fn with_markers(extra: &[&str]) -> Self {
        let mut markers: Vec<String> = BASE_MARKERS
            .iter()
            .chain(extra.iter())
            .map(|m| regex::escape(m))
            .collect();
        // longest first so REFERENCE is not cut short by REF
        markers.sort_by(|a, b| b.len().cmp(&a.len()));

        let marker_re = format!(
            r"(?i)\b(?:{})\b\s*(?:NO\.?|NR\.?|#)?\s*[:#.\-]?\s*(\d+)",
            markers.join("|")
        );
        let patterns = [
            marker_re.as_str(),
            r"(\d{5,})\s*$",
            r"(?i)\bCUST(?:OMER)?\.?\s*(?:NO\.?|NUMBER|NR\.?|#)?\s*[:#\-]?\s*(\d+)",
            r"\)\s*(\d+)",
            r"\b(\d{5,6})\b",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect();

        Self { patterns }
    }

    /// The first matching reference, or an empty string.
    pub fn extract(&self, text: &str) -> String {
        self.patterns
            .iter()
            .find_map(|re| re.captures(text))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    }

    /// For a dedicated reference column: the extracted digits when there are
    /// any, otherwise the cell as given.
    pub fn extract_or_raw(&self, cell: &str) -> String {
        match self.extract(cell) {
            found if !found.is_empty() => found,
            _ => cell.trim().to_string(),
        }
    }
}

/// [`ReferenceExtractor::extract`] with the base marker vocabulary.
pub fn extract_reference(text: &str) -> String {
    BASE.extract(text)
}

pub fn reference_or_raw(cell: &str) -> String {
    BASE.extract_or_raw(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_marker() {
        assert_eq!(extract_reference("Payment REF:12345 thanks"), "12345");
        assert_eq!(extract_reference("REFERENCE 998 rent 123456"), "998");
        assert_eq!(extract_reference("ref no. 4411"), "4411");
    }

    #[test]
    fn test_no_reference() {
        assert_eq!(extract_reference("no numbers here"), "");
        assert_eq!(extract_reference(""), "");
        assert_eq!(extract_reference("ATM 1234"), "");
    }

    #[test]
    fn test_priority_order() {
        // trailing run beats the customer marker earlier in the text
        assert_eq!(extract_reference("Cust No 42 invoice 7788990"), "7788990");
        assert_eq!(extract_reference("Customer: 42 paid"), "42");
        assert_eq!(extract_reference("DEBIT ORDER (INS)77123 X"), "77123");
        assert_eq!(extract_reference("(SALARY) 42 extra"), "42");
        assert_eq!(extract_reference("ACC 123456 MONTHLY"), "123456");
    }

    #[test]
    fn test_extra_markers() {
        let fnb = ReferenceExtractor::with_markers(&["TRN", "PMT"]);
        assert_eq!(fnb.extract("FNB APP PMT 8812 TO LANDLORD"), "8812");
        assert_eq!(fnb.extract("TRN#5531 CASH"), "5531");
        assert_eq!(extract_reference("FNB APP PMT 8812 TO LANDLORD"), "");
    }

    #[test]
    fn test_extract_or_raw() {
        let refs = ReferenceExtractor::new();
        assert_eq!(refs.extract_or_raw("INV 445566"), "445566");
        assert_eq!(refs.extract_or_raw(" RENT JAN "), "RENT JAN");
    }
}
