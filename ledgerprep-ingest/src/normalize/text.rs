/// Rows carrying these markers are balances or summaries, not transactions.
const NON_TRANSACTION_MARKERS: &[&str] = &[
    "OPENING BALANCE",
    "CLOSING BALANCE",
    "BALANCE BROUGHT FORWARD",
    "BALANCE CARRIED FORWARD",
    "ACCOUNT SUMMARY",
];

/// Collapse internal whitespace and trim punctuation from both ends.
pub fn clean_description(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
        .to_string()
}

pub fn is_non_transaction(text: &str) -> bool {
    let upper = text.to_uppercase();
    NON_TRANSACTION_MARKERS.iter().any(|m| upper.contains(m))
}
