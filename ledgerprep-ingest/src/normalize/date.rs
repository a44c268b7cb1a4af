use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Formats statement exports are known to use, tried in order.
const EXACT_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%d %B %Y",
];

const EXACT_DATETIME_FORMATS: &[&str] = &[
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
];

/// Locale-independent fallbacks (month-first, spelled-out and two-digit-year
/// variants).
const GENERAL_DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%d-%b-%Y",
    "%d %b %y",
    "%d-%b-%y",
    "%d/%m/%y",
    "%d-%m-%y",
];

const GENERAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

/// Normalize a statement date to `YYYY-MM-DD`.
///
/// Blank input gives an empty string. Anything that cannot be read as a date
/// comes back as the trimmed original.
pub fn normalize_date(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match parse_date(trimmed) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => trimmed.to_string(),
    }
}

/// The success path of [`normalize_date`].
pub fn parse_date(token: &str) -> Option<NaiveDate> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }

    // One export pads its compact dates to nine characters with a leading zero.
    let candidate = if trimmed.len() == 9 && trimmed.starts_with('0') {
        &trimmed[1..]
    } else {
        trimmed
    };

    if candidate.len() == 8 && candidate.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(candidate, "%Y%m%d")
            .ok()
            .filter(plausible);
    }

    parse_with(candidate, EXACT_DATE_FORMATS, EXACT_DATETIME_FORMATS)
        .or_else(|| parse_general(candidate))
}

fn parse_general(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive()).filter(plausible);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive()).filter(plausible);
    }
    parse_with(s, GENERAL_DATE_FORMATS, GENERAL_DATETIME_FORMATS)
}

fn parse_with(s: &str, date_formats: &[&str], datetime_formats: &[&str]) -> Option<NaiveDate> {
    date_formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok().filter(plausible))
        .or_else(|| {
            datetime_formats.iter().find_map(|fmt| {
                NaiveDateTime::parse_from_str(s, fmt)
                    .ok()
                    .map(|dt| dt.date())
                    .filter(plausible)
            })
        })
}

// chrono happily reads "01/05/23" as year 1 under %Y.
fn plausible(date: &NaiveDate) -> bool {
    (1900..=2199).contains(&date.year())
}

/// Cheap, permissive pre-filter for date columns.
///
/// True for anything with a separator that parses as a date, and for any
/// token of four or more characters starting with `20`.
pub fn is_date_like(token: &str) -> bool {
    let t = token.trim();
    if (t.contains('/') || t.contains('-')) && parse_date(t).is_some() {
        return true;
    }
    t.len() >= 4 && t.starts_with("20")
}

/// [`is_date_like`] confirmed by an actual parse; the row-acceptance test.
pub fn is_transaction_date(token: &str) -> bool {
    is_date_like(token) && parse_date(token).is_some()
}
