//! Delimiter inference and quote-aware line splitting.
//!
//! None of these functions fail: a malformed line still yields at least one
//! (possibly empty) field.

use std::sync::LazyLock;

use regex::Regex;

/// Candidate delimiters in tie-break priority order.
const DELIMITERS: [char; 4] = ['\t', ';', '|', ','];

static COLUMN_GAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}|\t").unwrap());

/// Pick the most frequent of tab, semicolon, pipe and comma.
///
/// Ties go to the earlier entry in [`DELIMITERS`]; a line with none of them
/// yields a comma.
pub fn detect_delimiter(line: &str) -> char {
    let mut best = ',';
    let mut best_count = 0;
    for delim in DELIMITERS {
        let count = line.matches(delim).count();
        if count > best_count {
            best = delim;
            best_count = count;
        }
    }
    best
}

/// Split `line` on `delimiter`, honouring double quotes.
///
/// Inside a quoted span the delimiter is literal and `""` yields one quote.
/// An unterminated quote simply runs to the end of the line.
pub fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Comma split for exports that quote every field but never escape quotes.
///
/// Quote characters only toggle the quoted state; nothing is unescaped.
pub fn split_quoted_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Split a fixed-width line on runs of two or more spaces (or any tab).
pub fn split_whitespace_columns(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return vec![String::new()];
    }
    COLUMN_GAP_RE.split(trimmed).map(str::to_string).collect()
}

/// Infer the layout of a single line and return its trimmed fields.
///
/// Delimited lines go through [`split_line`]; lines without any delimiter are
/// treated as multi-space fixed-width text.
pub fn tokenize(line: &str) -> Vec<String> {
    let delimiter = detect_delimiter(line);
    let raw = if line.contains(delimiter) {
        split_line(line, delimiter)
    } else {
        split_whitespace_columns(line)
    };
    raw.into_iter().map(|f| f.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_highest_count() {
        assert_eq!(detect_delimiter("a,b,c,d"), ',');
        assert_eq!(detect_delimiter("a;b;c"), ';');
        assert_eq!(detect_delimiter("a|b|c,d"), '|');
        assert_eq!(detect_delimiter("a\tb,c,d"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\td,e"), '\t');
    }

    #[test]
    fn test_detect_delimiter_tie_break() {
        assert_eq!(detect_delimiter("a,b;c,d;e"), ';');
        assert_eq!(detect_delimiter("a|b\tc"), '\t');
        assert_eq!(detect_delimiter("a|b,c"), '|');
    }

    #[test]
    fn test_detect_delimiter_defaults_to_comma() {
        assert_eq!(detect_delimiter("no delimiters here"), ',');
        assert_eq!(detect_delimiter(""), ',');
    }

    #[test]
    fn test_split_line_quotes() {
        assert_eq!(split_line(r#"a,"b,c",d"#, ','), vec!["a", "b,c", "d"]);
        assert_eq!(split_line(r#"a,"b""c",d"#, ','), vec!["a", "b\"c", "d"]);
    }

    #[test]
    fn test_split_line_degenerate_input() {
        assert_eq!(split_line("", ','), vec![""]);
        assert_eq!(split_line("a,", ','), vec!["a", ""]);
        // unterminated quote closes at end of line
        assert_eq!(split_line(r#"a,"b,c"#, ','), vec!["a", "b,c"]);
        assert_eq!(split_line("x;y", ';'), vec!["x", "y"]);
    }

    #[test]
    fn test_split_quoted_line_does_not_unescape() {
        assert_eq!(
            split_quoted_line(r#""001","20240105","a,b""#),
            vec!["001", "20240105", "a,b"]
        );
        assert_eq!(split_quoted_line(r#""say ""hi""""#), vec!["say hi"]);
    }

    #[test]
    fn test_split_whitespace_columns() {
        assert_eq!(
            split_whitespace_columns("20240105   123456   -000150.00   CARD PURCHASE SHOP"),
            vec!["20240105", "123456", "-000150.00", "CARD PURCHASE SHOP"]
        );
        assert_eq!(split_whitespace_columns("   "), vec![""]);
    }

    #[test]
    fn test_tokenize_trims_fields() {
        assert_eq!(tokenize(" a , b ,c"), vec!["a", "b", "c"]);
        assert_eq!(tokenize("01/02/2024  SHOP  -5.00"), vec!["01/02/2024", "SHOP", "-5.00"]);
    }
}
