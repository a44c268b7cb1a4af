//! Field normalizers: dates, signed amounts, references and narrations.
//!
//! Every parser funnels its raw tokens through these so the canonical record
//! means the same thing regardless of which bank produced the file.

pub mod amount;
pub mod date;
pub mod reference;
pub mod text;

pub use amount::{AmountNormalizer, format_amount, normalize_amount, split_amount};
pub use date::{is_date_like, is_transaction_date, normalize_date, parse_date};
pub use reference::{ReferenceExtractor, extract_reference, reference_or_raw};
pub use text::{clean_description, is_non_transaction};
