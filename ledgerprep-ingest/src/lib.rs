//! ledgerprep-ingest: bank statement classification and parsing.
//!
//! A file goes through [`ParserRegistry::resolve`] to pick a
//! [`StatementParser`], which turns it into canonical records using the
//! shared tokenizer and normalizers.

pub mod detect;
pub mod error;
pub mod lines;
pub mod normalize;
pub mod parser;
pub mod parsers;
pub mod registry;
pub mod tokenize;

pub use detect::DetectionThresholds;
pub use error::IngestError;
pub use parser::{ParseOutcome, StatementParser};
pub use parsers::{AbsaParser, FnbParser, GenericParser, StandardBankParser};
pub use registry::ParserRegistry;
