//! Parser selection: explicit hint first, then ordered detection, then the
//! generic fallback.

use std::path::Path;

use ledgerprep_core::CanonicalRecord;
use tracing::{debug, info, warn};

use crate::detect::DetectionThresholds;
use crate::error::IngestError;
use crate::parser::StatementParser;
use crate::parsers::{AbsaParser, FnbParser, GenericParser, StandardBankParser};

/// The ordered set of parsers a file is resolved against.
///
/// Built once and passed around by reference; nothing in it changes between
/// calls.
pub struct ParserRegistry {
    detectors: Vec<Box<dyn StatementParser>>,
    fallback: GenericParser,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new(DetectionThresholds::default())
    }
}

impl ParserRegistry {
    pub fn new(thresholds: DetectionThresholds) -> Self {
        Self {
            detectors: vec![
                Box::new(AbsaParser::new(thresholds)),
                Box::new(FnbParser::new(thresholds)),
                Box::new(StandardBankParser::new(thresholds)),
            ],
            fallback: GenericParser,
        }
    }

    /// Every parser in detection order, the fallback last.
    pub fn parsers(&self) -> impl Iterator<Item = &dyn StatementParser> {
        self.detectors
            .iter()
            .map(|p| p.as_ref() as &dyn StatementParser)
            .chain(std::iter::once(&self.fallback as &dyn StatementParser))
    }

    /// Select the parser for `path`.
    ///
    /// A non-empty `hint` naming a known institution wins outright. Otherwise
    /// the first detector that claims the file is returned, and the generic
    /// parser when none does. Only a missing file is an error.
    pub fn resolve(&self, hint: Option<&str>, path: &Path) -> Result<&dyn StatementParser, IngestError> {
        if !path.exists() {
            return Err(IngestError::FileNotFound(path.to_path_buf()));
        }

        if let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) {
            match self.parsers().find(|p| p.matches_hint(hint)) {
                Some(parser) => {
                    info!(hint, parser = parser.short_token(), "parser selected by hint");
                    return Ok(parser);
                }
                None => warn!(hint, "unrecognised bank hint; falling back to detection"),
            }
        }

        for parser in &self.detectors {
            if parser.is_match(path) {
                info!(parser = parser.short_token(), path = %path.display(), "format detected");
                return Ok(parser.as_ref());
            }
            debug!(parser = parser.short_token(), "no match");
        }

        info!(path = %path.display(), "no institution matched; using generic parser");
        Ok(&self.fallback)
    }

    /// Resolve, then parse, escalating a structural `NoData` outcome.
    pub fn parse(&self, hint: Option<&str>, path: &Path) -> Result<Vec<CanonicalRecord>, IngestError> {
        let parser = self.resolve(hint, path)?;
        parser.parse(path)?.into_records(parser.display_name(), path)
    }
}
