use std::path::PathBuf;

use thiserror::Error;

/// Conditions that leave the engine and reach the caller as fatal for a file.
///
/// Row-level normalization problems never show up here: they are absorbed by
/// the parsers (pass-through dates, zeroed amounts, skipped rows).
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no data parsed from {} by the {parser} parser", path.display())]
    NoData { parser: &'static str, path: PathBuf },
}

impl IngestError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
