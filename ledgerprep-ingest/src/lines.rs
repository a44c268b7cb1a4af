//! Line-oriented file access shared by detectors and parsers.
//!
//! Lines are decoded lossily so a stray Latin-1 byte in a narration never
//! aborts a parse.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::IngestError;

/// Hard cap on how many lines any detector may read.
pub const MAX_SAMPLE_LINES: usize = 50;

const UTF8_BOM: char = '\u{feff}';

/// Read every line of `path`.
pub fn read_lines(path: &Path, strip_bom: bool) -> Result<Vec<String>, IngestError> {
    read_at_most(path, usize::MAX, strip_bom)
}

/// Read the first `min(limit, MAX_SAMPLE_LINES)` lines of `path`.
pub fn sample_lines(path: &Path, limit: usize) -> Result<Vec<String>, IngestError> {
    read_at_most(path, limit.min(MAX_SAMPLE_LINES), false)
}

fn read_at_most(path: &Path, limit: usize, strip_bom: bool) -> Result<Vec<String>, IngestError> {
    if !path.exists() {
        return Err(IngestError::FileNotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    let mut reader = BufReader::new(file);

    let mut out = Vec::new();
    let mut buf = Vec::new();
    while out.len() < limit {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| IngestError::io(path, e))?;
        if n == 0 {
            break;
        }
        let mut line = String::from_utf8_lossy(&buf).into_owned();
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        if strip_bom && out.is_empty() {
            if let Some(rest) = line.strip_prefix(UTF8_BOM) {
                line = rest.to_string();
            }
        }
        out.push(line);
    }

    Ok(out)
}
