//! Tabular destinations for parsed records.
//!
//! The engine only produces an ordered `Vec<CanonicalRecord>`; whoever owns the
//! output (a spreadsheet writer, a CSV file, stdout) implements [`RecordSink`].

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::record::CanonicalRecord;

/// Destination for a finished record sequence.
pub trait RecordSink {
    fn write_records(&mut self, records: &[CanonicalRecord]) -> Result<()>;
}

/// Delimited-text sink backed by the `csv` crate.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Comma-delimited with a header row.
    pub fn new(out: W) -> Self {
        Self::with_options(out, b',', true)
    }

    pub fn with_options(out: W, delimiter: u8, include_header: bool) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(include_header)
            .from_writer(out);
        Self { writer }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flushing csv sink: {}", e.error()))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write_records(&mut self, records: &[CanonicalRecord]) -> Result<()> {
        for rec in records {
            self.writer
                .serialize(rec)
                .with_context(|| format!("writing record {}", rec.external_transaction_id))?;
        }
        self.writer.flush().context("flushing csv output")?;
        Ok(())
    }
}

/// Pretty-printed JSON array, keyed by the column labels.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RecordSink for JsonSink<W> {
    fn write_records(&mut self, records: &[CanonicalRecord]) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, records).context("serialize records")?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// `<stem>_<short_token>.csv` next to the input file.
pub fn default_output_name(input: &Path, short_token: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "statement".to_string());
    input.with_file_name(format!("{stem}_{short_token}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::COLUMN_LABELS;

    fn records() -> Vec<CanonicalRecord> {
        vec![
            CanonicalRecord::new(
                "1",
                "REF001",
                "2023-05-01",
                "Coffee",
                ("45.00".to_string(), "0.00".to_string()),
            ),
            CanonicalRecord::new(
                "2",
                "",
                "2023-05-01",
                "Rent, May",
                ("0.00".to_string(), "1200.00".to_string()),
            ),
        ]
    }

    #[test]
    fn test_csv_sink_writes_labels_then_rows() {
        let mut sink = CsvSink::new(Vec::new());
        sink.write_records(&records()).unwrap();
        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], COLUMN_LABELS.join(","));
        assert_eq!(lines[1], "1,REF001,2023-05-01,Coffee,45.00,0.00");
        assert_eq!(lines[2], "2,,2023-05-01,\"Rent, May\",0.00,1200.00");
    }

    #[test]
    fn test_csv_sink_without_header() {
        let mut sink = CsvSink::with_options(Vec::new(), b';', false);
        sink.write_records(&records()).unwrap();
        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        assert!(text.starts_with("1;REF001;2023-05-01;Coffee;45.00;0.00"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_json_sink_uses_column_labels() {
        let mut buf = Vec::new();
        JsonSink::new(&mut buf).write_records(&records()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[1]["Disbursement"], "1200.00");
        assert_eq!(value[0]["Ext. Ref. Nbr."], "REF001");
    }

    #[test]
    fn test_default_output_name() {
        let p = default_output_name(Path::new("/tmp/exports/march.csv"), "FNB");
        assert_eq!(p, PathBuf::from("/tmp/exports/march_FNB.csv"));
    }
}
