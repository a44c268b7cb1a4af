//! ledgerprep-core: canonical transaction record and the tabular sinks that consume it

pub mod record;
pub mod sink;

pub use record::{CanonicalRecord, COLUMN_LABELS, ZERO_AMOUNT};
pub use sink::{CsvSink, JsonSink, RecordSink, default_output_name};
