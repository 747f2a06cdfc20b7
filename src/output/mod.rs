//! Structured data dump.
//!
//! The dump is an independent, machine-readable copy of the exported
//! records next to the HTML document:
//!
//! - [`write_json`] / [`to_json`] - `{"export_info": {...}, "messages": [...]}`
//! - [`write_jsonl`] / [`to_jsonl`] - export info line, then one record per line
//! - [`write_csv`] / [`to_csv`] - `;`-separated table - requires `csv-output` feature
//!
//! Records are checked one by one when the dump is assembled. A record that
//! cannot be serialized is replaced by an error stand-in carrying its id, so
//! one bad record never loses the rest of the dump.
//!
//! # Example
//!
//! ```rust
//! use tgexport::MessageRecord;
//! use tgexport::output::{ExportDump, ExportInfo, to_json};
//! use tgexport::render::ExportSummary;
//!
//! let mut record = MessageRecord::new(1);
//! record.text = Some("hello".into());
//! let records = vec![record];
//!
//! let info = ExportInfo::new(
//!     "https://t.me/chan/1",
//!     "https://t.me/chan/1",
//!     ExportSummary::from_records(&records, &[]),
//! );
//! let dump = ExportDump::new(info, &records);
//! let json = to_json(&dump, false)?;
//! assert!(json.starts_with(r#"{"export_info":"#));
//! # Ok::<(), tgexport::ExportError>(())
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ExportError, RecordError, Result};
use crate::format::OutputFormat;
use crate::message::MessageRecord;
use crate::render::ExportSummary;

#[cfg(feature = "csv-output")]
mod csv_writer;
mod json_writer;
mod jsonl_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{CSV_HEADER, to_csv, write_csv};
pub use json_writer::{to_json, write_json};
pub use jsonl_writer::{to_jsonl, write_jsonl};

/// Generator identity recorded in every dump.
pub const GENERATOR: &str = concat!("tgexport ", env!("CARGO_PKG_VERSION"));

/// Metadata heading a dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportInfo {
    pub exported_at: DateTime<Utc>,
    pub total_messages: usize,
    pub generator: String,
    pub start_link: String,
    pub end_link: String,
    pub summary: ExportSummary,
}

impl ExportInfo {
    /// Creates export info stamped with the current time.
    pub fn new(start_link: impl Into<String>, end_link: impl Into<String>, summary: ExportSummary) -> Self {
        Self {
            exported_at: Utc::now(),
            total_messages: summary.total,
            generator: GENERATOR.to_string(),
            start_link: start_link.into(),
            end_link: end_link.into(),
            summary,
        }
    }

    #[must_use]
    pub fn with_exported_at(mut self, at: DateTime<Utc>) -> Self {
        self.exported_at = at;
        self
    }
}

/// A complete dump: export info plus one entry per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDump {
    pub export_info: ExportInfo,
    pub messages: Vec<MessageRecord>,
}

impl ExportDump {
    /// Assembles a dump, replacing records that cannot be serialized.
    pub fn new(export_info: ExportInfo, records: &[MessageRecord]) -> Self {
        Self {
            export_info,
            messages: records.iter().map(dumpable).collect(),
        }
    }

    /// Reads a JSON dump back.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Returns the record itself if it serializes, otherwise an error stand-in.
pub fn dumpable(record: &MessageRecord) -> MessageRecord {
    match serde_json::to_vec(record) {
        Ok(_) => record.clone(),
        Err(e) => {
            let err = RecordError::Serialization {
                message_id: record.id,
                reason: e.to_string(),
            };
            warn!(message_id = record.id, error = %err, "record replaced in dump");
            MessageRecord::failed(record.id, err)
        }
    }
}

/// Renders a dump into a string in the given format.
#[allow(unused_variables)]
pub fn dump_to_string(dump: &ExportDump, format: OutputFormat, pretty: bool) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(dump, pretty),
        OutputFormat::Jsonl => to_jsonl(dump),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => to_csv(dump),
        #[allow(unreachable_patterns)]
        _ => Err(unsupported(format)),
    }
}

/// Writes a dump to `path` in the given format.
#[allow(unused_variables)]
pub fn write_dump(dump: &ExportDump, path: impl AsRef<Path>, format: OutputFormat, pretty: bool) -> Result<()> {
    let path = path.as_ref();
    match format {
        OutputFormat::Json => write_json(dump, path, pretty),
        OutputFormat::Jsonl => write_jsonl(dump, path),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => write_csv(dump, path),
        #[allow(unreachable_patterns)]
        _ => Err(unsupported(format)),
    }
}

fn unsupported(format: OutputFormat) -> ExportError {
    ExportError::UnsupportedFormat {
        format: format.label(),
        feature: format.required_feature().unwrap_or("full"),
    }
}
