//! Data dump formats.
//!
//! The HTML document is always produced. Next to it the exporter writes a
//! machine-readable dump of the same records in one of these formats:
//!
//! - [`Json`](OutputFormat::Json) - one document with `export_info` and a `messages` array
//! - [`Jsonl`](OutputFormat::Jsonl) - an `export_info` line followed by one record per line
//! - [`Csv`](OutputFormat::Csv) - a flat table, one row per record (`csv-output` feature)
//!
//! # Example
//!
//! ```rust
//! use tgexport::format::OutputFormat;
//!
//! let format = OutputFormat::from_path("dump.ndjson")?;
//! assert_eq!(format, OutputFormat::Jsonl);
//! assert_eq!(format.extension(), "jsonl");
//! # Ok::<(), tgexport::ExportError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Format of the data dump written next to the HTML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// Single JSON document (default).
    #[default]
    Json,

    /// JSON Lines. The first line is the export info, then one record per line.
    Jsonl,

    /// Semicolon-separated table with flattened record fields.
    Csv,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    ///
    /// ```rust
    /// use tgexport::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Json.extension(), "json");
    /// assert_eq!(OutputFormat::Csv.extension(), "csv");
    /// ```
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Csv => "csv",
        }
    }

    /// Returns all accepted format names.
    pub fn all_names() -> &'static [&'static str] {
        &["json", "jsonl", "ndjson", "csv"]
    }

    /// Returns all formats.
    pub fn all() -> &'static [OutputFormat] {
        &[OutputFormat::Json, OutputFormat::Jsonl, OutputFormat::Csv]
    }

    /// Human-readable name of the format.
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Json => "JSON",
            OutputFormat::Jsonl => "JSONL",
            OutputFormat::Csv => "CSV",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Json => "application/json",
            OutputFormat::Jsonl => "application/x-ndjson",
            OutputFormat::Csv => "text/csv",
        }
    }

    /// Cargo feature this format needs, if any.
    pub fn required_feature(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Csv => Some("csv-output"),
            OutputFormat::Json | OutputFormat::Jsonl => None,
        }
    }

    /// Returns whether the format is compiled into this build.
    pub fn is_available(&self) -> bool {
        match self {
            OutputFormat::Csv => cfg!(feature = "csv-output"),
            OutputFormat::Json | OutputFormat::Jsonl => true,
        }
    }

    /// Detects the format from a file path's extension.
    pub fn from_path(path: &str) -> Result<Self, ExportError> {
        let ext = path.rsplit('.').next().unwrap_or("").to_lowercase();

        match ext.as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(ExportError::invalid_config(format!(
                "Unknown dump file extension: '.{}'. Expected one of: json, jsonl, csv",
                ext
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}
