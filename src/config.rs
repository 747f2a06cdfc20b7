//! Export configuration.
//!
//! [`ExportConfig`] carries every tunable of a range export. It has no
//! CLI framework dependencies and can be built in code, deserialized from
//! JSON, or assembled from command-line flags by the binary.
//!
//! # Example
//!
//! ```rust
//! use tgexport::config::ExportConfig;
//! use tgexport::format::OutputFormat;
//!
//! let config = ExportConfig::new()
//!     .with_output_dir("out")
//!     .with_batch_size(20)
//!     .with_dump_format(OutputFormat::Jsonl);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.media_dir(), std::path::Path::new("out/media"));
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::format::OutputFormat;

/// Directory exports are written to when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "downloads/exports";

/// Name of the media subdirectory inside the output directory.
pub const MEDIA_DIR_NAME: &str = "media";

/// Configuration for a range export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for the HTML document, the dump, the assets and `media/`
    /// (default: `downloads/exports`)
    pub output_dir: PathBuf,

    /// Messages fetched concurrently per window (default: 10)
    pub batch_size: usize,

    /// Media files downloaded concurrently per window (default: 5)
    pub media_batch_size: usize,

    /// Download media of fetched messages (default: true)
    pub download_media: bool,

    /// Format of the data dump (default: JSON)
    pub dump_format: OutputFormat,

    /// Pretty-print the JSON dump (default: true)
    pub pretty_dump: bool,

    /// Pause between fetch windows in milliseconds (default: 0)
    pub batch_delay_ms: u64,

    /// Longest flood wait honored with a retry, in seconds (default: 30)
    pub max_flood_wait_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            batch_size: 10,
            media_batch_size: 5,
            download_media: true,
            dump_format: OutputFormat::Json,
            pretty_dump: true,
            batch_delay_ms: 0,
            max_flood_wait_secs: 30,
        }
    }
}

impl ExportConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    #[must_use]
    pub fn with_media_batch_size(mut self, size: usize) -> Self {
        self.media_batch_size = size;
        self
    }

    /// Enables or disables media downloads.
    #[must_use]
    pub fn with_media(mut self, enabled: bool) -> Self {
        self.download_media = enabled;
        self
    }

    #[must_use]
    pub fn with_dump_format(mut self, format: OutputFormat) -> Self {
        self.dump_format = format;
        self
    }

    /// Enables or disables indentation of the JSON dump.
    #[must_use]
    pub fn with_pretty_dump(mut self, pretty: bool) -> Self {
        self.pretty_dump = pretty;
        self
    }

    /// Sets the pause between fetch windows.
    #[must_use]
    pub fn with_batch_delay_ms(mut self, millis: u64) -> Self {
        self.batch_delay_ms = millis;
        self
    }

    /// Sets the longest flood wait that is honored with a retry.
    #[must_use]
    pub fn with_max_flood_wait_secs(mut self, secs: u64) -> Self {
        self.max_flood_wait_secs = secs;
        self
    }

    /// Directory downloaded media is written to.
    pub fn media_dir(&self) -> PathBuf {
        self.output_dir.join(MEDIA_DIR_NAME)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Path of an export artifact inside the output directory.
    pub fn artifact_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Checks that the configuration can drive an export.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ExportError::invalid_config("batch size must be at least 1"));
        }
        if self.media_batch_size == 0 {
            return Err(ExportError::invalid_config(
                "media batch size must be at least 1",
            ));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ExportError::invalid_config("output directory is empty"));
        }
        if let Some(feature) = self.dump_format.required_feature() {
            if !self.dump_format.is_available() {
                return Err(ExportError::UnsupportedFormat {
                    format: self.dump_format.label(),
                    feature,
                });
            }
        }
        Ok(())
    }
}
