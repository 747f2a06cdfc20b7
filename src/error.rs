//! Unified error types for tgexport.
//!
//! Errors are split by blast radius:
//!
//! - [`ExportError`] aborts a whole export. Only structurally invalid input
//!   (unparseable links, a range spanning two chats, bad configuration) and
//!   I/O failures on the export directory end up here.
//! - [`RecordError`] is scoped to a single message. It is folded into an
//!   error-flagged [`MessageRecord`](crate::MessageRecord) and never aborts a batch.
//! - [`DownloadError`] is scoped to a single media item. The owning record is
//!   left untouched.
//! - [`RenderError`] is converted into the emergency document and never
//!   propagates past the renderer.
//! - [`SourceError`] is what a [`MessageSource`](crate::source::MessageSource)
//!   reports back from the platform.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::link::ChatRef;

/// A specialized [`Result`] type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// The error type for operations that abort an entire export.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// An I/O error occurred while preparing or writing export artifacts.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A link could not be parsed as a message link.
    #[error("Invalid message link '{input}': {reason}")]
    InvalidLink {
        /// The link as supplied by the user
        input: String,
        /// What is wrong with it
        reason: String,
    },

    /// The two range endpoints point into different chats.
    #[error("Range endpoints belong to different chats: {start} vs {end}")]
    ChatMismatch {
        /// Chat of the start link
        start: ChatRef,
        /// Chat of the end link
        end: ChatRef,
    },

    /// The export configuration is unusable.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },

    /// An archive file handed to [`ArchiveSource`](crate::source::ArchiveSource)
    /// does not have the expected structure.
    #[error("Invalid archive{}: {message}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    InvalidArchive {
        /// Description of what's wrong
        message: String,
        /// The archive path, if known
        path: Option<PathBuf>,
    },

    /// JSON serialization error while writing the data dump.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A dump format was requested whose feature is not compiled in.
    #[error("Output format {format} requires the '{feature}' feature to be enabled")]
    UnsupportedFormat {
        /// Display name of the format
        format: &'static str,
        /// Cargo feature that enables it
        feature: &'static str,
    },
}

impl ExportError {
    /// Creates an invalid link error.
    pub fn invalid_link(input: impl Into<String>, reason: impl Into<String>) -> Self {
        ExportError::InvalidLink {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        ExportError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates an invalid archive error.
    pub fn invalid_archive(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        ExportError::InvalidArchive {
            message: message.into(),
            path,
        }
    }

    /// Returns `true` for malformed links and cross-chat ranges.
    pub fn is_invalid_link(&self) -> bool {
        matches!(
            self,
            ExportError::InvalidLink { .. } | ExportError::ChatMismatch { .. }
        )
    }

    /// Returns `true` if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, ExportError::Io(_))
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, ExportError::InvalidConfig { .. })
    }
}

/// Errors reported by a message source (the platform transport).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// The message or file does not exist, or is not visible to this session.
    #[error("not found")]
    NotFound,

    /// The platform asked us to slow down.
    #[error("flood wait: retry after {seconds}s")]
    FloodWait {
        /// Seconds to wait before retrying
        seconds: u64,
    },

    /// Any other platform-side failure.
    #[error("{0}")]
    Unavailable(String),

    /// Local I/O failure while storing downloaded content.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SourceError {
    /// Creates an [`Unavailable`](SourceError::Unavailable) error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        SourceError::Unavailable(message.into())
    }

    /// Returns the requested wait if this is a flood wait.
    pub fn flood_wait(&self) -> Option<u64> {
        match self {
            SourceError::FloodWait { seconds } => Some(*seconds),
            _ => None,
        }
    }
}

/// A failure isolated to one message of the range.
///
/// The `Display` text of this error is what ends up in
/// [`MessageRecord::error`](crate::MessageRecord::error).
#[derive(Debug, Error)]
pub enum RecordError {
    /// The platform refused or failed the fetch.
    #[error("Could not fetch message {message_id}: {source}")]
    Fetch {
        message_id: i64,
        #[source]
        source: SourceError,
    },

    /// The message is empty, deleted or inaccessible.
    #[error("Message {message_id} not found or inaccessible")]
    Missing { message_id: i64 },

    /// The payload has a shape the normalizer cannot interpret.
    #[error("Could not normalize message {message_id}: {reason}")]
    Normalize { message_id: i64, reason: String },

    /// The record could not be made safely dumpable.
    #[error("Could not serialize message {message_id}: {reason}")]
    Serialization { message_id: i64, reason: String },
}

impl RecordError {
    /// The id of the message this error belongs to.
    pub fn message_id(&self) -> i64 {
        match self {
            RecordError::Fetch { message_id, .. }
            | RecordError::Missing { message_id }
            | RecordError::Normalize { message_id, .. }
            | RecordError::Serialization { message_id, .. } => *message_id,
        }
    }

    pub(crate) fn normalize(message_id: i64, reason: impl fmt::Display) -> Self {
        RecordError::Normalize {
            message_id,
            reason: reason.to_string(),
        }
    }
}

/// A failed media download. Logged and dropped by the downloader.
#[derive(Debug, Error)]
#[error("Could not download media of message {message_id}: {source}")]
pub struct DownloadError {
    /// Message owning the media
    pub message_id: i64,
    /// Underlying failure
    #[source]
    pub source: SourceError,
}

/// Failures while assembling the HTML document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The same message id appears twice in the record list.
    #[error("duplicate record for message {0}")]
    Duplicate(i64),

    /// Records are not in ascending id order.
    #[error("records out of order: {previous} is followed by {next}")]
    Unordered { previous: i64, next: i64 },

    /// A media artifact points at a message that is not in the record list.
    #[error("media artifact {path} belongs to message {message_id}, which is not in the export")]
    OrphanArtifact { message_id: i64, path: String },

    /// Writing into the output buffer failed.
    #[error("formatting failed: {0}")]
    Fmt(#[from] fmt::Error),

    /// Raw JSON for a message could not be produced.
    #[error("could not encode message {message_id} as JSON: {source}")]
    Json {
        message_id: i64,
        #[source]
        source: serde_json::Error,
    },
}
