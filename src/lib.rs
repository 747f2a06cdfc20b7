//! # tgexport
//!
//! Exports a contiguous range of Telegram messages into a self-contained,
//! navigable HTML document, a structured data dump and a folder of
//! downloaded media.
//!
//! ## Overview
//!
//! An export is given two message links from the same chat. Every id
//! between them (inclusive) is fetched, normalized into a [`MessageRecord`],
//! and rendered. The result always holds exactly one record per id, sorted
//! by id: messages that could not be fetched or understood become error
//! records instead of holes.
//!
//! Transport is behind the [`MessageSource`](source::MessageSource) trait.
//! [`ArchiveSource`](source::ArchiveSource) replays captured payloads from a
//! JSON archive; a live client implements the same trait.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tgexport::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = ArchiveSource::open("archive.json", None).await?;
//!     let config = ExportConfig::new()
//!         .with_output_dir("exports")
//!         .with_dump_format(OutputFormat::Jsonl);
//!
//!     let report = Exporter::new(source, config)
//!         .with_progress(stderr_progress())
//!         .export_range("https://t.me/somechannel/100", "https://t.me/somechannel/150")
//!         .await?;
//!
//!     println!("{} successful, {} failed", report.summary.successful, report.summary.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline pieces
//!
//! The stages can be used on their own:
//!
//! ```rust
//! use tgexport::link::MessageRange;
//!
//! let range = MessageRange::parse("https://t.me/c/1234567890/9", "https://t.me/c/1234567890/5")?;
//! assert_eq!(range.start, 5);
//! assert_eq!(range.len(), 5);
//! # Ok::<(), tgexport::ExportError>(())
//! ```
//!
//! ## Module Structure
//!
//! - [`link`] - message link parsing, [`MessageRange`](link::MessageRange)
//! - [`message`] - [`MessageRecord`] and the media, reply, reaction and service types
//! - [`source`] - the [`MessageSource`](source::MessageSource) seam and [`ArchiveSource`](source::ArchiveSource)
//! - [`normalize`] - raw payload to [`MessageRecord`]
//! - [`fetch`] - windowed concurrent fetching, [`BatchFetcher`](fetch::BatchFetcher)
//! - [`download`] - windowed media downloads, [`MediaDownloader`](download::MediaDownloader)
//! - [`render`] - HTML document, emergency fallback, [`ExportSummary`](render::ExportSummary)
//! - [`output`] - JSON, JSONL and CSV dumps
//! - [`export`] - the [`Exporter`](export::Exporter) orchestrator
//! - [`config`], [`format`], [`progress`], [`error`]
//! - [`cli`] - CLI types (feature `cli`)
//! - [`prelude`] - convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod export;
pub mod fetch;
pub mod format;
pub mod link;
pub mod message;
pub mod normalize;
pub mod output;
pub mod progress;
pub mod render;
pub mod source;

// Re-export the main types at the crate root for convenience
pub use error::{ExportError, Result};
pub use message::MessageRecord;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use tgexport::prelude::*;
/// ```
pub mod prelude {
    pub use crate::MessageRecord;

    // Errors
    pub use crate::error::{DownloadError, ExportError, RecordError, RenderError, Result, SourceError};

    // Links and ranges
    pub use crate::link::{ChatRef, MessageLink, MessageRange, parse_link};

    // Data model
    pub use crate::message::{
        MediaArtifact, MediaDescriptor, MediaKind, Reaction, ReplyPreview, ReplyReference, Sender,
        ServiceEvent, ServiceKind,
    };

    // Sources
    pub use crate::source::{ArchiveSource, MessageSource, RawMessage};

    // Pipeline
    pub use crate::config::ExportConfig;
    pub use crate::download::MediaDownloader;
    pub use crate::export::{ExportReport, Exporter};
    pub use crate::fetch::{BatchFetcher, FetchOptions};
    pub use crate::normalize::{normalize_message, normalize_raw};
    pub use crate::progress::{Phase, Progress, ProgressCallback, no_progress, stderr_progress};

    // Output
    pub use crate::format::OutputFormat;
    pub use crate::output::{ExportDump, ExportInfo, to_json, to_jsonl, write_dump};
    #[cfg(feature = "csv-output")]
    pub use crate::output::{to_csv, write_csv};
    pub use crate::render::{ExportSummary, RenderContext, render_document, render_or_fallback};
}
