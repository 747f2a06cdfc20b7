//! Export orchestrator.
//!
//! [`Exporter`] wires the pipeline together: parse the range, fetch, download
//! media, write the structured dump, render the document (or its emergency
//! replacement) and write the assets.
//!
//! Only an invalid range, an invalid configuration or a failing write to the
//! output directory abort an export. Everything else is isolated per message
//! or per media item.
//!
//! # Example
//!
//! ```rust,no_run
//! use tgexport::prelude::*;
//!
//! # async fn run() -> tgexport::Result<()> {
//! let source = ArchiveSource::open("archive.json", None).await?;
//! let config = ExportConfig::new().with_output_dir("exports");
//!
//! let report = Exporter::new(source, config)
//!     .export_range("https://t.me/chan/10", "https://t.me/chan/20")
//!     .await?;
//! println!("{} messages, {} failed", report.summary.total, report.summary.failed);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::ExportConfig;
use crate::download::MediaDownloader;
use crate::error::Result;
use crate::fetch::{BatchFetcher, FetchOptions};
use crate::link::MessageRange;
use crate::message::{MediaArtifact, MessageRecord};
use crate::output::{ExportDump, ExportInfo, dump_to_string};
use crate::progress::{ProgressCallback, no_progress};
use crate::render::{ExportSummary, RenderContext, render_or_fallback, write_assets};
use crate::source::MessageSource;

/// File name stem shared by every file of one export.
const FILE_STEM: &str = "telegram_export";

/// What an export produced.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub range: MessageRange,
    pub records: Vec<MessageRecord>,
    pub artifacts: Vec<MediaArtifact>,
    pub summary: ExportSummary,
    pub dump_path: PathBuf,
    /// `None` for dump-only exports
    pub html_path: Option<PathBuf>,
    /// Set when rendering failed and the emergency document was written
    pub render_error: Option<String>,
}

impl ExportReport {
    /// Returns `true` if the emergency document was written.
    pub fn is_emergency(&self) -> bool {
        self.render_error.is_some()
    }
}

/// Runs exports against a [`MessageSource`].
pub struct Exporter<S> {
    source: S,
    config: ExportConfig,
    progress: ProgressCallback,
}

impl<S: MessageSource> Exporter<S> {
    pub fn new(source: S, config: ExportConfig) -> Self {
        Self {
            source,
            config,
            progress: no_progress(),
        }
    }

    /// Sets the callback receiving fetch and download progress.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Exports every message between two links, inclusive.
    ///
    /// Writes the dump, the HTML document with its assets and the downloaded
    /// media into the configured output directory.
    pub async fn export_range(&self, start_link: &str, end_link: &str) -> Result<ExportReport> {
        let (range, now) = self.prepare(start_link, end_link).await?;
        let records = self.fetch(&range).await?;

        let artifacts = if self.config.download_media {
            MediaDownloader::new(&self.source, self.config.media_dir())
                .with_batch_size(self.config.media_batch_size)
                .with_progress(self.progress.clone())
                .download_all(&range.chat, &records)
                .await?
        } else {
            Vec::new()
        };

        let summary = ExportSummary::from_records(&records, &artifacts);
        let dump_path = self
            .write_dump(start_link, end_link, &records, summary, now)
            .await?;

        let ctx = RenderContext::new(start_link, end_link, range.chat.clone())
            .with_base_dir(&self.config.output_dir)
            .with_exported_at(now);
        let document = render_or_fallback(&records, &artifacts, &ctx);

        let html_name = if document.is_emergency() {
            format!("{}_emergency.html", stem(now))
        } else {
            format!("{}.html", stem(now))
        };
        let html_path = self.config.artifact_path(html_name);
        tokio::fs::write(&html_path, &document.html).await?;
        write_assets(&self.config.output_dir).await?;

        if let Some(reason) = &document.fallback_reason {
            warn!(path = %html_path.display(), error = %reason, "emergency document written");
        } else {
            info!(path = %html_path.display(), "document written");
        }

        Ok(ExportReport {
            range,
            records,
            artifacts,
            summary,
            dump_path,
            html_path: Some(html_path),
            render_error: document.fallback_reason,
        })
    }

    /// Fetches the range and writes only the structured dump.
    ///
    /// No media is downloaded and no document is rendered.
    pub async fn export_dump_only(&self, start_link: &str, end_link: &str) -> Result<ExportReport> {
        let (range, now) = self.prepare(start_link, end_link).await?;
        let records = self.fetch(&range).await?;
        let summary = ExportSummary::from_records(&records, &[]);
        let dump_path = self
            .write_dump(start_link, end_link, &records, summary, now)
            .await?;

        Ok(ExportReport {
            range,
            records,
            artifacts: Vec::new(),
            summary,
            dump_path,
            html_path: None,
            render_error: None,
        })
    }

    async fn prepare(&self, start_link: &str, end_link: &str) -> Result<(MessageRange, DateTime<Utc>)> {
        let range = MessageRange::parse(start_link, end_link)?;
        self.config.validate()?;
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        info!(range = %range, output = %self.config.output_dir.display(), "starting export");
        Ok((range, Utc::now()))
    }

    async fn fetch(&self, range: &MessageRange) -> Result<Vec<MessageRecord>> {
        BatchFetcher::new(&self.source, FetchOptions::from_config(&self.config))
            .with_progress(self.progress.clone())
            .fetch_range(range)
            .await
    }

    async fn write_dump(
        &self,
        start_link: &str,
        end_link: &str,
        records: &[MessageRecord],
        summary: ExportSummary,
        now: DateTime<Utc>,
    ) -> Result<PathBuf> {
        let format = self.config.dump_format;
        let info = ExportInfo::new(start_link, end_link, summary).with_exported_at(now);
        let dump = ExportDump::new(info, records);
        let content = dump_to_string(&dump, format, self.config.pretty_dump)?;

        let path = self
            .config
            .artifact_path(format!("{}.{}", stem(now), format.extension()));
        tokio::fs::write(&path, content).await?;
        info!(path = %path.display(), format = %format, "dump written");
        Ok(path)
    }
}

fn stem(now: DateTime<Utc>) -> String {
    format!("{FILE_STEM}_{}", now.format("%Y%m%d_%H%M%S"))
}
