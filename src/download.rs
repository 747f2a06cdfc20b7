//! Media downloader.
//!
//! Downloads the media of successfully normalized records in fixed-size
//! windows. A failed download is logged and left out of the artifact list;
//! the owning record stays as it is.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{info, warn};

use crate::error::{DownloadError, Result};
use crate::link::ChatRef;
use crate::message::{MediaArtifact, MediaDescriptor, MessageRecord};
use crate::progress::{Phase, Progress, ProgressCallback, no_progress};
use crate::source::MessageSource;

/// Downloads media for a list of records.
pub struct MediaDownloader<'a, S: ?Sized> {
    source: &'a S,
    media_dir: PathBuf,
    batch_size: usize,
    progress: ProgressCallback,
}

impl<'a, S> MediaDownloader<'a, S>
where
    S: MessageSource + ?Sized,
{
    /// Creates a downloader writing into `media_dir`, 5 downloads per window.
    pub fn new(source: &'a S, media_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            media_dir: media_dir.into(),
            batch_size: 5,
            progress: no_progress(),
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Downloads the media of every record that has some.
    ///
    /// Failed records, service events and records without media are
    /// skipped. Only creating the media directory can fail the call.
    pub async fn download_all(
        &self,
        chat: &ChatRef,
        records: &[MessageRecord],
    ) -> Result<Vec<MediaArtifact>> {
        let targets: Vec<(i64, &MediaDescriptor)> = records
            .iter()
            .filter(|record| record.has_media())
            .filter_map(|record| record.media.as_ref().map(|media| (record.id, media)))
            .collect();
        let total = targets.len();

        if total == 0 {
            info!("no media to download");
            return Ok(Vec::new());
        }

        tokio::fs::create_dir_all(&self.media_dir).await?;
        info!(total, dir = %self.media_dir.display(), "downloading media");

        let mut artifacts = Vec::with_capacity(total);
        let mut processed = 0;

        for window in targets.chunks(self.batch_size) {
            let results = join_all(
                window
                    .iter()
                    .map(|&(message_id, media)| self.download_one(chat, message_id, media)),
            )
            .await;

            processed += results.len();
            for result in results {
                match result {
                    Ok(artifact) => artifacts.push(artifact),
                    Err(err) => warn!(message_id = err.message_id, error = %err, "media download failed"),
                }
            }

            (self.progress)(
                Progress::new(Phase::Download, processed, total).with_succeeded(artifacts.len()),
            );
        }

        info!(downloaded = artifacts.len(), total, "media download complete");
        Ok(artifacts)
    }

    async fn download_one(
        &self,
        chat: &ChatRef,
        message_id: i64,
        media: &MediaDescriptor,
    ) -> std::result::Result<MediaArtifact, DownloadError> {
        self.source
            .download_media(chat, message_id, media, &self.media_dir)
            .await
            .map(|path| MediaArtifact::new(message_id, path))
            .map_err(|source| DownloadError { message_id, source })
    }
}
