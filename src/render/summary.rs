//! Export summary counters.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::message::{MediaArtifact, MessageRecord};

/// Chat-wide counters shown in the document header, the dump and the CLI.
///
/// `successful` counts every record that is not an error stand-in, service
/// events included, so `successful + failed == total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub total: usize,
    pub successful: usize,
    pub service: usize,
    pub failed: usize,
    /// Ordinary messages carrying a media descriptor
    pub with_media: usize,
    /// Ordinary messages with text and no media
    pub text_only: usize,
    /// Successful records replying to another message
    pub replies: usize,
    /// Records whose media file was downloaded
    pub media_downloaded: usize,
}

impl ExportSummary {
    /// Counts `records`, crediting downloads from `artifacts`.
    ///
    /// ```rust
    /// use tgexport::MessageRecord;
    /// use tgexport::render::ExportSummary;
    ///
    /// let mut ok = MessageRecord::new(1);
    /// ok.text = Some("hi".into());
    /// let records = vec![ok, MessageRecord::failed(2, "timeout")];
    ///
    /// let summary = ExportSummary::from_records(&records, &[]);
    /// assert_eq!((summary.total, summary.successful, summary.failed), (2, 1, 1));
    /// assert_eq!(summary.text_only, 1);
    /// ```
    pub fn from_records(records: &[MessageRecord], artifacts: &[MediaArtifact]) -> Self {
        let downloaded: HashSet<i64> = artifacts.iter().map(|a| a.message_id).collect();

        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            if record.is_failed() {
                summary.failed += 1;
                continue;
            }
            summary.successful += 1;

            if record.is_service() {
                summary.service += 1;
                continue;
            }
            if record.has_media() {
                summary.with_media += 1;
                if downloaded.contains(&record.id) {
                    summary.media_downloaded += 1;
                }
            }
            if record.is_text_only() {
                summary.text_only += 1;
            }
            if record.reply_to.is_some() {
                summary.replies += 1;
            }
        }

        summary
    }

    /// Share of successful records in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }
}
