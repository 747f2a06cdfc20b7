//! Batch fetcher.
//!
//! Fetches every id of a [`MessageRange`] in fixed-size windows. Inside a
//! window all fetches run concurrently and each one resolves to a record on
//! its own, so one failure never cancels its siblings. Windows run one after
//! another, progress is reported after each, and the final list is sorted by
//! id no matter in which order fetches completed.

use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::ExportConfig;
use crate::error::{RecordError, Result, SourceError};
use crate::link::{ChatRef, MessageRange};
use crate::message::MessageRecord;
use crate::normalize::{hydrate_reply, normalize_raw};
use crate::progress::{Phase, Progress, ProgressCallback, no_progress};
use crate::source::{MessageSource, RawMessage};

/// Tunables of a [`BatchFetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Fetches in flight per window (default: 10)
    pub batch_size: usize,

    /// Pause between windows (default: none)
    pub batch_delay: Duration,

    /// Longest flood wait that is slept off and retried once (default: 30s)
    pub max_flood_wait: Duration,

    /// Resolve reply previews with an extra fetch (default: true)
    pub resolve_replies: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_delay: Duration::ZERO,
            max_flood_wait: Duration::from_secs(30),
            resolve_replies: true,
        }
    }
}

impl FetchOptions {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            batch_delay: config.batch_delay(),
            max_flood_wait: Duration::from_secs(config.max_flood_wait_secs),
            resolve_replies: true,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    #[must_use]
    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    #[must_use]
    pub fn with_max_flood_wait(mut self, wait: Duration) -> Self {
        self.max_flood_wait = wait;
        self
    }

    #[must_use]
    pub fn with_reply_resolution(mut self, enabled: bool) -> Self {
        self.resolve_replies = enabled;
        self
    }
}

/// Fetches and normalizes a contiguous range of messages.
pub struct BatchFetcher<'a, S: ?Sized> {
    source: &'a S,
    options: FetchOptions,
    progress: ProgressCallback,
}

impl<'a, S> BatchFetcher<'a, S>
where
    S: MessageSource + ?Sized,
{
    pub fn new(source: &'a S, options: FetchOptions) -> Self {
        Self {
            source,
            options,
            progress: no_progress(),
        }
    }

    /// Sets the callback that receives progress after each window.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    /// Fetches every id of `range`.
    ///
    /// The result holds exactly one record per id, ascending by id. Ids that
    /// could not be fetched or normalized are error records. A range longer
    /// than [`MAX_RANGE_LEN`](crate::link::MAX_RANGE_LEN) is rejected before
    /// anything is fetched.
    pub async fn fetch_range(&self, range: &MessageRange) -> Result<Vec<MessageRecord>> {
        range.check_len()?;
        let ids: Vec<i64> = range.ids().collect();
        let total = ids.len();
        let batch_size = self.options.batch_size.max(1);

        info!(
            source = self.source.name(),
            range = %range,
            total,
            batch_size,
            "fetching messages"
        );

        let mut records = Vec::with_capacity(total);
        let mut failed = 0;

        for (index, window) in ids.chunks(batch_size).enumerate() {
            if index > 0 && !self.options.batch_delay.is_zero() {
                tokio::time::sleep(self.options.batch_delay).await;
            }

            let fetched = join_all(window.iter().map(|&id| self.fetch_one(&range.chat, id))).await;
            failed += fetched.iter().filter(|r| r.is_failed()).count();
            records.extend(fetched);

            debug!(window = index + 1, processed = records.len(), total, "window complete");
            (self.progress)(
                Progress::new(Phase::Fetch, records.len(), total)
                    .with_succeeded(records.len() - failed),
            );
        }

        records.sort_by_key(|record| record.id);
        info!(total, failed, "fetch complete");
        Ok(records)
    }

    async fn fetch_one(&self, chat: &ChatRef, message_id: i64) -> MessageRecord {
        let raw = match self.get_with_retry(chat, message_id).await {
            Ok(raw) => raw,
            Err(source) => {
                let err = RecordError::Fetch { message_id, source };
                warn!(message_id, error = %err, "fetch failed");
                return MessageRecord::failed(message_id, err);
            }
        };

        let mut record = normalize_raw(message_id, raw.as_ref());
        if self.options.resolve_replies && !record.is_failed() {
            hydrate_reply(self.source, chat, &mut record).await;
        }
        record
    }

    /// Fetches once, sleeping off and retrying a single acceptable flood wait.
    async fn get_with_retry(
        &self,
        chat: &ChatRef,
        message_id: i64,
    ) -> std::result::Result<Option<RawMessage>, SourceError> {
        match self.source.get_message(chat, message_id).await {
            Err(err) => match err.flood_wait().map(Duration::from_secs) {
                Some(wait) if wait <= self.options.max_flood_wait => {
                    warn!(message_id, wait_secs = wait.as_secs(), "flood wait, retrying once");
                    tokio::time::sleep(wait).await;
                    self.source.get_message(chat, message_id).await
                }
                _ => Err(err),
            },
            ok => ok,
        }
    }
}
