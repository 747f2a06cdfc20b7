//! Integration tests for the batch fetcher.
//!
//! ```bash
//! cargo test --test fetch_tests
//! ```

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use common::{Behavior, MockSource, chat, reply_message, text_message};
use tgexport::fetch::{BatchFetcher, FetchOptions};
use tgexport::link::MessageRange;
use tgexport::progress::{Phase, Progress};

fn range(start: i64, end: i64) -> MessageRange {
    MessageRange::new(chat(), start, end)
}

fn ids(records: &[tgexport::MessageRecord]) -> Vec<i64> {
    records.iter().map(|r| r.id).collect()
}

// ============================================================================
// Completeness and ordering
// ============================================================================

#[tokio::test]
async fn test_oversized_range_rejected_before_fetching() {
    let source = MockSource::with_texts(1..=3);
    let err = BatchFetcher::new(&source, FetchOptions::default())
        .fetch_range(&range(1, i64::MAX))
        .await
        .unwrap_err();

    assert!(err.is_invalid_link());
    assert_eq!(source.total_calls(), 0);
}

#[tokio::test]
async fn test_one_record_per_id_despite_failures() {
    let source = MockSource::with_texts(1..=20)
        .failing(4, "connection reset")
        .behavior(9, Behavior::Missing)
        .message(15, json!("not an object"));

    let records = BatchFetcher::new(&source, FetchOptions::default().with_batch_size(3))
        .fetch_range(&range(1, 20))
        .await
        .unwrap();

    assert_eq!(ids(&records), (1..=20).collect::<Vec<_>>());
    let failed: Vec<i64> = records.iter().filter(|r| r.is_failed()).map(|r| r.id).collect();
    assert_eq!(failed, vec![4, 9, 15]);
}

#[tokio::test]
async fn test_output_sorted_when_low_ids_finish_last() {
    let source = MockSource::with_texts(1..=6)
        .delay(1, Duration::from_millis(60))
        .delay(2, Duration::from_millis(40))
        .delay(3, Duration::from_millis(20));

    let records = BatchFetcher::new(&source, FetchOptions::default().with_batch_size(6))
        .fetch_range(&range(1, 6))
        .await
        .unwrap();

    assert_eq!(ids(&records), vec![1, 2, 3, 4, 5, 6]);
    assert!(records.iter().all(|r| !r.is_failed()));
}

#[tokio::test]
async fn test_window_bounds_concurrency() {
    let mut source = MockSource::with_texts(1..=12);
    for id in 1..=12 {
        source = source.delay(id, Duration::from_millis(15));
    }

    let records = BatchFetcher::new(&source, FetchOptions::default().with_batch_size(4))
        .fetch_range(&range(1, 12))
        .await
        .unwrap();

    assert_eq!(records.len(), 12);
    assert!(source.peak_in_flight() <= 4);
    assert!(source.peak_in_flight() > 1);
}

#[tokio::test]
async fn test_single_message_range() {
    let source = MockSource::with_texts([7]);
    let records = BatchFetcher::new(&source, FetchOptions::default())
        .fetch_range(&range(7, 7))
        .await
        .unwrap();
    assert_eq!(ids(&records), vec![7]);
    assert_eq!(records[0].text.as_deref(), Some("message 7"));
}

// ============================================================================
// Failure isolation
// ============================================================================

#[tokio::test]
async fn test_fetch_error_becomes_error_record() {
    let source = MockSource::with_texts(1..=3).failing(2, "timeout");
    let records = BatchFetcher::new(&source, FetchOptions::default())
        .fetch_range(&range(1, 3))
        .await
        .unwrap();

    let failed = &records[1];
    assert_eq!(failed.id, 2);
    assert!(failed.is_failed());
    assert!(failed.error.as_deref().unwrap().contains("timeout"));
    assert!(failed.text.is_none());
}

#[tokio::test]
async fn test_malformed_media_slot_becomes_error_record() {
    let mut payload = text_message(5, "with broken photo");
    payload["photo"] = json!("not-a-photo");
    let source = MockSource::new().message(5, payload);

    let records = BatchFetcher::new(&source, FetchOptions::default())
        .fetch_range(&range(5, 5))
        .await
        .unwrap();

    assert_eq!(records[0].id, 5);
    assert!(records[0].error.as_deref().unwrap().contains("photo"));
}

#[tokio::test]
async fn test_empty_payload_is_missing() {
    let source = MockSource::new().message(3, json!({"id": 3, "empty": true}));
    let records = BatchFetcher::new(&source, FetchOptions::default())
        .fetch_range(&range(3, 3))
        .await
        .unwrap();
    assert!(records[0].error.as_deref().unwrap().contains("not found"));
}

// ============================================================================
// Flood waits
// ============================================================================

#[tokio::test]
async fn test_short_flood_wait_is_retried_once() {
    let source = MockSource::new().behavior(
        1,
        Behavior::FloodWaitOnce(0, Box::new(Behavior::Message(text_message(1, "after wait")))),
    );

    let records = BatchFetcher::new(&source, FetchOptions::default())
        .fetch_range(&range(1, 1))
        .await
        .unwrap();

    assert_eq!(records[0].text.as_deref(), Some("after wait"));
    assert_eq!(source.calls(1), 2);
}

#[tokio::test]
async fn test_long_flood_wait_is_not_retried() {
    let source = MockSource::new().behavior(1, Behavior::FloodWait(120));
    let options = FetchOptions::default().with_max_flood_wait(Duration::from_secs(30));

    let records = BatchFetcher::new(&source, options)
        .fetch_range(&range(1, 1))
        .await
        .unwrap();

    assert!(records[0].is_failed());
    assert!(records[0].error.as_deref().unwrap().contains("flood wait"));
    assert_eq!(source.calls(1), 1);
}

#[tokio::test]
async fn test_repeated_flood_wait_fails_after_one_retry() {
    let source = MockSource::new().behavior(1, Behavior::FloodWait(0));
    let records = BatchFetcher::new(&source, FetchOptions::default())
        .fetch_range(&range(1, 1))
        .await
        .unwrap();

    assert!(records[0].is_failed());
    assert_eq!(source.calls(1), 2);
}

// ============================================================================
// Progress and replies
// ============================================================================

#[tokio::test]
async fn test_progress_after_each_window() {
    let source = MockSource::with_texts(1..=7).failing(2, "boom");
    let seen: Arc<Mutex<Vec<Progress>>> = Arc::default();
    let sink = Arc::clone(&seen);

    BatchFetcher::new(&source, FetchOptions::default().with_batch_size(3))
        .with_progress(Arc::new(move |p| sink.lock().unwrap().push(p)))
        .fetch_range(&range(1, 7))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    let processed: Vec<usize> = seen.iter().map(|p| p.processed).collect();
    assert_eq!(processed, vec![3, 6, 7]);
    assert!(seen.iter().all(|p| p.phase == Phase::Fetch && p.total == 7));

    let last = seen.last().unwrap();
    assert!(last.is_complete());
    assert_eq!(last.succeeded, 6);
    assert_eq!(last.failed(), 1);
}

#[tokio::test]
async fn test_batch_delay_spaces_windows() {
    let source = MockSource::with_texts(1..=4);
    let options = FetchOptions::default()
        .with_batch_size(2)
        .with_batch_delay(Duration::from_millis(50));

    let started = std::time::Instant::now();
    let records = BatchFetcher::new(&source, options)
        .fetch_range(&range(1, 4))
        .await
        .unwrap();

    assert_eq!(records.len(), 4);
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_reply_preview_is_resolved() {
    let source = MockSource::new()
        .message(1, text_message(1, "original question"))
        .message(2, reply_message(2, "an answer", 1));

    let records = BatchFetcher::new(&source, FetchOptions::default())
        .fetch_range(&range(2, 2))
        .await
        .unwrap();

    let reply = records[0].reply_to.as_ref().unwrap();
    assert_eq!(reply.message_id, 1);
    let preview = reply.preview.as_ref().unwrap();
    assert_eq!(preview.text.as_deref(), Some("original question"));
    assert_eq!(preview.sender_name.as_deref(), Some("User 1"));
}

#[tokio::test]
async fn test_unreachable_reply_target_keeps_record() {
    let source = MockSource::new()
        .message(2, reply_message(2, "an answer", 1))
        .failing(1, "gone");

    let records = BatchFetcher::new(&source, FetchOptions::default())
        .fetch_range(&range(2, 2))
        .await
        .unwrap();

    assert!(!records[0].is_failed());
    let reply = records[0].reply_to.as_ref().unwrap();
    assert_eq!(reply.message_id, 1);
    assert!(reply.preview.is_none());
}

#[tokio::test]
async fn test_reply_resolution_can_be_disabled() {
    let source = MockSource::new()
        .message(1, text_message(1, "original"))
        .message(2, reply_message(2, "answer", 1));

    let records = BatchFetcher::new(&source, FetchOptions::default().with_reply_resolution(false))
        .fetch_range(&range(2, 2))
        .await
        .unwrap();

    assert!(records[0].reply_to.as_ref().unwrap().preview.is_none());
    assert_eq!(source.calls(1), 0);
}
