//! Message normalizer.
//!
//! Turns one raw provider payload into a [`MessageRecord`]. The steps run in
//! a fixed priority order:
//!
//! 1. service classification, which ends normalization for service events
//! 2. text and caption, kept verbatim
//! 3. the primary media slot, see [`MediaKind::ALL`](crate::message::MediaKind::ALL)
//! 4. the reply reference (its preview is resolved separately by [`hydrate_reply`])
//! 5. reactions, best effort
//!
//! Any failure is folded into an error-flagged record carrying the requested
//! id, so every id of a range yields exactly one record.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RecordError;
use crate::link::ChatRef;
use crate::message::{MessageRecord, ReplyPreview, ReplyReference};
use crate::source::{MessageSource, RawMessage};

mod media;
mod raw;
mod reactions;
mod service;
mod text;

use raw::RawEnvelope;

pub use text::{ELLIPSIS, PREVIEW_CHARS, extract_text, truncate_preview};

/// Normalizes a fetched payload, converting every failure into an error record.
///
/// `None` stands for a message the platform reported as empty or inaccessible.
///
/// ```rust
/// use serde_json::json;
/// use tgexport::normalize::normalize_raw;
///
/// let ok = normalize_raw(5, Some(&json!({"id": 5, "text": "hello"})));
/// assert_eq!(ok.text.as_deref(), Some("hello"));
///
/// let missing = normalize_raw(6, None);
/// assert!(missing.is_failed());
/// assert_eq!(missing.id, 6);
/// ```
pub fn normalize_raw(message_id: i64, raw: Option<&RawMessage>) -> MessageRecord {
    let result = match raw {
        Some(raw) => normalize_message(message_id, raw),
        None => Err(RecordError::Missing { message_id }),
    };

    result.unwrap_or_else(|err| {
        warn!(message_id, error = %err, "message replaced by error record");
        MessageRecord::failed(message_id, err)
    })
}

/// Normalizes one raw payload.
///
/// The reply reference is filled in without a preview.
pub fn normalize_message(message_id: i64, raw: &RawMessage) -> Result<MessageRecord, RecordError> {
    let Value::Object(payload) = raw else {
        return Err(RecordError::normalize(message_id, "payload is not an object"));
    };

    let envelope: RawEnvelope = serde_json::from_value(raw.clone())
        .map_err(|e| RecordError::normalize(message_id, e))?;

    if envelope.empty {
        return Err(RecordError::Missing { message_id });
    }
    if let Some(id) = envelope.id {
        if id != message_id {
            return Err(RecordError::normalize(
                message_id,
                format!("payload carries id {id}"),
            ));
        }
    }

    let mut record = MessageRecord::new(message_id);
    record.date = envelope.date.as_ref().and_then(|d| d.to_datetime());
    record.edit_date = envelope.edit_date.as_ref().and_then(|d| d.to_datetime());
    if let Some(chat) = &envelope.chat {
        record.chat_id = chat.id;
        record.chat_title.clone_from(&chat.title);
        record.chat_username.clone_from(&chat.username);
    }
    record.sender = envelope.sender();
    record.reactions = reactions::extract_reactions(message_id, envelope.reactions.as_ref());

    if let Some(event) = service::classify(payload, envelope.service.as_deref()) {
        record.service = Some(event);
        return Ok(record);
    }

    record.text = envelope.text.as_ref().and_then(extract_text);
    record.caption = envelope.caption.as_ref().and_then(extract_text);
    record.media = media::detect_media(message_id, payload)?;
    record.reply_to = envelope.reply_target().map(|target| ReplyReference {
        message_id: target,
        preview: None,
    });

    Ok(record)
}

/// Builds the cached preview of a replied-to message.
pub fn reply_preview(target: &MessageRecord) -> ReplyPreview {
    let text = target
        .body()
        .map(|body| truncate_preview(body, PREVIEW_CHARS))
        .or_else(|| target.service.as_ref().map(|s| s.description.clone()));

    ReplyPreview {
        id: target.id,
        date: target.date,
        text,
        sender_name: target.sender_name(),
        media_type: target.media.as_ref().map(|m| m.kind()),
    }
}

/// Resolves the reply preview of `record` with one extra fetch.
///
/// Failures leave the preview empty; the record itself is never failed.
pub async fn hydrate_reply<S>(source: &S, chat: &ChatRef, record: &mut MessageRecord)
where
    S: MessageSource + ?Sized,
{
    let Some(reply) = record.reply_to.as_mut() else {
        return;
    };
    if reply.preview.is_some() {
        return;
    }

    let target_id = reply.message_id;
    match source.get_message(chat, target_id).await {
        Ok(Some(raw)) => match normalize_message(target_id, &raw) {
            Ok(target) => reply.preview = Some(reply_preview(&target)),
            Err(err) => debug!(message_id = record.id, target_id, error = %err, "reply target unusable"),
        },
        Ok(None) => debug!(message_id = record.id, target_id, "reply target not accessible"),
        Err(err) => debug!(message_id = record.id, target_id, error = %err, "reply target fetch failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MediaKind, ServiceKind};
    use serde_json::json;

    #[test]
    fn test_both_sender_keys_still_normalize() {
        let raw = json!({
            "id": 11,
            "date": 1705314600,
            "from_user": {"id": 7, "first_name": "Ada"},
            "from": {"id": 7, "first_name": "Ada"},
            "text": "hello"
        });
        let record = normalize_message(11, &raw).unwrap();
        assert!(!record.is_failed());
        assert_eq!(record.sender_name().as_deref(), Some("Ada"));
    }

    #[test]
    fn test_full_message() {
        let raw = json!({
            "id": 10,
            "date": 1705314600,
            "edit_date": "2024-01-15 11:00:00",
            "chat": {"id": -1001234567890_i64, "title": "Test", "username": "test"},
            "from_user": {"id": 7, "first_name": "Ada", "is_bot": false},
            "text": ["Hi ", {"type": "bold", "text": "there"}],
            "reply_to_message_id": 8,
            "reactions": {"reactions": [{"emoji": "👍", "count": 2}]}
        });
        let record = normalize_message(10, &raw).unwrap();
        assert_eq!(record.text.as_deref(), Some("Hi there"));
        assert_eq!(record.chat_id, Some(-1001234567890));
        assert_eq!(record.sender_name().as_deref(), Some("Ada"));
        assert_eq!(record.reply_to.as_ref().map(|r| r.message_id), Some(8));
        assert_eq!(record.reactions.len(), 1);
        assert!(record.edit_date.is_some());
        assert!(record.is_text_only());
    }

    #[test]
    fn test_caption_and_media() {
        let raw = json!({
            "id": 2,
            "caption": "sunset",
            "photo": [{"file_id": "a", "width": 10}, {"file_id": "b", "width": 100}]
        });
        let record = normalize_message(2, &raw).unwrap();
        assert_eq!(record.caption.as_deref(), Some("sunset"));
        assert_eq!(record.media.as_ref().map(|m| m.kind()), Some(MediaKind::Photo));
        assert!(record.has_media());
    }

    #[test]
    fn test_service_takes_precedence() {
        let raw = json!({
            "id": 3,
            "text": "ignored",
            "new_chat_title": "Renamed",
            "photo": {"file_id": "x"}
        });
        let record = normalize_message(3, &raw).unwrap();
        assert_eq!(record.service.as_ref().map(|s| s.kind), Some(ServiceKind::NewChatTitle));
        assert!(record.text.is_none());
        assert!(record.media.is_none());
        assert!(record.is_service());
    }

    #[test]
    fn test_non_object_payload_is_error_record() {
        let record = normalize_raw(4, Some(&json!([1, 2, 3])));
        assert!(record.is_failed());
        assert_eq!(record.id, 4);
        assert!(record.error.unwrap().contains("not an object"));
    }

    #[test]
    fn test_wrongly_typed_field_is_error_record() {
        let record = normalize_raw(4, Some(&json!({"id": 4, "from_user": "nobody"})));
        assert!(record.is_failed());
        assert_eq!(record.id, 4);
    }

    #[test]
    fn test_empty_payload_is_missing() {
        let record = normalize_raw(5, Some(&json!({"id": 5, "empty": true})));
        assert!(record.error.unwrap().contains("not found"));
    }

    #[test]
    fn test_mismatched_id_is_error() {
        let err = normalize_message(5, &json!({"id": 6})).unwrap_err();
        assert_eq!(err.message_id(), 5);
    }

    #[test]
    fn test_reply_preview_truncation() {
        let mut target = MessageRecord::new(8);
        target.text = Some("y".repeat(120));
        let preview = reply_preview(&target);
        assert_eq!(preview.id, 8);
        assert_eq!(preview.text.unwrap().chars().count(), PREVIEW_CHARS + ELLIPSIS.len());
    }
}
