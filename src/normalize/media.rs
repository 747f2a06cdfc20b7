//! Media slot detection.

use serde_json::{Map, Value};

use super::raw::RawMediaSlot;
use crate::error::RecordError;
use crate::message::{MediaDescriptor, MediaHandle, MediaKind};

/// Finds the primary media of a message.
///
/// Slots are checked in [`MediaKind::ALL`] order and the first non-empty one
/// wins. A present slot with an unusable shape is an error.
pub(crate) fn detect_media(
    message_id: i64,
    payload: &Map<String, Value>,
) -> Result<Option<MediaDescriptor>, RecordError> {
    for kind in MediaKind::ALL {
        let Some(value) = payload.get(kind.slot()) else {
            continue;
        };
        if let Some(slot) = slot_value(message_id, kind, value)? {
            return describe(message_id, kind, slot).map(Some);
        }
    }
    Ok(None)
}

/// Picks the slot object, resolving photo size arrays to their largest entry.
fn slot_value(
    message_id: i64,
    kind: MediaKind,
    value: &Value,
) -> Result<Option<RawMediaSlot>, RecordError> {
    let object = match value {
        Value::Null | Value::Bool(false) => return Ok(None),
        Value::Array(sizes) if kind == MediaKind::Photo => match sizes.last() {
            Some(largest) => largest,
            None => return Ok(None),
        },
        other => other,
    };

    if !object.is_object() {
        return Err(RecordError::normalize(
            message_id,
            format!("{} slot is not an object", kind.slot()),
        ));
    }

    serde_json::from_value(object.clone())
        .map(Some)
        .map_err(|e| RecordError::normalize(message_id, format!("{} slot: {e}", kind.slot())))
}

fn describe(
    message_id: i64,
    kind: MediaKind,
    slot: RawMediaSlot,
) -> Result<MediaDescriptor, RecordError> {
    let handle = slot.handle().map(MediaHandle::new).ok_or_else(|| {
        RecordError::normalize(message_id, format!("{} slot has no file id", kind.slot()))
    })?;

    let descriptor = match kind {
        MediaKind::Photo => MediaDescriptor::Photo {
            handle,
            width: slot.width,
            height: slot.height,
            file_size: slot.file_size,
        },
        MediaKind::Video => MediaDescriptor::Video {
            handle,
            width: slot.width,
            height: slot.height,
            duration: slot.duration,
            file_name: slot.file_name,
            mime_type: slot.mime_type,
            file_size: slot.file_size,
        },
        MediaKind::Audio => MediaDescriptor::Audio {
            handle,
            duration: slot.duration,
            title: slot.title,
            performer: slot.performer,
            file_name: slot.file_name,
            mime_type: slot.mime_type,
            file_size: slot.file_size,
        },
        MediaKind::Voice => MediaDescriptor::Voice {
            handle,
            duration: slot.duration,
            mime_type: slot.mime_type,
            file_size: slot.file_size,
        },
        MediaKind::Document => MediaDescriptor::Document {
            handle,
            file_name: slot.file_name,
            mime_type: slot.mime_type,
            file_size: slot.file_size,
        },
        MediaKind::Sticker => MediaDescriptor::Sticker {
            handle,
            width: slot.width,
            height: slot.height,
            emoji: slot.emoji,
            is_animated: slot.is_animated,
            is_video: slot.is_video,
            file_size: slot.file_size,
        },
    };
    Ok(descriptor)
}
