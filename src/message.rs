//! Normalized message model.
//!
//! This module provides [`MessageRecord`], the provider-independent
//! representation of one message in an exported range. The normalizer
//! produces exactly one record per requested id. A record is either
//! hydrated or carries an [`error`](MessageRecord::error) that marks it as a
//! stand-in for a failed fetch.
//!
//! # Serialization
//!
//! Field order of every struct here is the field order of the data dump.
//! `None` fields are omitted, dates are RFC 3339 strings and media
//! descriptors are tagged with `"type"`:
//!
//! ```
//! use tgexport::message::{MediaDescriptor, MediaHandle, MessageRecord};
//!
//! let mut record = MessageRecord::new(7);
//! record.caption = Some("sunset".into());
//! record.media = Some(MediaDescriptor::Photo {
//!     handle: MediaHandle::new("AgAD"),
//!     width: Some(1280),
//!     height: Some(720),
//!     file_size: None,
//! });
//!
//! let json = serde_json::to_string(&record)?;
//! assert!(json.starts_with(r#"{"id":7"#));
//! assert!(json.contains(r#""type":"photo""#));
//! # Ok::<(), serde_json::Error>(())
//! ```

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message of an exported range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Platform message id, unique within the chat.
    pub id: i64,

    /// When the message was sent.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<DateTime<Utc>>,

    /// When the message was last edited.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub edit_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chat_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chat_title: Option<String>,

    /// Public handle of the chat; absent for chats without one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chat_username: Option<String>,

    /// Author. `None` for anonymous admins and channel posts.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sender: Option<Sender>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,

    /// Text attached to a media message.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub caption: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub media: Option<MediaDescriptor>,

    /// Message this one replies to, with a cached preview when it resolved.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reply_to: Option<ReplyReference>,

    #[serde(default)]
    pub reactions: Vec<Reaction>,

    /// System event classification (joins, pins, title changes, ...).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub service: Option<ServiceEvent>,

    /// Failure description. When set, all content fields are unreliable.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl MessageRecord {
    /// Creates an empty record for `id`.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Creates an error stand-in for `id`.
    ///
    /// ```rust
    /// use tgexport::MessageRecord;
    ///
    /// let record = MessageRecord::failed(3, "timeout");
    /// assert!(record.is_failed());
    /// assert_eq!(record.id, 3);
    /// ```
    pub fn failed(id: i64, error: impl fmt::Display) -> Self {
        Self {
            id,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// Returns `true` if this record stands in for a failed fetch.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Returns `true` for successfully fetched service messages.
    pub fn is_service(&self) -> bool {
        !self.is_failed() && self.service.is_some()
    }

    /// Returns `true` for ordinary messages carrying a media descriptor.
    pub fn has_media(&self) -> bool {
        !self.is_failed() && !self.is_service() && self.media.is_some()
    }

    /// Returns `true` if the message carries non-blank text or caption.
    pub fn has_text(&self) -> bool {
        let present = |s: &Option<String>| s.as_deref().is_some_and(|t| !t.trim().is_empty());
        present(&self.text) || present(&self.caption)
    }

    /// Returns `true` for ordinary messages with text and no media.
    pub fn is_text_only(&self) -> bool {
        !self.is_failed() && !self.is_service() && self.media.is_none() && self.has_text()
    }

    /// Best display name of the author, if there is one.
    pub fn sender_name(&self) -> Option<String> {
        self.sender.as_ref().map(Sender::display_name)
    }

    /// Text, falling back to the caption.
    pub fn body(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }
}

/// Author of a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

impl Sender {
    /// Resolves a human-readable name: full name, then `@username`, then `User <id>`.
    ///
    /// ```rust
    /// use tgexport::message::Sender;
    ///
    /// let sender = Sender { first_name: Some("Ada".into()), last_name: Some("Lovelace".into()), ..Sender::default() };
    /// assert_eq!(sender.display_name(), "Ada Lovelace");
    /// ```
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if !full.is_empty() {
            return full;
        }
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            return format!("@{username}");
        }
        match self.id {
            Some(id) => format!("User {id}"),
            None => "Unknown".to_string(),
        }
    }
}

/// Provider-side handle used to download a media blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaHandle(String);

impl MediaHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Primary media kind of a message.
///
/// [`MediaKind::ALL`] is the detection order: a message carrying two media
/// slots is classified by the first one in this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
    Voice,
    Document,
    Sticker,
}

impl MediaKind {
    /// Detection order.
    pub const ALL: [MediaKind; 6] = [
        MediaKind::Photo,
        MediaKind::Video,
        MediaKind::Audio,
        MediaKind::Voice,
        MediaKind::Document,
        MediaKind::Sticker,
    ];

    /// Name of the payload field carrying this kind.
    pub fn slot(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Voice => "voice",
            MediaKind::Document => "document",
            MediaKind::Sticker => "sticker",
        }
    }

    /// File extension used when the provider gives no better hint.
    pub fn default_extension(self) -> &'static str {
        match self {
            MediaKind::Photo => "jpg",
            MediaKind::Video => "mp4",
            MediaKind::Audio => "mp3",
            MediaKind::Voice => "ogg",
            MediaKind::Document => "bin",
            MediaKind::Sticker => "webp",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            MediaKind::Photo => "📷",
            MediaKind::Video => "🎥",
            MediaKind::Audio => "🎵",
            MediaKind::Voice => "🎤",
            MediaKind::Document => "📄",
            MediaKind::Sticker => "🏷️",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MediaKind::Photo => "Photo",
            MediaKind::Video => "Video",
            MediaKind::Audio => "Audio",
            MediaKind::Voice => "Voice message",
            MediaKind::Document => "Document",
            MediaKind::Sticker => "Sticker",
        };
        f.write_str(label)
    }
}

/// Media attached to a message. Each variant carries only what is meaningful for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaDescriptor {
    Photo {
        handle: MediaHandle,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        width: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        height: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        file_size: Option<u64>,
    },
    Video {
        handle: MediaHandle,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        width: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        height: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        duration: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        file_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        mime_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        file_size: Option<u64>,
    },
    Audio {
        handle: MediaHandle,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        duration: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        performer: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        file_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        mime_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        file_size: Option<u64>,
    },
    Voice {
        handle: MediaHandle,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        duration: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        mime_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        file_size: Option<u64>,
    },
    Document {
        handle: MediaHandle,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        file_name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        mime_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        file_size: Option<u64>,
    },
    Sticker {
        handle: MediaHandle,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        width: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        height: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        emoji: Option<String>,
        #[serde(default)]
        is_animated: bool,
        #[serde(default)]
        is_video: bool,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        file_size: Option<u64>,
    },
}

impl MediaDescriptor {
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaDescriptor::Photo { .. } => MediaKind::Photo,
            MediaDescriptor::Video { .. } => MediaKind::Video,
            MediaDescriptor::Audio { .. } => MediaKind::Audio,
            MediaDescriptor::Voice { .. } => MediaKind::Voice,
            MediaDescriptor::Document { .. } => MediaKind::Document,
            MediaDescriptor::Sticker { .. } => MediaKind::Sticker,
        }
    }

    pub fn handle(&self) -> &MediaHandle {
        match self {
            MediaDescriptor::Photo { handle, .. }
            | MediaDescriptor::Video { handle, .. }
            | MediaDescriptor::Audio { handle, .. }
            | MediaDescriptor::Voice { handle, .. }
            | MediaDescriptor::Document { handle, .. }
            | MediaDescriptor::Sticker { handle, .. } => handle,
        }
    }

    pub fn file_size(&self) -> Option<u64> {
        match self {
            MediaDescriptor::Photo { file_size, .. }
            | MediaDescriptor::Video { file_size, .. }
            | MediaDescriptor::Audio { file_size, .. }
            | MediaDescriptor::Voice { file_size, .. }
            | MediaDescriptor::Document { file_size, .. }
            | MediaDescriptor::Sticker { file_size, .. } => *file_size,
        }
    }

    pub fn duration(&self) -> Option<u32> {
        match self {
            MediaDescriptor::Video { duration, .. }
            | MediaDescriptor::Audio { duration, .. }
            | MediaDescriptor::Voice { duration, .. } => *duration,
            _ => None,
        }
    }

    /// Original file name, for kinds that carry one.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            MediaDescriptor::Video { file_name, .. }
            | MediaDescriptor::Audio { file_name, .. }
            | MediaDescriptor::Document { file_name, .. } => file_name.as_deref(),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match self {
            MediaDescriptor::Video { mime_type, .. }
            | MediaDescriptor::Audio { mime_type, .. }
            | MediaDescriptor::Voice { mime_type, .. }
            | MediaDescriptor::Document { mime_type, .. } => mime_type.as_deref(),
            MediaDescriptor::Photo { .. } => Some("image/jpeg"),
            MediaDescriptor::Sticker {
                is_animated,
                is_video,
                ..
            } => Some(if *is_video {
                "video/webm"
            } else if *is_animated {
                "application/x-tgsticker"
            } else {
                "image/webp"
            }),
        }
    }
}

/// Pointer to the message a record replies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyReference {
    /// Id of the replied-to message, in the same chat.
    pub message_id: i64,
    /// Preview resolved at fetch time; `None` if resolution failed.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preview: Option<ReplyPreview>,
}

/// Lightweight, denormalized snapshot of a replied-to message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyPreview {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<DateTime<Utc>>,
    /// Text truncated to 100 characters.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sender_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub media_type: Option<MediaKind>,
}

/// One reaction bucket on a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Emoji, or `[unknown]` for reactions that could not be resolved.
    pub emoji: String,
    pub count: u32,
    /// Whether the exporting account picked this reaction.
    #[serde(default)]
    pub chosen: bool,
}

impl Reaction {
    /// Symbol used for reactions whose payload could not be resolved.
    pub const UNKNOWN: &'static str = "[unknown]";
}

/// A system-generated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEvent {
    pub kind: ServiceKind,
    /// Human-readable description of the event.
    pub description: String,
}

/// Kinds of service events.
///
/// [`ServiceKind::ALL`] is the detection order. Each kind is detected by
/// the presence of its [`slot`](ServiceKind::slot) in the raw payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    NewChatMembers,
    LeftChatMember,
    NewChatTitle,
    NewChatPhoto,
    DeleteChatPhoto,
    GroupChatCreated,
    SupergroupChatCreated,
    ChannelChatCreated,
    MigrateToChatId,
    MigrateFromChatId,
    PinnedMessage,
    SuccessfulPayment,
    GiftedPremium,
    ContactRegistered,
    WebAppData,
    Unknown,
}

impl ServiceKind {
    /// Detection order. [`ServiceKind::Unknown`] has no slot and is not listed.
    pub const ALL: [ServiceKind; 15] = [
        ServiceKind::NewChatMembers,
        ServiceKind::LeftChatMember,
        ServiceKind::NewChatTitle,
        ServiceKind::NewChatPhoto,
        ServiceKind::DeleteChatPhoto,
        ServiceKind::GroupChatCreated,
        ServiceKind::SupergroupChatCreated,
        ServiceKind::ChannelChatCreated,
        ServiceKind::MigrateToChatId,
        ServiceKind::MigrateFromChatId,
        ServiceKind::PinnedMessage,
        ServiceKind::SuccessfulPayment,
        ServiceKind::GiftedPremium,
        ServiceKind::ContactRegistered,
        ServiceKind::WebAppData,
    ];

    /// Payload field whose presence marks this kind.
    pub fn slot(self) -> &'static str {
        match self {
            ServiceKind::NewChatMembers => "new_chat_members",
            ServiceKind::LeftChatMember => "left_chat_member",
            ServiceKind::NewChatTitle => "new_chat_title",
            ServiceKind::NewChatPhoto => "new_chat_photo",
            ServiceKind::DeleteChatPhoto => "delete_chat_photo",
            ServiceKind::GroupChatCreated => "group_chat_created",
            ServiceKind::SupergroupChatCreated => "supergroup_chat_created",
            ServiceKind::ChannelChatCreated => "channel_chat_created",
            ServiceKind::MigrateToChatId => "migrate_to_chat_id",
            ServiceKind::MigrateFromChatId => "migrate_from_chat_id",
            ServiceKind::PinnedMessage => "pinned_message",
            ServiceKind::SuccessfulPayment => "successful_payment",
            ServiceKind::GiftedPremium => "gifted_premium",
            ServiceKind::ContactRegistered => "contact_registered",
            ServiceKind::WebAppData => "web_app_data",
            ServiceKind::Unknown => "service",
        }
    }

    /// Looks a kind up by its service tag name (case-insensitive).
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.rsplit('.').next().unwrap_or(tag).to_lowercase();
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.slot() == tag)
            .unwrap_or(ServiceKind::Unknown)
    }
}

/// A downloaded media file, keyed by the message that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaArtifact {
    pub message_id: i64,
    pub path: PathBuf,
}

impl MediaArtifact {
    pub fn new(message_id: i64, path: impl Into<PathBuf>) -> Self {
        Self {
            message_id,
            path: path.into(),
        }
    }

    /// Lowercased file extension, empty if there is none.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn photo() -> MediaDescriptor {
        MediaDescriptor::Photo {
            handle: MediaHandle::new("ph1"),
            width: Some(800),
            height: Some(600),
            file_size: Some(2048),
        }
    }

    #[test]
    fn test_failed_record() {
        let record = MessageRecord::failed(5, "boom");
        assert!(record.is_failed());
        assert!(!record.is_service());
        assert!(!record.has_media());
        assert_eq!(record.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_text_only_and_media_predicates() {
        let mut record = MessageRecord::new(1);
        record.text = Some("hello".into());
        assert!(record.is_text_only());
        assert!(!record.has_media());

        record.media = Some(photo());
        assert!(record.has_media());
        assert!(!record.is_text_only());
    }

    #[test]
    fn test_blank_text_is_not_text() {
        let mut record = MessageRecord::new(1);
        record.text = Some("   ".into());
        assert!(!record.has_text());
        assert!(!record.is_text_only());
    }

    #[test]
    fn test_service_record_is_not_media() {
        let mut record = MessageRecord::new(1);
        record.service = Some(ServiceEvent {
            kind: ServiceKind::NewChatPhoto,
            description: "Chat photo changed".into(),
        });
        record.media = Some(photo());
        assert!(record.is_service());
        assert!(!record.has_media());
    }

    #[test]
    fn test_sender_display_name_fallbacks() {
        let full = Sender {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            ..Sender::default()
        };
        assert_eq!(full.display_name(), "Ada Lovelace");

        let handle = Sender {
            username: Some("ada".into()),
            ..Sender::default()
        };
        assert_eq!(handle.display_name(), "@ada");

        let bare = Sender {
            id: Some(42),
            ..Sender::default()
        };
        assert_eq!(bare.display_name(), "User 42");
        assert_eq!(Sender::default().display_name(), "Unknown");
    }

    #[test]
    fn test_serialization_field_order() {
        let mut record = MessageRecord::new(10);
        record.date = Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
        record.text = Some("hi".into());
        record.error = None;

        let json = serde_json::to_string(&record).unwrap();
        let id = json.find("\"id\"").unwrap();
        let date = json.find("\"date\"").unwrap();
        let text = json.find("\"text\"").unwrap();
        let reactions = json.find("\"reactions\"").unwrap();
        assert!(id < date && date < text && text < reactions);
        assert!(json.contains("2024-01-15T10:30:00Z"));
        assert!(!json.contains("error"));
    }

    #[test]
    fn test_media_descriptor_tagging() {
        let json = serde_json::to_value(photo()).unwrap();
        assert_eq!(json["type"], "photo");
        assert_eq!(json["handle"], "ph1");
        assert_eq!(photo().kind(), MediaKind::Photo);
        assert_eq!(photo().file_size(), Some(2048));
    }

    #[test]
    fn test_service_kind_from_tag() {
        assert_eq!(ServiceKind::from_tag("pinned_message"), ServiceKind::PinnedMessage);
        assert_eq!(
            ServiceKind::from_tag("MessageServiceType.NEW_CHAT_TITLE"),
            ServiceKind::NewChatTitle
        );
        assert_eq!(ServiceKind::from_tag("video_chat_started"), ServiceKind::Unknown);
    }

    #[test]
    fn test_artifact_extension() {
        assert_eq!(MediaArtifact::new(1, "media/a.JPG").extension(), "jpg");
        assert_eq!(MediaArtifact::new(1, "media/noext").extension(), "");
    }
}
