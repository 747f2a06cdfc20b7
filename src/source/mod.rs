//! Boundary to the messaging platform.
//!
//! Everything that talks to Telegram hides behind [`MessageSource`]. The
//! exporter only needs two operations: fetch one message by id, and download
//! the media a message points at. Session handling and the wire protocol
//! live in the implementation.
//!
//! [`ArchiveSource`] is a ready-made implementation that replays a JSON
//! archive of raw payloads from disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::SourceError;
use crate::link::ChatRef;
use crate::message::{MediaDescriptor, MediaKind};

mod archive;

pub use archive::ArchiveSource;

/// A raw provider message.
///
/// Its shape varies between message kinds and between provider versions,
/// so it is kept as untyped JSON until the normalizer has looked at it.
pub type RawMessage = serde_json::Value;

/// An authenticated connection to the messaging platform.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Returns the name of the source, for logs.
    fn name(&self) -> &'static str;

    /// Fetches a single message.
    ///
    /// Returns `Ok(None)` when the platform reports the message as empty,
    /// deleted or inaccessible.
    async fn get_message(
        &self,
        chat: &ChatRef,
        message_id: i64,
    ) -> Result<Option<RawMessage>, SourceError>;

    /// Downloads the media of a message into `dest_dir`.
    ///
    /// Returns the path of the written file. Implementations should name
    /// the file with [`media_file_name`].
    async fn download_media(
        &self,
        chat: &ChatRef,
        message_id: i64,
        media: &MediaDescriptor,
        dest_dir: &Path,
    ) -> Result<PathBuf, SourceError>;
}

/// Download naming convention.
///
/// A provider file name is kept with the message id appended to its stem
/// (`report.pdf` becomes `report_7.pdf`), so equal names in one range never
/// share a path. Otherwise the file is named `<kind>_<message_id>.<ext>`,
/// with the extension taken from the MIME type or the kind's default.
///
/// ```rust
/// use tgexport::message::{MediaDescriptor, MediaHandle};
/// use tgexport::source::media_file_name;
///
/// let voice = MediaDescriptor::Voice {
///     handle: MediaHandle::new("v1"),
///     duration: Some(3),
///     mime_type: Some("audio/ogg".into()),
///     file_size: None,
/// };
/// assert_eq!(media_file_name(42, &voice), "voice_42.ogg");
/// ```
pub fn media_file_name(message_id: i64, media: &MediaDescriptor) -> String {
    if let Some(name) = media.file_name().map(sanitize_component).filter(|n| !n.is_empty()) {
        return match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
                format!("{stem}_{message_id}.{ext}")
            }
            _ => format!("{name}_{message_id}"),
        };
    }

    let kind = media.kind();
    let ext = media
        .mime_type()
        .and_then(extension_for_mime)
        .unwrap_or_else(|| kind.default_extension());
    format!("{}_{}.{}", kind.slot(), message_id, ext)
}

/// Maps common MIME types to a file extension.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let ext = match mime.split(';').next().unwrap_or(mime).trim() {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        "video/x-matroska" => "mkv",
        "audio/mpeg" => "mp3",
        "audio/ogg" => "ogg",
        "audio/opus" => "opus",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/mp4" | "audio/x-m4a" => "m4a",
        "audio/flac" => "flac",
        "application/pdf" => "pdf",
        "application/zip" => "zip",
        "application/x-tgsticker" => "tgs",
        "text/plain" => "txt",
        _ => return None,
    };
    Some(ext)
}

/// Strips path separators so a provider file name cannot escape the media directory.
fn sanitize_component(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.trim().trim_start_matches('.').to_string()
}

/// Guesses the media kind of a file from its extension.
pub fn kind_for_extension(ext: &str) -> Option<MediaKind> {
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "bmp" => Some(MediaKind::Photo),
        "mp4" | "webm" | "mov" | "avi" | "mkv" => Some(MediaKind::Video),
        "mp3" | "m4a" | "flac" | "wav" => Some(MediaKind::Audio),
        "ogg" | "oga" | "opus" => Some(MediaKind::Voice),
        "webp" | "tgs" => Some(MediaKind::Sticker),
        _ => None,
    }
}
