//! Offline message source backed by a JSON archive.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::fs;

use super::{MessageSource, RawMessage, media_file_name};
use crate::error::{ExportError, SourceError};
use crate::link::ChatRef;
use crate::message::MediaDescriptor;

/// Replays raw provider payloads captured in an archive file.
///
/// The archive has this structure:
/// ```json
/// {
///   "chats": [
///     {
///       "id": -1001234567890,
///       "username": "somechannel",
///       "title": "Some Channel",
///       "messages": [ { "id": 1, "date": 1705314600, "text": "..." } ]
///     }
///   ]
/// }
/// ```
///
/// Media blobs live in a separate directory, one file per media handle.
/// A download copies `<media_root>/<handle>` into the destination directory
/// under the name given by [`media_file_name`].
#[derive(Debug, Clone)]
pub struct ArchiveSource {
    chats: Vec<ArchivedChat>,
    media_root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct ArchiveFile {
    chats: Vec<ArchivedChat>,
}

#[derive(Debug, Clone, Deserialize)]
struct ArchivedChat {
    id: Option<i64>,
    username: Option<String>,
    title: Option<String>,
    #[serde(default)]
    messages: Vec<Value>,
}

impl ArchiveSource {
    /// Builds a source from archive JSON.
    pub fn from_json(content: &str, media_root: impl Into<PathBuf>) -> Result<Self, ExportError> {
        let archive: ArchiveFile = serde_json::from_str(content).map_err(|e| {
            ExportError::invalid_archive(format!("not a message archive: {e}"), None)
        })?;
        Ok(Self {
            chats: archive.chats,
            media_root: media_root.into(),
        })
    }

    /// Loads an archive from disk.
    ///
    /// Without an explicit `media_root`, blobs are looked up in a `media`
    /// directory next to the archive file.
    pub async fn open(path: impl AsRef<Path>, media_root: Option<PathBuf>) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let media_root = media_root.unwrap_or_else(|| {
            path.parent()
                .map(|p| p.join("media"))
                .unwrap_or_else(|| PathBuf::from("media"))
        });

        Self::from_json(&content, media_root).map_err(|err| match err {
            ExportError::InvalidArchive { message, .. } => {
                ExportError::invalid_archive(message, Some(path.to_path_buf()))
            }
            other => other,
        })
    }

    /// Number of chats in the archive.
    pub fn chat_count(&self) -> usize {
        self.chats.len()
    }

    fn find_chat(&self, chat: &ChatRef) -> Option<&ArchivedChat> {
        self.chats
            .iter()
            .find(|c| chat.matches(c.id, c.username.as_deref()))
    }
}

#[async_trait]
impl MessageSource for ArchiveSource {
    fn name(&self) -> &'static str {
        "Archive"
    }

    async fn get_message(
        &self,
        chat: &ChatRef,
        message_id: i64,
    ) -> Result<Option<RawMessage>, SourceError> {
        let archived = self
            .find_chat(chat)
            .ok_or_else(|| SourceError::unavailable(format!("chat {chat} is not in the archive")))?;

        let found = archived
            .messages
            .iter()
            .find(|m| m.get("id").and_then(Value::as_i64) == Some(message_id));

        let Some(message) = found else {
            return Ok(None);
        };

        let mut message = message.clone();
        // Archived payloads often omit the chat block; fill it from the chat entry.
        if let Value::Object(map) = &mut message {
            map.entry("chat").or_insert_with(|| {
                serde_json::json!({
                    "id": archived.id,
                    "title": archived.title,
                    "username": archived.username,
                })
            });
        }
        Ok(Some(message))
    }

    async fn download_media(
        &self,
        _chat: &ChatRef,
        message_id: i64,
        media: &MediaDescriptor,
        dest_dir: &Path,
    ) -> Result<PathBuf, SourceError> {
        let blob = self.media_root.join(media.handle().as_str());
        if !fs::try_exists(&blob).await? {
            return Err(SourceError::NotFound);
        }

        fs::create_dir_all(dest_dir).await?;
        let dest = dest_dir.join(media_file_name(message_id, media));
        fs::copy(&blob, &dest).await?;
        Ok(dest)
    }
}
