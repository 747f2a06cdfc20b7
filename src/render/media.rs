//! Media elements.
//!
//! A downloaded file is embedded by its extension. Media that was not
//! downloaded renders a typed placeholder with whatever metadata the
//! descriptor carries.

use std::path::Path;

use super::escape::{escape_html, format_duration, format_file_size};
use crate::message::{MediaArtifact, MediaDescriptor, MediaKind};

pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "webm", "mov", "avi", "mkv"];
pub const AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "ogg", "oga", "opus", "wav", "m4a", "flac"];

/// How a downloaded file is embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaElement {
    Image,
    Video,
    Audio,
    File,
}

impl MediaElement {
    /// Picks the element for a lowercased file extension.
    pub fn for_extension(ext: &str) -> Self {
        if IMAGE_EXTENSIONS.contains(&ext) {
            MediaElement::Image
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            MediaElement::Video
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            MediaElement::Audio
        } else {
            MediaElement::File
        }
    }
}

/// MIME type of a playable video extension.
fn video_mime(ext: &str) -> &'static str {
    match ext {
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => "video/mp4",
    }
}

/// Path of an artifact relative to the document, with forward slashes.
pub(crate) fn relative_src(artifact: &MediaArtifact, base_dir: &Path) -> String {
    let path = artifact.path.strip_prefix(base_dir).unwrap_or(&artifact.path);
    path.to_string_lossy().replace('\\', "/")
}

/// Renders the media block of a message.
pub(crate) fn media_html(
    media: Option<&MediaDescriptor>,
    artifact: Option<&MediaArtifact>,
    base_dir: &Path,
) -> String {
    let inner = match (media, artifact) {
        (_, Some(artifact)) => embedded(media, artifact, base_dir),
        (Some(media), None) => placeholder(media),
        (None, None) => return String::new(),
    };
    format!(r#"<div class="media-container">{inner}</div>"#)
}

fn embedded(media: Option<&MediaDescriptor>, artifact: &MediaArtifact, base_dir: &Path) -> String {
    let src = escape_html(&relative_src(artifact, base_dir));
    let ext = artifact.extension();
    let is_sticker = media.is_some_and(|m| m.kind() == MediaKind::Sticker);

    match MediaElement::for_extension(&ext) {
        MediaElement::Image if is_sticker => {
            format!(r#"<img src="{src}" alt="Sticker" class="sticker" loading="lazy">"#)
        }
        MediaElement::Image => {
            format!(r#"<img src="{src}" alt="Photo" class="media-item" loading="lazy">"#)
        }
        MediaElement::Video if is_sticker => format!(
            r#"<video autoplay loop muted playsinline class="sticker"><source src="{src}" type="{}"></video>"#,
            video_mime(&ext)
        ),
        MediaElement::Video => format!(
            r#"<video controls preload="metadata" class="media-item"><source src="{src}" type="{}">Your browser does not support video.</video>"#,
            video_mime(&ext)
        ),
        MediaElement::Audio => {
            let player = format!(
                r#"<audio controls preload="metadata" class="media-item"><source src="{src}">Your browser does not support audio.</audio>"#
            );
            match media {
                Some(MediaDescriptor::Voice { duration, .. }) => format!(
                    r#"<div class="voice-message"><div class="voice-icon">🎤</div><div>Voice message ({})</div></div>{player}"#,
                    format_duration(*duration)
                ),
                Some(audio @ MediaDescriptor::Audio { .. }) => {
                    format!("{player}{}", audio_caption(audio))
                }
                _ => player,
            }
        }
        MediaElement::File => {
            let name = artifact
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "file".to_string());
            let size = media
                .and_then(MediaDescriptor::file_size)
                .map(format_file_size)
                .unwrap_or_default();
            format!(
                r#"<div class="file-attachment"><div class="file-icon">📄</div><div class="file-info"><div class="file-name"><a href="{src}" target="_blank" rel="noopener">{}</a></div><div class="file-size">{}</div></div></div>"#,
                escape_html(&name),
                escape_html(&size)
            )
        }
    }
}

fn placeholder(media: &MediaDescriptor) -> String {
    let size = format_file_size(media.file_size().unwrap_or(0));
    match media {
        MediaDescriptor::Photo { .. } => {
            format!(r#"<div class="media-placeholder">📷 Photo ({size})</div>"#)
        }
        MediaDescriptor::Video { duration, .. } => format!(
            r#"<div class="media-placeholder">🎥 Video ({}, {size})</div>"#,
            format_duration(*duration)
        ),
        MediaDescriptor::Voice { duration, .. } => format!(
            r#"<div class="voice-message"><div class="voice-icon">🎤</div><div>Voice message ({})</div></div>"#,
            format_duration(*duration)
        ),
        MediaDescriptor::Audio { .. } => audio_caption(media),
        MediaDescriptor::Document { file_name, .. } => format!(
            r#"<div class="file-attachment"><div class="file-icon">📄</div><div class="file-info"><div class="file-name">{}</div><div class="file-size">{size}</div></div></div>"#,
            escape_html(file_name.as_deref().unwrap_or("Document"))
        ),
        MediaDescriptor::Sticker { emoji, .. } => format!(
            r#"<div class="media-placeholder">🏷️ Sticker {}</div>"#,
            escape_html(emoji.as_deref().unwrap_or_default())
        ),
    }
}

fn audio_caption(media: &MediaDescriptor) -> String {
    let MediaDescriptor::Audio {
        title,
        performer,
        duration,
        ..
    } = media
    else {
        return String::new();
    };

    let title = title.as_deref().unwrap_or("Audio file");
    let display = match performer.as_deref().filter(|p| !p.is_empty()) {
        Some(performer) => format!("{performer} - {title}"),
        None => title.to_string(),
    };
    format!(
        r#"<div class="caption">🎵 {} ({})</div>"#,
        escape_html(&display),
        format_duration(*duration)
    )
}
