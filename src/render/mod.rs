//! Document renderer.
//!
//! [`render_document`] is a pure function from the ordered records, their
//! media artifacts and a [`RenderContext`] to a styled, cross-linked HTML
//! document. Each record renders by precedence: error stand-in, then service
//! event, then ordinary content.
//!
//! Input that breaks the renderer's assumptions (unordered or duplicate ids,
//! artifacts of unknown messages) is a [`RenderError`].
//! [`render_or_fallback`] turns any such error into the
//! [`emergency_document`], which cannot fail.
//!
//! # Example
//!
//! ```rust
//! use tgexport::MessageRecord;
//! use tgexport::link::ChatRef;
//! use tgexport::render::{RenderContext, render_or_fallback};
//!
//! let mut record = MessageRecord::new(1);
//! record.text = Some("hello".into());
//!
//! let ctx = RenderContext::new("https://t.me/chan/1", "https://t.me/chan/1", ChatRef::username("chan"));
//! let doc = render_or_fallback(&[record], &[], &ctx);
//! assert!(!doc.is_emergency());
//! assert!(doc.html.contains(r#"id="message-1""#));
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::error;

use crate::error::RenderError;
use crate::link::ChatRef;
use crate::message::{MediaArtifact, MessageRecord, ReplyReference};

mod assets;
mod emergency;
mod escape;
mod media;
mod summary;

pub use assets::{SCRIPT, SCRIPT_FILE, STYLESHEET, STYLESHEET_FILE, write_assets};
pub use emergency::emergency_document;
pub use escape::{
    TextDirection, escape_html, format_duration, format_file_size, is_rtl_char, text_direction,
};
pub use media::{AUDIO_EXTENSIONS, IMAGE_EXTENSIONS, MediaElement, VIDEO_EXTENSIONS};
pub use summary::ExportSummary;

/// Everything the renderer needs besides the records.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Range start as given by the user
    pub start_link: String,
    /// Range end as given by the user
    pub end_link: String,
    /// Chat of the range; used to rebuild links of failed messages
    pub chat: ChatRef,
    pub exported_at: DateTime<Utc>,
    /// Directory the document is written to; artifact paths are made relative to it
    pub base_dir: PathBuf,
}

impl RenderContext {
    pub fn new(start_link: impl Into<String>, end_link: impl Into<String>, chat: ChatRef) -> Self {
        Self {
            start_link: start_link.into(),
            end_link: end_link.into(),
            chat,
            exported_at: Utc::now(),
            base_dir: PathBuf::new(),
        }
    }

    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_exported_at(mut self, at: DateTime<Utc>) -> Self {
        self.exported_at = at;
        self
    }
}

/// A rendered document.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub html: String,
    pub summary: ExportSummary,
    /// Why rendering failed, when this is the emergency document
    pub fallback_reason: Option<String>,
}

impl RenderedDocument {
    /// Returns `true` if this is the emergency document.
    pub fn is_emergency(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Renders the document, falling back to the emergency document on error.
pub fn render_or_fallback(
    records: &[MessageRecord],
    artifacts: &[MediaArtifact],
    ctx: &RenderContext,
) -> RenderedDocument {
    match render_document(records, artifacts, ctx) {
        Ok(doc) => doc,
        Err(err) => {
            let reason = err.to_string();
            error!(error = %reason, "rendering failed, writing emergency document");
            RenderedDocument {
                html: emergency_document(&ctx.start_link, &ctx.end_link, &reason),
                summary: ExportSummary::from_records(records, &[]),
                fallback_reason: Some(reason),
            }
        }
    }
}

/// Renders the full document.
///
/// `records` must be strictly ascending by id, and every artifact must
/// belong to one of them.
pub fn render_document(
    records: &[MessageRecord],
    artifacts: &[MediaArtifact],
    ctx: &RenderContext,
) -> Result<RenderedDocument, RenderError> {
    validate(records, artifacts)?;

    let artifacts_by_id: HashMap<i64, &MediaArtifact> =
        artifacts.iter().map(|a| (a.message_id, a)).collect();
    let ids: HashSet<i64> = records.iter().map(|r| r.id).collect();
    let summary = ExportSummary::from_records(records, artifacts);

    let mut html = String::with_capacity(4096 + records.len() * 1024);
    write_head(&mut html, records, ctx, &summary)?;

    for record in records {
        let renderer = RecordRenderer {
            record,
            artifact: artifacts_by_id.get(&record.id).copied(),
            ids: &ids,
            ctx,
        };
        renderer.write(&mut html)?;
    }

    write_tail(&mut html)?;

    Ok(RenderedDocument {
        html,
        summary,
        fallback_reason: None,
    })
}

fn validate(records: &[MessageRecord], artifacts: &[MediaArtifact]) -> Result<(), RenderError> {
    for pair in records.windows(2) {
        let (previous, next) = (pair[0].id, pair[1].id);
        if previous == next {
            return Err(RenderError::Duplicate(next));
        }
        if previous > next {
            return Err(RenderError::Unordered { previous, next });
        }
    }

    let ids: HashSet<i64> = records.iter().map(|r| r.id).collect();
    if let Some(orphan) = artifacts.iter().find(|a| !ids.contains(&a.message_id)) {
        return Err(RenderError::OrphanArtifact {
            message_id: orphan.message_id,
            path: orphan.path.display().to_string(),
        });
    }
    Ok(())
}

fn chat_title(records: &[MessageRecord], chat: &ChatRef) -> String {
    records
        .iter()
        .find_map(|r| r.chat_title.clone())
        .unwrap_or_else(|| chat.to_string())
}

fn write_head(
    out: &mut String,
    records: &[MessageRecord],
    ctx: &RenderContext,
    summary: &ExportSummary,
) -> Result<(), RenderError> {
    let title = escape_html(&chat_title(records, &ctx.chat));
    let start = escape_html(&ctx.start_link);
    let end = escape_html(&ctx.end_link);
    let (first, last) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first.id, last.id),
        _ => (0, 0),
    };

    write!(
        out,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Telegram Export - {title}</title>
<link rel="stylesheet" href="{STYLESHEET_FILE}">
</head>
<body>
<div class="chat-container">
<div class="chat-header">
<h1>{title}</h1>
<div class="info">Messages #{first} to #{last}</div>
</div>
<div class="download-info">Exported {exported} &middot; <a href="{start}" target="_blank" rel="noopener">Start</a> &middot; <a href="{end}" target="_blank" rel="noopener">End</a></div>
"#,
        exported = ctx.exported_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )?;

    out.push_str(r#"<div class="stats">"#);
    for (key, label, value) in [
        ("total", "Total", summary.total),
        ("successful", "Successful", summary.successful),
        ("service", "Service", summary.service),
        ("failed", "Failed", summary.failed),
        ("with-media", "With media", summary.with_media),
        ("text-only", "Text only", summary.text_only),
        ("replies", "Replies", summary.replies),
    ] {
        write!(
            out,
            r#"<span class="stat" data-stat="{key}">{label}: <strong>{value}</strong></span>"#
        )?;
    }
    out.push_str("</div>\n<div class=\"messages-container\">\n");
    Ok(())
}

fn write_tail(out: &mut String) -> Result<(), RenderError> {
    write!(
        out,
        "</div>\n</div>\n<script src=\"{SCRIPT_FILE}\"></script>\n</body>\n</html>\n"
    )?;
    Ok(())
}

struct RecordRenderer<'a> {
    record: &'a MessageRecord,
    artifact: Option<&'a MediaArtifact>,
    ids: &'a HashSet<i64>,
    ctx: &'a RenderContext,
}

impl RecordRenderer<'_> {
    fn write(&self, out: &mut String) -> Result<(), RenderError> {
        if self.record.is_failed() {
            self.write_failed(out)
        } else if self.record.is_service() {
            self.write_service(out)
        } else {
            self.write_content(out)
        }
    }

    fn id(&self) -> i64 {
        self.record.id
    }

    fn timestamp(&self) -> String {
        self.record
            .date
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }

    fn json_toggle(&self) -> String {
        format!(
            r#"<button class="json-toggle" onclick="toggleJson({id})" title="Show raw data">{{ }}</button>"#,
            id = self.id()
        )
    }

    fn raw_json(&self) -> Result<String, RenderError> {
        let json = serde_json::to_string_pretty(self.record).map_err(|source| RenderError::Json {
            message_id: self.id(),
            source,
        })?;
        Ok(format!(
            r#"<pre class="raw-json" id="json-{}" hidden>{}</pre>"#,
            self.id(),
            escape_html(&json)
        ))
    }

    fn write_failed(&self, out: &mut String) -> Result<(), RenderError> {
        let id = self.id();
        let url = escape_html(&self.ctx.chat.message_url(id));
        let error = escape_html(self.record.error.as_deref().unwrap_or_default());
        writeln!(
            out,
            r#"<div class="message failed" id="message-{id}" data-id="{id}">
<div class="message-header"><span class="message-id">#{id}</span><span class="timestamp">Failed to load</span>{toggle}</div>
<div class="error-message">{error}<br><a href="{url}" target="_blank" rel="noopener">Open in Telegram</a></div>
{json}
</div>"#,
            toggle = self.json_toggle(),
            json = self.raw_json()?,
        )?;
        Ok(())
    }

    fn write_service(&self, out: &mut String) -> Result<(), RenderError> {
        let id = self.id();
        let description = self
            .record
            .service
            .as_ref()
            .map(|s| escape_html(&s.description))
            .unwrap_or_default();
        writeln!(
            out,
            r#"<div class="message service" id="message-{id}" data-id="{id}">
<div class="message-header"><span class="message-id">#{id}</span><span class="timestamp">{ts}</span>{toggle}</div>
<div class="service-text">{description}</div>
{json}
</div>"#,
            ts = self.timestamp(),
            toggle = self.json_toggle(),
            json = self.raw_json()?,
        )?;
        Ok(())
    }

    fn write_content(&self, out: &mut String) -> Result<(), RenderError> {
        let id = self.id();
        let record = self.record;

        let sender = match &record.sender {
            Some(sender) => {
                let badge = if sender.is_bot {
                    r#"<span class="bot-badge">bot</span>"#
                } else {
                    ""
                };
                format!(
                    r#"<span class="username">{}</span>{badge}"#,
                    escape_html(&sender.display_name())
                )
            }
            None => r#"<span class="username">Channel</span>"#.to_string(),
        };
        let edited = if record.edit_date.is_some() {
            r#"<span class="edited">edited</span>"#
        } else {
            ""
        };

        write!(
            out,
            r#"<div class="message" id="message-{id}" data-id="{id}">
<div class="message-header"><span class="message-id">#{id}</span>{sender}<span class="timestamp">{ts}</span>{edited}{toggle}</div>
"#,
            ts = self.timestamp(),
            toggle = self.json_toggle(),
        )?;

        if let Some(reply) = &record.reply_to {
            self.write_reply(out, reply)?;
        }

        out.push_str(r#"<div class="message-content">"#);
        if let Some(text) = record.text.as_deref() {
            write_text_block(out, "message-text", text)?;
        }
        out.push_str(&media::media_html(
            record.media.as_ref(),
            self.artifact,
            &self.ctx.base_dir,
        ));
        if let Some(caption) = record.caption.as_deref() {
            write_text_block(out, "caption", caption)?;
        }
        out.push_str("</div>\n");

        if !record.reactions.is_empty() {
            out.push_str(r#"<div class="reactions">"#);
            for reaction in &record.reactions {
                write!(
                    out,
                    r#"<span class="reaction{}">{} {}</span>"#,
                    if reaction.chosen { " chosen" } else { "" },
                    escape_html(&reaction.emoji),
                    reaction.count
                )?;
            }
            out.push_str("</div>\n");
        }

        writeln!(out, "{}\n</div>", self.raw_json()?)?;
        Ok(())
    }

    fn write_reply(&self, out: &mut String, reply: &ReplyReference) -> Result<(), RenderError> {
        let target = reply.message_id;
        let preview = reply.preview.as_ref();
        let who = preview
            .and_then(|p| p.sender_name.as_deref())
            .map(escape_html)
            .unwrap_or_else(|| format!("message #{target}"));
        let text = preview
            .and_then(|p| {
                p.text
                    .clone()
                    .or_else(|| p.media_type.map(|kind| format!("{} {kind}", kind.icon())))
            })
            .map(|t| escape_html(&t))
            .unwrap_or_else(|| "Media message".to_string());

        if self.ids.contains(&target) {
            writeln!(
                out,
                r#"<div class="reply-to clickable" data-reply-to="{target}" onclick="scrollToMessage({target})"><div class="reply-username">↩ Replying to {who}</div><div class="reply-text">{text}</div></div>"#
            )?;
        } else {
            writeln!(
                out,
                r#"<div class="reply-to static" data-reply-to="{target}"><div class="reply-username">↩ Reply to {who} (not in this export)</div><div class="reply-text">{text}</div></div>"#
            )?;
        }
        Ok(())
    }
}

fn write_text_block(out: &mut String, class: &str, text: &str) -> Result<(), RenderError> {
    write!(
        out,
        r#"<div class="{class}" dir="{dir}">{text}</div>"#,
        dir = text_direction(text).as_attr(),
        text = escape_html(text)
    )?;
    Ok(())
}
