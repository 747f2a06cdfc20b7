//! CSV dump writer.

use std::fs::File;
use std::io;
use std::path::Path;

use super::ExportDump;
use crate::error::Result;
use crate::message::{MessageRecord, Reaction};

/// Column names, in order.
pub const CSV_HEADER: [&str; 14] = [
    "id",
    "date",
    "edit_date",
    "chat_id",
    "sender",
    "sender_username",
    "text",
    "caption",
    "media_type",
    "media_file_name",
    "reply_to",
    "reactions",
    "service",
    "error",
];

/// Writes the dump as a table with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - One row per record, columns as in [`CSV_HEADER`]
/// - Dates in RFC 3339, reactions as `👍×3 🔥×1`
/// - The export info is not part of the table
pub fn write_csv(dump: &ExportDump, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(file);

    writer.write_record(CSV_HEADER)?;
    for record in &dump.messages {
        writer.write_record(build_row(record))?;
    }

    writer.flush()?;
    Ok(())
}

/// Converts the dump to a CSV string.
pub fn to_csv(dump: &ExportDump) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for record in &dump.messages {
        writer.write_record(build_row(record))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

fn build_row(record: &MessageRecord) -> Vec<String> {
    let sender = record.sender.as_ref();
    vec![
        record.id.to_string(),
        record.date.map(|d| d.to_rfc3339()).unwrap_or_default(),
        record.edit_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
        record.chat_id.map(|id| id.to_string()).unwrap_or_default(),
        sender.map(|s| s.display_name()).unwrap_or_default(),
        sender.and_then(|s| s.username.clone()).unwrap_or_default(),
        record.text.clone().unwrap_or_default(),
        record.caption.clone().unwrap_or_default(),
        record
            .media
            .as_ref()
            .map(|m| m.kind().slot().to_string())
            .unwrap_or_default(),
        record
            .media
            .as_ref()
            .and_then(|m| m.file_name())
            .unwrap_or_default()
            .to_string(),
        record
            .reply_to
            .as_ref()
            .map(|r| r.message_id.to_string())
            .unwrap_or_default(),
        format_reactions(&record.reactions),
        record
            .service
            .as_ref()
            .map(|s| s.description.clone())
            .unwrap_or_default(),
        record.error.clone().unwrap_or_default(),
    ]
}

fn format_reactions(reactions: &[Reaction]) -> String {
    reactions
        .iter()
        .map(|r| format!("{}×{}", r.emoji, r.count))
        .collect::<Vec<_>>()
        .join(" ")
}
