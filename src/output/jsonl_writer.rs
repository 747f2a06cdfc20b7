//! JSON Lines dump writer.
//!
//! The first line wraps the export info, every following line is one
//! record. Line-oriented tools can skip the header with `tail -n +2`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use super::{ExportDump, ExportInfo};
use crate::error::Result;

#[derive(Serialize)]
struct InfoLine<'a> {
    export_info: &'a ExportInfo,
}

/// Writes the dump in JSONL format.
///
/// # Format
/// ```text
/// {"export_info":{"exported_at":"...","total_messages":2,...}}
/// {"id":1,"text":"Hello","reactions":[]}
/// {"id":2,"reactions":[],"error":"..."}
/// ```
pub fn write_jsonl(dump: &ExportDump, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, &InfoLine { export_info: &dump.export_info })?;
    writeln!(writer)?;
    for record in &dump.messages {
        serde_json::to_writer(&mut writer, record)?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Converts the dump to a JSONL string.
pub fn to_jsonl(dump: &ExportDump) -> Result<String> {
    let mut output = serde_json::to_string(&InfoLine { export_info: &dump.export_info })?;
    output.push('\n');
    for record in &dump.messages {
        output.push_str(&serde_json::to_string(record)?);
        output.push('\n');
    }
    Ok(output)
}
