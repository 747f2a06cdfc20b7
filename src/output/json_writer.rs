//! JSON dump writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::ExportDump;
use crate::error::Result;

/// Writes the dump as a single JSON document.
///
/// # Format
/// ```json
/// {
///   "export_info": {"exported_at": "...", "total_messages": 2, "generator": "tgexport 0.3.0", ...},
///   "messages": [
///     {"id": 1, "date": "2024-01-15T10:30:00Z", "text": "Hello", "reactions": []},
///     {"id": 2, "reactions": [], "error": "Message 2 not found or inaccessible"}
///   ]
/// }
/// ```
pub fn write_json(dump: &ExportDump, output_path: &Path, pretty: bool) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, dump)?;
    } else {
        serde_json::to_writer(&mut writer, dump)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Converts the dump to a JSON string.
pub fn to_json(dump: &ExportDump, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(dump)?
    } else {
        serde_json::to_string(dump)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageRecord;
    use crate::output::ExportInfo;
    use crate::render::ExportSummary;
    use tempfile::NamedTempFile;

    fn sample() -> ExportDump {
        let mut record = MessageRecord::new(1);
        record.text = Some("Hello".into());
        let records = vec![record, MessageRecord::failed(2, "gone")];
        let info = ExportInfo::new("s", "e", ExportSummary::from_records(&records, &[]));
        ExportDump::new(info, &records)
    }

    #[test]
    fn test_to_json_shape() {
        let json = to_json(&sample(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["export_info"]["total_messages"], 2);
        assert_eq!(value["messages"][0]["text"], "Hello");
        assert_eq!(value["messages"][1]["error"], "gone");
    }

    #[test]
    fn test_write_json_round_trip() {
        let dump = sample();
        let temp = NamedTempFile::new().unwrap();
        write_json(&dump, temp.path(), true).unwrap();

        let content = std::fs::read_to_string(temp.path()).unwrap();
        assert!(content.contains("\n  \"export_info\""));
        assert_eq!(ExportDump::from_json(&content).unwrap(), dump);
    }
}
