//! Text extraction and preview truncation.

use serde_json::Value;

/// Characters kept in reply and pinned-message previews.
pub const PREVIEW_CHARS: usize = 100;

/// Marker appended to a truncated preview.
pub const ELLIPSIS: &str = "...";

/// Flattens a provider text field into a plain string.
///
/// The field can be:
/// - A simple string: `"Hello"`
/// - An entity array with strings and objects: `["See ", {"type": "link", "text": "https://t.me"}]`
///
/// Blank results become `None`.
///
/// ```rust
/// use serde_json::json;
/// use tgexport::normalize::extract_text;
///
/// let rich = json!(["Check this: ", {"type": "link", "text": "https://example.com"}]);
/// assert_eq!(extract_text(&rich).as_deref(), Some("Check this: https://example.com"));
/// assert_eq!(extract_text(&json!("  ")), None);
/// ```
pub fn extract_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| match part {
                Value::String(s) => Some(s.as_str()),
                Value::Object(obj) => obj.get("text").and_then(Value::as_str),
                _ => None,
            })
            .collect::<String>(),
        Value::Object(obj) => obj
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    };

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Cuts `text` to at most `max_chars` characters, appending `...` when cut.
///
/// Counts `char`s, so multi-byte text is never split inside a code point.
///
/// ```rust
/// use tgexport::normalize::truncate_preview;
///
/// assert_eq!(truncate_preview("short", 100), "short");
/// assert_eq!(truncate_preview("привет мир", 6), "привет...");
/// ```
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}
