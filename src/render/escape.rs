//! Text helpers for the HTML document.

/// Escapes text for use in HTML content and quoted attribute values.
///
/// ```rust
/// use tgexport::render::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
///            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Writing direction of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Value for the HTML `dir` attribute.
    pub fn as_attr(self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

/// Share of right-to-left letters above which a text is right-to-left.
const RTL_THRESHOLD: f64 = 0.4;

/// Returns `true` for characters of the Hebrew, Arabic, Syriac, Thaana,
/// NKo, Samaritan and Mandaic blocks and their presentation forms.
pub fn is_rtl_char(c: char) -> bool {
    matches!(c,
        '\u{0590}'..='\u{08FF}'
        | '\u{FB1D}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFF}'
    )
}

/// Detects the writing direction of `text`.
///
/// A text is right-to-left when its first letter is in a right-to-left
/// block, or when more than 40% of its letters are.
///
/// ```rust
/// use tgexport::render::{TextDirection, text_direction};
///
/// assert_eq!(text_direction("  שלום world"), TextDirection::Rtl);
/// assert_eq!(text_direction("hello مرحبا"), TextDirection::Rtl);
/// assert_eq!(text_direction("hello world مرحبا"), TextDirection::Ltr);
/// assert_eq!(text_direction("12345"), TextDirection::Ltr);
/// ```
pub fn text_direction(text: &str) -> TextDirection {
    let mut letters = 0usize;
    let mut rtl = 0usize;

    for c in text.chars().filter(|c| c.is_alphabetic()) {
        let is_rtl = is_rtl_char(c);
        if letters == 0 && is_rtl {
            return TextDirection::Rtl;
        }
        letters += 1;
        if is_rtl {
            rtl += 1;
        }
    }

    if letters > 0 && rtl as f64 / letters as f64 > RTL_THRESHOLD {
        TextDirection::Rtl
    } else {
        TextDirection::Ltr
    }
}

/// Formats a byte count with binary units, rounded to two decimals.
///
/// ```rust
/// use tgexport::render::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 B");
/// assert_eq!(format_file_size(512), "512.0 B");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = (scaled * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{:.1} {}", rounded, UNITS[unit])
    } else {
        format!("{} {}", rounded, UNITS[unit])
    }
}

/// Formats a duration in seconds as `m:ss`; missing or zero is `Unknown`.
///
/// ```rust
/// use tgexport::render::format_duration;
///
/// assert_eq!(format_duration(Some(75)), "1:15");
/// assert_eq!(format_duration(Some(5)), "0:05");
/// assert_eq!(format_duration(None), "Unknown");
/// ```
pub fn format_duration(seconds: Option<u32>) -> String {
    match seconds {
        Some(secs) if secs > 0 => format!("{}:{:02}", secs / 60, secs % 60),
        _ => "Unknown".to_string(),
    }
}
