//! Emergency document.
//!
//! Written instead of the regular document when rendering fails. It is a
//! single `format!` over escaped strings, self-contained and without
//! references to the asset files.

use super::escape::escape_html;

/// Builds the fallback document for a failed render.
///
/// ```rust
/// use tgexport::render::emergency_document;
///
/// let html = emergency_document("https://t.me/chan/1", "https://t.me/chan/9", "records out of order");
/// assert!(html.contains("records out of order"));
/// assert!(html.contains("https://t.me/chan/9"));
/// ```
pub fn emergency_document(start_link: &str, end_link: &str, error: &str) -> String {
    let start = escape_html(start_link);
    let end = escape_html(end_link);
    let error = escape_html(error);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Telegram Export - Emergency</title>
<style>
body {{ font-family: Arial, sans-serif; margin: 40px; background: #f5f5f5; color: #222; }}
.box {{ background: #fff; padding: 20px; border-radius: 8px; max-width: 760px; margin: 0 auto; }}
.error {{ background: #fdecea; border-left: 4px solid #d93025; padding: 12px; white-space: pre-wrap; }}
</style>
</head>
<body>
<div class="box">
<h1>Telegram Export (emergency)</h1>
<p>The export document could not be generated. The data dump written next to this file is unaffected.</p>
<h2>Requested range</h2>
<p><strong>Start:</strong> <a href="{start}">{start}</a></p>
<p><strong>End:</strong> <a href="{end}">{end}</a></p>
<h2>Error</h2>
<div class="error">{error}</div>
<h2>Troubleshooting</h2>
<ul>
<li>Check that both links point into the same chat and that the account can read it.</li>
<li>Retry with a smaller range or a smaller batch size.</li>
<li>Open the data dump to inspect the exported messages.</li>
<li>Run again with <code>--verbose</code> and keep the log output.</li>
</ul>
</div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_inputs() {
        let html = emergency_document("<s>", "e\"nd", "<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("e&quot;nd"));
    }

    #[test]
    fn test_self_contained() {
        let html = emergency_document("a", "b", "c");
        assert!(!html.contains("style.css"));
        assert!(!html.contains("script.js"));
    }
}
