//! Static assets referenced by the HTML document.

use std::io;
use std::path::Path;

pub const STYLESHEET_FILE: &str = "style.css";
pub const SCRIPT_FILE: &str = "script.js";

pub const STYLESHEET: &str = r#"body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background-color: #0f1419;
    color: #ffffff;
    margin: 0;
    padding: 20px;
    line-height: 1.4;
}

a { color: #64b5f6; }

.chat-container {
    max-width: 800px;
    margin: 0 auto;
    background-color: #17212b;
    border-radius: 12px;
    overflow: hidden;
    box-shadow: 0 4px 20px rgba(0, 0, 0, 0.3);
}

.chat-header {
    background: linear-gradient(135deg, #2481cc, #1c5a96);
    padding: 20px;
    text-align: center;
}

.chat-header h1 { margin: 0; font-size: 24px; font-weight: 500; }
.chat-header .info { margin-top: 8px; opacity: 0.9; font-size: 14px; }

.download-info, .stats {
    text-align: center;
    padding: 15px;
    background-color: #1a252f;
    margin: 20px;
    border-radius: 8px;
    font-size: 13px;
    color: #8a8a8a;
}

.stats .stat { display: inline-block; margin: 0 10px; }
.stats .stat strong { color: #ffffff; }

.messages-container { padding: 20px; }

.message {
    margin-bottom: 16px;
    display: flex;
    flex-direction: column;
    transition: background-color 0.6s;
    border-radius: 12px;
}

.message.highlight { background-color: rgba(36, 129, 204, 0.25); }

.message-header {
    display: flex;
    align-items: center;
    margin-bottom: 6px;
    font-size: 13px;
}

.message-id {
    background-color: #2481cc;
    padding: 2px 8px;
    border-radius: 10px;
    font-weight: 500;
    margin-right: 10px;
    font-size: 11px;
}

.username { font-weight: 600; color: #64b5f6; margin-right: 8px; }
.bot-badge { font-size: 10px; background: #3a4a5c; border-radius: 4px; padding: 1px 4px; margin-right: 8px; }
.timestamp { color: #8a8a8a; font-size: 12px; }
.edited { color: #8a8a8a; font-size: 11px; font-style: italic; margin-left: 6px; }

.json-toggle {
    margin-left: auto;
    background: none;
    border: 1px solid #3a4a5c;
    color: #8a8a8a;
    border-radius: 6px;
    font-size: 11px;
    cursor: pointer;
}

.message-content {
    background-color: #232e3c;
    padding: 12px 16px;
    border-radius: 12px;
    border-left: 3px solid #2481cc;
}

.message-text { margin: 0; white-space: pre-wrap; word-wrap: break-word; }
.message-text[dir="rtl"], .caption[dir="rtl"] { text-align: right; }

.media-container { margin-top: 10px; border-radius: 8px; overflow: hidden; }
.media-item { display: block; max-width: 100%; border-radius: 8px; }
.sticker { display: block; max-width: 180px; }

.media-placeholder {
    background-color: #1a252f;
    padding: 20px;
    text-align: center;
    border-radius: 8px;
    border: 2px dashed #3a4a5c;
    color: #8a8a8a;
}

.voice-message {
    background-color: #1a252f;
    padding: 12px;
    border-radius: 20px;
    display: flex;
    align-items: center;
    gap: 10px;
}

.voice-icon, .file-icon {
    width: 28px;
    height: 28px;
    background-color: #2481cc;
    border-radius: 50%;
    display: flex;
    align-items: center;
    justify-content: center;
    font-size: 13px;
}

.file-attachment {
    background-color: #1a252f;
    padding: 12px;
    border-radius: 8px;
    border: 1px solid #3a4a5c;
    display: flex;
    align-items: center;
    gap: 12px;
}

.file-info { flex: 1; }
.file-name { font-weight: 500; margin-bottom: 2px; }
.file-size { font-size: 12px; color: #8a8a8a; }

.reply-to {
    background-color: #1a252f;
    border-left: 3px solid #64b5f6;
    padding: 8px 12px;
    margin-bottom: 8px;
    border-radius: 6px;
    font-size: 13px;
}

.reply-to.clickable { cursor: pointer; }
.reply-to.clickable:hover { background-color: #22303d; }
.reply-to.static { border-left-color: #3a4a5c; opacity: 0.8; }
.reply-username { color: #64b5f6; font-weight: 600; margin-bottom: 2px; }
.reply-text { color: #b0b0b0; font-style: italic; }

.caption { margin-top: 8px; font-style: italic; color: #e0e0e0; white-space: pre-wrap; }

.reactions { margin-top: 6px; display: flex; flex-wrap: wrap; gap: 6px; }
.reaction { background-color: #1a252f; border-radius: 12px; padding: 2px 8px; font-size: 13px; }
.reaction.chosen { border: 1px solid #2481cc; }

.message.service { align-items: center; }
.service-text {
    background-color: #1a252f;
    color: #b0b0b0;
    border-radius: 14px;
    padding: 6px 14px;
    font-size: 13px;
}

.error-message {
    background-color: #4a1a1a;
    border-left: 3px solid #ff6b6b;
    padding: 12px;
    border-radius: 8px;
    color: #ffb3b3;
}

.error-message a { color: #ffb3b3; }

.raw-json {
    background-color: #0f1419;
    color: #a5d6a7;
    font-size: 12px;
    padding: 10px;
    border-radius: 8px;
    overflow-x: auto;
    margin-top: 6px;
}
"#;

pub const SCRIPT: &str = r#"function toggleJson(id) {
    var block = document.getElementById('json-' + id);
    if (block) {
        block.hidden = !block.hidden;
    }
}

function scrollToMessage(id) {
    var target = document.getElementById('message-' + id);
    if (!target) {
        return;
    }
    target.scrollIntoView({ behavior: 'smooth', block: 'center' });
    target.classList.add('highlight');
    setTimeout(function () {
        target.classList.remove('highlight');
    }, 1500);
}
"#;

/// Writes `style.css` and `script.js` into `dir`.
pub async fn write_assets(dir: &Path) -> io::Result<()> {
    tokio::fs::write(dir.join(STYLESHEET_FILE), STYLESHEET).await?;
    tokio::fs::write(dir.join(SCRIPT_FILE), SCRIPT).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_defines_handlers() {
        assert!(SCRIPT.contains("function toggleJson(id)"));
        assert!(SCRIPT.contains("function scrollToMessage(id)"));
    }

    #[tokio::test]
    async fn test_write_assets() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path()).await.unwrap();
        let css = std::fs::read_to_string(dir.path().join(STYLESHEET_FILE)).unwrap();
        assert!(css.contains(".reply-to.clickable"));
        assert!(dir.path().join(SCRIPT_FILE).exists());
    }
}
