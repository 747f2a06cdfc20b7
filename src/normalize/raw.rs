//! Lenient views over raw provider payloads.
//!
//! Every field is optional. A field that is present but has the wrong JSON
//! type fails deserialization, which the normalizer turns into an
//! error-flagged record.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::message::Sender;

/// Top-level fields of a raw message the normalizer reads directly.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawEnvelope {
    pub id: Option<i64>,
    #[serde(default)]
    pub empty: bool,
    pub date: Option<RawTimestamp>,
    pub edit_date: Option<RawTimestamp>,
    pub chat: Option<RawChat>,
    pub from_user: Option<RawUser>,
    /// Older spelling of `from_user`
    pub from: Option<RawUser>,
    pub sender_chat: Option<RawChat>,
    pub text: Option<Value>,
    pub caption: Option<Value>,
    pub reply_to_message_id: Option<i64>,
    pub reply_to: Option<RawReplyHeader>,
    pub reactions: Option<Value>,
    /// Service tag, e.g. `"MessageServiceType.PINNED_MESSAGE"` or `"pinned_message"`.
    pub service: Option<String>,
}

impl RawEnvelope {
    /// Reply target id from either of the two provider spellings.
    pub fn reply_target(&self) -> Option<i64> {
        self.reply_to_message_id
            .or_else(|| self.reply_to.as_ref().and_then(|r| r.reply_to_msg_id))
    }

    /// Author of the message; channel posts fall back to the posting chat.
    pub fn sender(&self) -> Option<Sender> {
        if let Some(user) = self.from_user.as_ref().or(self.from.as_ref()) {
            return Some(user.to_sender());
        }
        self.sender_chat.as_ref().map(|chat| Sender {
            id: chat.id,
            first_name: chat.title.clone(),
            last_name: None,
            username: chat.username.clone(),
            is_bot: false,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct RawChat {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct RawUser {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

impl RawUser {
    pub fn to_sender(&self) -> Sender {
        Sender {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: self.username.clone(),
            is_bot: self.is_bot,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawReplyHeader {
    #[serde(alias = "message_id")]
    pub reply_to_msg_id: Option<i64>,
}

/// One media slot (`photo`, `video`, ...) of a raw message.
#[derive(Debug, Default, Clone, Deserialize)]
pub(crate) struct RawMediaSlot {
    pub file_id: Option<String>,
    pub file_unique_id: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration: Option<u32>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<u64>,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub emoji: Option<String>,
    #[serde(default)]
    pub is_animated: bool,
    #[serde(default)]
    pub is_video: bool,
}

impl RawMediaSlot {
    pub fn handle(&self) -> Option<&str> {
        self.file_id
            .as_deref()
            .or(self.file_unique_id.as_deref())
            .filter(|h| !h.is_empty())
    }
}

/// A timestamp as Unix seconds or as a date string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTimestamp {
    Unix(i64),
    Text(String),
}

impl RawTimestamp {
    /// Converts to UTC. Unparseable values yield `None`.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Unix(secs) => DateTime::from_timestamp(*secs, 0),
            RawTimestamp::Text(s) => parse_timestamp_text(s),
        }
    }
}

/// Parses Unix seconds, RFC 3339, or `YYYY-MM-DD HH:MM:SS` (taken as UTC).
pub(crate) fn parse_timestamp_text(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}
