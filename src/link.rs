//! Message link parsing.
//!
//! Telegram addresses a message with one of two URL shapes:
//!
//! | Shape | Example | Chat |
//! |-------|---------|------|
//! | Internal | `https://t.me/c/1234567890/42` | `-1001234567890` |
//! | Public | `https://t.me/durov/42` | `@durov` |
//!
//! Both may carry a forum-topic segment before the message id
//! (`/c/1234567890/7/42`) and a trailing query string (`?single`).
//!
//! # Example
//!
//! ```rust
//! use tgexport::link::{ChatRef, MessageRange, parse_link};
//!
//! let link = parse_link("https://t.me/c/1234567890/42?single")?;
//! assert_eq!(link.chat, ChatRef::Internal(-1001234567890));
//! assert_eq!(link.message_id, 42);
//!
//! let range = MessageRange::from_links(
//!     &parse_link("https://t.me/durov/50")?,
//!     &parse_link("https://t.me/Durov/45")?,
//! )?;
//! assert_eq!((range.start, range.end), (45, 50));
//! # Ok::<(), tgexport::ExportError>(())
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Prefix that turns the numeric suffix of an internal link into a real chat id.
const INTERNAL_PREFIX: &str = "-100";

/// Largest number of ids a single export may span.
pub const MAX_RANGE_LEN: usize = 100_000;

static INTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?(?:t|telegram)\.me/c/(\d+)/(?:(\d+)/)?(\d+)/?(?:[?#].*)?$",
    )
    .expect("internal link pattern is valid")
});

static PUBLIC_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?(?:t|telegram)\.me/@?([A-Za-z][A-Za-z0-9_]{2,})/(?:(\d+)/)?(\d+)/?(?:[?#].*)?$",
    )
    .expect("public link pattern is valid")
});

/// Identity of a chat as addressed by a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRef {
    /// Internal (private) chat id, already carrying the `-100` prefix.
    Internal(i64),
    /// Public username, normalized to lowercase without `@`.
    Username(String),
}

impl ChatRef {
    /// Builds a username reference, normalizing case and a leading `@`.
    pub fn username(name: &str) -> Self {
        ChatRef::Username(name.trim_start_matches('@').to_lowercase())
    }

    /// Builds an internal reference from the numeric part of a `/c/` link.
    pub fn from_internal_suffix(suffix: &str) -> Option<Self> {
        format!("{INTERNAL_PREFIX}{suffix}")
            .parse::<i64>()
            .ok()
            .map(ChatRef::Internal)
    }

    /// Returns the link kind this chat is addressed with.
    pub fn kind(&self) -> LinkKind {
        match self {
            ChatRef::Internal(_) => LinkKind::Internal,
            ChatRef::Username(_) => LinkKind::Public,
        }
    }

    /// Reconstructs a canonical link to a message in this chat.
    ///
    /// ```rust
    /// use tgexport::link::ChatRef;
    ///
    /// assert_eq!(ChatRef::Internal(-1001234567890).message_url(5), "https://t.me/c/1234567890/5");
    /// assert_eq!(ChatRef::username("Durov").message_url(5), "https://t.me/durov/5");
    /// ```
    pub fn message_url(&self, message_id: i64) -> String {
        match self {
            ChatRef::Internal(id) => {
                let full = id.to_string();
                let suffix = full.strip_prefix(INTERNAL_PREFIX).unwrap_or(&full);
                format!("https://t.me/c/{suffix}/{message_id}")
            }
            ChatRef::Username(name) => format!("https://t.me/{name}/{message_id}"),
        }
    }

    /// Returns `true` if a chat with this `id`/`username` is the one addressed.
    pub fn matches(&self, id: Option<i64>, username: Option<&str>) -> bool {
        match self {
            ChatRef::Internal(want) => id == Some(*want),
            ChatRef::Username(want) => username
                .map(|u| u.trim_start_matches('@').eq_ignore_ascii_case(want))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for ChatRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRef::Internal(id) => write!(f, "{id}"),
            ChatRef::Username(name) => write!(f, "@{name}"),
        }
    }
}

/// Addressing scheme of a message link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// `t.me/c/<id>/<msg>`
    Internal,
    /// `t.me/<username>/<msg>`
    Public,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::Internal => write!(f, "private"),
            LinkKind::Public => write!(f, "public"),
        }
    }
}

/// A parsed message link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLink {
    /// Chat the message lives in
    pub chat: ChatRef,
    /// Message id within the chat
    pub message_id: i64,
    /// Forum topic, if the link carried one
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub topic_id: Option<i64>,
}

impl MessageLink {
    /// Returns the addressing scheme this link used.
    pub fn kind(&self) -> LinkKind {
        self.chat.kind()
    }

    /// Returns `true` if both links point into the same chat.
    pub fn same_chat(&self, other: &MessageLink) -> bool {
        self.chat == other.chat
    }

    /// Reconstructs the canonical URL of this link (without topic or query).
    pub fn to_url(&self) -> String {
        self.chat.message_url(self.message_id)
    }
}

impl std::str::FromStr for MessageLink {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        parse_link(s)
    }
}

/// Parses a Telegram message URL.
///
/// The internal form is tried first, so `t.me/c/...` is never read as a
/// username called `c`.
pub fn parse_link(input: &str) -> Result<MessageLink> {
    let url = input.trim();

    if let Some(caps) = INTERNAL_LINK.captures(url) {
        let chat = ChatRef::from_internal_suffix(&caps[1])
            .ok_or_else(|| ExportError::invalid_link(input, "chat id is out of range"))?;
        return build_link(input, chat, caps.get(2).map(|m| m.as_str()), &caps[3]);
    }

    if let Some(caps) = PUBLIC_LINK.captures(url) {
        let chat = ChatRef::username(&caps[1]);
        return build_link(input, chat, caps.get(2).map(|m| m.as_str()), &caps[3]);
    }

    Err(ExportError::invalid_link(
        input,
        "expected https://t.me/c/<chat>/<message> or https://t.me/<username>/<message>",
    ))
}

fn build_link(input: &str, chat: ChatRef, topic: Option<&str>, message: &str) -> Result<MessageLink> {
    let message_id = message
        .parse::<i64>()
        .map_err(|_| ExportError::invalid_link(input, "message id is out of range"))?;
    if message_id < 1 {
        return Err(ExportError::invalid_link(input, "message id must be positive"));
    }
    let topic_id = topic
        .map(|t| {
            t.parse::<i64>()
                .map_err(|_| ExportError::invalid_link(input, "topic id is out of range"))
        })
        .transpose()?;

    Ok(MessageLink {
        chat,
        message_id,
        topic_id,
    })
}

/// A closed range of message ids in one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRange {
    /// Chat all ids belong to
    pub chat: ChatRef,
    /// Lowest id, inclusive
    pub start: i64,
    /// Highest id, inclusive
    pub end: i64,
}

impl MessageRange {
    /// Creates a range, swapping the bounds if they are given in reverse.
    pub fn new(chat: ChatRef, a: i64, b: i64) -> Self {
        Self {
            chat,
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Builds the range spanned by two links.
    ///
    /// Fails with [`ExportError::ChatMismatch`] when the links point into
    /// different chats, and with [`ExportError::InvalidLink`] when the range
    /// spans more than [`MAX_RANGE_LEN`] ids.
    pub fn from_links(start: &MessageLink, end: &MessageLink) -> Result<Self> {
        if !start.same_chat(end) {
            return Err(ExportError::ChatMismatch {
                start: start.chat.clone(),
                end: end.chat.clone(),
            });
        }
        let range = Self::new(start.chat.clone(), start.message_id, end.message_id);
        range.check_len()?;
        Ok(range)
    }

    /// Fails when the range spans more than [`MAX_RANGE_LEN`] ids.
    pub fn check_len(&self) -> Result<()> {
        if self.len() > MAX_RANGE_LEN {
            return Err(ExportError::invalid_link(
                self.to_string(),
                format!("range spans more than {MAX_RANGE_LEN} messages"),
            ));
        }
        Ok(())
    }

    /// Parses both links and builds the range between them.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::from_links(&parse_link(start)?, &parse_link(end)?)
    }

    /// Iterates the ids of the range in ascending order.
    pub fn ids(&self) -> std::ops::RangeInclusive<i64> {
        self.start..=self.end
    }

    /// Number of ids in the range, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        self.end
            .checked_sub(self.start)
            .and_then(|span| span.checked_add(1))
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX)
    }

    /// Always `false`: a range holds at least one id.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns `true` if `id` lies within the range.
    pub fn contains(&self, id: i64) -> bool {
        (self.start..=self.end).contains(&id)
    }
}

impl fmt::Display for MessageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}..={}]", self.chat, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_internal_link() {
        let link = parse_link("https://t.me/c/1234567890/42").unwrap();
        assert_eq!(link.chat, ChatRef::Internal(-1001234567890));
        assert_eq!(link.message_id, 42);
        assert_eq!(link.kind(), LinkKind::Internal);
        assert!(link.topic_id.is_none());
    }

    #[test]
    fn test_parse_public_link() {
        let link = parse_link("https://t.me/SomeChannel/7").unwrap();
        assert_eq!(link.chat, ChatRef::Username("somechannel".into()));
        assert_eq!(link.message_id, 7);
        assert_eq!(link.kind(), LinkKind::Public);
    }

    #[test]
    fn test_query_string_is_stripped() {
        let link = parse_link("https://t.me/c/1234567890/42?single").unwrap();
        assert_eq!(link.message_id, 42);

        let link = parse_link("https://t.me/durov/99?comment=3").unwrap();
        assert_eq!(link.message_id, 99);
    }

    #[test]
    fn test_topic_segment() {
        let link = parse_link("https://t.me/c/1234567890/15/42").unwrap();
        assert_eq!(link.topic_id, Some(15));
        assert_eq!(link.message_id, 42);

        let link = parse_link("https://t.me/forumchat/3/100").unwrap();
        assert_eq!(link.topic_id, Some(3));
        assert_eq!(link.message_id, 100);
    }

    #[test]
    fn test_telegram_me_host() {
        let link = parse_link("http://telegram.me/durov/1").unwrap();
        assert_eq!(link.chat, ChatRef::username("durov"));
    }

    #[test]
    fn test_invalid_links() {
        for bad in [
            "",
            "not a link",
            "https://example.com/durov/5",
            "https://t.me/durov",
            "https://t.me/durov/abc",
            "https://t.me/durov/s/12",
            "https://t.me/c/abc/5",
        ] {
            let err = parse_link(bad).unwrap_err();
            assert!(err.is_invalid_link(), "expected invalid link for {bad:?}");
        }
    }

    #[test]
    fn test_internal_id_overflow_is_invalid() {
        let err = parse_link("https://t.me/c/99999999999999999999/1").unwrap_err();
        assert!(err.is_invalid_link());
    }

    #[test]
    fn test_username_normalization() {
        let a = parse_link("https://t.me/Durov/1").unwrap();
        let b = parse_link("https://t.me/durov/2").unwrap();
        assert!(a.same_chat(&b));
    }

    #[test]
    fn test_range_swaps_bounds() {
        let range = MessageRange::parse("https://t.me/durov/10", "https://t.me/durov/3").unwrap();
        assert_eq!(range.start, 3);
        assert_eq!(range.end, 10);
        assert_eq!(range.len(), 8);
        assert!(range.contains(3));
        assert!(range.contains(10));
        assert!(!range.contains(11));
        assert_eq!(range.ids().collect::<Vec<_>>(), (3..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_range_rejects_mismatched_chats() {
        let err = MessageRange::parse("https://t.me/durov/1", "https://t.me/c/1234567890/5")
            .unwrap_err();
        assert!(matches!(err, ExportError::ChatMismatch { .. }));
    }

    #[test]
    fn test_zero_message_id_rejected() {
        let err = parse_link("https://t.me/durov/0").unwrap_err();
        assert!(err.is_invalid_link());
    }

    #[test]
    fn test_oversized_range_rejected() {
        let err = MessageRange::parse(
            "https://t.me/testchan/1",
            "https://t.me/testchan/9223372036854775807",
        )
        .unwrap_err();
        assert!(err.is_invalid_link());
        assert!(err.to_string().contains("more than"));

        let last = MAX_RANGE_LEN as i64;
        let range =
            MessageRange::parse("https://t.me/testchan/1", &format!("https://t.me/testchan/{last}"))
                .unwrap();
        assert_eq!(range.len(), MAX_RANGE_LEN);
    }

    #[test]
    fn test_len_saturates_instead_of_overflowing() {
        let range = MessageRange::new(ChatRef::username("testchan"), i64::MIN, i64::MAX);
        assert_eq!(range.len(), usize::MAX);
        assert!(range.check_len().is_err());
    }

    #[test]
    fn test_message_url_roundtrip() {
        let link = parse_link("https://t.me/c/1234567890/42?single").unwrap();
        assert_eq!(link.to_url(), "https://t.me/c/1234567890/42");
        assert_eq!(parse_link(&link.to_url()).unwrap().chat, link.chat);
    }

    #[test]
    fn test_chat_ref_matches() {
        let chat = ChatRef::username("durov");
        assert!(chat.matches(None, Some("Durov")));
        assert!(!chat.matches(Some(1), None));

        let chat = ChatRef::Internal(-1001);
        assert!(chat.matches(Some(-1001), None));
        assert!(!chat.matches(Some(-1002), Some("x")));
    }
}
