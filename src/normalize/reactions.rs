//! Best-effort reaction extraction.
//!
//! Providers report reactions in one of two shapes:
//!
//! - `{"reactions": [{"emoji": "👍", "count": 3, "chosen": true}]}`
//! - `{"results": [{"reaction": {"emoticon": "👍"}, "count": 3, "chosen_order": 0}]}`
//!
//! A bare array of entries is accepted as well. Reactions are an optional
//! enrichment, so nothing here can fail a record.

use serde_json::Value;
use tracing::debug;

use crate::message::Reaction;

/// Extracts reactions from a raw `reactions` field.
pub(crate) fn extract_reactions(message_id: i64, value: Option<&Value>) -> Vec<Reaction> {
    let entries = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(entries)) => entries,
        Some(Value::Object(obj)) => {
            match obj
                .get("reactions")
                .or_else(|| obj.get("results"))
                .and_then(Value::as_array)
            {
                Some(entries) => entries,
                None => {
                    debug!(message_id, "unrecognized reaction payload, skipping");
                    return Vec::new();
                }
            }
        }
        Some(_) => {
            debug!(message_id, "reaction payload is not an object, skipping");
            return Vec::new();
        }
    };

    entries.iter().map(|entry| to_reaction(message_id, entry)).collect()
}

fn to_reaction(message_id: i64, entry: &Value) -> Reaction {
    let Value::Object(obj) = entry else {
        if let Some(emoji) = entry.as_str() {
            return Reaction {
                emoji: emoji.to_string(),
                count: 1,
                chosen: false,
            };
        }
        debug!(message_id, "unresolvable reaction entry");
        return unknown(0, false);
    };

    let count = obj
        .get("count")
        .and_then(Value::as_u64)
        .map(|c| u32::try_from(c).unwrap_or(u32::MAX))
        .unwrap_or(0);
    let chosen = obj.get("chosen").and_then(Value::as_bool).unwrap_or(false)
        || obj.get("chosen_order").is_some_and(|v| !v.is_null());

    match emoji_of(obj.get("emoji").or_else(|| obj.get("reaction"))) {
        Some(emoji) => Reaction {
            emoji,
            count,
            chosen,
        },
        None => {
            debug!(message_id, "reaction without a resolvable emoji");
            unknown(count, chosen)
        }
    }
}

fn emoji_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(obj) => obj
            .get("emoticon")
            .or_else(|| obj.get("emoji"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string),
        _ => None,
    }
}

fn unknown(count: u32, chosen: bool) -> Reaction {
    Reaction {
        emoji: Reaction::UNKNOWN.to_string(),
        count,
        chosen,
    }
}
