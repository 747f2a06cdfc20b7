//! Service event classification.
//!
//! A message is a service event if one of the [`ServiceKind`] slots is
//! present in its payload, or if the payload carries a `service` tag. The
//! slot payload is read to enrich descriptions: joined member names, the
//! pinned message preview, payment amounts.

use serde_json::{Map, Value};

use super::raw::RawUser;
use super::text::{PREVIEW_CHARS, extract_text, truncate_preview};
use crate::message::{MediaKind, ServiceEvent, ServiceKind};

/// Classifies a payload as a service event.
///
/// Slots are checked in [`ServiceKind::ALL`] order. Without a matching slot
/// the `service` tag decides, and an unrecognized tag becomes
/// [`ServiceKind::Unknown`].
pub(crate) fn classify(payload: &Map<String, Value>, tag: Option<&str>) -> Option<ServiceEvent> {
    for kind in ServiceKind::ALL {
        if let Some(value) = payload.get(kind.slot()).filter(|v| is_present(v)) {
            return Some(ServiceEvent {
                kind,
                description: describe(kind, Some(value), payload),
            });
        }
    }

    let tag = tag.map(str::trim).filter(|t| !t.is_empty())?;
    let kind = ServiceKind::from_tag(tag);
    let description = match kind {
        ServiceKind::Unknown => format!("Service message ({tag})"),
        known => describe(known, None, payload),
    };
    Some(ServiceEvent { kind, description })
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Renders the human-readable description of an event.
pub(crate) fn describe(kind: ServiceKind, value: Option<&Value>, payload: &Map<String, Value>) -> String {
    match kind {
        ServiceKind::NewChatMembers => {
            let names = value
                .and_then(Value::as_array)
                .map(|users| users.iter().map(user_name).collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            if names.is_empty() {
                "New members joined the chat".to_string()
            } else {
                format!("{names} joined the chat")
            }
        }
        ServiceKind::LeftChatMember => match value.filter(|v| v.is_object()) {
            Some(user) => format!("{} left the chat", user_name(user)),
            None => "A member left the chat".to_string(),
        },
        ServiceKind::NewChatTitle => match value.and_then(Value::as_str) {
            Some(title) => format!("Chat title changed to \"{title}\""),
            None => "Chat title changed".to_string(),
        },
        ServiceKind::NewChatPhoto => "Chat photo changed".to_string(),
        ServiceKind::DeleteChatPhoto => "Chat photo removed".to_string(),
        ServiceKind::GroupChatCreated => "Group created".to_string(),
        ServiceKind::SupergroupChatCreated => "Supergroup created".to_string(),
        ServiceKind::ChannelChatCreated => "Channel created".to_string(),
        ServiceKind::MigrateToChatId => match value.and_then(Value::as_i64) {
            Some(id) => format!("Group migrated to supergroup {id}"),
            None => "Group migrated to a supergroup".to_string(),
        },
        ServiceKind::MigrateFromChatId => match value.and_then(Value::as_i64) {
            Some(id) => format!("Supergroup migrated from group {id}"),
            None => "Supergroup migrated from a basic group".to_string(),
        },
        ServiceKind::PinnedMessage => describe_pinned(value),
        ServiceKind::SuccessfulPayment => {
            let amount = value.and_then(|v| v.get("total_amount")).and_then(Value::as_i64);
            let currency = value.and_then(|v| v.get("currency")).and_then(Value::as_str);
            match (amount, currency) {
                (Some(amount), Some(currency)) => format!(
                    "Payment of {}.{:02} {currency} completed",
                    amount / 100,
                    (amount % 100).abs()
                ),
                _ => "Payment completed".to_string(),
            }
        }
        ServiceKind::GiftedPremium => {
            match value.and_then(|v| v.get("months")).and_then(Value::as_u64) {
                Some(months) => format!("Gifted Telegram Premium for {months} months"),
                None => "Gifted Telegram Premium".to_string(),
            }
        }
        ServiceKind::ContactRegistered => match payload.get("from_user").or_else(|| payload.get("from")) {
            Some(user) if user.is_object() => format!("{} joined Telegram", user_name(user)),
            _ => "A contact joined Telegram".to_string(),
        },
        ServiceKind::WebAppData => {
            match value.and_then(|v| v.get("button_text")).and_then(Value::as_str) {
                Some(button) => format!("Data sent from web app button \"{button}\""),
                None => "Data sent from a web app".to_string(),
            }
        }
        ServiceKind::Unknown => "Service message".to_string(),
    }
}

fn describe_pinned(value: Option<&Value>) -> String {
    let Some(Value::Object(pinned)) = value else {
        return "Pinned a message".to_string();
    };

    let text = pinned
        .get("text")
        .or_else(|| pinned.get("caption"))
        .and_then(extract_text);
    if let Some(text) = text {
        return format!("Pinned message: \"{}\"", truncate_preview(&text, PREVIEW_CHARS));
    }

    MediaKind::ALL
        .into_iter()
        .find(|kind| pinned.get(kind.slot()).is_some_and(is_present))
        .map(|kind| format!("Pinned a {}", kind.to_string().to_lowercase()))
        .unwrap_or_else(|| "Pinned a message".to_string())
}

fn user_name(value: &Value) -> String {
    serde_json::from_value::<RawUser>(value.clone())
        .map(|user| user.to_sender().display_name())
        .unwrap_or_else(|_| "Unknown".to_string())
}
