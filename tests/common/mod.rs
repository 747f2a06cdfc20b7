//! Shared fixtures for integration tests.
//!
//! [`MockSource`] is a scripted [`MessageSource`]: every id gets a
//! [`Behavior`], optionally a delay, and media downloads can be made to fail.
//! It also counts calls and the peak number of concurrent fetches.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use tgexport::error::SourceError;
use tgexport::link::ChatRef;
use tgexport::message::MediaDescriptor;
use tgexport::source::{MessageSource, RawMessage, media_file_name};

pub const CHAT: &str = "testchan";

pub fn link(id: i64) -> String {
    format!("https://t.me/{CHAT}/{id}")
}

pub fn chat() -> ChatRef {
    ChatRef::username(CHAT)
}

/// What the source does when asked for an id.
#[derive(Debug, Clone)]
pub enum Behavior {
    Message(Value),
    Missing,
    Fail(String),
    /// Flood wait on the first call, then behave like the inner behavior
    FloodWaitOnce(u64, Box<Behavior>),
    /// Flood wait on every call
    FloodWait(u64),
}

#[derive(Default)]
pub struct MockSource {
    behaviors: HashMap<i64, Behavior>,
    delays: HashMap<i64, Duration>,
    failing_media: HashSet<i64>,
    calls: Mutex<HashMap<i64, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source answering every id in `ids` with a plain text message.
    pub fn with_texts(ids: impl IntoIterator<Item = i64>) -> Self {
        ids.into_iter()
            .fold(Self::new(), |source, id| source.message(id, text_message(id, &format!("message {id}"))))
    }

    pub fn message(mut self, id: i64, payload: Value) -> Self {
        self.behaviors.insert(id, Behavior::Message(payload));
        self
    }

    pub fn behavior(mut self, id: i64, behavior: Behavior) -> Self {
        self.behaviors.insert(id, behavior);
        self
    }

    pub fn failing(self, id: i64, reason: &str) -> Self {
        self.behavior(id, Behavior::Fail(reason.to_string()))
    }

    pub fn delay(mut self, id: i64, delay: Duration) -> Self {
        self.delays.insert(id, delay);
        self
    }

    pub fn failing_media(mut self, id: i64) -> Self {
        self.failing_media.insert(id);
        self
    }

    pub fn calls(&self, id: i64) -> usize {
        self.calls.lock().unwrap().get(&id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, id: i64, call: usize) -> Result<Option<RawMessage>, SourceError> {
        let behavior = self.behaviors.get(&id).cloned().unwrap_or(Behavior::Missing);
        resolve(behavior, call)
    }
}

fn resolve(behavior: Behavior, call: usize) -> Result<Option<RawMessage>, SourceError> {
    match behavior {
        Behavior::Message(payload) => Ok(Some(payload)),
        Behavior::Missing => Ok(None),
        Behavior::Fail(reason) => Err(SourceError::Unavailable(reason)),
        Behavior::FloodWait(seconds) => Err(SourceError::FloodWait { seconds }),
        Behavior::FloodWaitOnce(seconds, _) if call == 1 => Err(SourceError::FloodWait { seconds }),
        Behavior::FloodWaitOnce(_, then) => resolve(*then, call),
    }
}

#[async_trait]
impl MessageSource for MockSource {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn get_message(
        &self,
        _chat: &ChatRef,
        message_id: i64,
    ) -> Result<Option<RawMessage>, SourceError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(message_id).or_insert(0);
            *count += 1;
            *count
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&message_id) {
            tokio::time::sleep(*delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.respond(message_id, call)
    }

    async fn download_media(
        &self,
        _chat: &ChatRef,
        message_id: i64,
        media: &MediaDescriptor,
        dest_dir: &Path,
    ) -> Result<PathBuf, SourceError> {
        if self.failing_media.contains(&message_id) {
            return Err(SourceError::unavailable("media server unreachable"));
        }
        tokio::fs::create_dir_all(dest_dir).await?;
        let path = dest_dir.join(media_file_name(message_id, media));
        tokio::fs::write(&path, format!("blob of {}", media.handle().as_str())).await?;
        Ok(path)
    }
}

pub fn text_message(id: i64, text: &str) -> Value {
    json!({
        "id": id,
        "date": 1705314600 + id * 60,
        "chat": {"id": -1001234567890i64, "title": "Test Channel", "username": CHAT},
        "from_user": {"id": 100 + id, "first_name": "User", "last_name": id.to_string()},
        "text": text
    })
}

pub fn reply_message(id: i64, text: &str, reply_to: i64) -> Value {
    let mut message = text_message(id, text);
    message["reply_to_message_id"] = json!(reply_to);
    message
}

pub fn photo_message(id: i64, text: &str) -> Value {
    let mut message = text_message(id, text);
    message["photo"] = json!([
        {"file_id": format!("small{id}"), "width": 90, "height": 90, "file_size": 512},
        {"file_id": format!("photo{id}"), "width": 1280, "height": 720, "file_size": 2048}
    ]);
    message
}
