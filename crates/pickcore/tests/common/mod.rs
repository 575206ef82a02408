//! Shared fixtures for the command and downloader integration tests.
//!
//! - `RecordingChat`: a `ChatSurface` that records every outbound call
//! - `RangeResponder`: wiremock responder honoring `Range: bytes=a-b`
//! - `Harness`: wiremock server + `CommandDeps` wired to it

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use pickcore::chat::{ChatId, ChatSurface, MessageId, SentMessage, UserId};
use pickcore::commands::{CommandDeps, Incoming};
use pickcore::core::scratch::ScratchDir;
use pickcore::download::HttpRangeFetcher;
use pickcore::providers::{MusicApi, VideoApi};
use pickcore::{AppError, AppResult, SelectionRegistry};
use std::path::Path;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

pub const CHAT: ChatId = ChatId(1001);
pub const REQUESTER: UserId = UserId(42);
pub const STRANGER: UserId = UserId(77);

/// One outbound chat operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Text {
        id: MessageId,
        text: String,
        reply_to: Option<MessageId>,
    },
    Edit {
        id: MessageId,
        text: String,
    },
    Delete {
        id: MessageId,
    },
    React {
        id: MessageId,
        emoji: String,
    },
    Photo {
        id: MessageId,
        caption: String,
        bytes: usize,
    },
    Album {
        urls: Vec<String>,
    },
    Audio {
        id: MessageId,
        bytes: usize,
    },
    Video {
        id: MessageId,
        caption: String,
        bytes: Vec<u8>,
    },
}

/// Records what handlers send instead of talking to a chat service.
pub struct RecordingChat {
    events: Mutex<Vec<ChatEvent>>,
    next_id: AtomicI32,
}

impl Default for RecordingChat {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(500),
        }
    }
}

impl RecordingChat {
    pub fn events(&self) -> Vec<ChatEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ChatEvent::Text { text, .. } | ChatEvent::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ChatEvent) {
        self.events.lock().unwrap().push(event);
    }

    fn sent(&self, chat: ChatId) -> SentMessage {
        SentMessage {
            chat_id: chat,
            message_id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)),
        }
    }

    fn read(path: &Path) -> AppResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| AppError::Chat(format!("attachment unreadable: {}", e)))
    }
}

#[async_trait]
impl ChatSurface for RecordingChat {
    async fn send_text(&self, chat: ChatId, text: &str, reply_to: Option<MessageId>) -> AppResult<SentMessage> {
        let sent = self.sent(chat);
        self.push(ChatEvent::Text {
            id: sent.message_id,
            text: text.to_string(),
            reply_to,
        });
        Ok(sent)
    }

    async fn edit_text(&self, _chat: ChatId, message: MessageId, text: &str) -> AppResult<()> {
        self.push(ChatEvent::Edit {
            id: message,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, _chat: ChatId, message: MessageId) -> AppResult<()> {
        self.push(ChatEvent::Delete { id: message });
        Ok(())
    }

    async fn react(&self, _chat: ChatId, message: MessageId, emoji: &str) -> AppResult<()> {
        self.push(ChatEvent::React {
            id: message,
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn send_photo(&self, chat: ChatId, path: &Path, caption: &str) -> AppResult<SentMessage> {
        let bytes = Self::read(path)?.len();
        let sent = self.sent(chat);
        self.push(ChatEvent::Photo {
            id: sent.message_id,
            caption: caption.to_string(),
            bytes,
        });
        Ok(sent)
    }

    async fn send_photo_album(&self, _chat: ChatId, urls: &[String], _reply_to: Option<MessageId>) -> AppResult<()> {
        self.push(ChatEvent::Album { urls: urls.to_vec() });
        Ok(())
    }

    async fn send_audio(&self, chat: ChatId, path: &Path, _caption: &str) -> AppResult<SentMessage> {
        let bytes = Self::read(path)?.len();
        let sent = self.sent(chat);
        self.push(ChatEvent::Audio {
            id: sent.message_id,
            bytes,
        });
        Ok(sent)
    }

    async fn send_video(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
        _reply_to: Option<MessageId>,
    ) -> AppResult<SentMessage> {
        let bytes = Self::read(path)?;
        let sent = self.sent(chat);
        self.push(ChatEvent::Video {
            id: sent.message_id,
            caption: caption.to_string(),
            bytes,
        });
        Ok(sent)
    }
}

/// Serves `body`, honoring a `Range` header with 206 responses.
///
/// Ranges starting at `fail_at` get a 500.
pub struct RangeResponder {
    pub body: Vec<u8>,
    pub fail_at: Option<usize>,
}

impl RangeResponder {
    pub fn new(body: Vec<u8>) -> Self {
        Self { body, fail_at: None }
    }

    pub fn failing_at(body: Vec<u8>, start: usize) -> Self {
        Self {
            body,
            fail_at: Some(start),
        }
    }
}

pub fn parse_range(value: &str) -> Option<(usize, usize)> {
    let spec = value.strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    Some((start.parse().ok()?, end.parse().ok()?))
}

impl Respond for RangeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let range = request
            .headers
            .get("range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_range);

        match range {
            Some((start, _)) if Some(start) == self.fail_at => ResponseTemplate::new(500),
            Some((start, end)) if start < self.body.len() => {
                let end = end.min(self.body.len() - 1);
                ResponseTemplate::new(206).set_body_bytes(self.body[start..=end].to_vec())
            }
            Some(_) => ResponseTemplate::new(416),
            None => ResponseTemplate::new(200).set_body_bytes(self.body.clone()),
        }
    }
}

/// Deterministic pseudo-media bytes.
pub fn media_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 253) as u8).collect()
}

/// Wiremock server plus handler dependencies pointing at it.
pub struct Harness {
    pub server: MockServer,
    pub chat: Arc<RecordingChat>,
    pub registry: Arc<SelectionRegistry>,
    pub scratch: tempfile::TempDir,
    pub deps: CommandDeps,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let chat = Arc::new(RecordingChat::default());
        let registry = Arc::new(SelectionRegistry::new());
        let scratch = tempfile::tempdir().unwrap();

        let client = reqwest::Client::new();
        let deps = CommandDeps::new(
            chat.clone(),
            registry.clone(),
            Arc::new(MusicApi::new(client.clone(), server.uri())),
            Arc::new(VideoApi::new(
                client.clone(),
                format!("{}/search", server.uri()),
                format!("{}/api.json", server.uri()),
            )),
            Arc::new(HttpRangeFetcher::with_client(client)),
            ScratchDir::new(scratch.path().join("cache")),
        )
        .with_concurrency(4);

        Self {
            server,
            chat,
            registry,
            scratch,
            deps,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Files left behind in the scratch directory.
    pub fn scratch_files(&self) -> usize {
        match std::fs::read_dir(self.scratch.path().join("cache")) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    pub fn command(&self, message_id: i32, text: &str) -> Incoming {
        Incoming {
            chat_id: CHAT,
            message_id: MessageId(message_id),
            sender: REQUESTER,
            text: text.to_string(),
            reply_to: None,
        }
    }

    pub fn reply(&self, message_id: i32, from: UserId, to: MessageId, text: &str) -> Incoming {
        Incoming {
            chat_id: CHAT,
            message_id: MessageId(message_id),
            sender: from,
            text: text.to_string(),
            reply_to: Some(to),
        }
    }
}
