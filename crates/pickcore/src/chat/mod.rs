//! Chat-surface abstraction.
//!
//! Command handlers never talk to Telegram directly; they drive a
//! `ChatSurface`. The bot binary implements it over the Bot API and the tests
//! implement it with a recorder.

use crate::core::error::AppResult;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// Chat (conversation) identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

/// Message identifier, unique within a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub i32);

/// Sender identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub u64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a message the bot has posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Outbound operations the command handlers need.
#[async_trait]
pub trait ChatSurface: Send + Sync {
    /// Sends a text message, optionally as a reply.
    async fn send_text(&self, chat: ChatId, text: &str, reply_to: Option<MessageId>) -> AppResult<SentMessage>;

    /// Replaces the text of a message the bot posted.
    async fn edit_text(&self, chat: ChatId, message: MessageId, text: &str) -> AppResult<()>;

    /// Deletes (unsends) a message.
    async fn delete_message(&self, chat: ChatId, message: MessageId) -> AppResult<()>;

    /// Sets an emoji reaction on a message.
    async fn react(&self, chat: ChatId, message: MessageId, emoji: &str) -> AppResult<()>;

    /// Sends a local image with a caption.
    async fn send_photo(&self, chat: ChatId, path: &Path, caption: &str) -> AppResult<SentMessage>;

    /// Sends remote images (thumbnails) as one album.
    async fn send_photo_album(&self, chat: ChatId, urls: &[String], reply_to: Option<MessageId>) -> AppResult<()>;

    /// Sends a local audio file.
    async fn send_audio(&self, chat: ChatId, path: &Path, caption: &str) -> AppResult<SentMessage>;

    /// Sends a local video file.
    async fn send_video(
        &self,
        chat: ChatId,
        path: &Path,
        caption: &str,
        reply_to: Option<MessageId>,
    ) -> AppResult<SentMessage>;
}
