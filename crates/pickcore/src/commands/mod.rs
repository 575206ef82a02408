//! `spotify` and `video` command handlers.
//!
//! Each command has two entry points: `on_start` for the command itself and
//! `on_reply` for a reply to a result list it posted. Errors never escape a
//! handler: they are logged with context and turned into one chat message.

pub mod spotify;
pub mod video;

use crate::chat::{ChatId, ChatSurface, MessageId, UserId};
use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::scratch::ScratchDir;
use crate::download::fetch::RangeFetcher;
use crate::providers::{MusicProvider, VideoProvider};
use crate::selection::{CommandTag, SelectionKey, SelectionRegistry};
use std::sync::Arc;

/// An inbound chat message, stripped of transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub sender: UserId,
    pub text: String,
    /// Message this one replies to, if any
    pub reply_to: Option<MessageId>,
}

/// Dependencies shared by every command handler.
#[derive(Clone)]
pub struct CommandDeps {
    pub chat: Arc<dyn ChatSurface>,
    pub registry: Arc<SelectionRegistry>,
    pub music: Arc<dyn MusicProvider>,
    pub videos: Arc<dyn VideoProvider>,
    pub fetcher: Arc<dyn RangeFetcher>,
    pub scratch: ScratchDir,
    /// Concurrent range requests per video download
    pub concurrency: usize,
}

impl CommandDeps {
    pub fn new(
        chat: Arc<dyn ChatSurface>,
        registry: Arc<SelectionRegistry>,
        music: Arc<dyn MusicProvider>,
        videos: Arc<dyn VideoProvider>,
        fetcher: Arc<dyn RangeFetcher>,
        scratch: ScratchDir,
    ) -> Self {
        Self {
            chat,
            registry,
            music,
            videos,
            fetcher,
            scratch,
            concurrency: *config::download::CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Routes a reply to the command that posted the replied-to message.
///
/// Returns `false` when the message is not a reply to a registered result
/// list, so the caller can treat it as ordinary text.
pub async fn handle_reply(deps: &CommandDeps, incoming: &Incoming) -> bool {
    let Some(reply_to) = incoming.reply_to else {
        return false;
    };
    let key = SelectionKey::new(incoming.chat_id, reply_to);
    let Some(entry) = deps.registry.lookup(&key) else {
        return false;
    };

    match entry.tag {
        CommandTag::Spotify => spotify::on_reply(deps, incoming, key, entry).await,
        CommandTag::Video => video::on_reply(deps, incoming, key, entry).await,
    }
    true
}

/// Parses a 1-based choice into a 0-based index into a list of `len` items.
///
/// Only the leading digits count, so "2 please" and "3." are choices 2 and 3.
pub fn parse_choice(text: &str, len: usize) -> AppResult<usize> {
    let trimmed = text.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let choice: usize = unsigned[..end]
        .parse()
        .map_err(|_| AppError::UserInput(format!("'{}' is not a number", text.trim())))?;
    if choice == 0 || choice > len {
        return Err(AppError::UserInput(format!("{} is outside 1–{}", choice, len)));
    }
    Ok(choice - 1)
}

/// Logs a handler failure with its command and chat.
pub(crate) fn log_failure(tag: CommandTag, chat_id: ChatId, stage: &str, err: &AppError) {
    log::error!(
        "[{}] {} failed in chat {} ({}): {}",
        tag.as_str(),
        stage,
        chat_id,
        err.category(),
        err
    );
}

/// Sends a notice, logging instead of failing if the chat rejects it.
pub(crate) async fn notify(deps: &CommandDeps, chat_id: ChatId, text: &str, reply_to: Option<MessageId>) {
    if let Err(e) = deps.chat.send_text(chat_id, text, reply_to).await {
        log::warn!("Failed to send notice to chat {}: {}", chat_id, e);
    }
}

/// Deletes a message, logging instead of failing.
pub(crate) async fn unsend(deps: &CommandDeps, chat_id: ChatId, message_id: MessageId) {
    if let Err(e) = deps.chat.delete_message(chat_id, message_id).await {
        log::warn!("Failed to delete message {} in chat {}: {}", message_id, chat_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice_valid() {
        assert_eq!(parse_choice("1", 5).ok(), Some(0));
        assert_eq!(parse_choice(" 5 ", 5).ok(), Some(4));
    }

    #[test]
    fn test_parse_choice_uses_leading_digits() {
        assert_eq!(parse_choice("2 please", 5).ok(), Some(1));
        assert_eq!(parse_choice("3.", 5).ok(), Some(2));
        assert_eq!(parse_choice("+4", 5).ok(), Some(3));
        assert!(matches!(parse_choice("9 please", 5), Err(AppError::UserInput(_))));
        assert!(matches!(parse_choice("no 2", 5), Err(AppError::UserInput(_))));
    }

    #[test]
    fn test_parse_choice_out_of_range() {
        assert!(matches!(parse_choice("0", 5), Err(AppError::UserInput(_))));
        assert!(matches!(parse_choice("9", 5), Err(AppError::UserInput(_))));
    }

    #[test]
    fn test_parse_choice_not_a_number() {
        assert!(matches!(parse_choice("two", 5), Err(AppError::UserInput(_))));
        assert!(matches!(parse_choice("", 5), Err(AppError::UserInput(_))));
        assert!(matches!(parse_choice("-1", 5), Err(AppError::UserInput(_))));
    }
}
