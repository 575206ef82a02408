//! `ChatSurface` over the Telegram Bot API.

use std::path::Path;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, InputMedia, InputMediaPhoto, Message, ReactionType, ReplyParameters};

use pickcore::{AppResult, ChatSurface, MessageId, SentMessage};

/// Telegram allows 2-10 items in one media group.
const MAX_ALBUM: usize = 10;

/// Sends handler output through a teloxide `Bot`.
#[derive(Clone)]
pub struct TelegramChat {
    bot: Bot,
}

impl TelegramChat {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn tg_chat(chat: pickcore::ChatId) -> teloxide::types::ChatId {
    teloxide::types::ChatId(chat.0)
}

fn tg_message(message: MessageId) -> teloxide::types::MessageId {
    teloxide::types::MessageId(message.0)
}

fn sent(msg: &Message) -> SentMessage {
    SentMessage {
        chat_id: pickcore::ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
    }
}

/// Album items actually sent: at most `MAX_ALBUM`.
fn album_slice(urls: &[String]) -> &[String] {
    &urls[..urls.len().min(MAX_ALBUM)]
}

#[async_trait]
impl ChatSurface for TelegramChat {
    async fn send_text(&self, chat: pickcore::ChatId, text: &str, reply_to: Option<MessageId>) -> AppResult<SentMessage> {
        let mut request = self.bot.send_message(tg_chat(chat), text);
        if let Some(reply_to) = reply_to {
            request = request.reply_parameters(ReplyParameters::new(tg_message(reply_to)));
        }
        let msg = request.await?;
        Ok(sent(&msg))
    }

    async fn edit_text(&self, chat: pickcore::ChatId, message: MessageId, text: &str) -> AppResult<()> {
        self.bot
            .edit_message_text(tg_chat(chat), tg_message(message), text)
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat: pickcore::ChatId, message: MessageId) -> AppResult<()> {
        self.bot.delete_message(tg_chat(chat), tg_message(message)).await?;
        Ok(())
    }

    async fn react(&self, chat: pickcore::ChatId, message: MessageId, emoji: &str) -> AppResult<()> {
        let reaction = vec![ReactionType::Emoji {
            emoji: emoji.to_string(),
        }];
        if let Err(e) = self
            .bot
            .set_message_reaction(tg_chat(chat), tg_message(message))
            .reaction(reaction)
            .await
        {
            // Chats may restrict the allowed reaction set.
            if e.to_string().contains("REACTION_INVALID") {
                log::debug!("Reaction '{}' rejected in chat {}: {}", emoji, chat, e);
                return Ok(());
            }
            return Err(e.into());
        }
        Ok(())
    }

    async fn send_photo(&self, chat: pickcore::ChatId, path: &Path, caption: &str) -> AppResult<SentMessage> {
        let msg = self
            .bot
            .send_photo(tg_chat(chat), InputFile::file(path))
            .caption(caption)
            .await?;
        Ok(sent(&msg))
    }

    async fn send_photo_album(&self, chat: pickcore::ChatId, urls: &[String], reply_to: Option<MessageId>) -> AppResult<()> {
        let urls = album_slice(urls);
        match urls {
            [] => Ok(()),
            [single] => {
                let mut request = self.bot.send_photo(tg_chat(chat), InputFile::url(url::Url::parse(single)?));
                if let Some(reply_to) = reply_to {
                    request = request.reply_parameters(ReplyParameters::new(tg_message(reply_to)));
                }
                request.await?;
                Ok(())
            }
            _ => {
                let media = urls
                    .iter()
                    .map(|u| Ok(InputMedia::Photo(InputMediaPhoto::new(InputFile::url(url::Url::parse(u)?)))))
                    .collect::<AppResult<Vec<_>>>()?;
                let mut request = self.bot.send_media_group(tg_chat(chat), media);
                if let Some(reply_to) = reply_to {
                    request = request.reply_parameters(ReplyParameters::new(tg_message(reply_to)));
                }
                let messages = request.await?;
                log::debug!("Sent {} thumbnails to chat {}", messages.len(), chat);
                Ok(())
            }
        }
    }

    async fn send_audio(&self, chat: pickcore::ChatId, path: &Path, caption: &str) -> AppResult<SentMessage> {
        let mut request = self.bot.send_audio(tg_chat(chat), InputFile::file(path));
        if !caption.is_empty() {
            request = request.caption(caption);
        }
        let msg = request.await?;
        Ok(sent(&msg))
    }

    async fn send_video(
        &self,
        chat: pickcore::ChatId,
        path: &Path,
        caption: &str,
        reply_to: Option<MessageId>,
    ) -> AppResult<SentMessage> {
        let mut request = self
            .bot
            .send_video(tg_chat(chat), InputFile::file(path))
            .caption(caption)
            .supports_streaming(true);
        if let Some(reply_to) = reply_to {
            request = request.reply_parameters(ReplyParameters::new(tg_message(reply_to)));
        }
        let msg = request.await?;
        Ok(sent(&msg))
    }
}
