//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;
use teloxide::utils::command::BotCommands;

use pickcore::commands::{handle_reply, spotify, video};
use pickcore::{CommandDeps, Incoming, MessageId, UserId};

use super::bot::Command;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Creates the dispatcher schema: slash commands first, then replies to
/// posted result lists.
pub fn schema(deps: CommandDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_replies = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(reply_handler(deps_replies))
}

/// The user a message came from.
///
/// Messages sent on behalf of a chat (anonymous admins, linked channels)
/// carry a shared placeholder `from`, so they have no requester identity.
pub fn sender_of(msg: &Message) -> Option<UserId> {
    if msg.sender_chat.is_some() {
        return None;
    }
    msg.from.as_ref().map(|u| UserId(u.id.0))
}

/// Strips a teloxide message down to what the command handlers need.
///
/// `None` for non-text messages and messages without a user sender.
pub fn incoming_from(msg: &Message) -> Option<Incoming> {
    let text = msg.text()?;
    let Some(sender) = sender_of(msg) else {
        log::debug!("Ignoring message {} in chat {} without a user sender", msg.id.0, msg.chat.id);
        return None;
    };
    Some(Incoming {
        chat_id: pickcore::ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
        sender,
        text: text.to_string(),
        reply_to: msg.reply_to_message().map(|r| MessageId(r.id.0)),
    })
}

fn command_handler(deps: CommandDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);
                let Some(incoming) = incoming_from(&msg) else {
                    return Ok(());
                };

                match cmd {
                    Command::Start | Command::Help => {
                        bot.send_message(msg.chat.id, Command::descriptions().to_string())
                            .await?;
                    }
                    // Downloads can take minutes; keep the chat's update queue moving.
                    Command::Spotify(query) => {
                        tokio::spawn(async move { spotify::on_start(&deps, &incoming, &query).await });
                    }
                    Command::Video(input) => {
                        tokio::spawn(async move { video::on_start(&deps, &incoming, &input).await });
                    }
                }
                Ok(())
            }
        },
    ))
}

fn reply_handler(deps: CommandDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.reply_to_message().is_some() && msg.text().is_some())
        .endpoint(move |msg: Message| {
            let deps = deps.clone();
            async move {
                if let Some(incoming) = incoming_from(&msg) {
                    tokio::spawn(async move {
                        if !handle_reply(&deps, &incoming).await {
                            log::debug!("Reply {} in chat {} is not a selection", incoming.message_id, incoming.chat_id);
                        }
                    });
                }
                Ok(())
            }
        })
}
