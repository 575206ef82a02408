//! Telegram transport: bot setup, the `ChatSurface` adapter and the dispatcher schema.

pub mod bot;
pub mod chat;
pub mod schema;

pub use bot::{create_bot, setup_bot_commands, Command};
pub use chat::TelegramChat;
pub use schema::{schema, HandlerError};
