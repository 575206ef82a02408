//! pickcore - search-and-pick download commands for chat bots
//!
//! This library holds everything the bot needs except the Telegram transport:
//! the parallel chunk downloader, the pending-selection registry, provider API
//! clients and the `spotify` / `video` command handlers.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and scratch files
//! - `download`: chunk planning, range fetching and the parallel downloader
//! - `selection`: registry of posted result lists awaiting a numeric reply
//! - `providers`: music and video search / resolution API clients
//! - `chat`: the chat-surface abstraction handlers talk to
//! - `commands`: the `spotify` and `video` command handlers

pub mod chat;
pub mod commands;
pub mod core;
pub mod download;
pub mod providers;
pub mod selection;

// Re-export commonly used types for convenience
pub use crate::core::error::{AppError, AppResult};
pub use chat::{ChatId, ChatSurface, MessageId, SentMessage, UserId};
pub use commands::{CommandDeps, Incoming};
pub use selection::SelectionRegistry;
