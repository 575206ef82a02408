//! pickbot - Telegram front end for the pickcore download commands

pub mod cli;
pub mod telegram;
