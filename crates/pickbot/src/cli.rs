use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pickbot")]
#[command(author, version, about = "Telegram bot that searches music and videos and downloads the one you pick", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the bot with long polling
    Run {
        /// Override DOWNLOAD_CONCURRENCY for video downloads
        #[arg(short, long)]
        concurrency: Option<usize>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
