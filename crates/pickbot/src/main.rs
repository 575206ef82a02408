use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::task::JoinHandle;
use tokio::time::interval;

use pickbot::cli::{Cli, Commands};
use pickbot::telegram::{create_bot, schema, setup_bot_commands, TelegramChat};
use pickcore::core::{config, init_logger, ScratchDir};
use pickcore::download::HttpRangeFetcher;
use pickcore::providers::{MusicApi, VideoApi};
use pickcore::{CommandDeps, SelectionRegistry};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, bot creation, HTTP clients).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Run { concurrency }) => run_bot(concurrency).await,
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot(None).await
        }
    }
}

async fn run_bot(concurrency: Option<usize>) -> Result<()> {
    log::info!("Starting pickbot...");
    let bot = create_bot()?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let registry = Arc::new(SelectionRegistry::new());
    let scratch = ScratchDir::from_config();
    scratch.ensure().await?;
    log::info!("Scratch directory: {}", scratch.root().display());

    let mut deps = CommandDeps::new(
        Arc::new(TelegramChat::new(bot.clone())),
        Arc::clone(&registry),
        Arc::new(MusicApi::from_config()?),
        Arc::new(VideoApi::from_config()?),
        Arc::new(HttpRangeFetcher::new()?),
        scratch,
    );
    if let Some(n) = concurrency {
        deps = deps.with_concurrency(n);
    }
    log::info!("Video downloads use {} concurrent range requests", deps.concurrency);

    let sweeper = spawn_selection_sweeper(registry);

    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    sweeper.abort();
    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Periodically drops selections nobody answered within the TTL.
fn spawn_selection_sweeper(registry: Arc<SelectionRegistry>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let ttl = config::selection::ttl();
        let mut ticker = interval(config::selection::sweep_interval());
        loop {
            ticker.tick().await;
            let removed = registry.sweep_expired(ttl);
            if removed > 0 {
                log::info!("🧹 Expired {} pending selection(s), {} left", removed, registry.len());
            }
        }
    })
}
