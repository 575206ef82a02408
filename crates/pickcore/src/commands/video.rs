//! `video <search term or URL>`: search videos (or take a direct URL) and
//! download the pick with parallel range requests.

use super::{log_failure, notify, parse_choice, unsend, CommandDeps, Incoming};
use crate::core::error::AppResult;
use crate::download::parallel::{download_parallel, DownloadTarget};
use crate::providers::{non_empty, VideoCandidate};
use crate::selection::{Candidates, CommandTag, SelectionEntry, SelectionKey};
use std::sync::Arc;

pub const USAGE: &str = "❌ Please use the format '/video <search term or URL>'.";
pub const SEARCH_FAILED: &str = "❌ Failed to search YouTube.";
pub const INVALID_CHOICE: &str = "❌ Please enter a valid number.";
pub const NO_API: &str = "❌ Could not fetch API URL. Try again later.";
pub const NO_FILE: &str = "❌ Could not retrieve a video file. Please try again with a different URL.";
pub const DOWNLOAD_FAILED: &str = "❌ Failed to download.";

pub fn no_results_message(input: &str) -> String {
    format!("⭕ No results found for: {}", input)
}

/// Numbered result list posted for selection.
pub fn format_results(videos: &[VideoCandidate]) -> String {
    let mut msg = String::new();
    for (i, video) in videos.iter().enumerate() {
        msg.push_str(&format!(
            "{}. {}\nDuration: {}\nChannel: {}\n\n",
            i + 1,
            video.title,
            video.timestamp,
            video.channel
        ));
    }
    msg.push_str("Reply with a number to select.");
    msg
}

pub fn success_caption(title: &str, channel: &str) -> String {
    format!("📥 Video download successful:\n• Title: {}\n• Channel: {}", title, channel)
}

/// Handles `video <input>`. Input starting with `http` skips the search.
pub async fn on_start(deps: &CommandDeps, incoming: &Incoming, args: &str) {
    let input = args.trim();
    if input.is_empty() {
        notify(deps, incoming.chat_id, USAGE, Some(incoming.message_id)).await;
        return;
    }

    if input.starts_with("http") {
        download_direct(deps, incoming, input, None, None).await;
        return;
    }

    if let Err(e) = search_and_post(deps, incoming, input).await {
        log_failure(CommandTag::Video, incoming.chat_id, "search", &e);
        notify(deps, incoming.chat_id, SEARCH_FAILED, Some(incoming.message_id)).await;
    }
}

async fn search_and_post(deps: &CommandDeps, incoming: &Incoming, input: &str) -> AppResult<()> {
    let chat_id = incoming.chat_id;
    let videos = deps.videos.search(input).await?;
    if videos.is_empty() {
        deps.chat
            .send_text(chat_id, &no_results_message(input), Some(incoming.message_id))
            .await?;
        return Ok(());
    }

    let thumbnails: Vec<String> = videos.iter().filter_map(|v| v.thumbnail.clone()).collect();
    if !thumbnails.is_empty() {
        if let Err(e) = deps
            .chat
            .send_photo_album(chat_id, &thumbnails, Some(incoming.message_id))
            .await
        {
            log::warn!("Failed to send thumbnails to chat {}: {}", chat_id, e);
        }
    }

    let list = deps
        .chat
        .send_text(chat_id, &format_results(&videos), Some(incoming.message_id))
        .await?;
    deps.registry.register(
        SelectionKey::new(list.chat_id, list.message_id),
        SelectionEntry::videos(incoming.sender, videos),
    );
    Ok(())
}

/// Handles a reply to a posted video list.
///
/// The first reply from the requester consumes the list whether or not the
/// number is valid; there is no second attempt.
pub async fn on_reply(deps: &CommandDeps, incoming: &Incoming, key: SelectionKey, entry: SelectionEntry) {
    let Candidates::Videos(videos) = &entry.candidates else {
        return;
    };
    if incoming.sender != entry.requester {
        log::debug!("Ignoring video reply from non-requester in chat {}", incoming.chat_id);
        return;
    }
    if deps.registry.take(&key).is_none() {
        log::debug!("Selection on message {} already resolved", key.message_id);
        return;
    }

    unsend(deps, key.chat_id, key.message_id).await;
    if let Err(e) = deps.chat.react(incoming.chat_id, incoming.message_id, "⏳").await {
        log::debug!("Failed to set reaction: {}", e);
    }

    let video = match parse_choice(&incoming.text, videos.len()) {
        Ok(index) => videos.get(index),
        Err(e) => {
            log::info!("[video] {} in chat {}", e, incoming.chat_id);
            None
        }
    };
    let Some(video) = video else {
        notify(deps, incoming.chat_id, INVALID_CHOICE, Some(incoming.message_id)).await;
        return;
    };

    download_direct(deps, incoming, &video.url, Some(&video.title), Some(&video.channel)).await;
}

/// Resolves and downloads `video_url`, then sends the file.
///
/// `title` and `channel` come from the search result when there was one;
/// otherwise the resolution API's values are used.
pub async fn download_direct(
    deps: &CommandDeps,
    incoming: &Incoming,
    video_url: &str,
    title: Option<&str>,
    channel: Option<&str>,
) {
    if let Err(e) = try_download_direct(deps, incoming, video_url, title, channel).await {
        log_failure(CommandTag::Video, incoming.chat_id, "download", &e);
        notify(deps, incoming.chat_id, DOWNLOAD_FAILED, Some(incoming.message_id)).await;
    }
}

async fn try_download_direct(
    deps: &CommandDeps,
    incoming: &Incoming,
    video_url: &str,
    title: Option<&str>,
    channel: Option<&str>,
) -> AppResult<()> {
    let chat_id = incoming.chat_id;
    let reply_to = Some(incoming.message_id);

    let base = match deps.videos.api_base().await {
        Ok(base) => base,
        Err(e) => {
            log_failure(CommandTag::Video, chat_id, "api discovery", &e);
            deps.chat.send_text(chat_id, NO_API, reply_to).await?;
            return Ok(());
        }
    };

    let Some(resolved) = deps.videos.resolve(&base, video_url).await? else {
        log::warn!("[video] no download URL for {}", video_url);
        deps.chat.send_text(chat_id, NO_FILE, reply_to).await?;
        return Ok(());
    };

    deps.scratch.ensure().await?;
    let file = deps.scratch.file("ytb_video", "mp4");
    let target = DownloadTarget::probe(deps.fetcher.as_ref(), &resolved.download_url, file.path()).await?;
    download_parallel(Arc::clone(&deps.fetcher), &target, deps.concurrency).await?;

    if let Err(e) = deps.chat.react(chat_id, incoming.message_id, "✅").await {
        log::debug!("Failed to set reaction: {}", e);
    }

    let title = non_empty(title.map(str::to_string))
        .or(resolved.title)
        .unwrap_or_else(|| "Unknown".to_string());
    let channel = non_empty(channel.map(str::to_string))
        .or(resolved.author)
        .unwrap_or_else(|| "Unknown".to_string());
    deps.chat
        .send_video(chat_id, file.path(), &success_caption(&title, &channel), reply_to)
        .await?;
    Ok(())
}
