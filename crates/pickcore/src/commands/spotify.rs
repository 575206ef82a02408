//! `spotify <song name>`: search tracks, pick one by replying with its number,
//! receive the cover and the audio file.

use super::{log_failure, notify, parse_choice, unsend, CommandDeps, Incoming};
use crate::chat::SentMessage;
use crate::core::error::AppResult;
use crate::download::parallel::download_to_file;
use crate::providers::TrackCandidate;
use crate::selection::{Candidates, CommandTag, SelectionEntry, SelectionKey};

pub const USAGE: &str = "⚠️ Usage: spotify <song name>";
pub const SEARCHING: &str = "🔎 Searching Spotify...";
pub const NO_RESULTS: &str = "❌ No results found.";
pub const SEARCH_FAILED: &str = "❌ Error while searching.";
pub const RESOLVE_FAILED: &str = "❌ Failed to download song.";
pub const DOWNLOAD_FAILED: &str = "❌ Error while downloading song.";

/// Numbered result list posted for selection.
pub fn format_results(tracks: &[TrackCandidate]) -> String {
    let mut msg = String::from("🎧 Spotify Results:\n\n");
    for (i, track) in tracks.iter().enumerate() {
        msg.push_str(&format!(
            "{}. {}\n👤 {}\n⏱ {}\n\n",
            i + 1,
            track.title,
            track.artist,
            track.duration
        ));
    }
    msg.push_str(&format!("👉 Reply with number (1–{})", tracks.len()));
    msg
}

pub fn invalid_choice_message(len: usize) -> String {
    format!("❌ Invalid choice. Reply with number 1–{}.", len)
}

/// Handles `spotify <query>`.
pub async fn on_start(deps: &CommandDeps, incoming: &Incoming, args: &str) {
    let chat_id = incoming.chat_id;
    let query = args.trim();
    if query.is_empty() {
        notify(deps, chat_id, USAGE, Some(incoming.message_id)).await;
        return;
    }

    let status = match deps.chat.send_text(chat_id, SEARCHING, None).await {
        Ok(status) => status,
        Err(e) => {
            log_failure(CommandTag::Spotify, chat_id, "search status", &e);
            return;
        }
    };

    if let Err(e) = search_and_post(deps, incoming, query, status).await {
        log_failure(CommandTag::Spotify, chat_id, "search", &e);
        if let Err(e) = deps.chat.edit_text(chat_id, status.message_id, SEARCH_FAILED).await {
            log::warn!("Failed to report search error in chat {}: {}", chat_id, e);
        }
    }
}

async fn search_and_post(deps: &CommandDeps, incoming: &Incoming, query: &str, status: SentMessage) -> AppResult<()> {
    let tracks = deps.music.search(query).await?;
    if tracks.is_empty() {
        deps.chat.edit_text(status.chat_id, status.message_id, NO_RESULTS).await?;
        return Ok(());
    }

    deps.chat
        .edit_text(status.chat_id, status.message_id, &format_results(&tracks))
        .await?;
    deps.registry.register(
        SelectionKey::new(status.chat_id, status.message_id),
        SelectionEntry::tracks(incoming.sender, tracks),
    );
    Ok(())
}

/// Handles a reply to a posted track list.
///
/// Replies from anyone but the requester are ignored. An invalid number keeps
/// the list open; a valid one consumes it.
pub async fn on_reply(deps: &CommandDeps, incoming: &Incoming, key: SelectionKey, entry: SelectionEntry) {
    let Candidates::Tracks(tracks) = &entry.candidates else {
        return;
    };
    if incoming.sender != entry.requester {
        log::debug!("Ignoring spotify reply from non-requester in chat {}", incoming.chat_id);
        return;
    }

    let index = match parse_choice(&incoming.text, tracks.len()) {
        Ok(index) => index,
        Err(e) => {
            log::info!("[spotify] {} in chat {}", e, incoming.chat_id);
            notify(
                deps,
                incoming.chat_id,
                &invalid_choice_message(tracks.len()),
                Some(incoming.message_id),
            )
            .await;
            return;
        }
    };
    let Some(track) = tracks.get(index) else {
        return;
    };
    if deps.registry.take(&key).is_none() {
        log::debug!("Selection on message {} already resolved", key.message_id);
        return;
    }

    unsend(deps, key.chat_id, key.message_id).await;

    if let Err(e) = download_and_send(deps, incoming, track).await {
        log_failure(CommandTag::Spotify, incoming.chat_id, "download", &e);
        notify(deps, incoming.chat_id, DOWNLOAD_FAILED, Some(incoming.message_id)).await;
    }
}

async fn download_and_send(deps: &CommandDeps, incoming: &Incoming, track: &TrackCandidate) -> AppResult<()> {
    let chat_id = incoming.chat_id;
    let status = deps
        .chat
        .send_text(
            chat_id,
            &format!("⏳ Downloading:\n🎵 {}\n👤 {}", track.title, track.artist),
            None,
        )
        .await?;

    let Some(resolved) = deps.music.resolve(&track.spotify_url).await? else {
        log::warn!("[spotify] no download URL for {}", track.spotify_url);
        deps.chat.edit_text(chat_id, status.message_id, RESOLVE_FAILED).await?;
        return Ok(());
    };

    deps.scratch.ensure().await?;

    let audio = deps.scratch.file("spotify_audio", "mp3");
    let size = download_to_file(deps.fetcher.as_ref(), &resolved.download_url, audio.path()).await?;
    log::info!(
        "✅ Track downloaded: {} ({:.2} MB)",
        resolved.name,
        size as f64 / (1024.0 * 1024.0)
    );

    let cover = match &resolved.image {
        Some(image) => {
            let cover = deps.scratch.file("spotify_cover", "jpg");
            download_to_file(deps.fetcher.as_ref(), image, cover.path()).await?;
            Some(cover)
        }
        None => None,
    };

    let caption = format!("🎵 {}\n👤 {}\n⏱ {}", resolved.name, resolved.artists, resolved.duration);
    match &cover {
        Some(cover) => deps.chat.send_photo(chat_id, cover.path(), &caption).await?,
        None => deps.chat.send_text(chat_id, &caption, None).await?,
    };
    deps.chat.send_audio(chat_id, audio.path(), "").await?;

    unsend(deps, chat_id, status.message_id).await;
    Ok(())
}
