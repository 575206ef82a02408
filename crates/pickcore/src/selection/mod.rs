//! Pending-selection registry.
//!
//! Maps a posted result list to the state needed to resolve a numeric reply:
//! who asked, what was offered, and which command owns it. The registry is
//! injected into handlers as an `Arc<SelectionRegistry>`; there is no global
//! instance. Concurrent writes follow last-write-wins, `take` is atomic.

use crate::chat::{ChatId, MessageId, UserId};
use crate::providers::{TrackCandidate, VideoCandidate};
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Command that owns a pending selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandTag {
    Spotify,
    Video,
}

impl CommandTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandTag::Spotify => "spotify",
            CommandTag::Video => "video",
        }
    }
}

/// Identifies the result-list message a reply must point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

impl SelectionKey {
    pub fn new(chat_id: ChatId, message_id: MessageId) -> Self {
        Self { chat_id, message_id }
    }
}

/// The ordered list a user picks from.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidates {
    Tracks(Vec<TrackCandidate>),
    Videos(Vec<VideoCandidate>),
}

impl Candidates {
    pub fn len(&self) -> usize {
        match self {
            Candidates::Tracks(t) => t.len(),
            Candidates::Videos(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// State stored for one posted result list.
#[derive(Debug, Clone)]
pub struct SelectionEntry {
    pub requester: UserId,
    pub tag: CommandTag,
    pub candidates: Candidates,
    pub created_at: Instant,
}

impl SelectionEntry {
    pub fn tracks(requester: UserId, tracks: Vec<TrackCandidate>) -> Self {
        Self {
            requester,
            tag: CommandTag::Spotify,
            candidates: Candidates::Tracks(tracks),
            created_at: Instant::now(),
        }
    }

    pub fn videos(requester: UserId, videos: Vec<VideoCandidate>) -> Self {
        Self {
            requester,
            tag: CommandTag::Video,
            candidates: Candidates::Videos(videos),
            created_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Registry of result lists awaiting a reply.
#[derive(Debug, Default)]
pub struct SelectionRegistry {
    entries: DashMap<SelectionKey, SelectionEntry>,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or overwrites) the selection for a posted message.
    pub fn register(&self, key: SelectionKey, entry: SelectionEntry) {
        log::debug!(
            "Registered {} selection on message {} in chat {} ({} candidates)",
            entry.tag.as_str(),
            key.message_id,
            key.chat_id,
            entry.candidates.len()
        );
        self.entries.insert(key, entry);
    }

    /// Returns a copy of the entry, leaving it registered.
    pub fn lookup(&self, key: &SelectionKey) -> Option<SelectionEntry> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    /// Removes the entry, returning it if it was still present.
    ///
    /// Only one of several concurrent callers gets `Some`, which is what
    /// makes a selection single-use.
    pub fn take(&self, key: &SelectionKey) -> Option<SelectionEntry> {
        self.entries.remove(key).map(|(_, entry)| entry)
    }

    /// Removes the entry if present.
    pub fn remove(&self, key: &SelectionKey) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evicts entries older than `ttl`, returning how many were dropped.
    pub fn sweep_expired(&self, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(ttl));
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            log::info!("🧹 Evicted {} expired selection(s)", evicted);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn key(id: i32) -> SelectionKey {
        SelectionKey::new(ChatId(7), MessageId(id))
    }

    fn track(title: &str) -> TrackCandidate {
        TrackCandidate {
            title: title.to_string(),
            artist: "Artist".to_string(),
            duration: "3:00".to_string(),
            spotify_url: format!("https://open.spotify.com/track/{}", title),
        }
    }

    #[test]
    fn test_register_lookup_remove() {
        let registry = SelectionRegistry::new();
        registry.register(key(1), SelectionEntry::tracks(UserId(42), vec![track("a"), track("b")]));

        let entry = registry.lookup(&key(1)).unwrap();
        assert_eq!(entry.requester, UserId(42));
        assert_eq!(entry.tag, CommandTag::Spotify);
        assert_eq!(entry.candidates.len(), 2);

        registry.remove(&key(1));
        assert!(registry.lookup(&key(1)).is_none());
    }

    #[test]
    fn test_take_is_single_use() {
        let registry = SelectionRegistry::new();
        registry.register(key(2), SelectionEntry::videos(UserId(1), Vec::new()));

        assert!(registry.take(&key(2)).is_some());
        assert!(registry.take(&key(2)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_keys_are_scoped_per_chat() {
        let registry = SelectionRegistry::new();
        registry.register(key(3), SelectionEntry::tracks(UserId(1), vec![track("a")]));
        assert!(registry.lookup(&SelectionKey::new(ChatId(8), MessageId(3))).is_none());
    }

    #[test]
    fn test_register_overwrites() {
        let registry = SelectionRegistry::new();
        registry.register(key(4), SelectionEntry::tracks(UserId(1), vec![track("a")]));
        registry.register(key(4), SelectionEntry::tracks(UserId(2), vec![track("b")]));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(&key(4)).unwrap().requester, UserId(2));
    }

    #[test]
    fn test_sweep_expired() {
        let registry = SelectionRegistry::new();
        let mut stale = SelectionEntry::tracks(UserId(1), vec![track("old")]);
        stale.created_at = Instant::now() - Duration::from_secs(120);
        registry.register(key(5), stale);
        registry.register(key(6), SelectionEntry::tracks(UserId(1), vec![track("new")]));

        assert_eq!(registry.sweep_expired(Duration::from_secs(60)), 1);
        assert!(registry.lookup(&key(5)).is_none());
        assert!(registry.lookup(&key(6)).is_some());
    }
}
