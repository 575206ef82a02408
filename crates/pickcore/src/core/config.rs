//! Configuration for the bot, read once from the environment.

use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: pickbot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "pickbot.log".to_string()));

/// Scratch directory for downloaded media before it is sent
/// Read from SCRATCH_DIR environment variable
/// Supports tilde (~) expansion for home directory
pub static SCRATCH_DIR: Lazy<String> = Lazy::new(|| {
    let raw = env::var("SCRATCH_DIR").unwrap_or_else(|_| "/tmp/pickbot".to_string());
    shellexpand::tilde(&raw).to_string()
});

/// Provider endpoints
pub mod providers {
    use super::*;

    /// Base URL of the music search / resolution API
    /// Read from MUSIC_API_BASE environment variable
    pub static MUSIC_API_BASE: Lazy<String> = Lazy::new(|| {
        env::var("MUSIC_API_BASE").unwrap_or_else(|_| "https://norch-project.gleeze.com".to_string())
    });

    /// Video search endpoint, queried with `?q=<query>`
    /// Read from VIDEO_SEARCH_URL environment variable
    pub static VIDEO_SEARCH_URL: Lazy<String> = Lazy::new(|| {
        env::var("VIDEO_SEARCH_URL").unwrap_or_else(|_| "https://yt-search-api.vercel.app/api/search".to_string())
    });

    /// JSON document `{ "api": "<base>" }` naming the current video download API
    /// Read from VIDEO_API_MANIFEST_URL environment variable
    pub static VIDEO_API_MANIFEST_URL: Lazy<String> = Lazy::new(|| {
        env::var("VIDEO_API_MANIFEST_URL").unwrap_or_else(|_| {
            "https://raw.githubusercontent.com/romeoislamrasel/romeobot/refs/heads/main/api.json".to_string()
        })
    });

    /// Number of music results offered for selection
    pub const MUSIC_RESULTS_LIMIT: usize = 5;

    /// Number of video results offered for selection
    pub const VIDEO_RESULTS_LIMIT: usize = 6;
}

/// Download configuration
pub mod download {
    use super::*;

    /// Default number of concurrent range requests per video download
    pub const DEFAULT_CONCURRENCY: usize = 5;

    /// Number of concurrent range requests per video download
    /// Read from DOWNLOAD_CONCURRENCY environment variable, never below 1
    pub static CONCURRENCY: Lazy<usize> = Lazy::new(|| {
        env::var("DOWNLOAD_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CONCURRENCY)
            .max(1)
    });
}

/// Pending selection configuration
pub mod selection {
    use super::*;

    /// How long a posted result list accepts replies (in seconds)
    pub const DEFAULT_TTL_SECS: u64 = 600;

    /// Interval between registry sweeps (in seconds)
    pub const SWEEP_INTERVAL_SECS: u64 = 60;

    /// Read from SELECTION_TTL_SECS environment variable
    pub static TTL_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("SELECTION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TTL_SECS)
    });

    /// Selection lifetime
    pub fn ttl() -> Duration {
        Duration::from_secs(*TTL_SECS)
    }

    /// Sweep interval duration
    pub fn sweep_interval() -> Duration {
        Duration::from_secs(SWEEP_INTERVAL_SECS)
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for whole asset transfers (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 600;

    /// Timeout for establishing a connection (in seconds)
    pub const CONNECT_TIMEOUT_SECS: u64 = 30;

    /// Timeout for JSON API calls (in seconds)
    pub const API_TIMEOUT_SECS: u64 = 30;

    /// User agent sent to providers and asset hosts
    pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; pickbot/0.1)";

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }

    /// Connect timeout duration
    pub fn connect_timeout() -> Duration {
        Duration::from_secs(CONNECT_TIMEOUT_SECS)
    }

    /// API call timeout duration
    pub fn api_timeout() -> Duration {
        Duration::from_secs(API_TIMEOUT_SECS)
    }
}
