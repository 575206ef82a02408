//! Provider API clients.
//!
//! Two seams, one per command:
//! - `MusicProvider`: track search and download resolution (`spotify`)
//! - `VideoProvider`: video search, API discovery and download resolution (`video`)
//!
//! The HTTP implementations live in `spotify` and `youtube`.

pub mod spotify;
pub mod youtube;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

pub use spotify::MusicApi;
pub use youtube::VideoApi;

/// One track offered for selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackCandidate {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub artist: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub spotify_url: String,
}

/// A track the provider resolved to a downloadable file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTrack {
    pub name: String,
    pub artists: String,
    pub duration: String,
    pub image: Option<String>,
    pub download_url: String,
}

/// One video offered for selection.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoCandidate {
    pub title: String,
    pub timestamp: String,
    pub channel: String,
    pub thumbnail: Option<String>,
    pub video_id: String,
    pub url: String,
}

/// A video the provider resolved to a downloadable file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVideo {
    pub download_url: String,
    pub title: Option<String>,
    pub author: Option<String>,
}

#[async_trait]
pub trait MusicProvider: Send + Sync {
    /// Searches tracks; an empty list means "no results".
    async fn search(&self, query: &str) -> AppResult<Vec<TrackCandidate>>;

    /// Resolves a track page URL; `None` when no download URL came back.
    async fn resolve(&self, spotify_url: &str) -> AppResult<Option<ResolvedTrack>>;
}

#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Searches videos; an empty list means "no results".
    async fn search(&self, query: &str) -> AppResult<Vec<VideoCandidate>>;

    /// Fetches the base URL of the current download API.
    async fn api_base(&self) -> AppResult<String>;

    /// Resolves a video URL against `base`; `None` when no download URL came back.
    async fn resolve(&self, base: &str, video_url: &str) -> AppResult<Option<ResolvedVideo>>;
}

/// Client for JSON API calls (shorter timeout than asset transfers).
pub fn api_client() -> AppResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(config::network::USER_AGENT)
        .timeout(config::network::api_timeout())
        .connect_timeout(config::network::connect_timeout())
        .build()?)
}

/// GET `request` and decode the JSON body, mapping non-2xx to `HttpStatus`.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(request: reqwest::RequestBuilder) -> AppResult<T> {
    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(AppError::HttpStatus(response.status()));
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Accepts a string, number, list of strings or null and renders it as text.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}

fn value_to_string(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map.get("name").map(value_to_string).unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Accepts an array and keeps the items that decode; anything else is empty.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let serde_json::Value::Array(items) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                log::debug!("Skipping undecodable result item: {}", e);
                None
            }
        })
        .collect())
}

/// Treats empty strings as missing.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
