//! Video search and download-resolution API client.
//!
//! - search: `GET {search_url}?q=<query>` → `{ videos: [ { title, timestamp, author: { name }, thumbnail, videoId, url } ] }`
//! - discovery: `GET {manifest_url}` → `{ api: <base> }`
//! - resolution: `GET {base}/api/video?url=<encoded url>` → `{ download_url, title, author }`

use super::{api_client, get_json, lenient_list, lenient_string, non_empty, ResolvedVideo, VideoCandidate, VideoProvider};
use crate::core::config;
use crate::core::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    videos: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    timestamp: String,
    #[serde(default, deserialize_with = "lenient_string")]
    author: String,
    #[serde(default, deserialize_with = "lenient_string")]
    thumbnail: String,
    #[serde(default, deserialize_with = "lenient_string")]
    video_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    url: String,
}

impl From<VideoItem> for VideoCandidate {
    fn from(item: VideoItem) -> Self {
        let url = if item.url.trim().is_empty() && !item.video_id.trim().is_empty() {
            format!("https://youtube.com/watch?v={}", item.video_id)
        } else {
            item.url
        };
        VideoCandidate {
            title: item.title,
            timestamp: item.timestamp,
            channel: item.author,
            thumbnail: non_empty(Some(item.thumbnail)),
            video_id: item.video_id,
            url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default, deserialize_with = "lenient_string")]
    api: String,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    download_url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    author: String,
}

/// HTTP client for video search, API discovery and resolution.
pub struct VideoApi {
    client: reqwest::Client,
    search_url: String,
    manifest_url: String,
}

impl VideoApi {
    pub fn new(client: reqwest::Client, search_url: impl Into<String>, manifest_url: impl Into<String>) -> Self {
        Self {
            client,
            search_url: search_url.into(),
            manifest_url: manifest_url.into(),
        }
    }

    /// Client against `VIDEO_SEARCH_URL` and `VIDEO_API_MANIFEST_URL`.
    pub fn from_config() -> AppResult<Self> {
        Ok(Self::new(
            api_client()?,
            config::providers::VIDEO_SEARCH_URL.as_str(),
            config::providers::VIDEO_API_MANIFEST_URL.as_str(),
        ))
    }
}

#[async_trait]
impl VideoProvider for VideoApi {
    async fn search(&self, query: &str) -> AppResult<Vec<VideoCandidate>> {
        let request = self.client.get(&self.search_url).query(&[("q", query)]);
        let response: SearchResponse = get_json(request).await?;

        let videos: Vec<VideoCandidate> = response
            .videos
            .into_iter()
            .map(VideoCandidate::from)
            .filter(|v| !v.url.trim().is_empty())
            .take(config::providers::VIDEO_RESULTS_LIMIT)
            .collect();
        log::info!("🔎 Video search '{}' returned {} result(s)", query, videos.len());
        Ok(videos)
    }

    async fn api_base(&self) -> AppResult<String> {
        let manifest: Manifest = get_json(self.client.get(&self.manifest_url)).await?;
        non_empty(Some(manifest.api))
            .map(|base| base.trim_end_matches('/').to_string())
            .ok_or_else(|| AppError::Provider("video API manifest has no `api` field".to_string()))
    }

    async fn resolve(&self, base: &str, video_url: &str) -> AppResult<Option<ResolvedVideo>> {
        let url = format!("{}/api/video?url={}", base, urlencoding::encode(video_url));
        let response: ResolveResponse = get_json(self.client.get(url)).await?;

        Ok(non_empty(Some(response.download_url)).map(|download_url| ResolvedVideo {
            download_url,
            title: non_empty(Some(response.title)),
            author: non_empty(Some(response.author)),
        }))
    }
}
