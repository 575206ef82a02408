//! Music search / download-resolution API client.
//!
//! - `GET {base}/api/spotify?q=<query>` → `{ results: [ { title, artist, duration, spotify_url } ] }`
//! - `GET {base}/api/spotify-dl-v2?url=<spotify_url>` → `{ trackData: [ { name, artists, duration, image, download_url } ] }`

use super::{api_client, get_json, lenient_list, lenient_string, non_empty, MusicProvider, ResolvedTrack, TrackCandidate};
use crate::core::config;
use crate::core::error::AppResult;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    results: Vec<TrackCandidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    track_data: Vec<TrackData>,
}

#[derive(Debug, Deserialize)]
struct TrackData {
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    artists: String,
    #[serde(default, deserialize_with = "lenient_string")]
    duration: String,
    #[serde(default, deserialize_with = "lenient_string")]
    image: String,
    #[serde(default, deserialize_with = "lenient_string")]
    download_url: String,
}

/// HTTP client for the music API.
pub struct MusicApi {
    client: reqwest::Client,
    base: String,
}

impl MusicApi {
    pub fn new(client: reqwest::Client, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client against `MUSIC_API_BASE`.
    pub fn from_config() -> AppResult<Self> {
        Ok(Self::new(api_client()?, config::providers::MUSIC_API_BASE.as_str()))
    }
}

#[async_trait]
impl MusicProvider for MusicApi {
    async fn search(&self, query: &str) -> AppResult<Vec<TrackCandidate>> {
        let request = self
            .client
            .get(format!("{}/api/spotify", self.base))
            .query(&[("q", query)]);
        let response: SearchResponse = get_json(request).await?;

        let mut results: Vec<TrackCandidate> = response
            .results
            .into_iter()
            .filter(|t| !t.spotify_url.trim().is_empty())
            .collect();
        results.truncate(config::providers::MUSIC_RESULTS_LIMIT);
        log::info!("🔎 Music search '{}' returned {} result(s)", query, results.len());
        Ok(results)
    }

    async fn resolve(&self, spotify_url: &str) -> AppResult<Option<ResolvedTrack>> {
        let request = self
            .client
            .get(format!("{}/api/spotify-dl-v2", self.base))
            .query(&[("url", spotify_url)]);
        let response: ResolveResponse = get_json(request).await?;

        let track = response.track_data.into_iter().next();
        Ok(track.and_then(|t| {
            let download_url = non_empty(Some(t.download_url))?;
            Some(ResolvedTrack {
                name: t.name,
                artists: t.artists,
                duration: t.duration,
                image: non_empty(Some(t.image)),
                download_url,
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::AppError;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn api(server: &MockServer) -> MusicApi {
        MusicApi::new(reqwest::Client::new(), server.uri())
    }

    #[tokio::test]
    async fn test_search_keeps_top_five() {
        let server = MockServer::start().await;
        let results: Vec<_> = (1..=8)
            .map(|i| json!({"title": format!("Song {}", i), "artist": "A", "duration": "3:00", "spotify_url": format!("u{}", i)}))
            .collect();
        Mock::given(method("GET"))
            .and(path("/api/spotify"))
            .and(query_param("q", "Imagine"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": results })))
            .mount(&server)
            .await;

        let tracks = api(&server).await.search("Imagine").await.unwrap();
        assert_eq!(tracks.len(), 5);
        assert_eq!(tracks[4].title, "Song 5");
    }

    #[tokio::test]
    async fn test_search_without_results_field_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/spotify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
            .mount(&server)
            .await;

        assert!(api(&server).await.search("x").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_non_array_results_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/spotify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": { "error": "rate limited" } })))
            .mount(&server)
            .await;

        assert!(api(&server).await.search("x").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_drops_items_without_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/spotify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [
                {"title": "Null url", "spotify_url": null},
                {"title": "Good", "artist": "A", "duration": "3:00", "spotify_url": "https://open.spotify.com/track/g"},
                {"title": "No url"},
                "garbage"
            ] })))
            .mount(&server)
            .await;

        let tracks = api(&server).await.search("x").await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "Good");
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = api(&server).await.search("x").await.unwrap_err();
        assert!(matches!(err, AppError::HttpStatus(s) if s.as_u16() == 502));
    }

    #[tokio::test]
    async fn test_resolve_first_track() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/spotify-dl-v2"))
            .and(query_param("url", "https://open.spotify.com/track/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "trackData": [
                    {"name": "Imagine", "artists": "John Lennon", "duration": "3:03",
                     "image": "https://img/cover.jpg", "download_url": "https://cdn/imagine.mp3"},
                    {"name": "Other", "download_url": "https://cdn/other.mp3"}
                ]
            })))
            .mount(&server)
            .await;

        let track = api(&server)
            .await
            .resolve("https://open.spotify.com/track/abc")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(track.name, "Imagine");
        assert_eq!(track.download_url, "https://cdn/imagine.mp3");
        assert_eq!(track.image.as_deref(), Some("https://img/cover.jpg"));
    }

    #[tokio::test]
    async fn test_resolve_without_download_url_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/spotify-dl-v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "trackData": [{"name": "Imagine", "download_url": ""}]
            })))
            .mount(&server)
            .await;

        assert!(api(&server).await.resolve("u").await.unwrap().is_none());
    }
}
