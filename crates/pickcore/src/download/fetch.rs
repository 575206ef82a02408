//! Range-fetch unit and whole-body fetches over HTTP.

use crate::core::config;
use crate::download::error::TransferError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_LENGTH, RANGE};
use reqwest::Client;

/// Byte source for the downloader.
///
/// Implemented over reqwest for production and over in-memory buffers in
/// tests. The server is trusted to honor the requested range; returned
/// lengths are not checked against it.
#[async_trait]
pub trait RangeFetcher: Send + Sync {
    /// GET with `Range: bytes=<start>-<end>` (inclusive), returning the body.
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> Result<Bytes, TransferError>;

    /// `HEAD` preflight, returning the Content-Length.
    async fn content_length(&self, url: &str) -> Result<u64, TransferError>;

    /// Plain GET of the whole body.
    async fn fetch_all(&self, url: &str) -> Result<Bytes, TransferError>;
}

/// `RangeFetcher` over a shared reqwest client.
#[derive(Clone)]
pub struct HttpRangeFetcher {
    client: Client,
}

impl HttpRangeFetcher {
    /// Builds a client with the asset-transfer timeouts.
    pub fn new() -> Result<Self, TransferError> {
        let client = Client::builder()
            .user_agent(config::network::USER_AGENT)
            .timeout(config::network::timeout())
            .connect_timeout(config::network::connect_timeout())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn check_status(response: reqwest::Response, url: &str) -> Result<reqwest::Response, TransferError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RangeFetcher for HttpRangeFetcher {
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> Result<Bytes, TransferError> {
        let response = self
            .client
            .get(url)
            .header(RANGE, format!("bytes={}-{}", start, end))
            .send()
            .await?;
        let response = Self::check_status(response, url)?;
        Ok(response.bytes().await?)
    }

    async fn content_length(&self, url: &str) -> Result<u64, TransferError> {
        let response = self.client.head(url).send().await?;
        let response = Self::check_status(response, url)?;

        // Read the header itself: the body of a HEAD response is always empty.
        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .ok_or_else(|| TransferError::MissingContentLength(url.to_string()))
    }

    async fn fetch_all(&self, url: &str) -> Result<Bytes, TransferError> {
        let response = self.client.get(url).send().await?;
        let response = Self::check_status(response, url)?;
        Ok(response.bytes().await?)
    }
}
