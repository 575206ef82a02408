//! Parallel chunk downloader.
//!
//! The asset is split into N ranges, every range is fetched concurrently, and
//! nothing is written until all of them have arrived. Buffers are then written
//! strictly in chunk order, so completion order never affects the output.
//! The first failing chunk cancels its siblings through a shared token.

use crate::download::error::TransferError;
use crate::download::fetch::RangeFetcher;
use crate::download::range::{plan_chunks, ChunkSpec};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// A resolved, reachable asset with a known size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    pub total_size: u64,
    pub destination: PathBuf,
}

impl DownloadTarget {
    /// Runs the `HEAD` preflight to learn the asset size.
    pub async fn probe(
        fetcher: &dyn RangeFetcher,
        url: &str,
        destination: impl Into<PathBuf>,
    ) -> Result<Self, TransferError> {
        let total_size = fetcher.content_length(url).await?;
        Ok(Self {
            url: url.to_string(),
            total_size,
            destination: destination.into(),
        })
    }
}

/// Downloads `target` with `concurrency` concurrent range requests.
///
/// Empty chunks (asset smaller than `concurrency`) are not requested. A
/// zero-byte asset produces an empty file without any request. The parent
/// directory of the destination must already exist.
///
/// # Errors
///
/// Any failed chunk fails the whole download; no file is written in that
/// case. A write failure removes the partially written file.
pub async fn download_parallel(
    fetcher: Arc<dyn RangeFetcher>,
    target: &DownloadTarget,
    concurrency: usize,
) -> Result<(), TransferError> {
    let chunks = plan_chunks(target.total_size, concurrency);
    log::info!(
        "📥 Parallel download: {} ({:.2} MB in {} chunks)",
        target.url,
        target.total_size as f64 / (1024.0 * 1024.0),
        chunks.len()
    );

    let buffers = fetch_chunks(fetcher, &target.url, &chunks).await?;

    if let Err(e) = write_in_order(&target.destination, &chunks, buffers).await {
        if let Err(remove_err) = fs_err::tokio::remove_file(&target.destination).await {
            log::warn!("Failed to remove partial file: {}", remove_err);
        }
        return Err(e);
    }

    log::info!("✅ Parallel download complete: {}", target.destination.display());
    Ok(())
}

/// Fan-out over every non-empty chunk, fan-in once all have finished.
async fn fetch_chunks(
    fetcher: Arc<dyn RangeFetcher>,
    url: &str,
    chunks: &[ChunkSpec],
) -> Result<Vec<Option<Bytes>>, TransferError> {
    let token = CancellationToken::new();
    let mut set = JoinSet::new();

    for chunk in chunks.iter().copied() {
        let Some(end) = chunk.end() else {
            continue;
        };
        let fetcher = Arc::clone(&fetcher);
        let url = url.to_string();
        let token = token.clone();

        set.spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => Err(TransferError::Cancelled),
                r = fetcher.fetch_range(&url, chunk.start, end) => r,
            };
            if result.is_err() {
                token.cancel();
            }
            (chunk.index, result)
        });
    }

    let mut buffers: Vec<Option<Bytes>> = vec![None; chunks.len()];
    let mut first_error: Option<TransferError> = None;

    while let Some(joined) = set.join_next().await {
        let (index, result) = match joined {
            Ok(pair) => pair,
            Err(join_err) => {
                token.cancel();
                first_error.get_or_insert(join_err.into());
                continue;
            }
        };

        match result {
            Ok(bytes) => buffers[index] = Some(bytes),
            Err(e) => {
                if !e.is_cancelled() {
                    log::error!("Error downloading chunk {}: {}", index + 1, e);
                }
                // A real failure outranks the cancellations it caused.
                let replace = match &first_error {
                    None => true,
                    Some(existing) => existing.is_cancelled() && !e.is_cancelled(),
                };
                if replace {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(buffers),
    }
}

async fn write_in_order(
    destination: &Path,
    chunks: &[ChunkSpec],
    buffers: Vec<Option<Bytes>>,
) -> Result<(), TransferError> {
    let mut file = fs_err::tokio::File::create(destination).await?;

    for (chunk, buffer) in chunks.iter().zip(buffers) {
        match buffer {
            Some(bytes) => file.write_all(&bytes).await?,
            None if chunk.is_empty() => {}
            None => return Err(TransferError::Join(format!("chunk {} missing", chunk.index + 1))),
        }
    }

    file.flush().await?;
    Ok(())
}

/// Single GET of the whole body, written to `destination`.
///
/// Used for covers, thumbnails and audio files whose size is not probed.
/// Returns the number of bytes written.
pub async fn download_to_file(
    fetcher: &dyn RangeFetcher,
    url: &str,
    destination: &Path,
) -> Result<u64, TransferError> {
    let bytes = fetcher.fetch_all(url).await?;
    let mut file = fs_err::tokio::File::create(destination).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    Ok(bytes.len() as u64)
}
