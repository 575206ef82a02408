//! Chunk planning for ranged downloads.

/// One contiguous byte range of an asset.
///
/// `len == 0` marks an empty chunk, produced when the asset is smaller than
/// the number of chunks. Empty chunks are never requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    /// Position of this chunk in the output file
    pub index: usize,
    /// First byte (inclusive)
    pub start: u64,
    /// Number of bytes covered
    pub len: u64,
}

impl ChunkSpec {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Last byte (inclusive), `None` for an empty chunk.
    pub fn end(&self) -> Option<u64> {
        if self.len == 0 {
            None
        } else {
            Some(self.start + self.len - 1)
        }
    }

    /// HTTP Range header value `bytes=<start>-<end>`, `None` for an empty chunk.
    pub fn range_header_value(&self) -> Option<String> {
        self.end().map(|end| format!("bytes={}-{}", self.start, end))
    }
}

/// Splits `total_size` bytes into exactly `concurrency` chunks.
///
/// `chunk_size = ceil(total_size / concurrency)`; chunk `i` starts at
/// `i * chunk_size` and ends at `min((i + 1) * chunk_size - 1, total_size - 1)`.
/// Trailing chunks past the end of the asset come back empty. A concurrency
/// of 0 is treated as 1.
pub fn plan_chunks(total_size: u64, concurrency: usize) -> Vec<ChunkSpec> {
    let count = concurrency.max(1);
    let chunk_size = total_size.div_ceil(count as u64);

    (0..count)
        .map(|index| {
            let start = (index as u64).saturating_mul(chunk_size).min(total_size);
            let end_excl = start.saturating_add(chunk_size).min(total_size);
            ChunkSpec {
                index,
                start,
                len: end_excl - start,
            }
        })
        .collect()
}
