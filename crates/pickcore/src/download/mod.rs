//! Download engine: chunk planning, range fetching and parallel assembly.
//!
//! - `range`: splits a known size into N contiguous `ChunkSpec`s
//! - `fetch`: the `RangeFetcher` seam and its reqwest implementation
//! - `parallel`: fan-out/fan-in chunked download into one file

pub mod error;
pub mod fetch;
pub mod parallel;
pub mod range;

pub use error::TransferError;
pub use fetch::{HttpRangeFetcher, RangeFetcher};
pub use parallel::{download_parallel, download_to_file, DownloadTarget};
pub use range::{plan_chunks, ChunkSpec};
