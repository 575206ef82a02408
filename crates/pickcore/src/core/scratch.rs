//! Scratch files for media that is downloaded, sent, then thrown away.
//!
//! Names carry a random v4 UUID so two requests started in the same instant
//! never share a path. A `ScratchFile` deletes itself when dropped, which
//! covers both the happy path (after the media message is sent) and every
//! early return on failure.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Directory that holds scratch files.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Scratch dir from `SCRATCH_DIR`.
    pub fn from_config() -> Self {
        Self::new(crate::core::config::SCRATCH_DIR.as_str())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the directory (and parents) if missing.
    pub async fn ensure(&self) -> std::io::Result<()> {
        fs_err::tokio::create_dir_all(&self.root).await
    }

    /// Reserves a unique path `<prefix>_<uuid>.<ext>` inside the directory.
    ///
    /// Nothing is created on disk until the caller writes to the path.
    pub fn file(&self, prefix: &str, ext: &str) -> ScratchFile {
        let name = format!("{}_{}.{}", prefix, Uuid::new_v4().simple(), ext);
        ScratchFile {
            path: self.root.join(name),
        }
    }
}

/// A scratch path removed from disk on drop.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("🧹 Removed scratch file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove scratch file {}: {}", self.path.display(), e),
        }
    }
}
