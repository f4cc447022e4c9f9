//! Archive cache client abstraction
//!
//! Probing/downloading and unpacking are separate operations so callers can
//! fetch many archives concurrently while unpacking them one at a time.

use crate::cache::key::CacheKey;
use crate::error::RepoCacheResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Scratch directory (relative to the destination) for in-flight downloads
pub const DOWNLOAD_DIR: &str = ".repocache-downloads";

/// Remote archive cache interface
///
/// Implemented over HTTP by [`crate::cache::IndexClient`]; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait ArchiveCache: Send + Sync {
    /// Download the archive indexed under `key` into a private path below
    /// `dest_dir`.
    ///
    /// Returns `Ok(None)` when nothing is indexed for the key. Transport
    /// failures are errors, never a fabricated miss.
    async fn fetch_if_available(
        &self,
        key: &CacheKey,
        dest_dir: &Path,
    ) -> RepoCacheResult<Option<PathBuf>>;

    /// Unpack a fetched archive into `dest_dir`, consuming it.
    ///
    /// Call at most once per archive.
    async fn extract(&self, archive_path: &Path, dest_dir: &Path) -> RepoCacheResult<()>;

    /// Remove whatever scratch space downloads left below `dest_dir`
    async fn discard_downloads(&self, _dest_dir: &Path) -> RepoCacheResult<()> {
        Ok(())
    }
}
