//! Archive descriptors and tarball extraction

use crate::error::{RepoCacheError, RepoCacheResult};
use flate2::read::GzDecoder;
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of the download phase for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveState {
    /// Local repository already exists, nothing was fetched
    Present,
    /// No archive is indexed for the project's key
    Miss,
    /// Archive downloaded to this path, waiting to be extracted
    Fetched(PathBuf),
}

impl fmt::Display for ArchiveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Miss => write!(f, "miss"),
            Self::Fetched(_) => write!(f, "fetched"),
        }
    }
}

/// Per-project download result, consumed once by the extraction phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveDescriptor {
    pub project_name: String,
    pub state: ArchiveState,
}

impl ArchiveDescriptor {
    pub fn new(project_name: impl Into<String>, state: ArchiveState) -> Self {
        Self {
            project_name: project_name.into(),
            state,
        }
    }
}

/// Unpack a gzip tarball into `dest_dir` and delete it afterwards
///
/// Runs on the blocking pool. Entries that would land outside `dest_dir`
/// are refused by the tar unpacker.
pub async fn extract_archive(archive_path: &Path, dest_dir: &Path) -> RepoCacheResult<()> {
    let archive_path = archive_path.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();

    tokio::task::spawn_blocking(move || unpack(&archive_path, &dest_dir))
        .await
        .map_err(|e| RepoCacheError::Internal(format!("extraction task failed: {}", e)))?
}

fn unpack(archive_path: &Path, dest_dir: &Path) -> RepoCacheResult<()> {
    debug!(
        "Extracting {} into {}",
        archive_path.display(),
        dest_dir.display()
    );

    let file = File::open(archive_path).map_err(|e| {
        RepoCacheError::io(format!("opening archive {}", archive_path.display()), e)
    })?;

    fs::create_dir_all(dest_dir).map_err(|e| {
        RepoCacheError::io(format!("creating directory {}", dest_dir.display()), e)
    })?;

    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    archive.set_preserve_permissions(true);
    archive
        .unpack(dest_dir)
        .map_err(|e| RepoCacheError::ArchiveExtract {
            path: archive_path.to_path_buf(),
            reason: e.to_string(),
        })?;

    fs::remove_file(archive_path).map_err(|e| {
        RepoCacheError::io(format!("removing archive {}", archive_path.display()), e)
    })?;

    Ok(())
}
