//! Content-addressed archive cache for repository snapshots
//!
//! Archives are indexed under a namespace derived from the repository's
//! canonical identity and the branch being checked out. Same identity and
//! branch = same namespace, on every machine and every run.
//!
//! # Archive States
//!
//! | State | Meaning | Extraction |
//! |-------|---------|------------|
//! | Present | Local copy already exists | skipped |
//! | Miss | No archive indexed for the key | needs force-clone |
//! | Fetched | Archive downloaded to a private path | unpacked once |

pub mod archive;
pub mod client;
pub mod identity;
pub mod index;
pub mod key;

pub use archive::{extract_archive, ArchiveDescriptor, ArchiveState};
pub use client::{ArchiveCache, DOWNLOAD_DIR};
pub use identity::{normalize, RepositoryIdentity};
pub use index::IndexClient;
pub use key::{derive_key, CacheKey, DIGEST_ALGORITHM};
