//! Cache key derivation
//!
//! Hashes `identity + "/" + branch` into a fixed-length digest and scopes it
//! under a caller-configured namespace prefix. Same identity and branch =
//! same key, independent of process, time or platform.

use crate::cache::identity::RepositoryIdentity;
use crate::error::{RepoCacheError, RepoCacheResult};
use sha2::{Digest, Sha256};
use std::fmt;

/// Digest algorithm used for keys. Changing it invalidates every cached archive.
pub const DIGEST_ALGORITHM: &str = "sha256";

/// Longest namespace the artifact index accepts
const MAX_NAMESPACE_LEN: usize = 255;

/// Key under which a repository archive is indexed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: String,
    namespace: String,
    digest: String,
}

impl CacheKey {
    /// Hashed source string (`identity/branch`), also used as the artifact name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full index namespace (`prefix.digest`)
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Hex digest of the name
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.namespace)
    }
}

/// Derive the cache key for a repository identity on a branch
pub fn derive_key(
    identity: &RepositoryIdentity,
    branch: &str,
    namespace_prefix: &str,
) -> RepoCacheResult<CacheKey> {
    if branch.trim().is_empty() {
        return Err(RepoCacheError::InvalidNamespace {
            namespace: namespace_prefix.to_string(),
            reason: format!("empty branch for {}", identity),
        });
    }

    let name = format!("{}/{}", identity, branch);
    let digest = hex::encode(Sha256::digest(name.as_bytes()));
    let namespace = format!("{}.{}", namespace_prefix, digest);
    validate_namespace(&namespace)?;

    Ok(CacheKey {
        name,
        namespace,
        digest,
    })
}

/// Reject namespaces the index cannot store verbatim
fn validate_namespace(namespace: &str) -> RepoCacheResult<()> {
    let fail = |reason: String| {
        Err(RepoCacheError::InvalidNamespace {
            namespace: namespace.to_string(),
            reason,
        })
    };

    if namespace.len() > MAX_NAMESPACE_LEN {
        return fail(format!("longer than {} characters", MAX_NAMESPACE_LEN));
    }

    for segment in namespace.split('.') {
        if segment.is_empty() {
            return fail("contains an empty segment".to_string());
        }
        if let Some(c) = segment
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return fail(format!("illegal character {:?}", c));
        }
    }

    Ok(())
}
