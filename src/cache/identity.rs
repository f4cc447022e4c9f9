//! Repository identity normalization
//!
//! Folds the many spellings of a remote URL that a hosting service treats
//! as the same repository into one canonical `host/path` string.

use crate::error::{RepoCacheError, RepoCacheResult};
use std::fmt;
use url::Url;

/// Suffixes that name the version-control flavour rather than the repository
const VCS_SUFFIXES: &[&str] = &[".git", ".hg"];

/// Canonical identity of a remote repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryIdentity(String);

impl RepositoryIdentity {
    /// The canonical identity string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a remote URL into its repository identity
///
/// Scheme, user-info, default ports, trailing separators, duplicate
/// slashes and `.git`/`.hg` suffixes are all dropped; the host is
/// lower-cased while the path keeps its case.
pub fn normalize(remote_url: &str) -> RepoCacheResult<RepositoryIdentity> {
    let trimmed = remote_url.trim();
    if trimmed.is_empty() {
        return Err(invalid(remote_url, "remote url is empty"));
    }

    let (host, path) = if trimmed.contains("://") {
        let url = Url::parse(trimmed).map_err(|e| invalid(remote_url, e.to_string()))?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .map(|h| with_port(&h.to_lowercase(), url.scheme(), url.port()));
        (host, url.path().to_string())
    } else if let Some((host, path)) = split_scp(trimmed) {
        (Some(host.to_lowercase()), path.to_string())
    } else {
        (None, trimmed.to_string())
    };

    let path = clean_path(&path);
    let identity = match host {
        Some(host) if path.is_empty() => host,
        Some(host) => format!("{}/{}", host, path),
        None if path.is_empty() => {
            return Err(invalid(remote_url, "remote url has neither host nor path"))
        }
        None => path,
    };

    Ok(RepositoryIdentity(identity))
}

fn invalid(input: &str, reason: impl Into<String>) -> RepoCacheError {
    RepoCacheError::InvalidIdentity {
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Keep explicit ports unless they are the scheme's well-known one
fn with_port(host: &str, scheme: &str, port: Option<u16>) -> String {
    let default = match scheme {
        "ssh" | "git+ssh" | "ssh+git" => Some(22),
        "git" => Some(9418),
        _ => None,
    };
    match port {
        Some(p) if Some(p) != default => format!("{}:{}", host, p),
        _ => host.to_string(),
    }
}

/// Split scp-style `[user@]host:path` remotes
///
/// Only applies when the colon comes before any slash, so local paths
/// such as `./a:b` or `/srv/a:b` are left alone.
fn split_scp(input: &str) -> Option<(&str, &str)> {
    let colon = input.find(':')?;
    let slash = input.find('/').unwrap_or(input.len());
    if colon > slash {
        return None;
    }
    let host = input[..colon].rsplit('@').next()?;
    if host.is_empty() {
        return None;
    }
    Some((host, &input[colon + 1..]))
}

fn clean_path(path: &str) -> String {
    let mut joined = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    for suffix in VCS_SUFFIXES {
        if let Some(stripped) = joined.strip_suffix(suffix) {
            joined = stripped.trim_end_matches('/').to_string();
            break;
        }
    }
    joined
}
