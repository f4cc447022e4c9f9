//! HTTP artifact index client
//!
//! Looks up the task indexed under a namespace, then downloads the archive
//! artifact that task published. A 404 at either step is a cache miss;
//! anything else that goes wrong is a transport error.

use crate::cache::archive::extract_archive;
use crate::cache::client::{ArchiveCache, DOWNLOAD_DIR};
use crate::cache::key::CacheKey;
use crate::config::schema::CacheConfig;
use crate::error::{RepoCacheError, RepoCacheResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::Builder;
use tracing::{debug, info, warn};

/// Index entry returned for a namespace
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexedTask {
    task_id: String,
}

/// Archive cache backed by an artifact index and queue over HTTP
#[derive(Clone)]
pub struct IndexClient {
    agent: ureq::Agent,
    index_url: String,
    queue_url: String,
    artifact_prefix: String,
}

impl IndexClient {
    /// Create a client from cache configuration
    pub fn new(config: &CacheConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Self {
            agent: ureq::Agent::new_with_config(agent_config),
            index_url: config.index_url.trim_end_matches('/').to_string(),
            queue_url: config.queue_url.trim_end_matches('/').to_string(),
            artifact_prefix: config.artifact_prefix.trim_matches('/').to_string(),
        }
    }

    fn task_url(&self, namespace: &str) -> String {
        format!("{}/task/{}", self.index_url, namespace)
    }

    fn artifact_url(&self, task_id: &str, name: &str) -> String {
        format!(
            "{}/task/{}/artifacts/{}/{}.tar.gz",
            self.queue_url, task_id, self.artifact_prefix, name
        )
    }
}

#[async_trait]
impl ArchiveCache for IndexClient {
    async fn fetch_if_available(
        &self,
        key: &CacheKey,
        dest_dir: &Path,
    ) -> RepoCacheResult<Option<PathBuf>> {
        let client = self.clone();
        let namespace = key.namespace().to_string();
        let artifact_name = key.name().to_string();
        let download_dir = dest_dir.join(DOWNLOAD_DIR);
        let file_prefix = format!("{}-", key.digest());

        let fetched = tokio::task::spawn_blocking(move || {
            let task_url = client.task_url(&namespace);
            let Some(task_id) = lookup_task(&client.agent, &task_url, &namespace)? else {
                return Ok(None);
            };
            let url = client.artifact_url(&task_id, &artifact_name);
            download(&client.agent, &url, &namespace, &download_dir, &file_prefix)
        })
        .await
        .map_err(|e| RepoCacheError::Internal(format!("download task failed: {}", e)))??;

        match &fetched {
            Some(path) => info!("Cache hit for {} ({})", key.name(), path.display()),
            None => info!("Cache miss for {}", key.name()),
        }
        Ok(fetched)
    }

    async fn extract(&self, archive_path: &Path, dest_dir: &Path) -> RepoCacheResult<()> {
        extract_archive(archive_path, dest_dir).await
    }

    async fn discard_downloads(&self, dest_dir: &Path) -> RepoCacheResult<()> {
        let download_dir = dest_dir.join(DOWNLOAD_DIR);
        if download_dir.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&download_dir).await {
                warn!("Failed to remove {}: {}", download_dir.display(), e);
            }
        }
        Ok(())
    }
}

/// Resolve a namespace to the task that published its archive
fn lookup_task(agent: &ureq::Agent, url: &str, namespace: &str) -> RepoCacheResult<Option<String>> {
    debug!("Probing index: {}", url);

    let mut response = match agent.get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::StatusCode(404)) => return Ok(None),
        Err(e) => return Err(RepoCacheError::transport(namespace, e.to_string())),
    };

    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| RepoCacheError::transport(namespace, e.to_string()))?;

    let task: IndexedTask = serde_json::from_str(&body).map_err(|e| {
        RepoCacheError::transport(namespace, format!("malformed index response: {}", e))
    })?;

    Ok(Some(task.task_id))
}

/// Stream an artifact into a uniquely named file below `download_dir`
///
/// Every call gets its own file, even for the same key, so each fetched
/// archive can be extracted and removed on its own.
fn download(
    agent: &ureq::Agent,
    url: &str,
    namespace: &str,
    download_dir: &Path,
    file_prefix: &str,
) -> RepoCacheResult<Option<PathBuf>> {
    debug!("Downloading artifact: {}", url);

    let response = match agent.get(url).call() {
        Ok(response) => response,
        Err(ureq::Error::StatusCode(404)) => return Ok(None),
        Err(e) => return Err(RepoCacheError::transport(namespace, e.to_string())),
    };

    std::fs::create_dir_all(download_dir).map_err(|e| {
        RepoCacheError::io(format!("creating directory {}", download_dir.display()), e)
    })?;

    let mut temp = Builder::new()
        .prefix(file_prefix)
        .suffix(".tar.gz")
        .tempfile_in(download_dir)
        .map_err(|e| RepoCacheError::io("creating download file", e))?;

    let mut reader = response.into_body().into_reader();
    std::io::copy(&mut reader, &mut temp).map_err(|e| {
        RepoCacheError::transport(namespace, format!("reading archive body: {}", e))
    })?;

    let (_, target) = temp
        .keep()
        .map_err(|e| RepoCacheError::io("keeping downloaded archive", e.error))?;

    Ok(Some(target))
}
