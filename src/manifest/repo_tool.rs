//! `repo` launcher driver

use crate::error::{RepoCacheError, RepoCacheResult};
use crate::manifest::{InitOptions, ManifestTool, Project, METADATA_DIR};
use crate::process;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Manifest as printed by `repo manifest --format=json`
#[derive(Debug, Deserialize)]
struct ManifestDoc {
    #[serde(default)]
    remote: Vec<RemoteEntry>,
    #[serde(default)]
    default: Option<DefaultEntry>,
    #[serde(default)]
    project: Vec<ProjectEntry>,
}

#[derive(Debug, Deserialize)]
struct RemoteEntry {
    name: String,
    fetch: String,
}

#[derive(Debug, Deserialize)]
struct DefaultEntry {
    remote: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectEntry {
    name: String,
    path: Option<String>,
    remote: Option<String>,
}

/// Manifest tool backed by the `repo` command
pub struct RepoTool {
    program: String,
}

impl RepoTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn exec(&self, dir: &Path, args: Vec<String>) -> RepoCacheResult<String> {
        let output = process::run(&self.program, &args, Some(dir)).await?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(RepoCacheError::Manifest {
                command: output.command,
                stderr: output.stderr,
            })
        }
    }

    /// URL the workspace's manifest repository was cloned from
    async fn manifest_url(&self, dir: &Path) -> RepoCacheResult<String> {
        let git_dir = dir.join(METADATA_DIR).join("manifests.git");
        let args = vec![
            format!("--git-dir={}", git_dir.to_string_lossy()),
            "config".to_string(),
            "--get".to_string(),
            "remote.origin.url".to_string(),
        ];
        let output = process::run("git", &args, None).await?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(RepoCacheError::Manifest {
                command: output.command,
                stderr: output.stderr,
            })
        }
    }
}

#[async_trait]
impl ManifestTool for RepoTool {
    async fn init(&self, dir: &Path, manifest: &str, options: &InitOptions) -> RepoCacheResult<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| RepoCacheError::io(format!("creating directory {}", dir.display()), e))?;

        info!("Initializing workspace from {} ({})", manifest, options.branch);
        self.exec(dir, init_args(manifest, options)).await?;
        Ok(())
    }

    async fn list_projects(&self, dir: &Path) -> RepoCacheResult<Vec<Project>> {
        let json = self
            .exec(dir, vec!["manifest".into(), "--format=json".into()])
            .await?;
        let doc: ManifestDoc = serde_json::from_str(&json)?;

        let manifest_url = if doc.remote.iter().any(|r| r.fetch.starts_with('.')) {
            Some(self.manifest_url(dir).await?)
        } else {
            None
        };

        let projects = resolve_projects(doc, manifest_url.as_deref())?;
        debug!("Manifest declares {} projects", projects.len());
        Ok(projects)
    }

    async fn sync(&self, dir: &Path, concurrency: usize) -> RepoCacheResult<()> {
        info!("Syncing workspace with {} job(s)", concurrency);
        self.exec(
            dir,
            vec!["sync".into(), "-j".into(), concurrency.max(1).to_string()],
        )
        .await?;
        Ok(())
    }
}

fn init_args(manifest: &str, options: &InitOptions) -> Vec<String> {
    let mut args = vec![
        "init".to_string(),
        "-u".to_string(),
        manifest.to_string(),
        "-b".to_string(),
        options.branch.clone(),
    ];
    if let Some(url) = &options.repo_url {
        args.push("--repo-url".to_string());
        args.push(url.clone());
    }
    if let Some(rev) = &options.repo_revision {
        args.push("--repo-rev".to_string());
        args.push(rev.clone());
    }
    args
}

/// Turn manifest entries into projects with absolute remote URLs
fn resolve_projects(doc: ManifestDoc, manifest_url: Option<&str>) -> RepoCacheResult<Vec<Project>> {
    let mut fetch_urls = HashMap::new();
    for remote in &doc.remote {
        fetch_urls.insert(
            remote.name.as_str(),
            resolve_fetch(&remote.fetch, manifest_url)?,
        );
    }
    let default_remote = doc.default.as_ref().and_then(|d| d.remote.as_deref());

    doc.project
        .iter()
        .map(|entry| -> RepoCacheResult<Project> {
            let remote_name = entry
                .remote
                .as_deref()
                .or(default_remote)
                .ok_or_else(|| manifest_error(format!("project {} has no remote", entry.name)))?;
            let fetch = fetch_urls.get(remote_name).ok_or_else(|| {
                manifest_error(format!(
                    "project {} uses undeclared remote {}",
                    entry.name, remote_name
                ))
            })?;

            Ok(Project {
                name: entry.name.clone(),
                path: entry.path.clone().unwrap_or_else(|| entry.name.clone()),
                remote: format!("{}/{}", fetch.trim_end_matches('/'), entry.name),
            })
        })
        .collect()
}

/// Relative fetch URLs (`..`, `./x`) are relative to the manifest URL
fn resolve_fetch(fetch: &str, manifest_url: Option<&str>) -> RepoCacheResult<String> {
    if !fetch.starts_with('.') {
        return Ok(fetch.to_string());
    }

    let base = manifest_url
        .ok_or_else(|| manifest_error(format!("relative fetch {} without manifest url", fetch)))?;
    let base = Url::parse(base)
        .map_err(|e| manifest_error(format!("manifest url {}: {}", base, e)))?;
    let joined = base
        .join(fetch)
        .map_err(|e| manifest_error(format!("fetch {}: {}", fetch, e)))?;
    Ok(joined.to_string())
}

fn manifest_error(stderr: String) -> RepoCacheError {
    RepoCacheError::Manifest {
        command: "repo manifest".to_string(),
        stderr,
    }
}
