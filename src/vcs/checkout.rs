//! Subprocess-backed checkout for git and mercurial

use crate::cache::{derive_key, normalize, ArchiveCache};
use crate::error::{RepoCacheError, RepoCacheResult};
use crate::process;
use crate::vcs::{Checkout, CheckoutRequest, VcsKind};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info};

/// Source of whole-repository clone archives
pub struct CloneCache {
    pub client: Arc<dyn ArchiveCache>,
    /// Namespace prefix clone archives are indexed under
    pub namespace: String,
    /// Branch component of clone archive keys
    pub branch: String,
}

/// Checkout driving the `git` / `hg` command line tools
///
/// A missing working copy is restored from the clone cache; a real clone
/// only happens when the request sets `force_clone`.
pub struct VcsCheckout {
    clone_cache: Option<CloneCache>,
}

impl VcsCheckout {
    /// Checkout that restores missing working copies from `cache`
    pub fn new(cache: CloneCache) -> Self {
        Self {
            clone_cache: Some(cache),
        }
    }

    /// Checkout without a clone cache; only forced clones can create working copies
    pub fn direct() -> Self {
        Self { clone_cache: None }
    }

    async fn exec(&self, vcs: VcsKind, args: Vec<String>) -> RepoCacheResult<String> {
        let output = process::run(vcs.program(), &args, None).await?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(RepoCacheError::checkout(output.command, output.stderr))
        }
    }

    /// Ensure the existing working copy belongs to the requested repository
    async fn verify_origin(&self, vcs: VcsKind, request: &CheckoutRequest) -> RepoCacheResult<()> {
        let origin = self.exec(vcs, origin_args(vcs, &request.dest_dir)).await?;
        let expected = normalize(&request.base_url)?;
        let actual = normalize(&origin)?;

        if actual != expected {
            return Err(RepoCacheError::checkout(
                format!("{} origin of {}", vcs, request.dest_dir.display()),
                format!("working copy points at {}, expected {}", origin, request.base_url),
            ));
        }
        Ok(())
    }

    /// Create the working copy, by forced clone or from the clone cache
    async fn materialize(&self, request: &CheckoutRequest) -> RepoCacheResult<VcsKind> {
        if request.force_clone {
            info!(
                "Cloning {} into {}",
                request.base_url,
                request.dest_dir.display()
            );
            let vcs = request.vcs;
            self.exec(vcs, clone_args(vcs, &request.base_url, &request.dest_dir))
                .await?;
            return Ok(vcs);
        }

        self.restore_from_cache(request).await?;
        let vcs = VcsKind::detect(&request.dest_dir).ok_or_else(|| {
            RepoCacheError::checkout(
                format!("restore {}", request.base_url),
                "clone archive did not contain a working copy",
            )
        })?;
        self.verify_origin(vcs, request).await?;
        Ok(vcs)
    }

    async fn restore_from_cache(&self, request: &CheckoutRequest) -> RepoCacheResult<()> {
        let identity = normalize(&request.base_url)?;
        let Some(cache) = &self.clone_cache else {
            return Err(RepoCacheError::CacheMissWithoutForce {
                projects: vec![identity.to_string()],
            });
        };

        let key = derive_key(&identity, &cache.branch, &cache.namespace)?;
        let scratch =
            TempDir::new().map_err(|e| RepoCacheError::io("creating download directory", e))?;

        match cache.client.fetch_if_available(&key, scratch.path()).await? {
            Some(archive) => {
                info!(
                    "Restoring {} from cached clone {}",
                    identity,
                    key.namespace()
                );
                cache.client.extract(&archive, &request.dest_dir).await
            }
            None => Err(RepoCacheError::CacheMissWithoutForce {
                projects: vec![identity.to_string()],
            }),
        }
    }

    /// Fetch the requested reference and pin the working copy
    async fn update(&self, vcs: VcsKind, request: &CheckoutRequest) -> RepoCacheResult<()> {
        debug!(
            "Fetching {:?} from {} into {}",
            request.fetch_ref(),
            request.head_url(),
            request.dest_dir.display()
        );
        self.exec(vcs, fetch_args(vcs, request)).await?;
        self.exec(vcs, pin_args(vcs, request)).await?;
        Ok(())
    }
}

#[async_trait]
impl Checkout for VcsCheckout {
    async fn checkout(&self, request: &CheckoutRequest) -> RepoCacheResult<()> {
        let vcs = match VcsKind::detect(&request.dest_dir) {
            Some(vcs) => {
                debug!("Updating existing {} working copy", vcs);
                self.verify_origin(vcs, request).await?;
                vcs
            }
            None => self.materialize(request).await?,
        };

        self.update(vcs, request).await
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn origin_args(vcs: VcsKind, dir: &Path) -> Vec<String> {
    match vcs {
        VcsKind::Git => vec![
            "-C".into(),
            path_arg(dir),
            "config".into(),
            "--get".into(),
            "remote.origin.url".into(),
        ],
        VcsKind::Mercurial => vec![
            "--cwd".into(),
            path_arg(dir),
            "paths".into(),
            "default".into(),
        ],
    }
}

fn clone_args(vcs: VcsKind, url: &str, dir: &Path) -> Vec<String> {
    match vcs {
        VcsKind::Git | VcsKind::Mercurial => vec!["clone".into(), url.into(), path_arg(dir)],
    }
}

fn fetch_args(vcs: VcsKind, request: &CheckoutRequest) -> Vec<String> {
    let dir = path_arg(&request.dest_dir);
    let mut args = match vcs {
        VcsKind::Git => vec!["-C".into(), dir, "fetch".into(), request.head_url().into()],
        VcsKind::Mercurial => vec!["--cwd".into(), dir, "pull".into(), request.head_url().into()],
    };
    if let Some(reference) = request.fetch_ref() {
        if vcs == VcsKind::Mercurial {
            args.push("-r".into());
        }
        args.push(reference.into());
    }
    args
}

fn pin_args(vcs: VcsKind, request: &CheckoutRequest) -> Vec<String> {
    let dir = path_arg(&request.dest_dir);
    match vcs {
        VcsKind::Git => {
            let target = request.head_rev.as_deref().unwrap_or("FETCH_HEAD");
            vec![
                "-C".into(),
                dir,
                "checkout".into(),
                "--force".into(),
                target.into(),
            ]
        }
        VcsKind::Mercurial => {
            let target = request
                .head_rev
                .as_deref()
                .or(request.head_ref.as_deref())
                .unwrap_or("default");
            vec![
                "--cwd".into(),
                dir,
                "update".into(),
                "--clean".into(),
                "-r".into(),
                target.into(),
            ]
        }
    }
}
