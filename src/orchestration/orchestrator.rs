//! Checkout state machine
//!
//! `SeedCheckout → ManifestInit → Enumerate → DownloadPhase → ExtractPhase →
//! FallbackSync → Persist → Done`, aborting from `ExtractPhase` when a
//! project has no cached archive and force-clone was not requested.
//!
//! Downloads run through a bounded pool and only write to private scratch
//! paths. Extraction is strictly sequential in enumeration order, because
//! nested projects share parent directories that are created on demand.

use crate::cache::{derive_key, normalize, ArchiveCache, ArchiveDescriptor, ArchiveState};
use crate::error::{RepoCacheError, RepoCacheResult};
use crate::manifest::{InitOptions, ManifestTool, Project, METADATA_DIR};
use crate::orchestration::stats::CheckoutStats;
use crate::vcs::{Checkout, CheckoutRequest};
use futures_util::stream::{self, StreamExt};
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Everything a multi-project checkout needs to know
#[derive(Debug, Clone, Default)]
pub struct CheckoutPlan {
    /// Workspace root
    pub dest_dir: PathBuf,
    /// Seed repository
    pub base_url: String,
    /// Manifest path or URL used to initialize the workspace
    pub manifest: String,
    pub head_url: Option<String>,
    pub head_rev: Option<String>,
    pub head_ref: Option<String>,
    /// Manifest branch, also the branch component of cache keys
    pub branch: String,
    /// Namespace prefix for project archives
    pub namespace: String,
    /// Allow real clones for projects without a cached archive
    pub force_clone: bool,
    /// Projects synced in parallel by the fallback sync
    pub sync_jobs: usize,
    /// Download pool size (`None` = one worker per project)
    pub download_jobs: Option<usize>,
    pub repo_url: Option<String>,
    pub repo_revision: Option<String>,
}

impl CheckoutPlan {
    fn seed_request(&self) -> CheckoutRequest {
        CheckoutRequest {
            dest_dir: self.dest_dir.clone(),
            base_url: self.base_url.clone(),
            head_url: self.head_url.clone(),
            head_rev: self.head_rev.clone(),
            head_ref: self.head_ref.clone(),
            force_clone: self.force_clone,
            ..CheckoutRequest::default()
        }
    }

    fn init_options(&self) -> InitOptions {
        InitOptions {
            branch: self.branch.clone(),
            repo_url: self.repo_url.clone(),
            repo_revision: self.repo_revision.clone(),
        }
    }
}

enum State {
    SeedCheckout,
    ManifestInit,
    Enumerate,
    DownloadPhase(Vec<Project>),
    ExtractPhase(Vec<ArchiveDescriptor>),
    FallbackSync,
    Persist,
    Done,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SeedCheckout => "SeedCheckout",
            Self::ManifestInit => "ManifestInit",
            Self::Enumerate => "Enumerate",
            Self::DownloadPhase(_) => "DownloadPhase",
            Self::ExtractPhase(_) => "ExtractPhase",
            Self::FallbackSync => "FallbackSync",
            Self::Persist => "Persist",
            Self::Done => "Done",
        };
        f.write_str(name)
    }
}

/// Multi-project checkout driver
pub struct Orchestrator<'a> {
    checkout: &'a dyn Checkout,
    manifest: &'a dyn ManifestTool,
    cache: &'a dyn ArchiveCache,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        checkout: &'a dyn Checkout,
        manifest: &'a dyn ManifestTool,
        cache: &'a dyn ArchiveCache,
    ) -> Self {
        Self {
            checkout,
            manifest,
            cache,
        }
    }

    /// Run a checkout to completion, returning the persisted stats
    pub async fn run(&self, plan: &CheckoutPlan) -> RepoCacheResult<CheckoutStats> {
        let mut stats = CheckoutStats::new();
        let mut state = State::SeedCheckout;

        loop {
            debug!("Entering {}", state);
            state = match state {
                State::SeedCheckout => {
                    self.checkout.checkout(&plan.seed_request()).await?;
                    State::ManifestInit
                }
                State::ManifestInit => {
                    self.manifest
                        .init(&plan.dest_dir, &plan.manifest, &plan.init_options())
                        .await?;
                    State::Enumerate
                }
                State::Enumerate => {
                    let projects = self.manifest.list_projects(&plan.dest_dir).await?;
                    info!("Workspace declares {} project(s)", projects.len());
                    State::DownloadPhase(projects)
                }
                State::DownloadPhase(projects) => {
                    // Timing covers downloads, extraction and sync only
                    stats = CheckoutStats::new();
                    let downloads = match self.download_phase(plan, &projects).await {
                        Ok(downloads) => downloads,
                        Err(e) => {
                            self.discard_downloads(plan).await;
                            return Err(e);
                        }
                    };
                    let mut descriptors = Vec::with_capacity(downloads.len());
                    for (descriptor, elapsed) in downloads {
                        stats.record(&descriptor.project_name, elapsed);
                        descriptors.push(descriptor);
                    }
                    State::ExtractPhase(descriptors)
                }
                State::ExtractPhase(descriptors) => {
                    let extracted = self.extract_phase(plan, descriptors).await;
                    self.discard_downloads(plan).await;
                    match extracted {
                        Ok(timings) => stats.record_all(timings),
                        Err(e) => {
                            if matches!(e, RepoCacheError::CacheMissWithoutForce { .. }) {
                                warn!("Aborting checkout: {}", e);
                            }
                            return Err(e);
                        }
                    }
                    State::FallbackSync
                }
                State::FallbackSync => {
                    self.manifest
                        .sync(&plan.dest_dir, plan.sync_jobs.max(1))
                        .await?;
                    State::Persist
                }
                State::Persist => {
                    stats.finish();
                    let path = CheckoutStats::path(&plan.dest_dir);
                    if plan.dest_dir.join(METADATA_DIR).is_dir() {
                        stats.save(&path).await?;
                        info!("Wrote checkout stats to {}", path.display());
                    } else {
                        warn!("Skipping stats, {} does not exist", METADATA_DIR);
                    }
                    State::Done
                }
                State::Done => {
                    let metadata = plan.dest_dir.join(METADATA_DIR);
                    if !metadata.is_dir() {
                        return Err(RepoCacheError::StructuralOutputMissing(metadata));
                    }
                    return Ok(stats);
                }
            };
        }
    }

    /// Drop leftover scratch archives. Failures are logged, never fatal.
    async fn discard_downloads(&self, plan: &CheckoutPlan) {
        if let Err(e) = self.cache.discard_downloads(&plan.dest_dir).await {
            warn!("Failed to discard downloads: {}", e);
        }
    }

    /// Fetch archives for every project not already present locally.
    ///
    /// Results keep enumeration order. Every task resolves before the first
    /// error, if any, is returned.
    async fn download_phase(
        &self,
        plan: &CheckoutPlan,
        projects: &[Project],
    ) -> RepoCacheResult<Vec<(ArchiveDescriptor, Duration)>> {
        let pool_size = plan.download_jobs.unwrap_or(projects.len()).max(1);
        debug!(
            "Downloading archives for {} project(s), {} at a time",
            projects.len(),
            pool_size
        );

        let results: Vec<RepoCacheResult<(ArchiveDescriptor, Duration)>> =
            stream::iter(projects)
                .map(|project| self.download_project(plan, project))
                .buffered(pool_size)
                .collect()
                .await;

        results.into_iter().collect()
    }

    async fn download_project(
        &self,
        plan: &CheckoutPlan,
        project: &Project,
    ) -> RepoCacheResult<(ArchiveDescriptor, Duration)> {
        if project.store_path(&plan.dest_dir).exists() {
            debug!("{} already present, skipping cache", project.name);
            return Ok((
                ArchiveDescriptor::new(&project.name, ArchiveState::Present),
                Duration::ZERO,
            ));
        }

        let started = Instant::now();
        let identity = normalize(&project.remote)?;
        let key = derive_key(&identity, &plan.branch, &plan.namespace)?;
        let state = match self.cache.fetch_if_available(&key, &plan.dest_dir).await? {
            Some(path) => ArchiveState::Fetched(path),
            None => ArchiveState::Miss,
        };
        debug!("{}: {}", project.name, state);

        Ok((ArchiveDescriptor::new(&project.name, state), started.elapsed()))
    }

    /// Extract fetched archives one at a time, in order.
    ///
    /// Misses without force-clone do not stop the remaining extractions;
    /// they are reported together once the loop is done.
    async fn extract_phase(
        &self,
        plan: &CheckoutPlan,
        descriptors: Vec<ArchiveDescriptor>,
    ) -> RepoCacheResult<Vec<(String, Duration)>> {
        let mut timings = Vec::new();
        let mut misses = Vec::new();

        for descriptor in descriptors {
            match descriptor.state {
                ArchiveState::Present => {}
                ArchiveState::Miss if plan.force_clone => {
                    info!("No cached copy of {}, sync will clone it", descriptor.project_name);
                }
                ArchiveState::Miss => {
                    warn!("Cached copy of {} could not be found", descriptor.project_name);
                    misses.push(descriptor.project_name);
                }
                ArchiveState::Fetched(path) => {
                    let started = Instant::now();
                    self.cache.extract(&path, &plan.dest_dir).await?;
                    debug!("Extracted {}", descriptor.project_name);
                    timings.push((descriptor.project_name, started.elapsed()));
                }
            }
        }

        if !misses.is_empty() {
            return Err(RepoCacheError::CacheMissWithoutForce { projects: misses });
        }
        Ok(timings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, DOWNLOAD_DIR};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    type Events = Arc<Mutex<Vec<String>>>;

    fn project(name: &str) -> Project {
        Project {
            name: name.to_string(),
            path: name.to_string(),
            remote: format!("https://git.example.com/b2g/{}.git", name),
        }
    }

    struct FakeCheckout {
        events: Events,
        requests: Mutex<Vec<CheckoutRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl Checkout for FakeCheckout {
        async fn checkout(&self, request: &CheckoutRequest) -> RepoCacheResult<()> {
            self.events.lock().unwrap().push("checkout".to_string());
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(RepoCacheError::checkout("git fetch", "fatal: unreachable"));
            }
            Ok(())
        }
    }

    struct FakeManifest {
        events: Events,
        projects: Vec<Project>,
        create_metadata: bool,
        init_delay: Duration,
    }

    #[async_trait]
    impl ManifestTool for FakeManifest {
        async fn init(&self, dir: &Path, _manifest: &str, options: &InitOptions) -> RepoCacheResult<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("init:{}", options.branch));
            tokio::time::sleep(self.init_delay).await;
            if self.create_metadata {
                std::fs::create_dir_all(dir.join(METADATA_DIR)).unwrap();
            }
            Ok(())
        }

        async fn list_projects(&self, _dir: &Path) -> RepoCacheResult<Vec<Project>> {
            Ok(self.projects.clone())
        }

        async fn sync(&self, dir: &Path, concurrency: usize) -> RepoCacheResult<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("sync:{}", concurrency));
            // A real sync clones whatever is still missing
            for project in &self.projects {
                std::fs::create_dir_all(project.store_path(dir)).unwrap();
            }
            Ok(())
        }
    }

    #[derive(Clone, Copy)]
    enum Outcome {
        Hit,
        Miss,
        Broken,
        Corrupt,
    }

    struct FakeCache {
        events: Events,
        outcomes: HashMap<String, Outcome>,
        fetches: Mutex<Vec<String>>,
        extractions: Mutex<Vec<(String, Instant, Instant)>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeCache {
        fn new(events: Events, outcomes: &[(&str, Outcome)]) -> Self {
            Self {
                events,
                outcomes: outcomes
                    .iter()
                    .map(|(name, outcome)| (name.to_string(), *outcome))
                    .collect(),
                fetches: Mutex::new(vec![]),
                extractions: Mutex::new(vec![]),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ArchiveCache for FakeCache {
        async fn fetch_if_available(
            &self,
            key: &CacheKey,
            dest_dir: &Path,
        ) -> RepoCacheResult<Option<PathBuf>> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            // key name is "git.example.com/b2g/<project>/<branch>"
            let project = key.name().split('/').nth(2).unwrap().to_string();
            self.fetches.lock().unwrap().push(project.clone());

            match self.outcomes.get(&project).copied().unwrap_or(Outcome::Miss) {
                Outcome::Hit => {
                    let downloads = dest_dir.join(DOWNLOAD_DIR);
                    std::fs::create_dir_all(&downloads).unwrap();
                    let archive = downloads.join(key.digest());
                    std::fs::write(&archive, &project).unwrap();
                    Ok(Some(archive))
                }
                Outcome::Corrupt => {
                    let downloads = dest_dir.join(DOWNLOAD_DIR);
                    std::fs::create_dir_all(&downloads).unwrap();
                    let archive = downloads.join(key.digest());
                    std::fs::write(&archive, format!("!{}", project)).unwrap();
                    Ok(Some(archive))
                }
                Outcome::Miss => Ok(None),
                Outcome::Broken => Err(RepoCacheError::transport(key.namespace(), "connection reset")),
            }
        }

        async fn extract(&self, archive_path: &Path, dest_dir: &Path) -> RepoCacheResult<()> {
            let started = Instant::now();
            let project = std::fs::read_to_string(archive_path).unwrap();
            if project.starts_with('!') {
                return Err(RepoCacheError::ArchiveExtract {
                    path: archive_path.to_path_buf(),
                    reason: "unexpected end of file".to_string(),
                });
            }
            self.events
                .lock()
                .unwrap()
                .push(format!("extract:{}", project));
            tokio::time::sleep(Duration::from_millis(5)).await;
            std::fs::create_dir_all(project_store(dest_dir, &project)).unwrap();
            std::fs::remove_file(archive_path).unwrap();
            self.extractions
                .lock()
                .unwrap()
                .push((project, started, Instant::now()));
            Ok(())
        }

        async fn discard_downloads(&self, dest_dir: &Path) -> RepoCacheResult<()> {
            let downloads = dest_dir.join(DOWNLOAD_DIR);
            if downloads.exists() {
                std::fs::remove_dir_all(downloads).unwrap();
            }
            Ok(())
        }
    }

    fn project_store(root: &Path, name: &str) -> PathBuf {
        project(name).store_path(root)
    }

    struct Harness {
        dir: TempDir,
        events: Events,
        checkout: FakeCheckout,
        manifest: FakeManifest,
        cache: FakeCache,
    }

    impl Harness {
        fn new(projects: &[&str], outcomes: &[(&str, Outcome)]) -> Self {
            let events: Events = Arc::new(Mutex::new(vec![]));
            Self {
                dir: TempDir::new().unwrap(),
                checkout: FakeCheckout {
                    events: events.clone(),
                    requests: Mutex::new(vec![]),
                    fail: false,
                },
                manifest: FakeManifest {
                    events: events.clone(),
                    projects: projects.iter().map(|p| project(p)).collect(),
                    create_metadata: true,
                    init_delay: Duration::ZERO,
                },
                cache: FakeCache::new(events.clone(), outcomes),
                events,
            }
        }

        fn plan(&self, force_clone: bool) -> CheckoutPlan {
            CheckoutPlan {
                dest_dir: self.dir.path().to_path_buf(),
                base_url: "https://git.example.com/b2g/B2G".to_string(),
                manifest: "https://git.example.com/b2g/b2g-manifest".to_string(),
                branch: "master".to_string(),
                namespace: "tc-vcs.v1.repo-project".to_string(),
                force_clone,
                sync_jobs: 4,
                ..CheckoutPlan::default()
            }
        }

        async fn run(&self, plan: &CheckoutPlan) -> RepoCacheResult<CheckoutStats> {
            Orchestrator::new(&self.checkout, &self.manifest, &self.cache)
                .run(plan)
                .await
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn synced(&self) -> bool {
            self.events().iter().any(|e| e.starts_with("sync:"))
        }

        fn stats_path(&self) -> PathBuf {
            CheckoutStats::path(self.dir.path())
        }
    }

    #[tokio::test]
    async fn cached_and_present_projects() {
        let h = Harness::new(&["proj1", "proj2"], &[("proj1", Outcome::Hit)]);
        std::fs::create_dir_all(project_store(h.dir.path(), "proj2")).unwrap();

        let stats = h.run(&h.plan(false)).await.unwrap();

        assert_eq!(*h.cache.fetches.lock().unwrap(), vec!["proj1"]);
        assert_eq!(h.cache.extractions.lock().unwrap().len(), 1);
        assert_eq!(stats.projects.len(), 2);
        assert_eq!(stats.projects["proj2"].duration, 0);
        assert!(stats.projects["proj1"].duration >= 20);
        assert!(h.synced());

        let persisted = CheckoutStats::load(&h.stats_path()).await.unwrap();
        assert_eq!(persisted.projects, stats.projects);
        assert_eq!(persisted.duration, stats.duration);
    }

    #[tokio::test]
    async fn miss_without_force_aborts_before_sync() {
        let h = Harness::new(&["proj1"], &[]);

        let err = h.run(&h.plan(false)).await.unwrap_err();

        match err {
            RepoCacheError::CacheMissWithoutForce { projects } => {
                assert_eq!(projects, vec!["proj1"])
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!h.synced());
        assert!(!h.stats_path().exists());
        assert!(!project_store(h.dir.path(), "proj1").exists());
        assert!(!h.dir.path().join(DOWNLOAD_DIR).exists());
    }

    #[tokio::test]
    async fn miss_with_force_falls_back_to_sync() {
        let h = Harness::new(&["proj1"], &[]);

        let stats = h.run(&h.plan(true)).await.unwrap();

        assert_eq!(h.cache.fetch_count(), 1);
        assert!(h.cache.extractions.lock().unwrap().is_empty());
        assert!(h.events().contains(&"sync:4".to_string()));
        assert!(project_store(h.dir.path(), "proj1").exists());
        assert!(h.stats_path().exists());
        assert!(stats.stop.is_some());
    }

    #[tokio::test]
    async fn miss_does_not_skip_other_extractions() {
        let h = Harness::new(
            &["proj1", "proj2", "proj3"],
            &[("proj1", Outcome::Hit), ("proj3", Outcome::Hit)],
        );

        let err = h.run(&h.plan(false)).await.unwrap_err();

        assert!(matches!(err, RepoCacheError::CacheMissWithoutForce { ref projects } if projects == &["proj2"]));
        let extracted: Vec<String> = h
            .cache
            .extractions
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _, _)| name.clone())
            .collect();
        assert_eq!(extracted, vec!["proj1", "proj3"]);
        assert!(!h.synced());
    }

    #[tokio::test]
    async fn present_projects_are_never_fetched() {
        let h = Harness::new(&["a", "b", "c"], &[("a", Outcome::Hit)]);
        for name in ["a", "b", "c"] {
            std::fs::create_dir_all(project_store(h.dir.path(), name)).unwrap();
        }

        let stats = h.run(&h.plan(false)).await.unwrap();

        assert_eq!(h.cache.fetch_count(), 0);
        assert!(stats.projects.values().all(|p| p.duration == 0));
    }

    #[tokio::test]
    async fn extraction_is_ordered_and_serial() {
        let names = ["gaia", "gecko", "build", "kernel", "vendor"];
        let outcomes: Vec<(&str, Outcome)> = names.iter().map(|n| (*n, Outcome::Hit)).collect();
        let h = Harness::new(&names, &outcomes);

        h.run(&h.plan(false)).await.unwrap();

        let extractions = h.cache.extractions.lock().unwrap();
        let order: Vec<&str> = extractions.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(order, names);
        for pair in extractions.windows(2) {
            assert!(pair[0].2 <= pair[1].1, "{} overlaps {}", pair[0].0, pair[1].0);
        }
    }

    #[tokio::test]
    async fn transport_error_is_not_a_miss() {
        let h = Harness::new(
            &["proj1", "proj2"],
            &[("proj1", Outcome::Hit), ("proj2", Outcome::Broken)],
        );

        let err = h.run(&h.plan(true)).await.unwrap_err();

        assert!(matches!(err, RepoCacheError::CacheTransport { .. }));
        assert_eq!(h.cache.fetch_count(), 2, "every download resolves first");
        assert!(h.cache.extractions.lock().unwrap().is_empty());
        assert!(!h.synced());
        assert!(
            !h.dir.path().join(DOWNLOAD_DIR).exists(),
            "fetched archives are discarded on abort"
        );
    }

    #[tokio::test]
    async fn failed_extraction_discards_remaining_downloads() {
        let h = Harness::new(
            &["proj1", "proj2", "proj3"],
            &[
                ("proj1", Outcome::Hit),
                ("proj2", Outcome::Corrupt),
                ("proj3", Outcome::Hit),
            ],
        );

        let err = h.run(&h.plan(true)).await.unwrap_err();

        assert!(matches!(err, RepoCacheError::ArchiveExtract { .. }));
        assert!(project_store(h.dir.path(), "proj1").exists());
        assert!(!project_store(h.dir.path(), "proj3").exists());
        assert!(!h.dir.path().join(DOWNLOAD_DIR).exists());
        assert!(!h.synced());
    }

    #[tokio::test]
    async fn stats_start_after_workspace_init() {
        let mut h = Harness::new(&["proj1"], &[("proj1", Outcome::Hit)]);
        h.manifest.init_delay = Duration::from_millis(50);
        let before = chrono::Utc::now();

        let stats = h.run(&h.plan(false)).await.unwrap();

        assert!(stats.start - before >= chrono::Duration::milliseconds(50));
        assert!(stats.stop.unwrap() >= stats.start);
    }

    #[tokio::test]
    async fn download_pool_size_is_respected() {
        let names = ["a", "b", "c", "d"];
        let h = Harness::new(&names, &[]);
        let mut plan = h.plan(true);
        plan.download_jobs = Some(2);

        h.run(&plan).await.unwrap();
        assert_eq!(h.cache.max_in_flight.load(Ordering::SeqCst), 2);

        let h = Harness::new(&names, &[]);
        h.run(&h.plan(true)).await.unwrap();
        assert_eq!(h.cache.max_in_flight.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn seed_failure_is_fatal() {
        let mut h = Harness::new(&["proj1"], &[("proj1", Outcome::Hit)]);
        h.checkout.fail = true;

        let err = h.run(&h.plan(false)).await.unwrap_err();

        assert!(matches!(err, RepoCacheError::Checkout { .. }));
        assert_eq!(h.events(), vec!["checkout"]);
        assert_eq!(h.cache.fetch_count(), 0);
    }

    #[tokio::test]
    async fn seed_request_carries_plan() {
        let h = Harness::new(&[], &[]);
        let mut plan = h.plan(true);
        plan.head_rev = Some("abc123".to_string());
        plan.head_ref = Some("refs/heads/feature".to_string());

        h.run(&plan).await.unwrap();

        let requests = h.checkout.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].force_clone);
        assert_eq!(requests[0].base_url, "https://git.example.com/b2g/B2G");
        assert_eq!(requests[0].fetch_ref(), Some("refs/heads/feature"));
    }

    #[tokio::test]
    async fn empty_workspace_still_syncs() {
        let h = Harness::new(&[], &[]);

        let stats = h.run(&h.plan(false)).await.unwrap();

        assert!(stats.projects.is_empty());
        assert_eq!(h.events(), vec!["checkout", "init:master", "sync:4"]);
    }

    #[tokio::test]
    async fn missing_metadata_is_structural_failure() {
        let mut h = Harness::new(&[], &[]);
        h.manifest.create_metadata = false;

        let err = h.run(&h.plan(false)).await.unwrap_err();

        match err {
            RepoCacheError::StructuralOutputMissing(path) => {
                assert_eq!(path, h.dir.path().join(METADATA_DIR))
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(h.synced());
    }

    #[tokio::test]
    async fn sync_concurrency_is_at_least_one() {
        let h = Harness::new(&[], &[]);
        let mut plan = h.plan(false);
        plan.sync_jobs = 0;

        h.run(&plan).await.unwrap();

        assert!(h.events().contains(&"sync:1".to_string()));
    }
}
