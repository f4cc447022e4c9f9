//! Per-run checkout timing record

use crate::error::{RepoCacheError, RepoCacheResult};
use crate::manifest::METADATA_DIR;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Stats file name inside the workspace metadata directory
pub const STATS_FILE: &str = ".repocache-stats.json";

/// Time spent on one project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    /// Milliseconds spent downloading and extracting
    pub duration: u64,
}

/// Timing record for one checkout run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutStats {
    /// When downloads began; seed checkout and workspace init are not counted
    pub start: DateTime<Utc>,
    pub stop: Option<DateTime<Utc>>,
    /// Total run time in milliseconds, set when the run finishes
    pub duration: Option<u64>,
    pub projects: BTreeMap<String, ProjectStats>,
}

impl CheckoutStats {
    /// Start a new record now
    pub fn new() -> Self {
        Self {
            start: Utc::now(),
            stop: None,
            duration: None,
            projects: BTreeMap::new(),
        }
    }

    /// Add time spent on a project, creating its entry if needed
    pub fn record(&mut self, project: &str, elapsed: Duration) {
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let entry = self.projects.entry(project.to_string()).or_default();
        entry.duration = entry.duration.saturating_add(millis);
    }

    /// Merge a phase's timing contributions
    pub fn record_all<I>(&mut self, timings: I)
    where
        I: IntoIterator<Item = (String, Duration)>,
    {
        for (project, elapsed) in timings {
            self.record(&project, elapsed);
        }
    }

    /// Stamp the stop time and total duration
    pub fn finish(&mut self) {
        let stop = Utc::now();
        let millis = (stop - self.start).num_milliseconds().max(0);
        self.stop = Some(stop);
        self.duration = Some(millis as u64);
    }

    /// Stats file location for a workspace root
    pub fn path(root: &Path) -> PathBuf {
        root.join(METADATA_DIR).join(STATS_FILE)
    }

    /// Load stats from file
    pub async fn load(path: &Path) -> RepoCacheResult<Self> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            RepoCacheError::io(format!("reading stats file {}", path.display()), e)
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save stats to file
    pub async fn save(&self, path: &Path) -> RepoCacheResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await.map_err(|e| {
            RepoCacheError::io(format!("writing stats file {}", path.display()), e)
        })
    }
}

impl Default for CheckoutStats {
    fn default() -> Self {
        Self::new()
    }
}
