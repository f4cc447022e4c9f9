//! Multi-project checkout orchestration
//!
//! Drives a full checkout through its phases:
//! - seed checkout of the base repository
//! - manifest init and project enumeration
//! - parallel archive downloads, serialized extraction
//! - fallback sync, stats persistence, structural verification

mod orchestrator;
pub mod stats;

pub use orchestrator::{CheckoutPlan, Orchestrator};
pub use stats::{CheckoutStats, ProjectStats, STATS_FILE};
