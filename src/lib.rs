//! repocache - archive-cache accelerated multi-repository checkouts
//!
//! Materializes manifest-driven source trees by restoring each project from
//! a pre-packaged archive when one exists, and falling back to real
//! version-control operations otherwise.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod orchestration;
mod process;
pub mod vcs;

pub use error::{RepoCacheError, RepoCacheResult};
