//! Shared utilities for the sentinel
//!
//! This crate provides:
//! - ID types (JobId)
//! - Time utilities (monotonic time, duration helpers)
//! - Default paths for config and scratch audio

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
