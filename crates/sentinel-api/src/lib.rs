//! Shared types for the sentinel
//!
//! This crate defines the data passed between the frame loop, its external
//! collaborators and the core engine:
//! - Detections (raw detector output and validated detections)
//! - Per-frame detection events
//! - Distraction states and frame actions
//! - Overlay drawing instructions

mod detection;
mod overlay;
mod types;

pub use detection::*;
pub use overlay::*;
pub use types::*;
