//! Distraction engine and notification pipeline for the sentinel
//!
//! This crate is the heart of the sentinel, containing:
//! - Distraction state machine (Idle -> Warming -> Violating -> Idle)
//! - Cooldown between escalations
//! - Trigger gate guarding the single-slot notification queue
//! - Notifier worker (generate -> synthesize -> play) on its own task
//! - Time enforcement using monotonic time

mod cooldown;
mod engine;
mod events;
mod gate;
mod monitor;
mod notifier;
mod session;

pub use cooldown::*;
pub use engine::*;
pub use events::*;
pub use gate::*;
pub use monitor::*;
pub use notifier::*;
pub use session::*;
