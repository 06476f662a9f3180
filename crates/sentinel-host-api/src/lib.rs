//! Collaborator trait interfaces for the sentinel
//!
//! This crate defines the capability-based interface between the core and
//! everything outside it: the camera feed, the detector, the display, and the
//! three notification backends (text generation, speech synthesis, playback).
//! It contains no platform code itself, only traits and test doubles.

mod frame;
mod mock;
mod notify;

pub use frame::*;
pub use mock::*;
pub use notify::*;
