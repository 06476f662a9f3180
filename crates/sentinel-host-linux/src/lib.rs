//! Linux collaborators for the sentinel
//!
//! This crate provides:
//! - JSON-lines detection feed (frames annotated by an upstream detector)
//! - Console overlay sink
//! - Ollama chat client for rebuke generation
//! - Google Translate speech synthesis (gTTS-compatible)
//! - External command audio player (mpg123 by default)

mod console;
mod feed;
mod ollama;
mod player;
mod tts;

pub use console::*;
pub use feed::*;
pub use ollama::*;
pub use player::*;
pub use tts::*;
