//! Notification backend traits: generation, synthesis, playback

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from notification backends.
///
/// All of these are recoverable: the notifier logs them and moves on.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("Playback failed: {0}")]
    Playback(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Request sent to the language-generation backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Fixed persona prompt plus instruction
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

/// Locale selection for speech synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechOptions {
    /// Language code, e.g. "en"
    pub language: String,
    /// Accent selector, e.g. "co.uk"
    pub tld: String,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            language: "en".into(),
            tld: "co.uk".into(),
        }
    }
}

/// Result of running the external player.
///
/// The exit status is recorded for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackOutcome {
    pub exit_code: Option<i32>,
}

impl PlaybackOutcome {
    pub fn success() -> Self {
        Self { exit_code: Some(0) }
    }

    pub fn success_reported(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Produces the text of one utterance
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> NotifyResult<String>;
}

/// Renders text to encoded audio bytes
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, options: &SpeechOptions) -> NotifyResult<Vec<u8>>;
}

/// Plays an audio file to completion
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, path: &Path) -> NotifyResult<PlaybackOutcome>;
}
