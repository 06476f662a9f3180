//! Audio playback through an external command

use async_trait::async_trait;
use sentinel_host_api::{AudioPlayer, NotifyError, NotifyResult, PlaybackOutcome};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs `argv` with the audio file path appended and waits for it to exit.
///
/// The child's exit status is reported but never treated as a failure;
/// only failing to start the command is.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    argv: Vec<String>,
}

impl CommandPlayer {
    pub fn new(argv: Vec<String>) -> NotifyResult<Self> {
        if argv.is_empty() {
            return Err(NotifyError::Playback("Empty player command".into()));
        }
        Ok(Self { argv })
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, path: &Path) -> NotifyResult<PlaybackOutcome> {
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| NotifyError::Playback("Empty player command".into()))?;

        debug!(program = %program, path = %path.display(), "Starting player");

        let status = Command::new(program)
            .args(args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| NotifyError::Playback(format!("Failed to run {}: {}", program, e)))?;

        Ok(PlaybackOutcome {
            exit_code: status.code(),
        })
    }
}
