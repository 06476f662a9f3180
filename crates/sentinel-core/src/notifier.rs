//! Notifier worker: generate a rebuke, render it, play it

use chrono::{DateTime, Local};
use sentinel_config::NotifierConfig;
use sentinel_host_api::{
    AudioPlayer, GenerationRequest, MessageGenerator, NotifyError, NotifyResult,
    PlaybackOutcome, SpeechOptions, SpeechSynthesizer,
};
use sentinel_util::JobId;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{JobReceiver, NotificationJob, WorkerMessage};

/// Static settings for the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierSettings {
    pub prompt: String,
    pub speech: SpeechOptions,
    pub scratch_path: PathBuf,
}

impl From<&NotifierConfig> for NotifierSettings {
    fn from(config: &NotifierConfig) -> Self {
        Self {
            prompt: config.prompt.clone(),
            speech: SpeechOptions {
                language: config.speech.language.clone(),
                tld: config.speech.tld.clone(),
            },
            scratch_path: config.scratch_path.clone(),
        }
    }
}

/// One spoken rebuke
#[derive(Debug, Clone)]
pub struct Utterance {
    pub job_id: JobId,
    pub text: String,
    pub playback: PlaybackOutcome,
    pub spoken_at: DateTime<Local>,
}

/// Tally returned when the worker exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub completed: u64,
    pub failed: u64,
}

/// Background worker that turns trigger tokens into spoken rebukes.
///
/// Jobs are handled strictly one at a time; playback finishes before the
/// next message is read. Failures are logged and never end the loop.
pub struct NotifierWorker {
    generator: Arc<dyn MessageGenerator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    player: Arc<dyn AudioPlayer>,
    settings: NotifierSettings,
}

impl NotifierWorker {
    pub fn new(
        generator: Arc<dyn MessageGenerator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        player: Arc<dyn AudioPlayer>,
        settings: NotifierSettings,
    ) -> Self {
        Self {
            generator,
            synthesizer,
            player,
            settings,
        }
    }

    /// Run the worker on its own task
    pub fn spawn(self, queue: JobReceiver) -> JoinHandle<WorkerReport> {
        tokio::spawn(self.run(queue))
    }

    pub async fn run(self, mut queue: JobReceiver) -> WorkerReport {
        let mut report = WorkerReport::default();

        info!(scratch_path = %self.settings.scratch_path.display(), "Notifier ready");

        loop {
            let job = match queue.recv().await {
                Some(WorkerMessage::Job(job)) => job,
                Some(WorkerMessage::Shutdown) => {
                    info!("Notifier received shutdown");
                    break;
                }
                None => {
                    debug!("Notifier queue closed");
                    break;
                }
            };

            match self.handle_job(job).await {
                Ok(utterance) => {
                    report.completed += 1;
                    info!(
                        job_id = %utterance.job_id,
                        text = %utterance.text,
                        exit_code = ?utterance.playback.exit_code,
                        spoken_at = %utterance.spoken_at.format("%H:%M:%S%.3f"),
                        "Utterance played"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(job_id = %job.id, error = %e, "Utterance failed");
                }
            }

            queue.tracker.complete();
        }

        info!(
            completed = report.completed,
            failed = report.failed,
            "Notifier stopped"
        );
        report
    }

    async fn handle_job(&self, job: NotificationJob) -> NotifyResult<Utterance> {
        debug!(job_id = %job.id, "Generating rebuke");

        let request = GenerationRequest::new(self.settings.prompt.clone());
        let raw = self.generator.generate(&request).await?;
        let text = clean_utterance(&raw)
            .ok_or_else(|| NotifyError::Generation("Empty response".into()))?;

        info!(job_id = %job.id, text = %text, "Rebuke generated");

        let audio = self
            .synthesizer
            .synthesize(&text, &self.settings.speech)
            .await?;
        write_scratch(&self.settings.scratch_path, &audio).await?;

        let playback = self.player.play(&self.settings.scratch_path).await?;
        if !playback.success_reported() {
            debug!(job_id = %job.id, exit_code = ?playback.exit_code, "Player reported non-zero exit");
        }

        Ok(Utterance {
            job_id: job.id,
            text,
            playback,
            spoken_at: sentinel_util::now(),
        })
    }
}

/// Trim generated text and strip wrapping quotes.
/// Returns `None` when nothing speakable is left.
pub fn clean_utterance(raw: &str) -> Option<String> {
    const QUOTES: &[char] = &['"', '\'', '“', '”', '‘', '’', '`'];

    let text = raw
        .trim()
        .trim_start_matches(QUOTES)
        .trim_end_matches(QUOTES)
        .trim();

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Replace the scratch file: remove any previous file, then write.
///
/// Not atomic; safe only while a single worker reads and writes the path.
pub async fn write_scratch(path: &Path, audio: &[u8]) -> NotifyResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    tokio::fs::write(path, audio).await?;
    Ok(())
}
