//! sentineld - The deep work sentinel
//!
//! This is the main entry point for the sentinel service.
//! It wires together all the components:
//! - Configuration loading and startup overrides
//! - Detection feed (stdin or file) and console overlay
//! - Core engine (distraction tracking, cooldown, trigger gate)
//! - Notifier worker (Ollama, Google Translate TTS, external player)

use anyhow::{Context, Result, bail};
use clap::Parser;
use sentinel_config::{Overrides, Policy, default_policy, load_config_with_overrides};
use sentinel_core::{
    Monitor, MonitorStats, NotifierSettings, NotifierWorker, SentinelEngine, StopReason,
    notification_queue,
};
use sentinel_host_api::{EmbeddedDetector, FrameSource};
use sentinel_host_linux::{
    CommandPlayer, ConsoleOverlay, GoogleTranslateTts, JsonLinesFeed, OllamaGenerator,
};
use sentinel_util::{SENTINEL_CONFIG_ENV, default_config_path};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// sentineld - Scolds you out loud when your phone stays in view
#[derive(Parser, Debug)]
#[command(name = "sentineld")]
#[command(about = "Watches a detection feed and scolds sustained distraction", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/sentinel/config.toml,
    /// built-in defaults when absent)
    #[arg(short, long, env = SENTINEL_CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Detection feed file, one JSON frame per line (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Detector class id treated as the distraction
    #[arg(long, env = "SENTINEL_TARGET_CLASS_ID")]
    target_class_id: Option<i64>,

    /// Minimum confidence (exclusive) for a detection to count
    #[arg(long, env = "SENTINEL_CONFIDENCE_THRESHOLD")]
    confidence_threshold: Option<f64>,

    /// Seconds of continuous presence before escalating
    #[arg(long, env = "SENTINEL_DISTRACTION_LIMIT")]
    distraction_limit: Option<f64>,

    /// Minimum seconds between notifications
    #[arg(long, env = "SENTINEL_COOLDOWN_SECONDS")]
    cooldown: Option<f64>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            target_class_id: self.target_class_id,
            confidence_threshold: self.confidence_threshold,
            distraction_limit_seconds: self.distraction_limit,
            cooldown_seconds: self.cooldown,
        }
    }
}

/// Load the policy from `explicit`, or from `fallback` when no path was
/// given. Only a missing fallback file means built-in defaults.
fn load_policy(explicit: Option<&Path>, fallback: &Path, overrides: &Overrides) -> Result<Policy> {
    let path = match explicit {
        Some(path) => path,
        None if !fallback.exists() => {
            info!(
                config_path = %fallback.display(),
                "No configuration file, using built-in defaults"
            );
            return default_policy(overrides).context("Invalid startup overrides");
        }
        None => fallback,
    };

    let policy = load_config_with_overrides(path, overrides)
        .with_context(|| format!("Failed to load config from {:?}", path))?;

    info!(config_path = %path.display(), "Configuration loaded");
    Ok(policy)
}

fn build_worker(policy: &Policy) -> Result<NotifierWorker> {
    let notifier = &policy.notifier;

    let generator = OllamaGenerator::new(&notifier.generator)
        .context("Failed to set up generation backend")?;
    let synthesizer = GoogleTranslateTts::new(notifier.generator.timeout)
        .context("Failed to set up speech backend")?;
    let player = CommandPlayer::new(notifier.player_argv.clone())
        .context("Failed to set up audio player")?;

    info!(
        endpoint = %notifier.generator.endpoint,
        model = %notifier.generator.model,
        language = %notifier.speech.language,
        tld = %notifier.speech.tld,
        player = ?notifier.player_argv,
        "Notifier configured"
    );

    Ok(NotifierWorker::new(
        Arc::new(generator),
        Arc::new(synthesizer),
        Arc::new(player),
        NotifierSettings::from(notifier),
    ))
}

/// Resolves on SIGTERM, SIGINT or SIGHUP
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
    let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
            _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully"),
            _ = sighup.recv() => info!("Received SIGHUP, shutting down gracefully"),
        }
    })
}

/// Run the frame loop to completion, then ask the notifier to exit
async fn watch<S: FrameSource>(
    engine: SentinelEngine,
    source: S,
    shutdown: impl Future<Output = ()>,
) -> (StopReason, MonitorStats) {
    let mut monitor = Monitor::new(engine, source, EmbeddedDetector, ConsoleOverlay::default());
    let reason = monitor.run(shutdown).await;

    if !monitor.engine().shutdown_notifier() {
        warn!("Notifier already gone at shutdown");
    }

    (reason, monitor.stats())
}

async fn run(args: Args) -> Result<()> {
    let policy = load_policy(
        args.config.as_deref(),
        &default_config_path(),
        &args.overrides(),
    )?;

    let (gate, queue) = notification_queue();
    let worker = build_worker(&policy)?.spawn(queue);
    let engine = SentinelEngine::new(&policy, gate);
    let shutdown = shutdown_signal()?;

    let (reason, stats) = match &args.input {
        Some(path) => {
            let feed = JsonLinesFeed::open(path)
                .await
                .with_context(|| format!("Failed to open detection feed {:?}", path))?;
            watch(engine, feed, shutdown).await
        }
        None => watch(engine, JsonLinesFeed::stdin(), shutdown).await,
    };

    info!("Waiting for notifier to finish");
    let report = worker.await.context("Notifier task failed")?;

    info!(
        frames = stats.frames,
        detection_errors = stats.detection_errors,
        escalations = stats.escalations_submitted,
        utterances = report.completed,
        failed_utterances = report.failed,
        "Shutdown complete"
    );

    if let StopReason::AcquisitionFailed(message) = reason {
        error!(error = %message, "Stopped on acquisition failure");
        bail!("Frame acquisition failed: {}", message);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "sentineld starting");

    let code = match run(args).await {
        Ok(()) => 0,
        Err(e) => {
            error!(error = ?e, "sentineld failed");
            1
        }
    };

    // A pending stdin read cannot be cancelled and would hold up runtime shutdown
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_config_flag_is_optional() {
        let args = Args::try_parse_from(["sentineld", "--cooldown", "4"]).unwrap();
        assert_eq!(args.overrides().cooldown_seconds, Some(4.0));

        let args = Args::try_parse_from(["sentineld", "--config", "/tmp/sentinel.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/tmp/sentinel.toml")));
    }

    #[test]
    fn test_missing_default_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("config.toml");
        let overrides = Overrides {
            distraction_limit_seconds: Some(5.0),
            ..Default::default()
        };

        let policy = load_policy(None, &fallback, &overrides).unwrap();
        assert_eq!(policy.timing.distraction_limit, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("config.toml");

        // Naming the default location explicitly still requires the file
        assert!(load_policy(Some(&fallback), &fallback, &Overrides::default()).is_err());
    }

    #[test]
    fn test_default_location_is_read_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("config.toml");
        std::fs::write(
            &fallback,
            "config_version = 1\n[timing]\ncooldown_seconds = 12.0\n",
        )
        .unwrap();

        let policy = load_policy(None, &fallback, &Overrides::default()).unwrap();
        assert_eq!(policy.timing.cooldown, Duration::from_secs(12));
    }
}
