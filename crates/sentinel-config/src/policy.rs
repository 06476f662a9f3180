//! Validated policy structures

use crate::schema::RawConfig;
use sentinel_api::TargetFilter;
use sentinel_util::{default_scratch_path, seconds_to_duration};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TARGET_CLASS_ID: u32 = 67;
pub const DEFAULT_TARGET_LABEL: &str = "PHONE";
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_DISTRACTION_LIMIT: Duration = Duration::from_secs(3);
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(8);

pub const DEFAULT_PROMPT: &str = "You are a strict study supervisor. I just got distracted by my phone. \
Give me a ONE sentence, harsh, sarcastic command to get back to work. Do not use quotes.";
pub const DEFAULT_GENERATOR_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_GENERATOR_MODEL: &str = "llama3.2:1b";
pub const DEFAULT_GENERATOR_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SPEECH_LANGUAGE: &str = "en";
pub const DEFAULT_SPEECH_TLD: &str = "co.uk";
pub const DEFAULT_PLAYER_ARGV: [&str; 2] = ["mpg123", "-q"];

/// Validated policy ready for use by the engine and notifier
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub detection: DetectionPolicy,
    pub timing: TimingPolicy,
    pub notifier: NotifierConfig,
}

impl Policy {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            detection: DetectionPolicy::from_raw(&raw),
            timing: TimingPolicy::from_raw(&raw),
            notifier: NotifierConfig::from_raw(raw),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::from_raw(RawConfig::default())
    }
}

/// Target selection
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionPolicy {
    pub target_class_id: u32,
    pub target_label: String,
    pub confidence_threshold: f64,
}

impl DetectionPolicy {
    fn from_raw(raw: &RawConfig) -> Self {
        let d = &raw.detection;
        Self {
            target_class_id: d
                .target_class_id
                .and_then(|id| u32::try_from(id).ok())
                .unwrap_or(DEFAULT_TARGET_CLASS_ID),
            target_label: d
                .target_label
                .clone()
                .unwrap_or_else(|| DEFAULT_TARGET_LABEL.to_string()),
            confidence_threshold: d
                .confidence_threshold
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
        }
    }

    pub fn filter(&self) -> TargetFilter {
        TargetFilter::new(self.target_class_id, self.confidence_threshold)
    }
}

/// Grace period and cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingPolicy {
    pub distraction_limit: Duration,
    pub cooldown: Duration,
}

impl TimingPolicy {
    fn from_raw(raw: &RawConfig) -> Self {
        let t = &raw.timing;
        Self {
            distraction_limit: t
                .distraction_limit_seconds
                .and_then(seconds_to_duration)
                .unwrap_or(DEFAULT_DISTRACTION_LIMIT),
            cooldown: t
                .cooldown_seconds
                .and_then(seconds_to_duration)
                .unwrap_or(DEFAULT_COOLDOWN),
        }
    }
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            distraction_limit: DEFAULT_DISTRACTION_LIMIT,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

/// Notification pipeline settings
#[derive(Debug, Clone, PartialEq)]
pub struct NotifierConfig {
    pub scratch_path: PathBuf,
    pub prompt: String,
    pub generator: GeneratorConfig,
    pub speech: SpeechConfig,
    pub player_argv: Vec<String>,
}

impl NotifierConfig {
    fn from_raw(raw: RawConfig) -> Self {
        let n = raw.notifier;
        Self {
            scratch_path: n.scratch_path.unwrap_or_else(default_scratch_path),
            prompt: n.prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
            generator: GeneratorConfig {
                endpoint: n
                    .generator
                    .endpoint
                    .unwrap_or_else(|| DEFAULT_GENERATOR_ENDPOINT.to_string()),
                model: n
                    .generator
                    .model
                    .unwrap_or_else(|| DEFAULT_GENERATOR_MODEL.to_string()),
                timeout: n
                    .generator
                    .timeout_seconds
                    .and_then(seconds_to_duration)
                    .unwrap_or(DEFAULT_GENERATOR_TIMEOUT),
            },
            speech: SpeechConfig {
                language: n
                    .speech
                    .language
                    .unwrap_or_else(|| DEFAULT_SPEECH_LANGUAGE.to_string()),
                tld: n
                    .speech
                    .tld
                    .unwrap_or_else(|| DEFAULT_SPEECH_TLD.to_string()),
            },
            player_argv: n.player.argv.unwrap_or_else(|| {
                DEFAULT_PLAYER_ARGV.iter().map(|s| s.to_string()).collect()
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechConfig {
    pub language: String,
    pub tld: String,
}
