//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::CURRENT_CONFIG_VERSION;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Target object selection
    #[serde(default)]
    pub detection: RawDetectionConfig,

    /// Grace period and cooldown
    #[serde(default)]
    pub timing: RawTimingConfig,

    /// Notification pipeline
    #[serde(default)]
    pub notifier: RawNotifierConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_CONFIG_VERSION,
            detection: RawDetectionConfig::default(),
            timing: RawTimingConfig::default(),
            notifier: RawNotifierConfig::default(),
        }
    }
}

/// Which detector class counts as a distraction
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDetectionConfig {
    /// Detector class id of the target (default: 67, "cell phone" in COCO)
    pub target_class_id: Option<i64>,

    /// Label drawn next to matched boxes
    pub target_label: Option<String>,

    /// Minimum confidence, exclusive (default: 0.5)
    pub confidence_threshold: Option<f64>,
}

/// Grace period and cooldown, in seconds
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTimingConfig {
    /// Continuous presence tolerated before escalating (default: 3.0)
    pub distraction_limit_seconds: Option<f64>,

    /// Minimum spacing between notifications (default: 8.0)
    pub cooldown_seconds: Option<f64>,
}

/// Notification pipeline settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawNotifierConfig {
    /// Where rendered audio is written before playback
    pub scratch_path: Option<PathBuf>,

    /// Persona prompt sent to the generation backend
    pub prompt: Option<String>,

    #[serde(default)]
    pub generator: RawGeneratorConfig,

    #[serde(default)]
    pub speech: RawSpeechConfig,

    #[serde(default)]
    pub player: RawPlayerConfig,
}

/// Language-generation backend (Ollama chat API)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawGeneratorConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<f64>,
}

/// Speech-synthesis backend
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSpeechConfig {
    /// Language code, e.g. "en"
    pub language: Option<String>,

    /// Top-level domain selecting the accent, e.g. "co.uk"
    pub tld: Option<String>,
}

/// External audio player
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPlayerConfig {
    /// Program and leading arguments; the audio path is appended
    pub argv: Option<Vec<String>>,
}
