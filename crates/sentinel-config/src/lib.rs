//! Configuration parsing and validation for the sentinel
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Target class and confidence threshold
//! - Grace period and cooldown timing
//! - Notifier backends (generation, speech, playback)
//! - Startup overrides for the core tunables

mod policy;
mod schema;
mod validation;

pub use policy::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Startup overrides for the core tunables, applied on top of the file
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub target_class_id: Option<i64>,
    pub confidence_threshold: Option<f64>,
    pub distraction_limit_seconds: Option<f64>,
    pub cooldown_seconds: Option<f64>,
}

impl Overrides {
    fn apply(&self, raw: &mut RawConfig) {
        if let Some(id) = self.target_class_id {
            raw.detection.target_class_id = Some(id);
        }
        if let Some(threshold) = self.confidence_threshold {
            raw.detection.confidence_threshold = Some(threshold);
        }
        if let Some(limit) = self.distraction_limit_seconds {
            raw.timing.distraction_limit_seconds = Some(limit);
        }
        if let Some(cooldown) = self.cooldown_seconds {
            raw.timing.cooldown_seconds = Some(cooldown);
        }
    }
}

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Policy> {
    load_config_with_overrides(path, &Overrides::default())
}

/// Load configuration from a TOML file and apply startup overrides
pub fn load_config_with_overrides(
    path: impl AsRef<Path>,
    overrides: &Overrides,
) -> ConfigResult<Policy> {
    let content = std::fs::read_to_string(path)?;
    let raw: RawConfig = toml::from_str(&content)?;
    build_policy(raw, overrides)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Policy> {
    let raw: RawConfig = toml::from_str(content)?;
    build_policy(raw, &Overrides::default())
}

/// Built-in defaults with startup overrides applied
pub fn default_policy(overrides: &Overrides) -> ConfigResult<Policy> {
    build_policy(RawConfig::default(), overrides)
}

fn build_policy(mut raw: RawConfig, overrides: &Overrides) -> ConfigResult<Policy> {
    // Check version
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    overrides.apply(&mut raw);

    // Validate
    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    let policy = Policy::from_raw(raw);
    debug!(
        target_class_id = policy.detection.target_class_id,
        limit_secs = policy.timing.distraction_limit.as_secs_f64(),
        cooldown_secs = policy.timing.cooldown.as_secs_f64(),
        "Policy built"
    );
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_parse_minimal_config() {
        let policy = parse_config("config_version = 1").unwrap();
        assert_eq!(policy, Policy::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config = r#"
            config_version = 1

            [detection]
            target_class_id = 73
            target_label = "BOOK"
            confidence_threshold = 0.65

            [timing]
            distraction_limit_seconds = 5.0
            cooldown_seconds = 12.5

            [notifier]
            scratch_path = "/tmp/test-shout.mp3"
            prompt = "Be brief."

            [notifier.generator]
            endpoint = "http://gpu-box:11434"
            model = "llama3.2:3b"
            timeout_seconds = 10.0

            [notifier.speech]
            language = "de"
            tld = "de"

            [notifier.player]
            argv = ["ffplay", "-nodisp", "-autoexit"]
        "#;

        let policy = parse_config(config).unwrap();
        assert_eq!(policy.detection.target_class_id, 73);
        assert_eq!(policy.detection.target_label, "BOOK");
        assert_eq!(policy.detection.confidence_threshold, 0.65);
        assert_eq!(policy.timing.distraction_limit, Duration::from_secs(5));
        assert_eq!(policy.timing.cooldown, Duration::from_millis(12_500));
        assert_eq!(policy.notifier.prompt, "Be brief.");
        assert_eq!(policy.notifier.generator.endpoint, "http://gpu-box:11434");
        assert_eq!(policy.notifier.generator.timeout, Duration::from_secs(10));
        assert_eq!(policy.notifier.speech.language, "de");
        assert_eq!(policy.notifier.player_argv[0], "ffplay");
    }

    #[test]
    fn test_reject_wrong_version() {
        let result = parse_config("config_version = 99");
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn test_reject_invalid_values() {
        let config = r#"
            config_version = 1

            [detection]
            confidence_threshold = 2.0
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::ValidationFailed { .. })));
    }

    #[test]
    fn test_overrides_take_precedence_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "config_version = 1\n[timing]\ndistraction_limit_seconds = 10.0\ncooldown_seconds = 20.0"
        )
        .unwrap();

        let overrides = Overrides {
            distraction_limit_seconds: Some(1.5),
            ..Default::default()
        };
        let policy = load_config_with_overrides(file.path(), &overrides).unwrap();

        assert_eq!(policy.timing.distraction_limit, Duration::from_millis(1500));
        assert_eq!(policy.timing.cooldown, Duration::from_secs(20));
    }

    #[test]
    fn test_overrides_are_validated() {
        let overrides = Overrides {
            cooldown_seconds: Some(-4.0),
            ..Default::default()
        };
        assert!(matches!(
            default_policy(&overrides),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }
}
