//! Configuration validation

use crate::schema::RawConfig;
use sentinel_util::seconds_to_duration;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("target_class_id {0} is out of range")]
    ClassIdOutOfRange(i64),

    #[error("confidence_threshold {0} must be within [0, 1]")]
    ThresholdOutOfRange(f64),

    #[error("{field} = {value} is not a valid duration")]
    InvalidDuration { field: &'static str, value: f64 },

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let detection = &config.detection;
    if let Some(id) = detection.target_class_id
        && u32::try_from(id).is_err()
    {
        errors.push(ValidationError::ClassIdOutOfRange(id));
    }

    if let Some(threshold) = detection.confidence_threshold
        && !(0.0..=1.0).contains(&threshold)
    {
        errors.push(ValidationError::ThresholdOutOfRange(threshold));
    }

    if let Some(label) = &detection.target_label
        && label.trim().is_empty()
    {
        errors.push(ValidationError::Empty("target_label"));
    }

    let durations = [
        ("distraction_limit_seconds", config.timing.distraction_limit_seconds),
        ("cooldown_seconds", config.timing.cooldown_seconds),
        ("generator.timeout_seconds", config.notifier.generator.timeout_seconds),
    ];
    for (field, value) in durations {
        if let Some(value) = value
            && seconds_to_duration(value).is_none()
        {
            errors.push(ValidationError::InvalidDuration { field, value });
        }
    }

    let notifier = &config.notifier;
    let strings = [
        ("prompt", &notifier.prompt),
        ("generator.endpoint", &notifier.generator.endpoint),
        ("generator.model", &notifier.generator.model),
        ("speech.language", &notifier.speech.language),
        ("speech.tld", &notifier.speech.tld),
    ];
    for (field, value) in strings {
        if let Some(value) = value
            && value.trim().is_empty()
        {
            errors.push(ValidationError::Empty(field));
        }
    }

    if let Some(argv) = &notifier.player.argv
        && argv.first().is_none_or(|program| program.trim().is_empty())
    {
        errors.push(ValidationError::Empty("player.argv"));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&RawConfig::default()).is_empty());
    }

    #[test]
    fn test_rejects_threshold_outside_unit_interval() {
        let mut config = RawConfig::default();
        config.detection.confidence_threshold = Some(1.5);

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::ThresholdOutOfRange(_)));
    }

    #[test]
    fn test_rejects_negative_durations() {
        let mut config = RawConfig::default();
        config.timing.distraction_limit_seconds = Some(-1.0);
        config.timing.cooldown_seconds = Some(f64::NAN);

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, ValidationError::InvalidDuration { .. })));
    }

    #[test]
    fn test_rejects_negative_class_id() {
        let mut config = RawConfig::default();
        config.detection.target_class_id = Some(-3);

        let errors = validate_config(&config);
        assert!(matches!(errors[0], ValidationError::ClassIdOutOfRange(-3)));
    }

    #[test]
    fn test_rejects_empty_player_and_prompt() {
        let mut config = RawConfig::default();
        config.notifier.player.argv = Some(vec![]);
        config.notifier.prompt = Some("   ".into());

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 2);
    }
}
