//! Config validation CLI tool
//!
//! Validates a sentinel configuration file and reports any errors.

use sentinel_util::{default_config_path, format_duration};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a sentinel configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match sentinel_config::load_config(&config_path) {
        Ok(policy) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", sentinel_config::CURRENT_CONFIG_VERSION);
            println!(
                "  Target: class {} ({}), confidence > {}",
                policy.detection.target_class_id,
                policy.detection.target_label,
                policy.detection.confidence_threshold
            );
            println!(
                "  Distraction limit: {:.1}s",
                policy.timing.distraction_limit.as_secs_f64()
            );
            println!("  Cooldown: {}", format_duration(policy.timing.cooldown));
            println!(
                "  Generator: {} @ {}",
                policy.notifier.generator.model, policy.notifier.generator.endpoint
            );
            println!("  Player: {}", policy.notifier.player_argv.join(" "));
            println!("  Scratch audio: {}", policy.notifier.scratch_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                sentinel_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                sentinel_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                sentinel_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                sentinel_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        sentinel_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
