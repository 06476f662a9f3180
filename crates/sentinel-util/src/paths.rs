//! Default paths for sentinel components
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/sentinel/config.toml` or `~/.config/sentinel/config.toml`
//! - Scratch audio: `$XDG_RUNTIME_DIR/sentinel/shout.mp3` or `/tmp/sentinel-$USER/shout.mp3`

use std::path::PathBuf;

/// Environment variable for overriding the config path
pub const SENTINEL_CONFIG_ENV: &str = "SENTINEL_CONFIG";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Scratch audio filename
const SCRATCH_FILENAME: &str = "shout.mp3";

/// Application subdirectory name
const APP_DIR: &str = "sentinel";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/sentinel/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/sentinel/config.toml` (fallback)
/// 3. `/etc/sentinel/config.toml` (last resort)
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default scratch location for rendered audio.
///
/// Order of precedence:
/// 1. `$XDG_RUNTIME_DIR/sentinel/shout.mp3` (if XDG_RUNTIME_DIR is set)
/// 2. `/tmp/sentinel-$USER/shout.mp3` (fallback)
pub fn default_scratch_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(APP_DIR).join(SCRATCH_FILENAME);
    }

    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/{}-{}", APP_DIR, username)).join(SCRATCH_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_contains_sentinel() {
        let path = default_config_path();
        assert!(path.to_string_lossy().contains("sentinel"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_scratch_path_is_mp3_in_app_dir() {
        let path = default_scratch_path();
        assert!(path.to_string_lossy().contains("sentinel"));
        assert_eq!(path.file_name().unwrap(), "shout.mp3");
    }
}
