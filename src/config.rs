//! Configuration loading and management.
//!
//! Configuration is loaded with the following precedence:
//! 1. Environment variables (`EMACS_TRACKER_*`)
//! 2. Config file (`~/.cache/emacs_tracker/config.toml`)
//! 3. Defaults

use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// How to reach the editor.
    pub emacs: EmacsConfig,

    /// Where session logs are written.
    pub storage: StorageConfig,

    /// Sampling defaults.
    pub tracking: TrackingConfig,
}

/// Editor connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmacsConfig {
    /// Evaluation program.
    pub program: String,

    /// Server socket used when a call names no target.
    pub socket_name: Option<String>,

    /// Upper bound for a single round-trip, in seconds.
    pub timeout_seconds: f64,
}

impl EmacsConfig {
    /// Round-trip bound as a `Duration`.
    ///
    /// Falls back to 5 seconds when the configured value is unusable.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_secs(5))
    }
}

impl Default for EmacsConfig {
    fn default() -> Self {
        Self {
            program: "emacsclient".to_string(),
            socket_name: None,
            timeout_seconds: 5.0,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `buffer_sequences.json`.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_dir(),
        }
    }
}

/// Sampling configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Interval used when `start_tracking` is called without one.
    pub interval_seconds: f64,

    /// Flush to disk after one-off snapshots taken while not sampling.
    pub auto_save: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 2.0,
            auto_save: true,
        }
    }
}

/// Get the default storage directory.
fn default_storage_dir() -> PathBuf {
    dirs::home_dir().map_or_else(
        || PathBuf::from(".cache").join("emacs_tracker"),
        |h| h.join(".cache").join("emacs_tracker"),
    )
}

/// Expand a leading `~/` against the home directory.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Load configuration with precedence: env vars → file → defaults.
///
/// `explicit_path` takes priority over `EMACS_TRACKER_CONFIG`.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    let config_path = explicit_path.map_or_else(get_config_path, Path::to_path_buf);
    if config_path.exists() {
        let contents = fs::read_to_string(&config_path).map_err(Error::Storage)?;
        config = toml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))?;
    }

    apply_env_overrides(&mut config);
    config.storage.path = expand_home(&config.storage.path);

    Ok(config)
}

/// Get the path to the config file.
fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var("EMACS_TRACKER_CONFIG") {
        return PathBuf::from(path);
    }

    default_storage_dir().join("config.toml")
}

/// Apply environment variable overrides to config.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(path) = env::var("EMACS_TRACKER_STORAGE_PATH") {
        config.storage.path = PathBuf::from(path);
    }

    if let Ok(program) = env::var("EMACS_TRACKER_PROGRAM") {
        if !program.is_empty() {
            config.emacs.program = program;
        }
    }

    if let Ok(val) = env::var("EMACS_TRACKER_TIMEOUT") {
        if let Ok(secs) = val.parse() {
            config.emacs.timeout_seconds = secs;
        }
    }

    if let Ok(val) = env::var("EMACS_TRACKER_INTERVAL") {
        if let Ok(secs) = val.parse() {
            config.tracking.interval_seconds = secs;
        }
    }

    if let Ok(val) = env::var("EMACS_TRACKER_AUTO_SAVE") {
        config.tracking.auto_save = !matches!(val.to_lowercase().as_str(), "0" | "false" | "no");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.emacs.program, "emacsclient");
        assert!(config.emacs.socket_name.is_none());
        assert_eq!(config.emacs.timeout(), Duration::from_secs(5));
        assert!((config.tracking.interval_seconds - 2.0).abs() < f64::EPSILON);
        assert!(config.tracking.auto_save);
        assert!(config.storage.path.ends_with(".cache/emacs_tracker"));
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
            [emacs]
            program = "/opt/emacs/bin/emacsclient"
            socket_name = "/run/user/1000/emacs/server"
            timeout_seconds = 1.5

            [storage]
            path = "/var/tmp/tracker"

            [tracking]
            interval_seconds = 0.5
            auto_save = false
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.emacs.program, "/opt/emacs/bin/emacsclient");
        assert_eq!(
            config.emacs.socket_name.as_deref(),
            Some("/run/user/1000/emacs/server")
        );
        assert_eq!(config.emacs.timeout(), Duration::from_millis(1500));
        assert_eq!(config.storage.path, PathBuf::from("/var/tmp/tracker"));
        assert!((config.tracking.interval_seconds - 0.5).abs() < f64::EPSILON);
        assert!(!config.tracking.auto_save);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let toml = r"
            [tracking]
            interval_seconds = 10.0
        ";

        let config: Config = toml::from_str(toml).unwrap();
        assert!((config.tracking.interval_seconds - 10.0).abs() < f64::EPSILON);
        assert!(config.tracking.auto_save); // Default
        assert_eq!(config.emacs.program, "emacsclient"); // Default
    }

    #[test]
    fn unusable_timeout_falls_back() {
        let zero = EmacsConfig {
            timeout_seconds: 0.0,
            ..Default::default()
        };
        assert_eq!(zero.timeout(), Duration::from_secs(5));

        let negative = EmacsConfig {
            timeout_seconds: -3.0,
            ..Default::default()
        };
        assert_eq!(negative.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn expand_home_leaves_absolute_paths() {
        let path = PathBuf::from("/tmp/tracker");
        assert_eq!(expand_home(&path), path);
    }

    #[test]
    fn load_config_from_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[emacs]\nsocket_name = \"/tmp/sock\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.emacs.socket_name.as_deref(), Some("/tmp/sock"));
    }

    #[test]
    fn load_config_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[emacs\nthis is not toml").unwrap();

        let result = load_config(Some(&path));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
