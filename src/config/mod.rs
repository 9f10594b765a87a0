//! Configuration loading and management

mod io;
mod settings;

pub use settings::{ConsoleSettings, LogSettings, ScrollOnOutput};

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Directory holding a project-local configuration
pub const CONFIG_DIR_NAME: &str = ".console-session";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Console session behavior
    #[serde(default)]
    pub console: ConsoleSettings,

    /// Logging settings
    #[serde(default)]
    pub log: LogSettings,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Path of the project-local config file under `dir`
    pub fn local_config_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_DIR_NAME).join("config.toml")
    }

    /// Load configuration for a working directory.
    ///
    /// Looks for `<dir>/.console-session/config.toml`, then the global
    /// `~/.console-session/config.toml`, and falls back to defaults.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let local_path = Self::local_config_path(dir);
        if local_path.exists() {
            return Self::from_file(&local_path);
        }

        let global_path = Self::global_config_path();
        if global_path.exists() {
            return Self::from_file(&global_path);
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Resolve the configuration from an explicit path or a working directory
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Self::from_dir(dir),
        }
    }

    /// Reject values the session cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.console.scrollback_len == 0 {
            bail!("console.scrollback_len must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.console.scrollback_len, 100_000);
        assert_eq!(config.console.finished_text, "[Finished]");
        assert!(config.console.echo_input);
        assert_eq!(config.console.scroll_on_output, ScrollOnOutput::AtBottom);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml(
            r#"
[console]
scrollback_len = 500
scroll_on_output = "always"
"#,
        )
        .unwrap();
        assert_eq!(config.console.scrollback_len, 500);
        assert_eq!(config.console.scroll_on_output, ScrollOnOutput::Always);
        assert!(config.console.echo_input);
    }

    #[test]
    fn test_zero_scrollback_rejected() {
        let err = Config::from_toml("[console]\nscrollback_len = 0\n").unwrap_err();
        assert!(err.to_string().contains("scrollback_len"));
    }

    #[test]
    fn test_unknown_scroll_mode_rejected() {
        assert!(Config::from_toml("[console]\nscroll_on_output = \"sometimes\"\n").is_err());
    }

    #[test]
    fn test_from_dir_prefers_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::local_config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[console]\nfinished_text = \"[done]\"\n").unwrap();

        let config = Config::from_dir(dir.path()).unwrap();
        assert_eq!(config.console.finished_text, "[done]");
    }

    #[test]
    fn test_resolve_explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::resolve(Some(&missing), dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
