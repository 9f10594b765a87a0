//! Init command implementation

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use console_session::config::Config;

/// Default configuration content for console-session init
pub const DEFAULT_CONFIG: &str = r#"# console-session configuration
# =============================
#
# Looked up in this order: --config, ./.console-session/config.toml,
# ~/.console-session/config.toml. Missing keys take the defaults below.

# ============================================================================
# CONSOLE - Session behavior
# ============================================================================
#
# Available options:
#   scrollback_len   - Maximum transcript length in characters (default: 100000)
#   finished_text    - Record appended when the task terminates (default: "[Finished]")
#   echo_input       - Copy submitted lines into the transcript (default: true)
#   scroll_on_output - "at_bottom" follows output only while the view is at the
#                      bottom, "always" jumps to new output (default: "at_bottom")

[console]
scrollback_len = 100000
finished_text = "[Finished]"
echo_input = true
scroll_on_output = "at_bottom"

# ============================================================================
# LOG - Diagnostics (written to stderr)
# ============================================================================
#
# RUST_LOG takes precedence, then --verbose, then this level.

[log]
level = "info"
"#;

/// Write a default configuration file.
///
/// Goes to `config_path` when given, otherwise to the project-local
/// `.console-session/config.toml` under `work_dir`.
pub async fn init_command(work_dir: &Path, config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(|| Config::local_config_path(work_dir));

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    Config::write_text(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
    info!(path = %config_path.display(), "wrote default configuration");
    println!("Created: {}", config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_defaults() {
        let parsed = Config::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        init_command(dir.path(), None, false).await.unwrap();

        let path = Config::local_config_path(dir.path());
        assert!(path.exists());

        let err = init_command(dir.path(), None, false).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));

        std::fs::write(&path, "# edited\n").unwrap();
        init_command(dir.path(), None, true).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
