//! Settings configuration types

use serde::{Deserialize, Serialize};

use crate::task::DEFAULT_FINISHED_TEXT;

/// When appended output should pull the viewport to the bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollOnOutput {
    /// Only when the viewport was already at the bottom (stick-to-bottom)
    #[default]
    AtBottom,
    /// On every append, even if the user scrolled back
    Always,
}

/// Console session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Maximum transcript length in characters; older output is dropped
    /// from the head once exceeded
    #[serde(default = "default_scrollback_len")]
    pub scrollback_len: usize,

    /// Text of the record posted when the task terminates
    #[serde(default = "default_finished_text")]
    pub finished_text: String,

    /// Echo submitted input into the transcript (tagged bold)
    #[serde(default = "default_echo_input")]
    pub echo_input: bool,

    /// Auto-scroll policy for new output
    #[serde(default)]
    pub scroll_on_output: ScrollOnOutput,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            scrollback_len: default_scrollback_len(),
            finished_text: default_finished_text(),
            echo_input: default_echo_input(),
            scroll_on_output: ScrollOnOutput::default(),
        }
    }
}

fn default_scrollback_len() -> usize {
    100_000
}

fn default_finished_text() -> String {
    DEFAULT_FINISHED_TEXT.to_string()
}

fn default_echo_input() -> bool {
    true
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Default filter directive when RUST_LOG is unset (e.g. "info", "console_session=debug")
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
