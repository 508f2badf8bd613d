//! Configuration schema types.
//!
//! All structs accept both `snake_case` and `camelCase` field names in JSON
//! via `#[serde(alias)]`. Unknown fields are silently ignored.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlackifyError};

/// Destination field used when `outputField` is not supplied.
pub const DEFAULT_OUTPUT_FIELD: &str = "slackText";

/// Marker used for unordered list items.
pub const DEFAULT_BULLET: &str = "•";

const DEFAULT_LOG_LEVEL: &str = "info";

fn default_output_field() -> String {
    DEFAULT_OUTPUT_FIELD.into()
}

fn default_bullet() -> String {
    DEFAULT_BULLET.into()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.into()
}

/// How a run reacts to a failing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Abort the run on the first failing item.
    #[default]
    FailFast,
    /// Record the failure on the item and keep going.
    Continue,
}

impl FailureMode {
    /// Whether failing items are captured instead of aborting the run.
    pub fn continues(self) -> bool {
        matches!(self, FailureMode::Continue)
    }
}

impl From<bool> for FailureMode {
    fn from(continue_on_fail: bool) -> Self {
        if continue_on_fail {
            FailureMode::Continue
        } else {
            FailureMode::FailFast
        }
    }
}

// ── Root config ──────────────────────────────────────────────────────────

/// Root configuration for slackify.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Node parameters and run policy.
    #[serde(default)]
    pub node: NodeSettings,

    /// Converter tuning.
    #[serde(default)]
    pub converter: ConverterOptions,

    /// Logging defaults.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every run fail.
    pub fn validate(&self) -> Result<()> {
        if self.node.output_field.trim().is_empty() {
            return Err(SlackifyError::ConfigInvalid {
                reason: "node.output_field must not be empty".into(),
            });
        }
        if self.converter.bullet.is_empty() {
            return Err(SlackifyError::ConfigInvalid {
                reason: "converter.bullet must not be empty".into(),
            });
        }
        if self.converter.max_input_bytes == Some(0) {
            return Err(SlackifyError::ConfigInvalid {
                reason: "converter.max_input_bytes must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

/// Raw node parameters, before per-item template evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSettings {
    /// Markdown to convert; may contain `{{ ... }}` expressions.
    #[serde(default, alias = "markdownText")]
    pub markdown_text: Option<String>,

    /// Field that receives the converted text; may contain expressions.
    #[serde(default = "default_output_field", alias = "outputField")]
    pub output_field: String,

    /// Capture per-item failures instead of aborting.
    #[serde(default, alias = "continueOnFail")]
    pub continue_on_fail: bool,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            markdown_text: None,
            output_field: default_output_field(),
            continue_on_fail: false,
        }
    }
}

impl NodeSettings {
    pub fn failure_mode(&self) -> FailureMode {
        FailureMode::from(self.continue_on_fail)
    }
}

/// Options for the Slack mrkdwn converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterOptions {
    /// Marker written in front of unordered list items.
    #[serde(default = "default_bullet")]
    pub bullet: String,

    /// Inputs larger than this many bytes are rejected.
    #[serde(default, alias = "maxInputBytes")]
    pub max_input_bytes: Option<usize>,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            bullet: default_bullet(),
            max_input_bytes: None,
        }
    }
}

/// Logging defaults applied when `RUST_LOG` is not set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
