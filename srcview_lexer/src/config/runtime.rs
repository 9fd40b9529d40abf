//! Runtime preferences, each field defaulting from a `SRCVIEW_*` environment variable

use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Environment variable names for configuration
pub mod env_vars {
    // File processor
    pub const REQUIRE_JSON_EXTENSION: &str = "SRCVIEW_REQUIRE_JSON_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "SRCVIEW_ENABLE_PERFORMANCE_LOGGING";

    // Tokenizer
    pub const TOKENIZER_ATOMIZE: &str = "SRCVIEW_TOKENIZER_ATOMIZE";
    pub const TOKENIZER_PRESERVE_COMMENT_WHITESPACE: &str =
        "SRCVIEW_TOKENIZER_PRESERVE_COMMENT_WHITESPACE";
    pub const TOKENIZER_TRIM_TRAILING_WHITESPACE: &str =
        "SRCVIEW_TOKENIZER_TRIM_TRAILING_WHITESPACE";
    pub const TOKENIZER_KEY_BY_LINE: &str = "SRCVIEW_TOKENIZER_KEY_BY_LINE";
    pub const TOKENIZER_OUTPUT_MODE: &str = "SRCVIEW_TOKENIZER_OUTPUT_MODE";
    pub const TOKENIZER_COLLECT_METRICS: &str = "SRCVIEW_TOKENIZER_COLLECT_METRICS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "SRCVIEW_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "SRCVIEW_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "SRCVIEW_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "SRCVIEW_LOGGING_INCLUDE_FILE_CONTEXT";
}

/// Read and parse one variable, falling back when unset or unparsable.
fn env_or<T: FromStr>(name: &str, fallback: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(fallback)
}

fn env_with<T>(name: &str, parse: fn(&str) -> Option<T>, fallback: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| parse(v.trim()))
        .unwrap_or(fallback)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Reject token dumps without a .json extension
    pub require_json_extension: bool,
    pub enable_performance_logging: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_json_extension: env_or(env_vars::REQUIRE_JSON_EXTENSION, false),
            enable_performance_logging: env_or(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
        }
    }
}

/// Shape of the per-token output handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Token, category, and auxiliary tags
    Enhanced,
    /// Token only
    Raw,
    /// Text plus presentation class names
    Fragments,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Enhanced => "enhanced",
            OutputMode::Raw => "raw",
            OutputMode::Fragments => "fragments",
        }
    }
}

/// Parse output mode from string (used for environment variables and CLI)
pub fn parse_output_mode(mode: &str) -> Option<OutputMode> {
    match mode.to_lowercase().as_str() {
        "enhanced" => Some(OutputMode::Enhanced),
        "raw" => Some(OutputMode::Raw),
        "fragments" | "fragment" => Some(OutputMode::Fragments),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerPreferences {
    /// Split composite raw tokens into atoms
    pub atomize: bool,

    /// Leading/trailing whitespace on comment and string lines becomes
    /// separate whitespace atoms
    pub preserve_comment_whitespace: bool,

    /// Drop whitespace at the end of each line from the output
    pub trim_trailing_whitespace: bool,

    /// Key output by line number instead of sequential index
    pub key_by_line: bool,

    pub output_mode: OutputMode,

    pub collect_metrics: bool,
}

impl Default for TokenizerPreferences {
    fn default() -> Self {
        Self {
            atomize: env_or(env_vars::TOKENIZER_ATOMIZE, true),
            preserve_comment_whitespace: env_or(
                env_vars::TOKENIZER_PRESERVE_COMMENT_WHITESPACE,
                true,
            ),
            trim_trailing_whitespace: env_or(env_vars::TOKENIZER_TRIM_TRAILING_WHITESPACE, false),
            key_by_line: env_or(env_vars::TOKENIZER_KEY_BY_LINE, false),
            output_mode: env_with(
                env_vars::TOKENIZER_OUTPUT_MODE,
                parse_output_mode,
                OutputMode::Enhanced,
            ),
            collect_metrics: env_or(env_vars::TOKENIZER_COLLECT_METRICS, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// JSON lines instead of text
    pub use_structured_logging: bool,

    pub enable_console_logging: bool,

    /// Preferred minimum level; the compile-time security level always wins
    pub min_log_level: LogLevel,

    /// Attach the file being processed to every event
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env_with(env_vars::LOGGING_MIN_LEVEL, parse_log_level, LogLevel::Info),
            include_file_context: env_or(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Every runtime preference, read once at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub tokenizer: TokenizerPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::default()
    }
}
