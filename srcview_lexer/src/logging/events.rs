//! Log events emitted by the scanner, file processor and pipeline

use super::codes::{self, Code};
use crate::utils::Span;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Log severity levels, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Map the compile-time numeric level (0 = error .. 3 = debug)
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => LogLevel::Error,
            1 => LogLevel::Warning,
            2 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

// Codes for events that carry no registered code
const GENERIC_WARNING: Code = Code::new("W000");
const GENERIC_INFO: Code = Code::new("I000");
const GENERIC_DEBUG: Code = Code::new("D000");

/// Clamp a message to the configured maximum length on a char boundary.
fn bounded_message(message: &str) -> String {
    let limit = super::config::get_max_log_message_length();
    if message.len() <= limit {
        return message.to_string();
    }
    let mut end = limit;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &message[..end])
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: bounded_message(message),
            span: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Error, error_code, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::new(LogLevel::Warning, GENERIC_WARNING, message)
    }

    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Warning, warning_code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::new(LogLevel::Info, GENERIC_INFO, message)
    }

    /// Info-level event carrying a success code
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::new(LogLevel::Info, success_code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::new(LogLevel::Debug, GENERIC_DEBUG, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    /// `[LEVEL] CODE - message at span {k=v, ...}`
    pub fn format(&self) -> String {
        let mut line = format!("[{}] {} - {}", self.level.as_str(), self.code, self.message);
        if let Some(span) = &self.span {
            line.push_str(&format!(" at {}", span));
        }
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            line.push_str(&format!(" {{{}}}", pairs.join(", ")));
        }
        line
    }

    /// Multi-line form with registry metadata, used for halting errors
    pub fn format_detailed(&self) -> String {
        let code = self.code.as_str();
        let mut output = self.format();
        output.push_str(&format!("\n  Category: {}", self.category()));
        output.push_str(&format!("\n  Severity: {}", codes::get_severity(code).as_str()));
        if self.is_error() {
            output.push_str(&format!("\n  Requires halt: {}", self.requires_halt()));
            output.push_str(&format!("\n  Action: {}", codes::get_action(code)));
        }
        output
    }

    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let code = self.code.as_str();
        let mut json = serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            "level": self.level.as_str(),
            "code": code,
            "category": self.category(),
            "message": self.message,
        });

        if self.is_error() {
            json["recoverable"] = codes::is_recoverable(code).into();
            json["requires_halt"] = self.requires_halt().into();
        }

        if let Some(span) = &self.span {
            json["span"] = serde_json::json!({
                "line": span.start().line,
                "start": span.start().offset,
                "end": span.end().offset,
            });
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::to_value(&self.context)?;
        }

        serde_json::to_string(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{Position, Span};

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::file_processing::FILE_NOT_FOUND, "File not found");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E005");
        assert_eq!(event.category(), "FileProcessing");
    }

    #[test]
    fn test_generic_codes() {
        assert_eq!(LogEvent::warning("w").code.as_str(), "W000");
        assert_eq!(LogEvent::info("i").code.as_str(), "I000");
        assert_eq!(LogEvent::debug("d").level, LogLevel::Debug);
        assert_eq!(
            LogEvent::success(codes::success::SCAN_COMPLETE, "done").level,
            LogLevel::Info
        );
    }

    #[test]
    fn test_format_orders_context() {
        let event = LogEvent::warning_with_code(codes::scanner::CANDIDATE_OVERFLOW, "Discarded")
            .with_context("opener", "use")
            .with_context("buffered", "64");

        assert_eq!(
            event.format(),
            "[WARN] E032 - Discarded {buffered=64, opener=use}"
        );
    }

    #[test]
    fn test_detailed_format_for_precondition_violation() {
        let span = Span::covering(Position::new(4, 2), "(int)");
        let event = LogEvent::error(codes::lexical::PRECONDITION_VIOLATION, "Bad split")
            .with_span(span);

        assert!(event.format().contains("at line 2 [4..9)"));
        let detailed = event.format_detailed();
        assert!(detailed.contains("Category: Lexical"));
        assert!(detailed.contains("Requires halt: true"));
    }

    #[test]
    fn test_long_messages_are_bounded() {
        let limit = super::super::config::get_max_log_message_length();
        let event = LogEvent::info(&"x".repeat(limit + 10));
        assert_eq!(event.message.len(), limit + 3);
        assert!(event.message.ends_with("..."));
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::file_processing::PERMISSION_DENIED, "Access denied")
            .with_context("file", "tokens.json");

        let json: serde_json::Value = serde_json::from_str(&event.format_json().unwrap()).unwrap();
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["code"], "E009");
        assert_eq!(json["context"]["file"], "tokens.json");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_level_from_index() {
        assert_eq!(LogLevel::from_index(0), LogLevel::Error);
        assert_eq!(LogLevel::from_index(9), LogLevel::Debug);
        assert!(LogLevel::Error < LogLevel::Debug);
    }
}
