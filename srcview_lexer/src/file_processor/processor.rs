//! Token dump reader with compile-time limits and global logging integration

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_TOKEN_COUNT,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes;
use crate::tokens::{Token, TokenKind};
use crate::utils::count_line_breaks;
use crate::{log_debug, log_error, log_performance, log_success};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

/// File processor specific errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum FileProcessorError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file extension: expected .json, found {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File is empty")]
    EmptyFile,

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading file: {message}")]
    IoError { message: String },

    #[error("Invalid file path: {path}")]
    InvalidPath { path: String },

    #[error("Malformed token dump: {message}")]
    MalformedTokenDump { message: String },

    #[error("Token dump holds {count} tokens (max: {max_tokens})")]
    TooManyTokens { count: usize, max_tokens: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> crate::logging::Code {
        use codes::file_processing as fp;
        match self {
            FileProcessorError::FileNotFound { .. } => fp::FILE_NOT_FOUND,
            FileProcessorError::InvalidExtension { .. } => fp::INVALID_EXTENSION,
            FileProcessorError::FileTooLarge { .. } => fp::FILE_TOO_LARGE,
            FileProcessorError::EmptyFile => fp::EMPTY_FILE,
            FileProcessorError::PermissionDenied { .. } => fp::PERMISSION_DENIED,
            FileProcessorError::InvalidEncoding { .. } => fp::INVALID_ENCODING,
            FileProcessorError::IoError { .. } => fp::IO_ERROR,
            FileProcessorError::InvalidPath { .. } => fp::INVALID_PATH,
            FileProcessorError::MalformedTokenDump { .. } => fp::MALFORMED_TOKEN_DUMP,
            FileProcessorError::TooManyTokens { .. } => fp::TOO_MANY_TOKENS,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    /// Map an I/O failure on `path` to the matching variant
    fn from_io(path: &Path, error: &io::Error) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            io::ErrorKind::NotFound => FileProcessorError::FileNotFound { path },
            io::ErrorKind::PermissionDenied => FileProcessorError::PermissionDenied { path },
            io::ErrorKind::InvalidData => FileProcessorError::InvalidEncoding { path },
            _ => FileProcessorError::IoError {
                message: format!("{}: {}", path, error),
            },
        }
    }
}

/// One entry of a token dump.
///
/// Accepts `{kind, text, line?, offset?}` objects, `[kind, text, line]`
/// triples, and bare single-character strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DumpRecord {
    Full {
        kind: String,
        text: String,
        #[serde(default)]
        line: Option<u32>,
        #[serde(default)]
        offset: Option<usize>,
    },
    Triple(String, String, u32),
    Bare(String),
}

/// Parse a JSON token dump. Missing lines and offsets continue from the
/// previous token.
pub fn parse_token_dump(content: &str) -> Result<Vec<Token>, FileProcessorError> {
    let records: Vec<DumpRecord> =
        serde_json::from_str(content).map_err(|e| FileProcessorError::MalformedTokenDump {
            message: e.to_string(),
        })?;

    if records.len() > MAX_TOKEN_COUNT {
        return Err(FileProcessorError::TooManyTokens {
            count: records.len(),
            max_tokens: MAX_TOKEN_COUNT,
        });
    }

    let mut tokens = Vec::with_capacity(records.len());
    let mut next_line = 1u32;
    let mut next_offset = 0usize;

    for record in records {
        let (kind, text, line, offset) = match record {
            DumpRecord::Full {
                kind,
                text,
                line,
                offset,
            } => (TokenKind::from_lexer_name(&kind), text, line, offset),
            DumpRecord::Triple(kind, text, line) => {
                (TokenKind::from_lexer_name(&kind), text, Some(line), None)
            }
            DumpRecord::Bare(text) => (TokenKind::from_lexer_name(&text), text, None, None),
        };

        let token = Token::new(
            kind,
            text,
            line.unwrap_or(next_line),
            offset.unwrap_or(next_offset),
        );
        next_offset = token.end_offset();
        next_line = token.line + count_line_breaks(&token.text);
        tokens.push(token);
    }

    Ok(tokens)
}

/// File metadata collected during processing
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Canonical file path
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// File extension (if any)
    pub extension: Option<String>,
    /// Number of raw tokens in the dump
    pub token_count: usize,
    pub is_json_file: bool,
    pub modified: Option<SystemTime>,
}

impl FileMetadata {
    /// Get file size in human-readable format
    pub fn human_readable_size(&self) -> String {
        human_size(self.size)
    }

    /// Check if file is likely to be large for processing (uses compile-time threshold)
    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Raw tokens read from a dump plus metadata
#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub tokens: Vec<Token>,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Source text reassembled from the token texts
    pub fn source_text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Tokens read per millisecond
    pub fn processing_rate(&self) -> f64 {
        let duration_ms = self.processing_duration.as_secs_f64() * 1000.0;
        if duration_ms > 0.0 {
            self.token_count() as f64 / duration_ms
        } else {
            0.0
        }
    }
}

/// Token dump reader with compile-time limits and runtime preferences
#[derive(Debug, Clone)]
pub struct FileProcessor {
    /// Whether to require a .json extension (runtime preference)
    pub require_json_extension: bool,
    /// Whether to enable detailed performance logging (runtime preference)
    pub enable_performance_logging: bool,
}

impl FileProcessor {
    pub fn new() -> Self {
        Self {
            require_json_extension: false,
            enable_performance_logging: true,
        }
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_json_extension: prefs.require_json_extension,
            enable_performance_logging: prefs.enable_performance_logging,
        }
    }

    pub fn with_json_extension_required(mut self, required: bool) -> Self {
        self.require_json_extension = required;
        self
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.enable_performance_logging = enabled;
        self
    }

    pub fn max_file_size() -> u64 {
        MAX_FILE_SIZE
    }

    pub fn large_file_threshold() -> u64 {
        LARGE_FILE_THRESHOLD
    }

    /// Read and parse a token dump
    pub fn process_file(
        &self,
        file_path: &str,
    ) -> Result<FileProcessingResult, FileProcessorError> {
        let start_time = Instant::now();
        log_debug!("Starting file processing", "file" => file_path);

        let mut metadata = self.inspect(file_path).map_err(|e| reject(e, file_path))?;
        let content = fs::read_to_string(&metadata.path)
            .map_err(|e| reject(FileProcessorError::from_io(&metadata.path, &e), file_path))?;
        let tokens = parse_token_dump(&content).map_err(|e| reject(e, file_path))?;
        metadata.token_count = tokens.len();

        let result = FileProcessingResult {
            tokens,
            metadata,
            processing_duration: start_time.elapsed(),
        };
        self.log_processing_success(&result, file_path);
        Ok(result)
    }

    /// Resolve the path and check size and extension before reading
    fn inspect(&self, file_path: &str) -> Result<FileMetadata, FileProcessorError> {
        if file_path.is_empty() {
            return Err(FileProcessorError::InvalidPath {
                path: String::new(),
            });
        }

        let requested = Path::new(file_path);
        let path = requested
            .canonicalize()
            .map_err(|e| FileProcessorError::from_io(requested, &e))?;
        let stat = fs::metadata(&path).map_err(|e| FileProcessorError::from_io(&path, &e))?;
        if !stat.is_file() {
            return Err(FileProcessorError::InvalidPath {
                path: file_path.to_string(),
            });
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        let metadata = FileMetadata {
            size: stat.len(),
            is_json_file: extension.as_deref() == Some("json"),
            extension,
            token_count: 0,
            modified: stat.modified().ok(),
            path,
        };

        if metadata.size > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                size: metadata.size,
                max_size: MAX_FILE_SIZE,
            });
        }
        if metadata.size == 0 {
            return Err(FileProcessorError::EmptyFile);
        }
        if self.require_json_extension && !metadata.is_json_file {
            return Err(FileProcessorError::InvalidExtension {
                extension: metadata.extension,
            });
        }

        log_debug!("Token dump accepted",
            "size" => metadata.human_readable_size(),
            "is_large_file" => metadata.is_large_file()
        );
        Ok(metadata)
    }

    fn log_processing_success(&self, result: &FileProcessingResult, file_path: &str) {
        if self.enable_performance_logging {
            log_performance!(codes::success::FILE_PROCESSING_SUCCESS, "Token dump read",
                duration = result.processing_duration,
                "file" => file_path,
                "size" => result.metadata.human_readable_size(),
                "tokens" => result.token_count(),
                "tokens_per_ms" => format!("{:.2}", result.processing_rate()),
                "is_large_file" => result.metadata.is_large_file()
            );
        } else {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Token dump read",
                "file" => file_path,
                "tokens" => result.token_count()
            );
        }
    }
}

/// Log a rejected dump once, at the point it leaves the processor
fn reject(error: FileProcessorError, file_path: &str) -> FileProcessorError {
    log_error!(error.error_code(), "Token dump rejected",
        "file" => file_path,
        "reason" => &error
    );
    error
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dump_file(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_parse_object_records() {
        let tokens = parse_token_dump(
            r#"[
                {"kind": "T_OPEN_TAG", "text": "<?php\n", "line": 1, "offset": 0},
                {"kind": "T_VARIABLE", "text": "$a", "line": 2, "offset": 6},
                {"kind": ";", "text": ";", "line": 2, "offset": 8}
            ]"#,
        )
        .unwrap();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::OpenTag);
        assert_eq!(tokens[2], Token::new(TokenKind::Semicolon, ";", 2, 8));
    }

    #[test]
    fn test_missing_positions_are_derived() {
        let tokens = parse_token_dump(
            r#"[
                ["T_OPEN_TAG", "<?php\n", 1],
                {"kind": "T_COMMENT", "text": "// x\n"},
                "{",
                "}"
            ]"#,
        )
        .unwrap();

        assert_eq!(tokens[1].offset, 6);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2], Token::new(TokenKind::OpenCurly, "{", 3, 11));
        assert_eq!(tokens[3].offset, 12);
    }

    #[test]
    fn test_derived_lines_follow_every_break_style() {
        let tokens = parse_token_dump(
            r#"[
                ["T_OPEN_TAG", "<?php\r", 1],
                {"kind": "T_COMMENT", "text": "// a\r\n"},
                "{"
            ]"#,
        )
        .unwrap();

        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2], Token::new(TokenKind::OpenCurly, "{", 3, 12));
    }

    #[test]
    fn test_malformed_dump() {
        let err = parse_token_dump(r#"{"kind": "T_STRING"}"#).unwrap_err();
        assert_matches!(err, FileProcessorError::MalformedTokenDump { .. });
        assert_eq!(err.error_code(), codes::file_processing::MALFORMED_TOKEN_DUMP);
    }

    #[test]
    fn test_process_valid_file() {
        let file = dump_file(r#"[{"kind": "T_INLINE_HTML", "text": "<p>"}]"#, ".json");
        let processor = FileProcessor::new();
        let result = processor
            .process_file(file.path().to_str().unwrap())
            .unwrap();

        assert_eq!(result.token_count(), 1);
        assert_eq!(result.metadata.token_count, 1);
        assert!(result.metadata.is_json_file);
        assert_eq!(result.source_text(), "<p>");
    }

    #[test]
    fn test_file_not_found() {
        let processor = FileProcessor::new();
        let result = processor.process_file("/definitely/not/here.json");
        assert_matches!(result, Err(FileProcessorError::FileNotFound { .. }));
    }

    #[test]
    fn test_empty_file() {
        let file = dump_file("", ".json");
        let result = FileProcessor::new().process_file(file.path().to_str().unwrap());
        assert_matches!(result, Err(FileProcessorError::EmptyFile));
    }

    #[test]
    fn test_extension_requirement() {
        let file = dump_file("[]", ".txt");
        let path = file.path().to_str().unwrap();

        let strict = FileProcessor::new().with_json_extension_required(true);
        assert_matches!(
            strict.process_file(path),
            Err(FileProcessorError::InvalidExtension { extension: Some(ext) }) if ext == "txt"
        );

        let lenient = FileProcessor::new();
        assert!(lenient.process_file(path).is_ok());
    }

    #[test]
    fn test_from_preferences() {
        let prefs = FileProcessorPreferences {
            require_json_extension: true,
            enable_performance_logging: false,
        };
        let processor = FileProcessor::from_preferences(&prefs);
        assert!(processor.require_json_extension);
        assert!(!processor.enable_performance_logging);
    }

    #[test]
    fn test_error_metadata() {
        let error = FileProcessorError::FileTooLarge {
            size: MAX_FILE_SIZE + 1,
            max_size: MAX_FILE_SIZE,
        };
        assert_eq!(error.error_code(), codes::file_processing::FILE_TOO_LARGE);
        assert!(error.requires_halt());
        assert!(!error.is_recoverable());
        assert_eq!(FileProcessor::max_file_size(), MAX_FILE_SIZE);
    }
}
