//! Error and success codes with their classification metadata
//!
//! Every code used by the lexer layers is declared here together with its
//! category, severity, and recommended action.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

}

/// Complete metadata for an error code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Token dump file error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const MALFORMED_TOKEN_DUMP: Code = Code::new("E013");
    pub const TOO_MANY_TOKENS: Code = Code::new("E014");
}

/// Atomizer error codes
pub mod lexical {
    use super::Code;

    pub const PRECONDITION_VIOLATION: Code = Code::new("E020");
    pub const TOKEN_TOO_LONG: Code = Code::new("E021");
}

/// Scanner and feature builder codes
pub mod scanner {
    use super::Code;

    pub const SCAN_HALTED: Code = Code::new("E030");
    pub const BUILDER_DEPTH_EXCEEDED: Code = Code::new("E031");
    pub const CANDIDATE_OVERFLOW: Code = Code::new("E032");
    pub const IMPORT_ENTRY_LIMIT: Code = Code::new("E033");
}

/// Output generation error codes
pub mod output {
    use super::Code;

    pub const SERIALIZATION_FAILED: Code = Code::new("E040");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    // File processing
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");

    // Scanner
    pub const SCAN_COMPLETE: Code = Code::new("I020");
    pub const FEATURE_RECOGNIZED: Code = Code::new("I021");
    pub const NAMESPACE_ENTERED: Code = Code::new("I022");

    // Output
    pub const OUTPUT_GENERATED: Code = Code::new("I040");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

use Severity::{Critical, High, Low, Medium};

/// code, category, severity, recoverable, requires_halt, description, action
#[rustfmt::skip]
const REGISTRY_TABLE: &[(&str, &str, Severity, bool, bool, &str, &str)] = &[
    ("ERR001", "System", Critical, false, true, "Critical internal system error", "File a bug report with the failing input"),
    ("ERR002", "System", Critical, false, true, "System initialization failure", "Check configuration and environment variables"),

    ("E005", "FileProcessing", Medium, false, true, "File not found at specified path", "Check file path and ensure file exists"),
    ("E006", "FileProcessing", Low, true, false, "File does not have .json extension", "Rename the token dump or disable the extension requirement"),
    ("E007", "FileProcessing", Medium, false, true, "File exceeds maximum size limit", "Split the source unit or raise max_file_size"),
    ("E008", "FileProcessing", Medium, false, true, "File is empty when content expected", "Provide a non-empty token dump"),
    ("E009", "FileProcessing", Medium, false, true, "Permission denied accessing file", "Check file permissions and user access rights"),
    ("E010", "FileProcessing", Medium, false, true, "File content is not valid UTF-8", "Re-export the token dump as UTF-8"),
    ("E011", "FileProcessing", Medium, false, true, "I/O error while reading file", "Retry or check the underlying storage"),
    ("E012", "FileProcessing", Medium, false, true, "Path does not point to a regular file", "Pass a file path, not a directory"),
    ("E013", "FileProcessing", Medium, false, true, "Token dump is not a valid token array", "Regenerate the dump with the primitive lexer"),
    ("E014", "FileProcessing", Medium, false, true, "Token dump exceeds maximum token count", "Split the source unit or raise max_token_count"),

    ("E020", "Lexical", Critical, false, true, "Split function invoked on a token it does not accept", "Fix the caller; this is a programming error"),
    ("E021", "Lexical", Medium, false, true, "Token text exceeds maximum token length", "Raise max_token_length or inspect the input"),

    ("E030", "Scanner", High, false, true, "Scan halted after an unrecoverable error", "Inspect the preceding error event"),
    ("E031", "Scanner", Low, true, false, "Feature builder stack depth limit reached", "Raise max_builder_depth if the input is legitimate"),
    ("E032", "Scanner", Low, true, false, "Candidate buffer discarded without a verdict", "Raise max_candidate_tokens if the input is legitimate"),
    ("E033", "Scanner", Low, true, false, "Import declaration entry limit reached", "Raise max_import_entries if the input is legitimate"),

    ("E040", "Output", Medium, false, true, "Failed to serialize scan output", "Check output mode and input content"),

    ("I001", "Success", Low, true, false, "Operation completed successfully", "No action required"),
    ("I004", "Success", Low, true, false, "System initialization completed", "No action required"),
    ("I006", "Success", Low, true, false, "Token dump loaded successfully", "Continue with scanning"),
    ("I020", "Success", Low, true, false, "Scan of source unit completed", "No action required"),
    ("I021", "Success", Low, true, false, "Language feature recognized", "No action required"),
    ("I022", "Success", Low, true, false, "Namespace became active", "No action required"),
    ("I040", "Success", Low, true, false, "Scan output generated", "No action required"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_TABLE
            .iter()
            .map(|&(code, category, severity, recoverable, halt, description, action)| {
                (
                    code,
                    ErrorMetadata::new(code, category, severity, recoverable, halt, description, action),
                )
            })
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific error code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_declared_code_has_metadata() {
        let declared = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            file_processing::FILE_NOT_FOUND,
            file_processing::MALFORMED_TOKEN_DUMP,
            file_processing::TOO_MANY_TOKENS,
            lexical::PRECONDITION_VIOLATION,
            lexical::TOKEN_TOO_LONG,
            scanner::SCAN_HALTED,
            scanner::BUILDER_DEPTH_EXCEEDED,
            scanner::CANDIDATE_OVERFLOW,
            scanner::IMPORT_ENTRY_LIMIT,
            output::SERIALIZATION_FAILED,
            success::SCAN_COMPLETE,
            success::FEATURE_RECOGNIZED,
            success::NAMESPACE_ENTERED,
            success::OUTPUT_GENERATED,
        ];
        for code in declared {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_registry_codes_are_unique() {
        assert_eq!(get_error_registry().len(), REGISTRY_TABLE.len());
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E020"), "Lexical");
        assert_eq!(get_severity("E020"), Severity::Critical);
        assert!(requires_halt("E020"));
        assert!(is_recoverable("E031"));
        assert!(!requires_halt("E031"));
        assert_eq!(get_description("nope"), "Unknown error");
        assert_eq!(get_category("nope"), "Unknown");
    }
}
