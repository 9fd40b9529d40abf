mod error;
pub mod output;
mod result;

// Re-export public types
pub use error::PipelineError;
pub use output::{Fragment, OutputToken, PipelineOutput, TokenListing};
pub use result::PipelineResult;

use crate::config::runtime::{FileProcessorPreferences, TokenizerPreferences};
use crate::file_processor::FileProcessor;
use crate::logging::{self, codes};
use crate::scanner::{ScanOptions, Scanner};
use crate::tokens::Token;
use crate::{log_info, log_performance, log_success};
use std::path::PathBuf;
use std::time::Instant;

/// Scan an in-memory raw token stream (stream -> atoms -> levels -> builders -> categories)
pub fn process_tokens(
    tokens: Vec<Token>,
    prefs: &TokenizerPreferences,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    let mut scanner = Scanner::new(tokens.into_iter(), ScanOptions::from(prefs));
    let scanned = scanner.scan_all()?;
    let namespace = scanner.namespace().map(str::to_string);
    let (products, tables, metrics) = scanner.into_parts();

    let result = PipelineResult {
        tokens: scanned,
        products,
        namespace,
        tables,
        metrics,
        file_metadata: None,
        processing_duration: start_time.elapsed(),
    };

    if prefs.collect_metrics {
        log_performance!(codes::success::SCAN_COMPLETE, "Scan metrics",
            duration = result.processing_duration,
            "raw_tokens" => result.metrics.raw_tokens,
            "atoms_produced" => result.metrics.atoms_produced,
            "builders_opened" => result.metrics.builders_opened,
            "builders_finished" => result.metrics.builders_finished,
            "candidates_discarded" => result.metrics.candidates_discarded,
            "classifier_cache_hits" => result.metrics.classifier_cache_hits
        );
    }

    Ok(result)
}

/// Read a token dump and scan it with default preferences
pub fn process_file(file_path: &str) -> Result<PipelineResult, PipelineError> {
    process_file_with_preferences(
        file_path,
        &TokenizerPreferences::default(),
        &FileProcessorPreferences::default(),
    )
}

/// Read a token dump and scan it (file -> raw tokens -> scanner -> result)
pub fn process_file_with_preferences(
    file_path: &str,
    tokenizer: &TokenizerPreferences,
    files: &FileProcessorPreferences,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    // Set up file context for global logging
    logging::with_file_context(PathBuf::from(file_path), 0, || {
        log_info!("Starting token stream pipeline",
            "file" => file_path,
            "atomize" => tokenizer.atomize,
            "output_mode" => tokenizer.output_mode.as_str()
        );

        let file_result = FileProcessor::from_preferences(files).process_file(file_path)?;
        let mut result = process_tokens(file_result.tokens, tokenizer)?;

        result.file_metadata = Some(file_result.metadata);
        result.processing_duration = start_time.elapsed();
        result.log_success(file_path);

        Ok(result)
    })
}

/// Shape a result for the presentation layer
pub fn render(
    result: &PipelineResult,
    prefs: &TokenizerPreferences,
    source: Option<String>,
) -> PipelineOutput {
    let output = PipelineOutput::from_result(result, prefs, source);
    log_success!(codes::success::OUTPUT_GENERATED, "Output generated",
        "mode" => output.mode.as_str(),
        "entries" => output.tokens.len()
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::OutputMode;
    use crate::grammar::Product;
    use crate::tokens::TokenKind;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    fn prefs() -> TokenizerPreferences {
        TokenizerPreferences {
            atomize: true,
            preserve_comment_whitespace: true,
            trim_trailing_whitespace: false,
            key_by_line: false,
            output_mode: OutputMode::Enhanced,
            collect_metrics: true,
        }
    }

    #[test]
    fn test_process_tokens() {
        let tokens = vec![
            Token::new(TokenKind::OpenTag, "<?php ", 1, 0),
            Token::new(TokenKind::Namespace, "namespace", 1, 6),
            Token::new(TokenKind::Whitespace, " ", 1, 15),
            Token::new(TokenKind::Identifier, "App", 1, 16),
            Token::new(TokenKind::Semicolon, ";", 1, 19),
        ];
        let result = process_tokens(tokens, &prefs()).unwrap();

        assert_eq!(result.namespace.as_deref(), Some("App"));
        assert_eq!(result.source_text(), "<?php namespace App;");
        assert_matches!(result.products.as_slice(), [Product::NamespaceDeclaration(decl)] => {
            assert_eq!(decl.name, "App");
        });
    }

    #[test]
    fn test_process_file_end_to_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("closure.json");
        fs::write(
            &path,
            r#"[
                ["T_OPEN_TAG", "<?php\n", 1],
                ["T_VARIABLE", "$f", 2],
                ["T_WHITESPACE", " ", 2], "=", ["T_WHITESPACE", " ", 2],
                ["T_FN", "fn", 2],
                "(", ["T_VARIABLE", "$x", 2], ")",
                ["T_WHITESPACE", " ", 2], ["T_DOUBLE_ARROW", "=>", 2], ["T_WHITESPACE", " ", 2],
                ["T_VARIABLE", "$x", 2],
                ";"
            ]"#,
        )
        .unwrap();

        let result = process_file(path.to_str().unwrap()).unwrap();
        assert!(result.file_metadata.is_some());
        assert_eq!(result.source_text(), "<?php\n$f = fn($x) => $x;");
        assert_eq!(result.metrics.builders_finished, 1);

        let output = render(&result, &prefs(), None);
        assert_eq!(output.tokens.len(), result.token_count());
    }

    #[test]
    fn test_missing_file_maps_code() {
        let error = process_file("/no/such/dump.json").unwrap_err();
        assert_matches!(error, PipelineError::FileProcessing(_));
        assert_eq!(error.error_code(), codes::file_processing::FILE_NOT_FOUND);
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        assert_matches!(error, PipelineError::Pipeline { ref message } if message == "Test error");
    }
}
