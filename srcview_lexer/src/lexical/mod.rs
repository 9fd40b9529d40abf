//! Lexical refinement of raw lexer tokens
//!
//! The primitive lexer hands over coarse tokens: a whitespace run spanning
//! several lines, a doc comment with embedded newlines, a cast with its
//! parentheses. This module splits those into atoms so every later stage sees
//! one line break per line-break token and position-exact offsets.

pub mod atomizer;

use crate::config::compile_time::lexical::MAX_TOKEN_LENGTH;
use crate::tokens::Token;

pub use atomizer::{
    split_attribute, split_cast, split_close_tag, split_heredoc_end, split_heredoc_start,
    split_lines, split_open_tag, split_whitespace, AtomizeError, Atomizer,
};

/// Atomize a whole token sequence eagerly.
///
/// The scanner atomizes lazily; this is for callers that only want the
/// refined stream.
pub fn atomize_all<I>(tokens: I, preserve_whitespace: bool) -> Result<Vec<Token>, AtomizeError>
where
    I: IntoIterator<Item = Token>,
{
    let atomizer = Atomizer::new(preserve_whitespace);
    let mut refined = Vec::new();

    for token in tokens {
        match atomizer.atomize(&token)? {
            Some(atoms) => refined.extend(atoms),
            None => refined.push(token),
        }
    }

    Ok(refined)
}

/// Initialize lexical module validation (for system startup)
pub fn init_lexical_logging() -> Result<(), String> {
    for code in [
        crate::logging::codes::lexical::PRECONDITION_VIOLATION,
        crate::logging::codes::lexical::TOKEN_TOO_LONG,
    ] {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    crate::log_debug!("Lexical limits initialized",
        "max_token_length" => MAX_TOKEN_LENGTH
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    #[test]
    fn test_atomize_all_keeps_text() {
        let raw = vec![
            Token::new(TokenKind::OpenTag, "<?php\n", 1, 0),
            Token::new(TokenKind::Whitespace, "\n  ", 2, 6),
            Token::new(TokenKind::Variable, "$a", 3, 9),
        ];
        let source: String = raw.iter().map(|t| t.text.as_str()).collect();

        let refined = atomize_all(raw, true).unwrap();
        let rebuilt: String = refined.iter().map(|t| t.text.as_str()).collect();

        assert_eq!(rebuilt, source);
        assert_eq!(refined.len(), 5);
        assert_eq!(refined[4].line, 3);
    }

    #[test]
    fn test_lexical_codes_registered() {
        assert!(init_lexical_logging().is_ok());
    }
}
