//! Atomizer: splits composite raw tokens into atomic tokens
//!
//! Every split keeps the source exact: the atoms of a token concatenate back
//! to the token's text, the first atom starts at the token's offset, and each
//! following atom starts where the previous one ended. Line numbers advance
//! with every line break crossed.
//!
//! The split functions are public so callers can apply one directly. Each one
//! checks that it was handed the kind it expects and returns
//! [`AtomizeError::PreconditionViolation`] otherwise.

use crate::config::compile_time::lexical::MAX_TOKEN_LENGTH;
use crate::logging::codes;
use crate::tokens::{Token, TokenKind};
use crate::utils::count_line_breaks;

/// Atomizer errors. All of them indicate a caller or lexer bug, not bad source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AtomizeError {
    #[error("{operation} expects {expected}, got {found} at line {line} (offset {offset})")]
    PreconditionViolation {
        operation: &'static str,
        expected: &'static str,
        found: TokenKind,
        line: u32,
        offset: usize,
    },

    #[error("{operation} cannot split {text:?} at line {line} (offset {offset}): {reason}")]
    MalformedComposite {
        operation: &'static str,
        text: String,
        reason: &'static str,
        line: u32,
        offset: usize,
    },

    #[error("Token too long: {length} bytes at line {line} (max {MAX_TOKEN_LENGTH})")]
    TokenTooLong { length: usize, line: u32 },
}

impl AtomizeError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            AtomizeError::PreconditionViolation { .. }
            | AtomizeError::MalformedComposite { .. } => codes::lexical::PRECONDITION_VIOLATION,
            AtomizeError::TokenTooLong { .. } => codes::lexical::TOKEN_TOO_LONG,
        }
    }
}

/// Writes atoms one after another, tracking line and offset.
struct AtomWriter {
    line: u32,
    offset: usize,
    atoms: Vec<Token>,
}

impl AtomWriter {
    fn starting_at(token: &Token) -> Self {
        Self {
            line: token.line,
            offset: token.offset,
            atoms: Vec::new(),
        }
    }

    fn push(&mut self, kind: TokenKind, text: &str) {
        if text.is_empty() {
            return;
        }
        self.atoms
            .push(Token::new(kind, text, self.line, self.offset));
        self.offset += text.len();
        self.line += count_line_breaks(text);
    }

    /// Alternating whitespace / line-break atoms for a run of whitespace.
    fn push_whitespace_runs(&mut self, text: &str) {
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let breaking = is_break_byte(bytes[i]);
            let start = i;
            while i < bytes.len() && is_break_byte(bytes[i]) == breaking {
                i += 1;
            }
            let kind = if breaking {
                TokenKind::LineBreak
            } else {
                TokenKind::Whitespace
            };
            self.push(kind, &text[start..i]);
        }
    }

    fn finish(self) -> Vec<Token> {
        self.atoms
    }
}

fn is_break_byte(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

/// Splits `text` into `(content, line_break)` pairs. The last pair may have an
/// empty line break.
fn line_segments(text: &str) -> Vec<(&str, &str)> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                let end = if bytes.get(i + 1) == Some(&b'\n') { i + 2 } else { i + 1 };
                segments.push((&text[start..i], &text[i..end]));
                i = end;
                start = end;
            }
            b'\n' => {
                segments.push((&text[start..i], &text[i..i + 1]));
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        segments.push((&text[start..], ""));
    }
    segments
}

/// Length of a single leading line break, if any.
fn leading_line_break(text: &str) -> usize {
    if text.starts_with("\r\n") {
        2
    } else if text.starts_with('\n') || text.starts_with('\r') {
        1
    } else {
        0
    }
}

fn require(
    token: &Token,
    operation: &'static str,
    expected: &'static str,
    accepted: bool,
) -> Result<(), AtomizeError> {
    if accepted {
        Ok(())
    } else {
        Err(AtomizeError::PreconditionViolation {
            operation,
            expected,
            found: token.kind,
            line: token.line,
            offset: token.offset,
        })
    }
}

fn malformed(token: &Token, operation: &'static str, reason: &'static str) -> AtomizeError {
    AtomizeError::MalformedComposite {
        operation,
        text: token.text.clone(),
        reason,
        line: token.line,
        offset: token.offset,
    }
}

// ============================================================================
// SPLIT FUNCTIONS
// ============================================================================

/// Whitespace run into alternating whitespace and line-break atoms.
pub fn split_whitespace(token: &Token) -> Result<Vec<Token>, AtomizeError> {
    const OP: &str = "split_whitespace";
    require(token, OP, "T_WHITESPACE", token.kind == TokenKind::Whitespace)?;
    if token.text.is_empty() {
        return Err(malformed(token, OP, "empty whitespace token"));
    }

    let mut writer = AtomWriter::starting_at(token);
    writer.push_whitespace_runs(&token.text);
    Ok(writer.finish())
}

/// Cast `( type )` into paren, optional whitespace, type name, optional whitespace, paren.
pub fn split_cast(token: &Token) -> Result<Vec<Token>, AtomizeError> {
    const OP: &str = "split_cast";
    require(token, OP, "a cast token", token.kind.is_cast())?;

    let text = token.text.as_str();
    if text.len() < 3 || !text.starts_with('(') || !text.ends_with(')') {
        return Err(malformed(token, OP, "cast must be a parenthesized type name"));
    }

    let inner = &text[1..text.len() - 1];
    let type_name = inner.trim();
    if type_name.is_empty() {
        return Err(malformed(token, OP, "cast has no type name"));
    }
    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[leading.len() + type_name.len()..];

    let mut writer = AtomWriter::starting_at(token);
    writer.push(TokenKind::OpenParen, "(");
    writer.push(TokenKind::Whitespace, leading);
    writer.push(TokenKind::CastType, type_name);
    writer.push(TokenKind::Whitespace, trailing);
    writer.push(TokenKind::CloseParen, ")");
    Ok(writer.finish())
}

/// Attribute opener `#[` into a marker and an opening square bracket.
pub fn split_attribute(token: &Token) -> Result<Vec<Token>, AtomizeError> {
    const OP: &str = "split_attribute";
    require(token, OP, "T_ATTRIBUTE", token.kind == TokenKind::Attribute)?;
    if token.text != "#[" {
        return Err(malformed(token, OP, "attribute opener must be `#[`"));
    }

    let mut writer = AtomWriter::starting_at(token);
    writer.push(TokenKind::AttributeMarker, "#");
    writer.push(TokenKind::OpenSquare, "[");
    Ok(writer.finish())
}

/// Open tag into the tag itself plus any trailing whitespace atoms.
pub fn split_open_tag(token: &Token) -> Result<Vec<Token>, AtomizeError> {
    const OP: &str = "split_open_tag";
    require(
        token,
        OP,
        "T_OPEN_TAG or T_OPEN_TAG_WITH_ECHO",
        matches!(token.kind, TokenKind::OpenTag | TokenKind::OpenTagWithEcho),
    )?;

    let text = token.text.as_str();
    let tag_len = if text.get(..5).is_some_and(|tag| tag.eq_ignore_ascii_case("<?php")) {
        5
    } else if text.starts_with("<?=") {
        3
    } else if text.starts_with("<?") {
        2
    } else {
        return Err(malformed(token, OP, "open tag must start with `<?`"));
    };

    let rest = &text[tag_len..];
    if !rest.chars().all(char::is_whitespace) {
        return Err(malformed(token, OP, "open tag may only be followed by whitespace"));
    }

    let mut writer = AtomWriter::starting_at(token);
    writer.push(token.kind, &text[..tag_len]);
    writer.push_whitespace_runs(rest);
    Ok(writer.finish())
}

/// Close tag into the tag plus an optional single trailing line break.
pub fn split_close_tag(token: &Token) -> Result<Vec<Token>, AtomizeError> {
    const OP: &str = "split_close_tag";
    require(token, OP, "T_CLOSE_TAG", token.kind == TokenKind::CloseTag)?;

    let text = token.text.as_str();
    if !text.starts_with("?>") {
        return Err(malformed(token, OP, "close tag must start with `?>`"));
    }
    let rest = &text[2..];
    if leading_line_break(rest) != rest.len() {
        return Err(malformed(token, OP, "close tag may only be followed by one line break"));
    }

    let mut writer = AtomWriter::starting_at(token);
    writer.push(TokenKind::CloseTag, "?>");
    writer.push(TokenKind::LineBreak, rest);
    Ok(writer.finish())
}

/// Heredoc opener into the `<<<ID` atom plus its mandatory line break.
pub fn split_heredoc_start(token: &Token) -> Result<Vec<Token>, AtomizeError> {
    const OP: &str = "split_heredoc_start";
    require(token, OP, "T_START_HEREDOC", token.kind == TokenKind::StartHeredoc)?;

    let text = token.text.as_str();
    let break_len = if text.ends_with("\r\n") {
        2
    } else if text.ends_with('\n') || text.ends_with('\r') {
        1
    } else {
        return Err(malformed(token, OP, "heredoc opener must end the line"));
    };
    let identifier = &text[..text.len() - break_len];
    if identifier.is_empty() || identifier.contains(['\n', '\r']) {
        return Err(malformed(token, OP, "heredoc opener must be a single identifier line"));
    }

    let mut writer = AtomWriter::starting_at(token);
    writer.push(TokenKind::StartHeredoc, identifier);
    writer.push(TokenKind::LineBreak, &text[identifier.len()..]);
    Ok(writer.finish())
}

/// Heredoc terminator into optional indentation plus the terminator.
pub fn split_heredoc_end(token: &Token) -> Result<Vec<Token>, AtomizeError> {
    const OP: &str = "split_heredoc_end";
    require(token, OP, "T_END_HEREDOC", token.kind == TokenKind::EndHeredoc)?;

    let text = token.text.as_str();
    let terminator = text.trim_start_matches([' ', '\t']);
    if terminator.is_empty() {
        return Err(malformed(token, OP, "heredoc terminator is empty"));
    }

    let mut writer = AtomWriter::starting_at(token);
    writer.push(TokenKind::Whitespace, &text[..text.len() - terminator.len()]);
    writer.push(TokenKind::EndHeredoc, terminator);
    Ok(writer.finish())
}

/// Comment or string segment split line by line.
///
/// With `preserve_whitespace`, leading and trailing whitespace on each line
/// becomes its own whitespace atom; otherwise it stays in the content atom.
pub fn split_lines(token: &Token, preserve_whitespace: bool) -> Result<Vec<Token>, AtomizeError> {
    const OP: &str = "split_lines";
    require(
        token,
        OP,
        "a comment or string segment",
        matches!(
            token.kind,
            TokenKind::Comment
                | TokenKind::DocComment
                | TokenKind::ConstantString
                | TokenKind::EncapsedString
        ),
    )?;

    let mut writer = AtomWriter::starting_at(token);
    for (content, line_break) in line_segments(&token.text) {
        if preserve_whitespace {
            let body = content.trim();
            if body.is_empty() {
                writer.push(TokenKind::Whitespace, content);
            } else {
                let leading = content.len() - content.trim_start().len();
                writer.push(TokenKind::Whitespace, &content[..leading]);
                writer.push(token.kind, body);
                writer.push(TokenKind::Whitespace, &content[leading + body.len()..]);
            }
        } else {
            writer.push(token.kind, content);
        }
        writer.push(TokenKind::LineBreak, line_break);
    }
    Ok(writer.finish())
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Chooses and applies the split function for a raw token.
#[derive(Debug, Clone, Copy)]
pub struct Atomizer {
    preserve_whitespace: bool,
}

impl Atomizer {
    pub fn new(preserve_whitespace: bool) -> Self {
        Self {
            preserve_whitespace,
        }
    }

    /// `Ok(None)` when the token passes through unchanged.
    pub fn atomize(&self, token: &Token) -> Result<Option<Vec<Token>>, AtomizeError> {
        if token.text.len() > MAX_TOKEN_LENGTH {
            return Err(AtomizeError::TokenTooLong {
                length: token.text.len(),
                line: token.line,
            });
        }

        let atoms = match token.kind {
            TokenKind::Whitespace => split_whitespace(token)?,
            kind if kind.is_cast() => split_cast(token)?,
            TokenKind::Attribute => split_attribute(token)?,
            TokenKind::OpenTag | TokenKind::OpenTagWithEcho => split_open_tag(token)?,
            TokenKind::CloseTag => split_close_tag(token)?,
            TokenKind::StartHeredoc => split_heredoc_start(token)?,
            TokenKind::EndHeredoc => split_heredoc_end(token)?,
            TokenKind::Comment
            | TokenKind::DocComment
            | TokenKind::ConstantString
            | TokenKind::EncapsedString => split_lines(token, self.preserve_whitespace)?,
            _ => return Ok(None),
        };

        debug_assert_eq!(
            atoms.iter().map(|a| a.text.as_str()).collect::<String>(),
            token.text
        );

        if atoms.len() == 1 && atoms[0] == *token {
            Ok(None)
        } else {
            Ok(Some(atoms))
        }
    }
}

impl Default for Atomizer {
    fn default() -> Self {
        Self::new(true)
    }
}
