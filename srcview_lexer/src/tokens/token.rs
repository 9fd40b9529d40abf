//! Token model shared by every stage of the re-tokenizer
//!
//! `TokenKind` covers the token names emitted by the primitive lexer plus the
//! atom-only kinds the atomizer introduces when it splits composite tokens.
use crate::utils::{Position, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of token kinds understood by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TokenKind {
    // === MARKUP AND TAGS ===
    InlineHtml,
    OpenTag,
    OpenTagWithEcho,
    CloseTag,

    // === TRIVIA ===
    Whitespace,
    /// Atom: one line break sequence
    LineBreak,
    Comment,
    DocComment,

    // === NAMES ===
    Variable,
    /// Bare identifier (`T_STRING`)
    Identifier,
    NameQualified,
    NameFullyQualified,
    NameRelative,

    // === LITERALS ===
    ConstantString,
    EncapsedString,
    StringVarname,
    LNumber,
    DNumber,
    NumString,
    StartHeredoc,
    EndHeredoc,
    DoubleQuote,
    Backtick,

    // === CASTS ===
    IntCast,
    DoubleCast,
    StringCast,
    ArrayCast,
    ObjectCast,
    BoolCast,
    UnsetCast,
    /// Atom: the type name inside a cast
    CastType,

    // === ATTRIBUTES AND INTERPOLATION ===
    /// `#[`
    Attribute,
    /// Atom: the `#` of a split attribute opener
    AttributeMarker,
    /// `${`
    DollarOpenCurlyBraces,
    /// `{$`
    CurlyOpen,

    // === FEATURE KEYWORDS ===
    Namespace,
    Use,
    Function,
    Fn,
    As,
    Const,

    // === CLASS-INTRODUCING KEYWORDS ===
    Class,
    New,
    Instanceof,
    Extends,
    Interface,
    Trait,
    Enum,
    Implements,
    Insteadof,
    Catch,

    // === OTHER KEYWORDS ===
    Case,
    Static,
    Array,
    Callable,
    /// Statement-level keyword without special handling
    Keyword,
    /// Keyword usable inside an expression (`isset`, `include`, `clone`, ...)
    ExpressionKeyword,
    /// `__LINE__`, `__CLASS__`, ...
    MagicConstant,

    // === MULTI-CHARACTER OPERATORS ===
    DoubleColon,
    ObjectOperator,
    NullsafeObjectOperator,
    DoubleArrow,
    NsSeparator,
    Ellipsis,
    Operator,

    // === SINGLE-CHARACTER TOKENS ===
    OpenParen,
    CloseParen,
    OpenCurly,
    CloseCurly,
    OpenSquare,
    CloseSquare,
    Semicolon,
    Comma,
    Colon,
    Question,
    Pipe,
    Ampersand,
    Equals,
    Dollar,
    /// Any other single-character operator
    Char,

    Unknown,
}

/// Bracket family tracked by the level counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BracketFamily {
    Paren,
    Curly,
    Square,
}

impl BracketFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            BracketFamily::Paren => "paren",
            BracketFamily::Curly => "curly",
            BracketFamily::Square => "square",
        }
    }
}

/// Whether a bracket token opens or closes its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketRole {
    Open,
    Close,
}

impl TokenKind {
    /// Map a primitive lexer token name (or single-character token text) to a kind.
    ///
    /// Unrecognized `T_*` names map to `Unknown` so that newer lexers do not
    /// break the scanner.
    pub fn from_lexer_name(name: &str) -> TokenKind {
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return TokenKind::from_char(ch);
        }

        match name {
            "T_INLINE_HTML" => TokenKind::InlineHtml,
            "T_OPEN_TAG" => TokenKind::OpenTag,
            "T_OPEN_TAG_WITH_ECHO" => TokenKind::OpenTagWithEcho,
            "T_CLOSE_TAG" => TokenKind::CloseTag,
            "T_WHITESPACE" => TokenKind::Whitespace,
            "LINE_BREAK" => TokenKind::LineBreak,
            "T_COMMENT" => TokenKind::Comment,
            "T_DOC_COMMENT" => TokenKind::DocComment,
            "T_VARIABLE" => TokenKind::Variable,
            "T_STRING" => TokenKind::Identifier,
            "T_NAME_QUALIFIED" => TokenKind::NameQualified,
            "T_NAME_FULLY_QUALIFIED" => TokenKind::NameFullyQualified,
            "T_NAME_RELATIVE" => TokenKind::NameRelative,
            "T_CONSTANT_ENCAPSED_STRING" => TokenKind::ConstantString,
            "T_ENCAPSED_AND_WHITESPACE" => TokenKind::EncapsedString,
            "T_STRING_VARNAME" => TokenKind::StringVarname,
            "T_LNUMBER" => TokenKind::LNumber,
            "T_DNUMBER" => TokenKind::DNumber,
            "T_NUM_STRING" => TokenKind::NumString,
            "T_START_HEREDOC" => TokenKind::StartHeredoc,
            "T_END_HEREDOC" => TokenKind::EndHeredoc,
            "T_INT_CAST" => TokenKind::IntCast,
            "T_DOUBLE_CAST" => TokenKind::DoubleCast,
            "T_STRING_CAST" => TokenKind::StringCast,
            "T_ARRAY_CAST" => TokenKind::ArrayCast,
            "T_OBJECT_CAST" => TokenKind::ObjectCast,
            "T_BOOL_CAST" => TokenKind::BoolCast,
            "T_UNSET_CAST" => TokenKind::UnsetCast,
            "CAST_TYPE" => TokenKind::CastType,
            "T_ATTRIBUTE" => TokenKind::Attribute,
            "ATTRIBUTE_MARKER" => TokenKind::AttributeMarker,
            "T_DOLLAR_OPEN_CURLY_BRACES" => TokenKind::DollarOpenCurlyBraces,
            "T_CURLY_OPEN" => TokenKind::CurlyOpen,
            "T_NAMESPACE" => TokenKind::Namespace,
            "T_USE" => TokenKind::Use,
            "T_FUNCTION" => TokenKind::Function,
            "T_FN" => TokenKind::Fn,
            "T_AS" => TokenKind::As,
            "T_CONST" => TokenKind::Const,
            "T_CLASS" => TokenKind::Class,
            "T_NEW" => TokenKind::New,
            "T_INSTANCEOF" => TokenKind::Instanceof,
            "T_EXTENDS" => TokenKind::Extends,
            "T_INTERFACE" => TokenKind::Interface,
            "T_TRAIT" => TokenKind::Trait,
            "T_ENUM" => TokenKind::Enum,
            "T_IMPLEMENTS" => TokenKind::Implements,
            "T_INSTEADOF" => TokenKind::Insteadof,
            "T_CATCH" => TokenKind::Catch,
            "T_CASE" => TokenKind::Case,
            "T_STATIC" => TokenKind::Static,
            "T_ARRAY" => TokenKind::Array,
            "T_CALLABLE" => TokenKind::Callable,
            "T_PAAMAYIM_NEKUDOTAYIM" | "T_DOUBLE_COLON" => TokenKind::DoubleColon,
            "T_OBJECT_OPERATOR" => TokenKind::ObjectOperator,
            "T_NULLSAFE_OBJECT_OPERATOR" => TokenKind::NullsafeObjectOperator,
            "T_DOUBLE_ARROW" => TokenKind::DoubleArrow,
            "T_NS_SEPARATOR" => TokenKind::NsSeparator,
            "T_ELLIPSIS" => TokenKind::Ellipsis,
            "T_AMPERSAND_FOLLOWED_BY_VAR_OR_VARARG"
            | "T_AMPERSAND_NOT_FOLLOWED_BY_VAR_OR_VARARG" => TokenKind::Ampersand,
            "T_ABSTRACT" | "T_BREAK" | "T_CONTINUE" | "T_DECLARE" | "T_DEFAULT" | "T_DO"
            | "T_ECHO" | "T_ELSE" | "T_ELSEIF" | "T_ENDDECLARE" | "T_ENDFOR"
            | "T_ENDFOREACH" | "T_ENDIF" | "T_ENDSWITCH" | "T_ENDWHILE" | "T_FINAL"
            | "T_FINALLY" | "T_FOR" | "T_FOREACH" | "T_GLOBAL" | "T_GOTO" | "T_IF"
            | "T_PRIVATE" | "T_PROTECTED" | "T_PUBLIC" | "T_READONLY" | "T_RETURN"
            | "T_SWITCH" | "T_TRY" | "T_VAR" | "T_WHILE" | "T_HALT_COMPILER" => {
                TokenKind::Keyword
            }
            "T_ISSET" | "T_EMPTY" | "T_EVAL" | "T_INCLUDE" | "T_INCLUDE_ONCE" | "T_REQUIRE"
            | "T_REQUIRE_ONCE" | "T_PRINT" | "T_LIST" | "T_EXIT" | "T_CLONE" | "T_YIELD"
            | "T_YIELD_FROM" | "T_THROW" | "T_MATCH" | "T_UNSET" => {
                TokenKind::ExpressionKeyword
            }
            "T_LINE" | "T_FILE" | "T_DIR" | "T_CLASS_C" | "T_TRAIT_C" | "T_METHOD_C"
            | "T_FUNC_C" | "T_NS_C" | "T_PROPERTY_C" => TokenKind::MagicConstant,
            "T_IS_EQUAL" | "T_IS_NOT_EQUAL" | "T_IS_IDENTICAL" | "T_IS_NOT_IDENTICAL"
            | "T_IS_SMALLER_OR_EQUAL" | "T_IS_GREATER_OR_EQUAL" | "T_SPACESHIP"
            | "T_PLUS_EQUAL" | "T_MINUS_EQUAL" | "T_MUL_EQUAL" | "T_DIV_EQUAL"
            | "T_CONCAT_EQUAL" | "T_MOD_EQUAL" | "T_AND_EQUAL" | "T_OR_EQUAL"
            | "T_XOR_EQUAL" | "T_SL_EQUAL" | "T_SR_EQUAL" | "T_POW_EQUAL"
            | "T_COALESCE_EQUAL" | "T_COALESCE" | "T_BOOLEAN_AND" | "T_BOOLEAN_OR"
            | "T_LOGICAL_AND" | "T_LOGICAL_OR" | "T_LOGICAL_XOR" | "T_INC" | "T_DEC"
            | "T_SL" | "T_SR" | "T_POW" => TokenKind::Operator,
            _ => TokenKind::Unknown,
        }
    }

    /// Map a single-character token to its kind.
    pub fn from_char(ch: char) -> TokenKind {
        match ch {
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '{' => TokenKind::OpenCurly,
            '}' => TokenKind::CloseCurly,
            '[' => TokenKind::OpenSquare,
            ']' => TokenKind::CloseSquare,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '?' => TokenKind::Question,
            '|' => TokenKind::Pipe,
            '&' => TokenKind::Ampersand,
            '=' => TokenKind::Equals,
            '$' => TokenKind::Dollar,
            '"' => TokenKind::DoubleQuote,
            '`' => TokenKind::Backtick,
            '\\' => TokenKind::NsSeparator,
            _ => TokenKind::Char,
        }
    }

    /// Name used when serializing a kind.
    pub fn as_lexer_name(&self) -> &'static str {
        match self {
            TokenKind::InlineHtml => "T_INLINE_HTML",
            TokenKind::OpenTag => "T_OPEN_TAG",
            TokenKind::OpenTagWithEcho => "T_OPEN_TAG_WITH_ECHO",
            TokenKind::CloseTag => "T_CLOSE_TAG",
            TokenKind::Whitespace => "T_WHITESPACE",
            TokenKind::LineBreak => "LINE_BREAK",
            TokenKind::Comment => "T_COMMENT",
            TokenKind::DocComment => "T_DOC_COMMENT",
            TokenKind::Variable => "T_VARIABLE",
            TokenKind::Identifier => "T_STRING",
            TokenKind::NameQualified => "T_NAME_QUALIFIED",
            TokenKind::NameFullyQualified => "T_NAME_FULLY_QUALIFIED",
            TokenKind::NameRelative => "T_NAME_RELATIVE",
            TokenKind::ConstantString => "T_CONSTANT_ENCAPSED_STRING",
            TokenKind::EncapsedString => "T_ENCAPSED_AND_WHITESPACE",
            TokenKind::StringVarname => "T_STRING_VARNAME",
            TokenKind::LNumber => "T_LNUMBER",
            TokenKind::DNumber => "T_DNUMBER",
            TokenKind::NumString => "T_NUM_STRING",
            TokenKind::StartHeredoc => "T_START_HEREDOC",
            TokenKind::EndHeredoc => "T_END_HEREDOC",
            TokenKind::DoubleQuote => "\"",
            TokenKind::Backtick => "`",
            TokenKind::IntCast => "T_INT_CAST",
            TokenKind::DoubleCast => "T_DOUBLE_CAST",
            TokenKind::StringCast => "T_STRING_CAST",
            TokenKind::ArrayCast => "T_ARRAY_CAST",
            TokenKind::ObjectCast => "T_OBJECT_CAST",
            TokenKind::BoolCast => "T_BOOL_CAST",
            TokenKind::UnsetCast => "T_UNSET_CAST",
            TokenKind::CastType => "CAST_TYPE",
            TokenKind::Attribute => "T_ATTRIBUTE",
            TokenKind::AttributeMarker => "ATTRIBUTE_MARKER",
            TokenKind::DollarOpenCurlyBraces => "T_DOLLAR_OPEN_CURLY_BRACES",
            TokenKind::CurlyOpen => "T_CURLY_OPEN",
            TokenKind::Namespace => "T_NAMESPACE",
            TokenKind::Use => "T_USE",
            TokenKind::Function => "T_FUNCTION",
            TokenKind::Fn => "T_FN",
            TokenKind::As => "T_AS",
            TokenKind::Const => "T_CONST",
            TokenKind::Class => "T_CLASS",
            TokenKind::New => "T_NEW",
            TokenKind::Instanceof => "T_INSTANCEOF",
            TokenKind::Extends => "T_EXTENDS",
            TokenKind::Interface => "T_INTERFACE",
            TokenKind::Trait => "T_TRAIT",
            TokenKind::Enum => "T_ENUM",
            TokenKind::Implements => "T_IMPLEMENTS",
            TokenKind::Insteadof => "T_INSTEADOF",
            TokenKind::Catch => "T_CATCH",
            TokenKind::Case => "T_CASE",
            TokenKind::Static => "T_STATIC",
            TokenKind::Array => "T_ARRAY",
            TokenKind::Callable => "T_CALLABLE",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::ExpressionKeyword => "EXPRESSION_KEYWORD",
            TokenKind::MagicConstant => "MAGIC_CONSTANT",
            TokenKind::DoubleColon => "T_DOUBLE_COLON",
            TokenKind::ObjectOperator => "T_OBJECT_OPERATOR",
            TokenKind::NullsafeObjectOperator => "T_NULLSAFE_OBJECT_OPERATOR",
            TokenKind::DoubleArrow => "T_DOUBLE_ARROW",
            TokenKind::NsSeparator => "T_NS_SEPARATOR",
            TokenKind::Ellipsis => "T_ELLIPSIS",
            TokenKind::Operator => "OPERATOR",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenCurly => "{",
            TokenKind::CloseCurly => "}",
            TokenKind::OpenSquare => "[",
            TokenKind::CloseSquare => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Question => "?",
            TokenKind::Pipe => "|",
            TokenKind::Ampersand => "&",
            TokenKind::Equals => "=",
            TokenKind::Dollar => "$",
            TokenKind::Char => "CHAR",
            TokenKind::Unknown => "UNKNOWN",
        }
    }

    /// Bracket family and role, if this kind moves a level counter.
    pub fn bracket(&self) -> Option<(BracketFamily, BracketRole)> {
        match self {
            TokenKind::OpenParen => Some((BracketFamily::Paren, BracketRole::Open)),
            TokenKind::CloseParen => Some((BracketFamily::Paren, BracketRole::Close)),
            TokenKind::OpenCurly | TokenKind::CurlyOpen | TokenKind::DollarOpenCurlyBraces => {
                Some((BracketFamily::Curly, BracketRole::Open))
            }
            TokenKind::CloseCurly => Some((BracketFamily::Curly, BracketRole::Close)),
            TokenKind::OpenSquare | TokenKind::Attribute => {
                Some((BracketFamily::Square, BracketRole::Open))
            }
            TokenKind::CloseSquare => Some((BracketFamily::Square, BracketRole::Close)),
            _ => None,
        }
    }

    pub fn is_cast(&self) -> bool {
        matches!(
            self,
            TokenKind::IntCast
                | TokenKind::DoubleCast
                | TokenKind::StringCast
                | TokenKind::ArrayCast
                | TokenKind::ObjectCast
                | TokenKind::BoolCast
                | TokenKind::UnsetCast
        )
    }

    /// Whitespace of any shape
    pub fn is_whitespace(&self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::LineBreak)
    }

    /// Tokens skipped by lookahead/lookbehind and by candidate buffers
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineBreak | TokenKind::Comment | TokenKind::DocComment
        )
    }

    /// Qualified, fully-qualified, or relative name
    pub fn is_name_segment(&self) -> bool {
        matches!(
            self,
            TokenKind::NameQualified | TokenKind::NameFullyQualified | TokenKind::NameRelative
        )
    }

    /// Any token that can spell a (possibly qualified) name
    pub fn is_name(&self) -> bool {
        *self == TokenKind::Identifier || self.is_name_segment()
    }

    /// Keywords that introduce a class-like name
    pub fn introduces_class_name(&self) -> bool {
        matches!(
            self,
            TokenKind::Class
                | TokenKind::New
                | TokenKind::Instanceof
                | TokenKind::Extends
                | TokenKind::Interface
                | TokenKind::Trait
                | TokenKind::Enum
                | TokenKind::Implements
                | TokenKind::Insteadof
                | TokenKind::Use
        )
    }

    /// Reserved words the primitive lexer reports as keywords
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Namespace
                | TokenKind::Use
                | TokenKind::Function
                | TokenKind::Fn
                | TokenKind::As
                | TokenKind::Const
                | TokenKind::Class
                | TokenKind::New
                | TokenKind::Instanceof
                | TokenKind::Extends
                | TokenKind::Interface
                | TokenKind::Trait
                | TokenKind::Enum
                | TokenKind::Implements
                | TokenKind::Insteadof
                | TokenKind::Catch
                | TokenKind::Case
                | TokenKind::Static
                | TokenKind::Array
                | TokenKind::Callable
                | TokenKind::Keyword
                | TokenKind::ExpressionKeyword
        )
    }
}

impl From<String> for TokenKind {
    fn from(name: String) -> Self {
        TokenKind::from_lexer_name(&name)
    }
}

impl From<TokenKind> for String {
    fn from(kind: TokenKind) -> Self {
        kind.as_lexer_name().to_string()
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_lexer_name())
    }
}

/// One lexical token with its exact source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based line of the first byte
    pub line: u32,
    /// Byte offset of the first byte
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            offset,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.offset, self.line)
    }

    pub fn span(&self) -> Span {
        Span::covering(self.position(), &self.text)
    }

    /// Offset one past the last byte
    pub fn end_offset(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Whether `next` starts exactly where this token ends
    pub fn is_adjacent_to(&self, next: &Token) -> bool {
        next.offset == self.end_offset()
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    /// Case-insensitive text comparison for keyword-like tokens
    pub fn text_is(&self, expected: &str) -> bool {
        self.text.eq_ignore_ascii_case(expected)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}) at {}", self.kind, self.text, self.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_name_mapping() {
        assert_eq!(TokenKind::from_lexer_name("T_WHITESPACE"), TokenKind::Whitespace);
        assert_eq!(TokenKind::from_lexer_name("T_STRING"), TokenKind::Identifier);
        assert_eq!(TokenKind::from_lexer_name("T_PAAMAYIM_NEKUDOTAYIM"), TokenKind::DoubleColon);
        assert_eq!(TokenKind::from_lexer_name("T_IF"), TokenKind::Keyword);
        assert_eq!(TokenKind::from_lexer_name("T_ISSET"), TokenKind::ExpressionKeyword);
        assert_eq!(TokenKind::from_lexer_name("("), TokenKind::OpenParen);
        assert_eq!(TokenKind::from_lexer_name("+"), TokenKind::Char);
        assert_eq!(TokenKind::from_lexer_name("T_SOMETHING_NEW"), TokenKind::Unknown);
    }

    #[test]
    fn test_lexer_names_are_stable() {
        for kind in [
            TokenKind::Whitespace,
            TokenKind::LineBreak,
            TokenKind::CastType,
            TokenKind::AttributeMarker,
            TokenKind::NameQualified,
            TokenKind::CloseCurly,
            TokenKind::DoubleColon,
        ] {
            assert_eq!(TokenKind::from_lexer_name(kind.as_lexer_name()), kind);
        }
    }

    #[test]
    fn test_bracket_families() {
        assert_eq!(
            TokenKind::CurlyOpen.bracket(),
            Some((BracketFamily::Curly, BracketRole::Open))
        );
        assert_eq!(
            TokenKind::DollarOpenCurlyBraces.bracket(),
            Some((BracketFamily::Curly, BracketRole::Open))
        );
        assert_eq!(
            TokenKind::Attribute.bracket(),
            Some((BracketFamily::Square, BracketRole::Open))
        );
        assert_eq!(TokenKind::IntCast.bracket(), None);
    }

    #[test]
    fn test_token_serde_uses_lexer_names() {
        let token = Token::new(TokenKind::Identifier, "foo", 3, 10);
        let json = serde_json::to_string(&token).unwrap();
        assert!(json.contains("\"kind\":\"T_STRING\""));

        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn test_adjacency() {
        let a = Token::new(TokenKind::Variable, "$a", 1, 0);
        let b = Token::new(TokenKind::Whitespace, " ", 1, 2);
        let c = Token::new(TokenKind::Semicolon, ";", 1, 4);
        assert!(a.is_adjacent_to(&b));
        assert!(!b.is_adjacent_to(&c));
        assert_eq!(a.end_offset(), 2);
    }
}
