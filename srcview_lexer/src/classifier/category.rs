//! Token categories and auxiliary tags

use crate::symbols::SymbolKind;
use crate::tokens::{BracketFamily, TokenKind};
use serde::{Deserialize, Serialize};

/// Semantic category of one atomic token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    // === KEYWORD FAMILY ===
    Keyword,
    ExpressionKeyword,
    /// Reserved type names (`int`, `string`, `self`, `array`, ...)
    TypeKeyword,
    /// `true`, `false`, `null`
    Literal,
    MagicConstant,

    // === NAMES ===
    Variable,
    /// Property name or `${name}` variable name
    VariableName,
    /// `}` closing a `${name}` construct
    VariableNameClose,
    ClassName,
    FunctionName,
    ConstantName,
    /// Qualified name segment
    Namespace,
    /// Identifier whose role could not be determined
    String,

    // === LITERALS ===
    QuotedString,
    Heredoc,
    /// `{$` and `${` openers inside interpolated strings
    Interpolation,
    Number,
    Cast,

    // === PUNCTUATION ===
    Operator,
    Punctuation,
    Attribute,

    // === LAYOUT ===
    Comment,
    DocComment,
    Whitespace,
    LineBreak,
    Tag,
    InlineHtml,

    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Keyword => "keyword",
            Category::ExpressionKeyword => "expression_keyword",
            Category::TypeKeyword => "type_keyword",
            Category::Literal => "literal",
            Category::MagicConstant => "magic_constant",
            Category::Variable => "variable",
            Category::VariableName => "variable_name",
            Category::VariableNameClose => "variable_name_close",
            Category::ClassName => "class_name",
            Category::FunctionName => "function_name",
            Category::ConstantName => "constant_name",
            Category::Namespace => "namespace",
            Category::String => "string",
            Category::QuotedString => "quoted_string",
            Category::Heredoc => "heredoc",
            Category::Interpolation => "interpolation",
            Category::Number => "number",
            Category::Cast => "cast",
            Category::Operator => "operator",
            Category::Punctuation => "punctuation",
            Category::Attribute => "attribute",
            Category::Comment => "comment",
            Category::DocComment => "doc_comment",
            Category::Whitespace => "whitespace",
            Category::LineBreak => "line_break",
            Category::Tag => "tag",
            Category::InlineHtml => "inline_html",
            Category::Unknown => "unknown",
        }
    }

    /// Presentation class name (`class_name` -> `class-name`)
    pub fn css_class(&self) -> String {
        self.as_str().replace('_', "-")
    }

    /// Keyword-family categories carry a keyword sub-name tag
    pub fn is_keyword_family(&self) -> bool {
        matches!(
            self,
            Category::Keyword
                | Category::ExpressionKeyword
                | Category::TypeKeyword
                | Category::Literal
                | Category::MagicConstant
        )
    }

    /// Category for an identifier known to name a symbol of `kind`
    pub fn for_symbol(kind: SymbolKind) -> Category {
        match kind {
            SymbolKind::Class => Category::ClassName,
            SymbolKind::Function => Category::FunctionName,
            SymbolKind::Constant => Category::ConstantName,
        }
    }
}

/// Context-free category for a token kind. `None` for identifiers, whose
/// category depends on their surroundings.
pub fn static_category(kind: TokenKind) -> Option<Category> {
    use TokenKind as K;

    let category = match kind {
        K::InlineHtml => Category::InlineHtml,
        K::OpenTag | K::OpenTagWithEcho | K::CloseTag => Category::Tag,

        K::Whitespace => Category::Whitespace,
        K::LineBreak => Category::LineBreak,
        K::Comment => Category::Comment,
        K::DocComment => Category::DocComment,

        K::Variable => Category::Variable,
        K::StringVarname => Category::VariableName,
        K::Identifier => return None,
        K::NameQualified | K::NameFullyQualified | K::NameRelative | K::NsSeparator => {
            Category::Namespace
        }

        K::ConstantString | K::EncapsedString | K::DoubleQuote | K::Backtick => {
            Category::QuotedString
        }
        K::StartHeredoc | K::EndHeredoc => Category::Heredoc,
        K::DollarOpenCurlyBraces | K::CurlyOpen => Category::Interpolation,
        K::LNumber | K::DNumber | K::NumString => Category::Number,

        K::IntCast
        | K::DoubleCast
        | K::StringCast
        | K::ArrayCast
        | K::ObjectCast
        | K::BoolCast
        | K::UnsetCast
        | K::CastType => Category::Cast,

        K::Attribute | K::AttributeMarker => Category::Attribute,

        K::Namespace
        | K::Use
        | K::Function
        | K::Fn
        | K::As
        | K::Const
        | K::Class
        | K::New
        | K::Instanceof
        | K::Extends
        | K::Interface
        | K::Trait
        | K::Enum
        | K::Implements
        | K::Insteadof
        | K::Catch
        | K::Case
        | K::Static
        | K::Keyword => Category::Keyword,
        K::Array | K::Callable => Category::TypeKeyword,
        K::ExpressionKeyword => Category::ExpressionKeyword,
        K::MagicConstant => Category::MagicConstant,

        K::DoubleColon
        | K::ObjectOperator
        | K::NullsafeObjectOperator
        | K::DoubleArrow
        | K::Ellipsis
        | K::Operator
        | K::Question
        | K::Pipe
        | K::Ampersand
        | K::Equals
        | K::Dollar
        | K::Char => Category::Operator,

        K::OpenParen
        | K::CloseParen
        | K::OpenCurly
        | K::CloseCurly
        | K::OpenSquare
        | K::CloseSquare
        | K::Semicolon
        | K::Comma
        | K::Colon => Category::Punctuation,

        K::Unknown => Category::Unknown,
    };

    Some(category)
}

/// Reserved names that read as identifiers but behave as keywords
pub fn pseudo_type_category(text: &str) -> Option<Category> {
    const LITERALS: &[&str] = &["true", "false", "null"];
    const TYPES: &[&str] = &[
        "string", "array", "int", "integer", "bool", "boolean", "object", "float", "double",
        "mixed", "void", "never", "self", "parent", "static", "iterable", "callable", "resource",
    ];

    let lower = text.to_ascii_lowercase();
    if LITERALS.contains(&lower.as_str()) {
        Some(Category::Literal)
    } else if TYPES.contains(&lower.as_str()) {
        Some(Category::TypeKeyword)
    } else {
        None
    }
}

/// Auxiliary decoration attached to a classified token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum Tag {
    /// Lowercased keyword text
    Keyword { name: String },
    /// Opens a bracket family; `depth` counts this opener
    Opens { family: BracketFamily, depth: i32 },
    /// Closes a bracket family opened at `depth`
    Closes { family: BracketFamily, depth: i32 },
    /// Role of the last segment of a qualified name
    Role { role: SymbolKind },
    /// Fully-qualified form of a name
    Resolved { name: String },
}

impl Tag {
    pub fn css_class(&self) -> String {
        match self {
            Tag::Keyword { name } => format!("keyword-{}", name),
            Tag::Opens { family, depth } => format!("opens-{}-{}", family.as_str(), depth),
            Tag::Closes { family, depth } => format!("closes-{}-{}", family.as_str(), depth),
            Tag::Role { role } => format!("role-{}", role.as_str()),
            Tag::Resolved { .. } => "resolved".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_have_no_static_category() {
        assert_eq!(static_category(TokenKind::Identifier), None);
        assert_eq!(static_category(TokenKind::Function), Some(Category::Keyword));
        assert_eq!(static_category(TokenKind::NameQualified), Some(Category::Namespace));
        assert_eq!(static_category(TokenKind::CloseCurly), Some(Category::Punctuation));
    }

    #[test]
    fn test_pseudo_types() {
        assert_eq!(pseudo_type_category("NULL"), Some(Category::Literal));
        assert_eq!(pseudo_type_category("self"), Some(Category::TypeKeyword));
        assert_eq!(pseudo_type_category("Model"), None);
    }

    #[test]
    fn test_css_classes() {
        assert_eq!(Category::VariableNameClose.css_class(), "variable-name-close");
        let tag = Tag::Closes {
            family: BracketFamily::Curly,
            depth: 2,
        };
        assert_eq!(tag.css_class(), "closes-curly-2");
    }
}
