//! Feature builders: token-fed state machines for namespace declarations,
//! namespace imports and function signatures
//!
//! Builders are a closed set. An opener keyword maps to an ordered list of
//! candidate variants; each variant decides from the level state, the active
//! builder and the candidate buffer whether it applies.

pub mod function;
pub mod import;
pub mod namespace;

use crate::classifier::Category;
use crate::grammar::products::Product;
use crate::scanner::LevelState;
use crate::symbols::SymbolKind;
use crate::tokens::{Token, TokenKind};

pub use function::{FunctionBuilder, FunctionPhase};
pub use import::ImportBuilder;
pub use namespace::NamespaceBuilder;

// ============================================================================
// BUILDER PROTOCOL TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Yes,
    No,
    /// Needs more candidate tokens to decide
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedOutcome {
    #[default]
    Continue,
    Done,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuilderState {
    /// Created, nothing fed yet
    #[default]
    Pending,
    Building,
    Finished,
}

/// Events a builder reports while being fed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderEvent {
    /// A namespace declaration's name is complete; imports must be flushed
    NamespaceNameKnown(String),
}

/// Category decided by a builder for the token it was just fed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryHint {
    pub category: Category,
    /// Role of the last segment when the token is a name segment
    pub role: Option<SymbolKind>,
    /// Name is written fully qualified and must not be resolved against imports
    pub absolute: bool,
}

impl CategoryHint {
    pub fn category(category: Category) -> Self {
        Self {
            category,
            role: None,
            absolute: false,
        }
    }

    pub fn qualified_name(role: Option<SymbolKind>) -> Self {
        Self {
            category: Category::Namespace,
            role,
            absolute: true,
        }
    }
}

/// Result of feeding one token
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    pub outcome: FeedOutcome,
    pub hint: Option<CategoryHint>,
    pub events: Vec<BuilderEvent>,
}

impl Feed {
    pub fn done() -> Self {
        Self {
            outcome: FeedOutcome::Done,
            ..Self::default()
        }
    }

    pub fn hinted(hint: CategoryHint) -> Self {
        Self {
            hint: Some(hint),
            ..Self::default()
        }
    }

    pub fn with_event(mut self, event: BuilderEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn is_done(&self) -> bool {
        self.outcome == FeedOutcome::Done
    }
}

// ============================================================================
// VARIANTS AND OPENER TABLE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuilderVariant {
    NamespaceDeclaration,
    NamespaceImport,
    FunctionSignature,
}

/// Opener keyword -> candidate variants, tried in order
static OPENERS: &[(TokenKind, &[BuilderVariant])] = &[
    (TokenKind::Namespace, &[BuilderVariant::NamespaceDeclaration]),
    (TokenKind::Use, &[BuilderVariant::NamespaceImport]),
    (TokenKind::Function, &[BuilderVariant::FunctionSignature]),
    (TokenKind::Fn, &[BuilderVariant::FunctionSignature]),
];

/// Candidate variants registered for an opener kind
pub fn candidates_for(kind: TokenKind) -> Option<&'static [BuilderVariant]> {
    OPENERS
        .iter()
        .find(|(opener, _)| *opener == kind)
        .map(|(_, variants)| *variants)
}

impl BuilderVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuilderVariant::NamespaceDeclaration => "namespace_declaration",
            BuilderVariant::NamespaceImport => "namespace_import",
            BuilderVariant::FunctionSignature => "function_signature",
        }
    }

    /// `buffer[0]` is always the opener keyword.
    pub fn verify(&self, levels: &LevelState, active: Option<&Builder>, buffer: &[Token]) -> Verdict {
        match self {
            BuilderVariant::NamespaceDeclaration => NamespaceBuilder::verify(levels, active, buffer),
            BuilderVariant::NamespaceImport => ImportBuilder::verify(levels, active, buffer),
            BuilderVariant::FunctionSignature => FunctionBuilder::verify(levels, active, buffer),
        }
    }

    /// Build from the candidate buffer. Every buffered token after the
    /// opener is fed in order; the returned feed belongs to the last one.
    pub fn create(&self, levels: &LevelState, buffer: &[Token]) -> (Builder, Feed) {
        let mut builder = match (self, buffer.first()) {
            (BuilderVariant::NamespaceDeclaration, _) => Builder::Namespace(NamespaceBuilder::new()),
            (BuilderVariant::NamespaceImport, _) => Builder::Import(ImportBuilder::new()),
            (BuilderVariant::FunctionSignature, opener) => {
                let arrow = opener.is_some_and(|t| t.kind == TokenKind::Fn);
                Builder::Function(FunctionBuilder::new(arrow))
            }
        };

        let mut feed = Feed::default();
        for token in buffer.iter().skip(1) {
            let step = builder.feed(token, levels);
            feed.events.extend(step.events);
            feed.hint = step.hint;
            feed.outcome = step.outcome;
            if feed.is_done() {
                break;
            }
        }

        (builder, feed)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

#[derive(Debug, Clone)]
pub enum Builder {
    Namespace(NamespaceBuilder),
    Import(ImportBuilder),
    Function(FunctionBuilder),
}

impl Builder {
    pub fn variant(&self) -> BuilderVariant {
        match self {
            Builder::Namespace(_) => BuilderVariant::NamespaceDeclaration,
            Builder::Import(_) => BuilderVariant::NamespaceImport,
            Builder::Function(_) => BuilderVariant::FunctionSignature,
        }
    }

    pub fn feed(&mut self, token: &Token, levels: &LevelState) -> Feed {
        match self {
            Builder::Namespace(b) => b.feed(token, levels),
            Builder::Import(b) => b.feed(token),
            Builder::Function(b) => b.feed(token, levels),
        }
    }

    pub fn state(&self) -> BuilderState {
        match self {
            Builder::Namespace(b) => b.state(),
            Builder::Import(b) => b.state(),
            Builder::Function(b) => b.state(),
        }
    }

    /// In-progress (or final) product
    pub fn snapshot(&self) -> Product {
        match self {
            Builder::Namespace(b) => Product::NamespaceDeclaration(b.declaration().clone()),
            Builder::Import(b) => Product::NamespaceImport(b.import().clone()),
            Builder::Function(b) => Product::FunctionSignature(b.signature().clone()),
        }
    }

    /// Final product, once finished
    pub fn product(&self) -> Option<Product> {
        (self.state() == BuilderState::Finished).then(|| self.snapshot())
    }

    pub fn into_product(self) -> Option<Product> {
        if self.state() != BuilderState::Finished {
            return None;
        }
        Some(match self {
            Builder::Namespace(b) => Product::NamespaceDeclaration(b.into_declaration()),
            Builder::Import(b) => Product::NamespaceImport(b.into_import()),
            Builder::Function(b) => Product::FunctionSignature(b.into_signature()),
        })
    }

    /// Whether type names are currently being collected (parameter or return types)
    pub fn is_accumulating_types(&self) -> bool {
        match self {
            Builder::Function(b) => b.is_accumulating_types(),
            _ => false,
        }
    }

    /// Curly depth of an open namespace body
    pub fn namespace_body_depth(&self) -> Option<i32> {
        match self {
            Builder::Namespace(b) => b.body_depth(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opener_table() {
        assert_eq!(
            candidates_for(TokenKind::Use),
            Some(&[BuilderVariant::NamespaceImport][..])
        );
        assert_eq!(
            candidates_for(TokenKind::Fn),
            Some(&[BuilderVariant::FunctionSignature][..])
        );
        assert!(candidates_for(TokenKind::Class).is_none());
    }

    #[test]
    fn test_create_replays_buffer() {
        let levels = LevelState::default();
        let buffer = vec![
            Token::new(TokenKind::Namespace, "namespace", 1, 0),
            Token::new(TokenKind::NameQualified, "App\\Models", 1, 10),
        ];
        let (builder, feed) = BuilderVariant::NamespaceDeclaration.create(&levels, &buffer);

        assert_eq!(builder.state(), BuilderState::Building);
        assert_eq!(feed.hint, Some(CategoryHint::qualified_name(None)));
        assert!(builder.product().is_none());
    }
}
