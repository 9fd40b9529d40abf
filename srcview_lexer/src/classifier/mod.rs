//! Token classifier
//!
//! Assigns a [`Category`] and auxiliary [`Tag`]s to each atomic token. The
//! decision order is fixed: a builder hint wins outright, then the `case`
//! label rule, then the closing-curly and name-segment rules, then the static
//! kind table, and finally the identifier heuristics that look around the
//! current token through a [`TokenWindow`].
//!
//! Results are cached per token index. Tokens must be classified in stream
//! order the first time, since curly closers are matched against the openers
//! seen so far.

pub mod category;

use crate::config::compile_time::lexical::MAX_LOOKAHEAD_TOKENS;
use crate::grammar::CategoryHint;
use crate::scanner::LevelState;
use crate::symbols::{ImportTables, SymbolKind};
use crate::tokens::{BracketFamily, BracketRole, Token, TokenKind, TokenWindow};
use serde::{Deserialize, Serialize};

pub use category::{pseudo_type_category, static_category, Category, Tag};

/// Category plus tags for one token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub tags: Vec<Tag>,
}

/// Scanner state the classifier reads
#[derive(Debug, Clone, Copy)]
pub struct ClassifyContext<'a> {
    pub hint: Option<CategoryHint>,
    pub levels: LevelState,
    /// Active builder is collecting type names
    pub type_mode: bool,
    pub tables: &'a ImportTables,
}

#[derive(Debug, Default)]
pub struct Classifier {
    cache: Vec<Option<Classification>>,
    curly_openers: Vec<TokenKind>,
    cache_hits: usize,
}

fn is_blank(token: &Token) -> bool {
    token.kind.is_whitespace()
}

/// Nearest earlier token not matching `skip`, with its distance.
fn scan_back<W, F>(window: &W, from: usize, skip: F) -> Option<(usize, &Token)>
where
    W: TokenWindow,
    F: Fn(&Token) -> bool,
{
    (from..from + MAX_LOOKAHEAD_TOKENS)
        .map_while(|n| window.behind(n).map(|token| (n, token)))
        .find(|(_, token)| !skip(token))
}

/// Preceded by a class-introducing keyword, skipping names and commas
/// (`implements A, B`), or inside a `catch (A | B $e)` type list.
fn names_a_class<W: TokenWindow>(window: &W) -> bool {
    let skip_names = |t: &Token| {
        t.is_trivia() || t.kind.is_name() || matches!(t.kind, TokenKind::Comma | TokenKind::NsSeparator)
    };
    if let Some((_, token)) = scan_back(window, 1, skip_names) {
        if token.kind.introduces_class_name() {
            return true;
        }
    }

    let skip_union = |t: &Token| {
        t.is_trivia() || t.kind.is_name() || matches!(t.kind, TokenKind::Pipe | TokenKind::NsSeparator)
    };
    match scan_back(window, 1, skip_union) {
        Some((n, token)) if token.kind == TokenKind::OpenParen => {
            scan_back(window, n + 1, Token::is_trivia).is_some_and(|(_, t)| t.kind == TokenKind::Catch)
        }
        _ => false,
    }
}

fn opens_call<W: TokenWindow>(window: &mut W) -> bool {
    window
        .ahead_skipping(is_blank)
        .is_some_and(|t| t.kind == TokenKind::OpenParen)
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, index: usize) -> Option<&Classification> {
        self.cache.get(index).and_then(Option::as_ref)
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits
    }

    /// Category only
    pub fn category<W: TokenWindow>(
        &mut self,
        index: usize,
        token: &Token,
        window: &mut W,
        ctx: &ClassifyContext<'_>,
    ) -> Category {
        self.classify(index, token, window, ctx).category
    }

    /// Classify the token at stream `index`; `window` must be positioned on it.
    pub fn classify<W: TokenWindow>(
        &mut self,
        index: usize,
        token: &Token,
        window: &mut W,
        ctx: &ClassifyContext<'_>,
    ) -> Classification {
        if let Some(cached) = self.cached(index) {
            let cached = cached.clone();
            self.cache_hits += 1;
            return cached;
        }

        let (category, role) = self.decide(token, window, ctx);
        let classification = Classification {
            category,
            tags: tags_for(token, category, role, ctx),
        };

        if self.cache.len() <= index {
            self.cache.resize(index + 1, None);
        }
        self.cache[index] = Some(classification.clone());
        classification
    }

    fn decide<W: TokenWindow>(
        &mut self,
        token: &Token,
        window: &mut W,
        ctx: &ClassifyContext<'_>,
    ) -> (Category, Option<SymbolKind>) {
        let closed_opener = match token.kind.bracket() {
            Some((BracketFamily::Curly, BracketRole::Open)) => {
                self.curly_openers.push(token.kind);
                None
            }
            Some((BracketFamily::Curly, BracketRole::Close)) => self.curly_openers.pop(),
            _ => None,
        };

        if let Some(hint) = ctx.hint {
            return (hint.category, hint.role);
        }

        if (token.kind == TokenKind::Identifier || token.kind.is_keyword())
            && window
                .previous_significant()
                .is_some_and(|t| t.kind == TokenKind::Case)
        {
            return (Category::String, None);
        }

        if token.kind == TokenKind::CloseCurly {
            let category = match closed_opener {
                Some(TokenKind::DollarOpenCurlyBraces) => Category::VariableNameClose,
                Some(TokenKind::CurlyOpen) => Category::Interpolation,
                _ => Category::Punctuation,
            };
            return (category, None);
        }

        if token.kind.is_name_segment() {
            let role = if names_a_class(window) {
                SymbolKind::Class
            } else if opens_call(window) {
                SymbolKind::Function
            } else {
                SymbolKind::Class
            };
            return (Category::Namespace, Some(role));
        }

        if let Some(category) = static_category(token.kind) {
            return (category, None);
        }

        (identifier_category(token, window, ctx), None)
    }
}

fn identifier_category<W: TokenWindow>(
    token: &Token,
    window: &mut W,
    ctx: &ClassifyContext<'_>,
) -> Category {
    if let Some(category) = pseudo_type_category(&token.text) {
        return category;
    }
    if names_a_class(window) {
        return Category::ClassName;
    }
    if opens_call(window) {
        return Category::FunctionName;
    }
    match window.previous_significant().map(|t| t.kind) {
        Some(TokenKind::ObjectOperator | TokenKind::NullsafeObjectOperator) => {
            return Category::VariableName
        }
        Some(TokenKind::DoubleColon | TokenKind::Const) => return Category::ConstantName,
        _ => {}
    }
    if ctx.type_mode {
        return Category::ClassName;
    }
    if window
        .next_significant()
        .is_some_and(|t| t.kind == TokenKind::DoubleColon)
    {
        return Category::ClassName;
    }
    Category::String
}

fn tags_for(
    token: &Token,
    category: Category,
    role: Option<SymbolKind>,
    ctx: &ClassifyContext<'_>,
) -> Vec<Tag> {
    let mut tags = Vec::new();

    if category.is_keyword_family() {
        tags.push(Tag::Keyword {
            name: token.text.to_ascii_lowercase(),
        });
    }

    match token.kind.bracket() {
        Some((family, BracketRole::Open)) => tags.push(Tag::Opens {
            family,
            depth: ctx.levels.depth(family),
        }),
        Some((family, BracketRole::Close)) => tags.push(Tag::Closes {
            family,
            depth: ctx.levels.depth(family),
        }),
        None => {}
    }

    let absolute = ctx.hint.is_some_and(|h| h.absolute);
    match category {
        Category::Namespace if token.kind.is_name() => {
            if let Some(role) = role {
                tags.push(Tag::Role { role });
            }
            let name = if absolute {
                token.text.trim_start_matches('\\').to_string()
            } else {
                ctx.tables.resolve(&token.text, role.unwrap_or(SymbolKind::Class))
            };
            tags.push(Tag::Resolved { name });
        }
        Category::ClassName if ctx.hint.is_none() => tags.push(Tag::Resolved {
            name: ctx.tables.resolve(&token.text, SymbolKind::Class),
        }),
        _ => {}
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::LevelTracker;
    use crate::tokens::TokenCache;

    /// Classify a whole token list in order.
    fn classify_all(tokens: &[(TokenKind, &str)], tables: &ImportTables) -> Vec<Classification> {
        let mut offset = 0;
        let stream: Vec<Token> = tokens
            .iter()
            .map(|(kind, text)| {
                let token = Token::new(*kind, *text, 1, offset);
                offset += text.len();
                token
            })
            .collect();

        let mut cache = TokenCache::new(stream.into_iter());
        let mut tracker = LevelTracker::new();
        let mut classifier = Classifier::new();
        let mut out = Vec::new();

        while let Some(index) = cache.advance().unwrap() {
            let token = cache.get(index).unwrap().clone();
            tracker.advance(&token);
            let ctx = ClassifyContext {
                hint: None,
                levels: tracker.state(),
                type_mode: false,
                tables,
            };
            out.push(classifier.classify(index, &token, &mut cache, &ctx));
        }
        out
    }

    fn categories(tokens: &[(TokenKind, &str)]) -> Vec<Category> {
        classify_all(tokens, &ImportTables::new())
            .into_iter()
            .map(|c| c.category)
            .collect()
    }

    /// Window that counts how often it is consulted
    struct CountingWindow {
        current: Token,
        lookups: usize,
    }

    impl TokenWindow for CountingWindow {
        fn behind(&self, n: usize) -> Option<&Token> {
            (n == 0).then_some(&self.current)
        }

        fn ahead(&mut self, _n: usize) -> Option<&Token> {
            self.lookups += 1;
            None
        }
    }

    #[test]
    fn test_class_names_after_keywords() {
        use TokenKind as K;
        let got = categories(&[
            (K::New, "new"),
            (K::Whitespace, " "),
            (K::Identifier, "Foo"),
            (K::OpenParen, "("),
            (K::CloseParen, ")"),
            (K::Semicolon, ";"),
            (K::Class, "class"),
            (K::Whitespace, " "),
            (K::Identifier, "Bar"),
            (K::Whitespace, " "),
            (K::Implements, "implements"),
            (K::Whitespace, " "),
            (K::Identifier, "A"),
            (K::Comma, ","),
            (K::Whitespace, " "),
            (K::Identifier, "B"),
        ]);
        assert_eq!(got[2], Category::ClassName);
        assert_eq!(got[8], Category::ClassName);
        assert_eq!(got[12], Category::ClassName);
        assert_eq!(got[15], Category::ClassName);
    }

    #[test]
    fn test_function_and_property_names() {
        use TokenKind as K;
        let got = categories(&[
            (K::Identifier, "strlen"),
            (K::Whitespace, " "),
            (K::OpenParen, "("),
            (K::Variable, "$o"),
            (K::ObjectOperator, "->"),
            (K::Identifier, "name"),
            (K::CloseParen, ")"),
            (K::Semicolon, ";"),
            (K::Identifier, "Config"),
            (K::DoubleColon, "::"),
            (K::Identifier, "LIMIT"),
        ]);
        assert_eq!(got[0], Category::FunctionName);
        assert_eq!(got[5], Category::VariableName);
        assert_eq!(got[8], Category::ClassName);
        assert_eq!(got[10], Category::ConstantName);
    }

    #[test]
    fn test_catch_types() {
        use TokenKind as K;
        let got = categories(&[
            (K::Catch, "catch"),
            (K::Whitespace, " "),
            (K::OpenParen, "("),
            (K::Identifier, "AError"),
            (K::Whitespace, " "),
            (K::Pipe, "|"),
            (K::Whitespace, " "),
            (K::Identifier, "BError"),
            (K::Whitespace, " "),
            (K::Variable, "$e"),
            (K::CloseParen, ")"),
        ]);
        assert_eq!(got[3], Category::ClassName);
        assert_eq!(got[7], Category::ClassName);
    }

    #[test]
    fn test_pseudo_types_and_case_labels() {
        use TokenKind as K;
        let got = classify_all(
            &[
                (K::Identifier, "null"),
                (K::Semicolon, ";"),
                (K::New, "new"),
                (K::Whitespace, " "),
                (K::Identifier, "self"),
                (K::Semicolon, ";"),
                (K::Case, "case"),
                (K::Whitespace, " "),
                (K::Keyword, "Default"),
            ],
            &ImportTables::new(),
        );
        assert_eq!(got[0].category, Category::Literal);
        assert_eq!(got[4].category, Category::TypeKeyword);
        assert_eq!(got[4].tags, vec![Tag::Keyword { name: "self".to_string() }]);
        assert_eq!(got[8].category, Category::String);
    }

    #[test]
    fn test_dollar_brace_close() {
        use TokenKind as K;
        let got = categories(&[
            (K::DoubleQuote, "\""),
            (K::DollarOpenCurlyBraces, "${"),
            (K::StringVarname, "name"),
            (K::CloseCurly, "}"),
            (K::CurlyOpen, "{$"),
            (K::Variable, "$x"),
            (K::CloseCurly, "}"),
            (K::DoubleQuote, "\""),
            (K::OpenCurly, "{"),
            (K::CloseCurly, "}"),
        ]);
        assert_eq!(got[3], Category::VariableNameClose);
        assert_eq!(got[6], Category::Interpolation);
        assert_eq!(got[9], Category::Punctuation);
    }

    #[test]
    fn test_name_segments_resolve() {
        use TokenKind as K;
        let mut tables = ImportTables::new();
        tables.flush("App\\Models");
        tables.add_import(SymbolKind::Class, "App\\Auth\\User", None);

        let got = classify_all(
            &[
                (K::New, "new"),
                (K::Whitespace, " "),
                (K::NameRelative, "namespace\\Sub\\Item"),
                (K::Semicolon, ";"),
                (K::NameQualified, "Util\\format"),
                (K::OpenParen, "("),
                (K::CloseParen, ")"),
                (K::Semicolon, ";"),
                (K::New, "new"),
                (K::Whitespace, " "),
                (K::Identifier, "User"),
            ],
            &tables,
        );

        assert_eq!(got[2].category, Category::Namespace);
        assert!(got[2].tags.contains(&Tag::Role { role: SymbolKind::Class }));
        assert!(got[2].tags.contains(&Tag::Resolved {
            name: "App\\Models\\Sub\\Item".to_string()
        }));
        assert!(got[4].tags.contains(&Tag::Role { role: SymbolKind::Function }));
        assert_eq!(got[10].category, Category::ClassName);
        assert!(got[10].tags.contains(&Tag::Resolved {
            name: "App\\Auth\\User".to_string()
        }));
    }

    #[test]
    fn test_bracket_tags() {
        use TokenKind as K;
        let got = classify_all(
            &[(K::OpenCurly, "{"), (K::OpenCurly, "{"), (K::CloseCurly, "}"), (K::CloseCurly, "}")],
            &ImportTables::new(),
        );
        assert_eq!(got[1].tags, vec![Tag::Opens { family: BracketFamily::Curly, depth: 2 }]);
        assert_eq!(got[2].tags, vec![Tag::Closes { family: BracketFamily::Curly, depth: 2 }]);
        assert_eq!(got[3].tags, vec![Tag::Closes { family: BracketFamily::Curly, depth: 1 }]);
    }

    #[test]
    fn test_hint_short_circuits() {
        let tables = ImportTables::new();
        let token = Token::new(TokenKind::Identifier, "Alias", 1, 0);
        let mut window = CountingWindow {
            current: token.clone(),
            lookups: 0,
        };
        let ctx = ClassifyContext {
            hint: Some(CategoryHint::category(Category::FunctionName)),
            levels: LevelState::default(),
            type_mode: false,
            tables: &tables,
        };
        let mut classifier = Classifier::new();
        assert_eq!(classifier.category(0, &token, &mut window, &ctx), Category::FunctionName);
        assert_eq!(window.lookups, 0);
    }

    #[test]
    fn test_type_mode_and_idempotence() {
        let tables = ImportTables::new();
        let token = Token::new(TokenKind::Identifier, "Model", 1, 0);
        let mut window = CountingWindow {
            current: token.clone(),
            lookups: 0,
        };
        let ctx = ClassifyContext {
            hint: None,
            levels: LevelState::default(),
            type_mode: true,
            tables: &tables,
        };
        let mut classifier = Classifier::new();

        let first = classifier.classify(0, &token, &mut window, &ctx);
        assert_eq!(first.category, Category::ClassName);
        let lookups = window.lookups;
        assert!(lookups > 0);

        let second = classifier.classify(0, &token, &mut window, &ctx);
        assert_eq!(second, first);
        assert_eq!(window.lookups, lookups);
        assert_eq!(classifier.cache_hits(), 1);
    }
}
