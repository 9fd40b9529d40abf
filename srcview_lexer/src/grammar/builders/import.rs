//! Namespace import builder: `use A\B;`, `use function A\f as g;`,
//! `use A\{B, function c, const D as E,};`

use super::{Builder, BuilderState, CategoryHint, Feed, Verdict};
use crate::classifier::Category;
use crate::grammar::products::{ImportEntry, NamespaceImport};
use crate::scanner::LevelState;
use crate::symbols::SymbolKind;
use crate::tokens::{Token, TokenKind};

#[derive(Debug, Clone, Default)]
struct EntryDraft {
    kind: Option<SymbolKind>,
    name: String,
    alias: Option<String>,
    expecting_alias: bool,
}

#[derive(Debug, Clone)]
pub struct ImportBuilder {
    state: BuilderState,
    import: NamespaceImport,
    default_kind: SymbolKind,
    draft: EntryDraft,
    in_group: bool,
    saw_name: bool,
}

impl Default for ImportBuilder {
    fn default() -> Self {
        Self {
            state: BuilderState::Pending,
            import: NamespaceImport::default(),
            default_kind: SymbolKind::Class,
            draft: EntryDraft::default(),
            in_group: false,
            saw_name: false,
        }
    }
}

impl ImportBuilder {
    /// Top level, or directly inside a namespace body. Anywhere else `use` is
    /// a trait use or a closure capture list.
    pub fn verify(levels: &LevelState, active: Option<&Builder>, _buffer: &[Token]) -> Verdict {
        let valid = match active {
            None => levels.curly == 0,
            Some(builder) => builder.namespace_body_depth() == Some(levels.curly),
        };
        if valid {
            Verdict::Yes
        } else {
            Verdict::No
        }
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn import(&self) -> &NamespaceImport {
        &self.import
    }

    pub fn into_import(self) -> NamespaceImport {
        self.import
    }

    fn entry_kind(&self) -> SymbolKind {
        self.draft.kind.unwrap_or(self.default_kind)
    }

    /// Close the current entry. Empty entries (trailing commas) are dropped.
    fn push_entry(&mut self) {
        let draft = std::mem::take(&mut self.draft);
        let kind = draft.kind.unwrap_or(self.default_kind);
        let name = draft.name.trim();
        if name.is_empty() {
            return;
        }

        let full_name = match (&self.import.group_prefix, self.in_group) {
            (Some(prefix), true) => format!("{}\\{}", prefix, name),
            _ => name.to_string(),
        };
        self.import
            .entries
            .push(ImportEntry::new(kind, full_name, draft.alias));
    }

    fn symbol_keyword(&mut self, kind: SymbolKind) {
        if self.in_group && self.draft.name.is_empty() {
            self.draft.kind = Some(kind);
        } else if !self.in_group && !self.saw_name && self.import.entries.is_empty() {
            self.default_kind = kind;
        }
    }

    pub fn feed(&mut self, token: &Token) -> Feed {
        if self.state == BuilderState::Finished || token.is_trivia() {
            return Feed::default();
        }
        self.state = BuilderState::Building;

        match token.kind {
            TokenKind::Function => {
                self.symbol_keyword(SymbolKind::Function);
                Feed::default()
            }
            TokenKind::Const => {
                self.symbol_keyword(SymbolKind::Constant);
                Feed::default()
            }
            TokenKind::As => {
                self.draft.expecting_alias = true;
                Feed::default()
            }
            TokenKind::Identifier if self.draft.expecting_alias => {
                self.draft.alias = Some(token.text.clone());
                self.draft.expecting_alias = false;
                Feed::hinted(CategoryHint::category(Category::for_symbol(self.entry_kind())))
            }
            TokenKind::NsSeparator => {
                self.draft.name.push_str(&token.text);
                Feed::default()
            }
            kind if kind.is_name() => {
                self.draft.name.push_str(&token.text);
                self.saw_name = true;
                Feed::hinted(CategoryHint::qualified_name(Some(self.entry_kind())))
            }
            TokenKind::OpenCurly if !self.in_group => {
                let prefix = std::mem::take(&mut self.draft).name;
                self.import.group_prefix = Some(prefix.trim_end_matches('\\').to_string());
                self.in_group = true;
                Feed::default()
            }
            TokenKind::Comma => {
                self.push_entry();
                Feed::default()
            }
            TokenKind::CloseCurly if self.in_group => {
                self.push_entry();
                self.in_group = false;
                Feed::default()
            }
            TokenKind::Semicolon => {
                self.push_entry();
                self.state = BuilderState::Finished;
                Feed::done()
            }
            _ => Feed::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed `use`-statement tokens (without the `use` keyword).
    fn feed_all(tokens: &[(TokenKind, &str)]) -> (ImportBuilder, Vec<Feed>) {
        let mut builder = ImportBuilder::new();
        let mut offset = 4;
        let feeds = tokens
            .iter()
            .map(|(kind, text)| {
                let token = Token::new(*kind, *text, 1, offset);
                offset += text.len();
                builder.feed(&token)
            })
            .collect();
        (builder, feeds)
    }

    #[test]
    fn test_grouped_import() {
        use TokenKind as K;
        let (builder, feeds) = feed_all(&[
            (K::Identifier, "Vendor"),
            (K::NsSeparator, "\\"),
            (K::OpenCurly, "{"),
            (K::Identifier, "ClassA"),
            (K::Comma, ","),
            (K::Whitespace, " "),
            (K::Identifier, "ClassB"),
            (K::Whitespace, " "),
            (K::As, "as"),
            (K::Whitespace, " "),
            (K::Identifier, "CB"),
            (K::CloseCurly, "}"),
            (K::Semicolon, ";"),
        ]);

        assert!(feeds.last().unwrap().is_done());
        assert_eq!(builder.state(), BuilderState::Finished);

        let import = builder.import();
        assert_eq!(import.group_prefix.as_deref(), Some("Vendor"));
        assert_eq!(
            import.entries,
            vec![
                ImportEntry::new(SymbolKind::Class, "Vendor\\ClassA", None),
                ImportEntry::new(SymbolKind::Class, "Vendor\\ClassB", Some("CB".to_string())),
            ]
        );
        assert_eq!(feeds[10].hint, Some(CategoryHint::category(Category::ClassName)));
    }

    #[test]
    fn test_trailing_comma_and_per_entry_kinds() {
        use TokenKind as K;
        let (builder, _) = feed_all(&[
            (K::NameQualified, "Lib\\Util"),
            (K::NsSeparator, "\\"),
            (K::OpenCurly, "{"),
            (K::Function, "function"),
            (K::Identifier, "helper"),
            (K::Comma, ","),
            (K::Const, "const"),
            (K::Identifier, "LIMIT"),
            (K::Comma, ","),
            (K::CloseCurly, "}"),
            (K::Semicolon, ";"),
        ]);

        let entries = &builder.import().entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ImportEntry::new(SymbolKind::Function, "Lib\\Util\\helper", None));
        assert_eq!(entries[1], ImportEntry::new(SymbolKind::Constant, "Lib\\Util\\LIMIT", None));
    }

    #[test]
    fn test_declaration_wide_kind() {
        use TokenKind as K;
        let (builder, feeds) = feed_all(&[
            (K::Function, "function"),
            (K::NameQualified, "App\\format"),
            (K::Comma, ","),
            (K::NameQualified, "App\\parse"),
            (K::Semicolon, ";"),
        ]);

        assert!(builder
            .import()
            .entries
            .iter()
            .all(|e| e.kind == SymbolKind::Function));
        assert_eq!(
            feeds[1].hint,
            Some(CategoryHint::qualified_name(Some(SymbolKind::Function)))
        );
    }

    #[test]
    fn test_unterminated_import_never_finishes() {
        use TokenKind as K;
        let (builder, feeds) = feed_all(&[(K::NameQualified, "App\\User"), (K::Whitespace, "\n")]);
        assert!(feeds.iter().all(|f| !f.is_done()));
        assert_eq!(builder.state(), BuilderState::Building);
        assert!(builder.import().entries.is_empty());
    }

    #[test]
    fn test_verify_positions() {
        let top = LevelState::default();
        let nested = LevelState {
            curly: 1,
            unified: 1,
            ..LevelState::default()
        };
        assert_eq!(ImportBuilder::verify(&top, None, &[]), Verdict::Yes);
        assert_eq!(ImportBuilder::verify(&nested, None, &[]), Verdict::No);
    }
}
