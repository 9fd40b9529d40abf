//! Namespace declaration builder: `namespace Name;` or `namespace Name { ... }`

use super::{Builder, BuilderEvent, BuilderState, CategoryHint, Feed, Verdict};
use crate::grammar::products::{CompoundStatement, NamespaceDeclaration};
use crate::scanner::LevelState;
use crate::tokens::{Token, TokenKind};

#[derive(Debug, Clone, Default)]
pub struct NamespaceBuilder {
    state: BuilderState,
    declaration: NamespaceDeclaration,
    name_known: bool,
    body_open: Option<(i32, Token)>,
}

impl NamespaceBuilder {
    /// Top-level only: nothing active and outside every curly block.
    pub fn verify(levels: &LevelState, active: Option<&Builder>, buffer: &[Token]) -> Verdict {
        if active.is_some() || levels.curly != 0 {
            return Verdict::No;
        }
        match buffer.get(1) {
            None => Verdict::Unknown,
            Some(token) if token.kind.is_name() || token.kind == TokenKind::OpenCurly => {
                Verdict::Yes
            }
            Some(_) => Verdict::No,
        }
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn declaration(&self) -> &NamespaceDeclaration {
        &self.declaration
    }

    pub fn into_declaration(self) -> NamespaceDeclaration {
        self.declaration
    }

    pub fn body_depth(&self) -> Option<i32> {
        self.body_open.as_ref().map(|(depth, _)| *depth)
    }

    fn name_known(&mut self, feed: Feed) -> Feed {
        if self.name_known {
            return feed;
        }
        self.name_known = true;
        feed.with_event(BuilderEvent::NamespaceNameKnown(self.declaration.name.clone()))
    }

    pub fn feed(&mut self, token: &Token, levels: &LevelState) -> Feed {
        if self.state == BuilderState::Finished || token.is_trivia() {
            return Feed::default();
        }
        self.state = BuilderState::Building;

        if let Some((depth, open_token)) = &self.body_open {
            if token.kind == TokenKind::CloseCurly && levels.curly == *depth {
                self.declaration.body = Some(CompoundStatement {
                    open_depth: *depth,
                    open_token: open_token.clone(),
                    close_token: token.clone(),
                });
                self.state = BuilderState::Finished;
                return Feed::done();
            }
            return Feed::default();
        }

        match token.kind {
            kind if !self.name_known && (kind.is_name() || kind == TokenKind::NsSeparator) => {
                self.declaration.name.push_str(&token.text);
                if kind == TokenKind::NsSeparator {
                    Feed::default()
                } else {
                    Feed::hinted(CategoryHint::qualified_name(None))
                }
            }
            TokenKind::Semicolon => {
                self.state = BuilderState::Finished;
                self.name_known(Feed::done())
            }
            TokenKind::OpenCurly => {
                self.body_open = Some((levels.curly, token.clone()));
                self.name_known(Feed::default())
            }
            _ => Feed::default(),
        }
    }
}
