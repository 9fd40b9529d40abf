//! Token cache: yielded history plus a lookahead queue
//!
//! Raw tokens are pulled from the source on demand and atomized on the way in,
//! so lookahead and atomization share one queue. Lookahead never fails: if a
//! raw token cannot be atomized the cache records the fault, stops pulling,
//! and reports the error once iteration actually reaches that point.

use std::collections::VecDeque;

use crate::config::compile_time::lexical::MAX_LOOKAHEAD_TOKENS;
use crate::lexical::{AtomizeError, Atomizer};
use crate::tokens::Token;

/// Read access around the current token.
///
/// `behind(0)` is the current token, `behind(1)` the one before it.
/// `ahead(0)` is the next token not yet yielded.
pub trait TokenWindow {
    fn behind(&self, n: usize) -> Option<&Token>;

    fn ahead(&mut self, n: usize) -> Option<&Token>;

    /// Nearest earlier token that is not skipped, within the lookahead bound.
    fn behind_skipping<F>(&self, skip: F) -> Option<&Token>
    where
        F: Fn(&Token) -> bool,
    {
        (1..=MAX_LOOKAHEAD_TOKENS)
            .map_while(|n| self.behind(n))
            .find(|token| !skip(token))
    }

    /// Nearest upcoming token that is not skipped, within the lookahead bound.
    fn ahead_skipping<F>(&mut self, skip: F) -> Option<&Token>
    where
        F: Fn(&Token) -> bool,
    {
        let mut n = 0;
        loop {
            if n >= MAX_LOOKAHEAD_TOKENS {
                return None;
            }
            match self.ahead(n) {
                None => return None,
                Some(token) if skip(token) => n += 1,
                Some(_) => break,
            }
        }
        self.ahead(n)
    }

    fn previous_significant(&self) -> Option<&Token> {
        self.behind_skipping(Token::is_trivia)
    }

    fn next_significant(&mut self) -> Option<&Token> {
        self.ahead_skipping(Token::is_trivia)
    }
}

pub struct TokenCache<I> {
    source: I,
    atomizer: Option<Atomizer>,
    pending: VecDeque<Token>,
    history: Vec<Token>,
    fault: Option<AtomizeError>,
    raw_pulled: usize,
    atoms_produced: usize,
}

impl<I> TokenCache<I>
where
    I: Iterator<Item = Token>,
{
    /// Cache that passes raw tokens through unchanged.
    pub fn new(source: I) -> Self {
        Self {
            source,
            atomizer: None,
            pending: VecDeque::new(),
            history: Vec::new(),
            fault: None,
            raw_pulled: 0,
            atoms_produced: 0,
        }
    }

    /// Cache that atomizes raw tokens as they are pulled.
    pub fn with_atomizer(source: I, atomizer: Atomizer) -> Self {
        Self {
            atomizer: Some(atomizer),
            ..Self::new(source)
        }
    }

    /// Pull raw tokens until `count` tokens are queued or the source ends.
    fn fill(&mut self, count: usize) {
        while self.pending.len() < count && self.fault.is_none() {
            let Some(raw) = self.source.next() else {
                return;
            };
            self.raw_pulled += 1;

            let Some(atomizer) = self.atomizer else {
                self.pending.push_back(raw);
                continue;
            };

            match atomizer.atomize(&raw) {
                Ok(Some(atoms)) => {
                    self.atoms_produced += atoms.len();
                    self.pending.extend(atoms);
                }
                Ok(None) => self.pending.push_back(raw),
                Err(err) => self.fault = Some(err),
            }
        }
    }

    /// Move to the next token. Returns its index in the history.
    pub fn advance(&mut self) -> Result<Option<usize>, AtomizeError> {
        self.fill(1);
        match self.pending.pop_front() {
            Some(token) => {
                self.history.push(token);
                Ok(Some(self.history.len() - 1))
            }
            None => match self.fault.take() {
                Some(err) => Err(err),
                None => Ok(None),
            },
        }
    }

    pub fn current(&self) -> Option<&Token> {
        self.history.last()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.history.len().checked_sub(1)
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.history.get(index)
    }

    pub fn history(&self) -> &[Token] {
        &self.history
    }

    pub fn raw_pulled(&self) -> usize {
        self.raw_pulled
    }

    pub fn atoms_produced(&self) -> usize {
        self.atoms_produced
    }
}

impl<I> TokenWindow for TokenCache<I>
where
    I: Iterator<Item = Token>,
{
    fn behind(&self, n: usize) -> Option<&Token> {
        let index = self.history.len().checked_sub(n + 1)?;
        self.history.get(index)
    }

    fn ahead(&mut self, n: usize) -> Option<&Token> {
        self.fill(n + 1);
        self.pending.get(n)
    }
}

impl<I> std::fmt::Debug for TokenCache<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("history", &self.history.len())
            .field("pending", &self.pending.len())
            .field("fault", &self.fault)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    fn stream() -> Vec<Token> {
        vec![
            Token::new(TokenKind::Identifier, "foo", 1, 0),
            Token::new(TokenKind::Whitespace, " \n", 1, 3),
            Token::new(TokenKind::OpenParen, "(", 2, 5),
        ]
    }

    #[test]
    fn test_advance_and_lookbehind() {
        let mut cache = TokenCache::new(stream().into_iter());
        assert_eq!(cache.advance().unwrap(), Some(0));
        assert_eq!(cache.advance().unwrap(), Some(1));
        assert_eq!(cache.behind(0).map(|t| t.kind), Some(TokenKind::Whitespace));
        assert_eq!(cache.behind(1).map(|t| t.text.as_str()), Some("foo"));
        assert!(cache.behind(2).is_none());
    }

    #[test]
    fn test_lookahead_sees_atoms() {
        let source = stream().into_iter();
        let mut cache = TokenCache::with_atomizer(source, Atomizer::new(true));
        cache.advance().unwrap();

        assert_eq!(cache.ahead(0).map(|t| t.kind), Some(TokenKind::Whitespace));
        assert_eq!(cache.ahead(1).map(|t| t.kind), Some(TokenKind::LineBreak));
        assert_eq!(cache.next_significant().map(|t| t.kind), Some(TokenKind::OpenParen));
        assert_eq!(cache.atoms_produced(), 2);

        // Lookahead does not consume.
        assert_eq!(cache.advance().unwrap(), Some(1));
        assert_eq!(cache.current().map(|t| t.text.as_str()), Some(" "));
    }

    #[test]
    fn test_previous_significant() {
        let mut cache = TokenCache::new(stream().into_iter());
        while cache.advance().unwrap().is_some() {}
        assert_eq!(cache.previous_significant().map(|t| t.text.as_str()), Some("foo"));
    }

    #[test]
    fn test_fault_surfaces_on_advance() {
        let tokens = vec![
            Token::new(TokenKind::Variable, "$a", 1, 0),
            Token::new(TokenKind::Attribute, "#", 1, 2),
        ];
        let mut cache = TokenCache::with_atomizer(tokens.into_iter(), Atomizer::new(false));

        assert_eq!(cache.advance().unwrap(), Some(0));
        assert!(cache.ahead(0).is_none());
        assert!(cache.advance().is_err());
        assert_eq!(cache.advance().unwrap(), None);
    }
}
