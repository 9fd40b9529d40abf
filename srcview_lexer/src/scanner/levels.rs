//! Bracket nesting counters
//!
//! An opener is counted before it is yielded; a closer is uncounted only once
//! the scanner has moved past it. While a closer is the current token the
//! counter still shows the depth its opener was counted at, which is what
//! builders compare against their snapshot.

use serde::Serialize;

use crate::tokens::{BracketFamily, BracketRole, Token};

/// Four nesting counters. Unbalanced input may drive them negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelState {
    pub parens: i32,
    pub curly: i32,
    pub square: i32,
    pub unified: i32,
}

impl LevelState {
    pub fn depth(&self, family: BracketFamily) -> i32 {
        match family {
            BracketFamily::Paren => self.parens,
            BracketFamily::Curly => self.curly,
            BracketFamily::Square => self.square,
        }
    }

    fn shift(&mut self, family: BracketFamily, delta: i32) {
        match family {
            BracketFamily::Paren => self.parens += delta,
            BracketFamily::Curly => self.curly += delta,
            BracketFamily::Square => self.square += delta,
        }
        self.unified += delta;
    }

    pub fn is_balanced(&self) -> bool {
        *self == LevelState::default()
    }
}

#[derive(Debug, Default)]
pub struct LevelTracker {
    state: LevelState,
    pending_close: Option<BracketFamily>,
}

impl LevelTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `token` if it opens a bracket family.
    pub fn increment(&mut self, token: &Token) {
        if let Some((family, BracketRole::Open)) = token.kind.bracket() {
            self.state.shift(family, 1);
        }
    }

    /// Uncount `token` if it closes a bracket family.
    pub fn decrement(&mut self, token: &Token) {
        if let Some((family, BracketRole::Close)) = token.kind.bracket() {
            self.state.shift(family, -1);
        }
    }

    /// Move onto `token`: settle the previous closer, then count this opener.
    pub fn advance(&mut self, token: &Token) {
        self.settle();
        match token.kind.bracket() {
            Some((family, BracketRole::Open)) => self.state.shift(family, 1),
            Some((family, BracketRole::Close)) => self.pending_close = Some(family),
            None => {}
        }
    }

    /// Apply a closer that has been moved past.
    pub fn settle(&mut self) {
        if let Some(family) = self.pending_close.take() {
            self.state.shift(family, -1);
        }
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    pub fn depth(&self, family: BracketFamily) -> i32 {
        self.state.depth(family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenKind;

    fn tokens(text: &str) -> Vec<Token> {
        text.chars()
            .enumerate()
            .map(|(i, ch)| Token::new(TokenKind::from_char(ch), ch.to_string(), 1, i))
            .collect()
    }

    #[test]
    fn test_balanced_input_returns_to_zero() {
        let mut tracker = LevelTracker::new();
        for token in tokens("{([x])}{}") {
            tracker.advance(&token);
        }
        tracker.settle();
        assert!(tracker.state().is_balanced());
    }

    #[test]
    fn test_closer_keeps_opener_depth_while_current() {
        let mut tracker = LevelTracker::new();
        let stream = tokens("{{}}");
        let mut seen = Vec::new();
        for token in &stream {
            tracker.advance(token);
            seen.push(tracker.depth(BracketFamily::Curly));
        }
        assert_eq!(seen, vec![1, 2, 2, 1]);
    }

    #[test]
    fn test_unified_counts_all_families() {
        let mut tracker = LevelTracker::new();
        for token in tokens("([{") {
            tracker.advance(&token);
        }
        let state = tracker.state();
        assert_eq!((state.parens, state.square, state.curly), (1, 1, 1));
        assert_eq!(state.unified, 3);
    }

    #[test]
    fn test_unbalanced_goes_negative() {
        let mut tracker = LevelTracker::new();
        for token in tokens("))") {
            tracker.advance(&token);
        }
        tracker.settle();
        assert_eq!(tracker.depth(BracketFamily::Paren), -2);
        assert_eq!(tracker.state().unified, -2);
    }

    #[test]
    fn test_explicit_increment_decrement() {
        let mut tracker = LevelTracker::new();
        let open = Token::new(TokenKind::OpenSquare, "[", 1, 0);
        let close = Token::new(TokenKind::CloseSquare, "]", 1, 1);
        tracker.increment(&open);
        tracker.increment(&close);
        assert_eq!(tracker.depth(BracketFamily::Square), 1);
        tracker.decrement(&close);
        assert!(tracker.state().is_balanced());
    }
}
