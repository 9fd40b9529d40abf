//! Feature builder stack with its candidate buffer
//!
//! Per token: an opener keyword starts a candidate buffer; buffered tokens are
//! verified against the opener's variants until one accepts or rejects; when
//! no builder was opened by this token, the innermost builder is fed and
//! popped once it finishes.

use crate::config::compile_time::lexical::{MAX_BUILDER_DEPTH, MAX_CANDIDATE_TOKENS};
use crate::grammar::builders::{
    candidates_for, Builder, BuilderEvent, BuilderVariant, CategoryHint, Verdict,
};
use crate::grammar::products::Product;
use crate::logging::codes;
use crate::scanner::LevelState;
use crate::tokens::Token;
use crate::{log_debug, log_warning};

#[derive(Debug, Clone)]
struct Candidate {
    variants: &'static [BuilderVariant],
    buffer: Vec<Token>,
}

enum Resolution {
    Open(BuilderVariant),
    Reject,
    Pending,
}

/// Why a candidate buffer was dropped without opening a builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    Rejected,
    CandidateOverflow,
    DepthExceeded,
}

/// Everything one token did to the stack
#[derive(Debug, Clone, Default)]
pub struct StackStep {
    pub hint: Option<CategoryHint>,
    pub events: Vec<BuilderEvent>,
    pub products: Vec<Product>,
    pub opened: Option<BuilderVariant>,
    pub discarded: Option<DiscardReason>,
}

#[derive(Debug, Clone, Default)]
pub struct BuilderStack {
    builders: Vec<Builder>,
    candidate: Option<Candidate>,
}

impl BuilderStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost active builder
    pub fn active(&self) -> Option<&Builder> {
        self.builders.last()
    }

    pub fn builders(&self) -> &[Builder] {
        &self.builders
    }

    pub fn depth(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Tokens buffered while a candidate awaits verification
    pub fn candidate_len(&self) -> usize {
        self.candidate.as_ref().map_or(0, |c| c.buffer.len())
    }

    /// Process one token. `may_open` is false when the token cannot act as a
    /// feature opener (after `::` or `case`).
    pub fn step(&mut self, token: &Token, levels: LevelState, may_open: bool) -> StackStep {
        let mut step = StackStep::default();

        if self.candidate.is_none() && may_open {
            if let Some(variants) = candidates_for(token.kind) {
                self.candidate = Some(Candidate {
                    variants,
                    buffer: Vec::new(),
                });
            }
        }

        if !token.is_trivia() {
            if let Some(mut candidate) = self.candidate.take() {
                candidate.buffer.push(token.clone());
                match self.resolve(&candidate, &levels) {
                    Resolution::Open(variant) => {
                        self.open(variant, &candidate.buffer, &levels, &mut step)
                    }
                    Resolution::Reject => step.discarded = Some(DiscardReason::Rejected),
                    Resolution::Pending if candidate.buffer.len() >= MAX_CANDIDATE_TOKENS => {
                        log_warning!(code = codes::scanner::CANDIDATE_OVERFLOW,
                            "Candidate buffer discarded before verification",
                            "opener" => candidate.buffer[0].text.as_str(),
                            "line" => candidate.buffer[0].line,
                            "buffered" => candidate.buffer.len()
                        );
                        step.discarded = Some(DiscardReason::CandidateOverflow);
                    }
                    Resolution::Pending => self.candidate = Some(candidate),
                }
            }
        }

        if step.opened.is_none() {
            self.feed_active(token, &levels, &mut step);
        }

        step
    }

    fn resolve(&self, candidate: &Candidate, levels: &LevelState) -> Resolution {
        for variant in candidate.variants {
            match variant.verify(levels, self.active(), &candidate.buffer) {
                Verdict::Yes => return Resolution::Open(*variant),
                Verdict::No => return Resolution::Reject,
                Verdict::Unknown => continue,
            }
        }
        Resolution::Pending
    }

    fn open(
        &mut self,
        variant: BuilderVariant,
        buffer: &[Token],
        levels: &LevelState,
        step: &mut StackStep,
    ) {
        if self.builders.len() >= MAX_BUILDER_DEPTH {
            log_warning!(code = codes::scanner::BUILDER_DEPTH_EXCEEDED,
                "Builder not opened, stack is full",
                "builder" => variant.as_str(),
                "depth" => self.builders.len()
            );
            step.discarded = Some(DiscardReason::DepthExceeded);
            return;
        }

        let (builder, feed) = variant.create(levels, buffer);
        log_debug!("Builder opened",
            "builder" => variant.as_str(),
            "line" => buffer[0].line,
            "depth" => self.builders.len() + 1
        );

        let done = feed.is_done();
        step.opened = Some(variant);
        step.hint = feed.hint;
        step.events.extend(feed.events);
        self.builders.push(builder);

        if done {
            self.pop_finished(step);
        }
    }

    fn feed_active(&mut self, token: &Token, levels: &LevelState, step: &mut StackStep) {
        let Some(active) = self.builders.last_mut() else {
            return;
        };

        let feed = active.feed(token, levels);
        let done = feed.is_done();
        if feed.hint.is_some() {
            step.hint = feed.hint;
        }
        step.events.extend(feed.events);

        if done {
            self.pop_finished(step);
        }
    }

    fn pop_finished(&mut self, step: &mut StackStep) {
        let Some(builder) = self.builders.pop() else {
            return;
        };
        let variant = builder.variant();
        if let Some(product) = builder.into_product() {
            log_debug!("Builder finished",
                "builder" => variant.as_str(),
                "depth" => self.builders.len()
            );
            step.products.push(product);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::products::FunctionKind;
    use crate::scanner::LevelTracker;
    use crate::tokens::TokenKind;

    struct Harness {
        stack: BuilderStack,
        tracker: LevelTracker,
        offset: usize,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                stack: BuilderStack::new(),
                tracker: LevelTracker::new(),
                offset: 0,
            }
        }

        fn push(&mut self, kind: TokenKind, text: &str) -> StackStep {
            let token = Token::new(kind, text, 1, self.offset);
            self.offset += text.len();
            self.tracker.advance(&token);
            self.stack.step(&token, self.tracker.state(), true)
        }

        fn run(&mut self, tokens: &[(TokenKind, &str)]) -> Vec<Product> {
            tokens
                .iter()
                .flat_map(|(kind, text)| self.push(*kind, text).products)
                .collect()
        }
    }

    #[test]
    fn test_namespace_waits_for_name() {
        use TokenKind as K;
        let mut h = Harness::new();

        let first = h.push(K::Namespace, "namespace");
        assert!(first.opened.is_none());
        assert_eq!(h.stack.candidate_len(), 1);

        h.push(K::Whitespace, " ");
        let name = h.push(K::NameQualified, "App\\Models");
        assert_eq!(name.opened, Some(BuilderVariant::NamespaceDeclaration));
        assert!(name.hint.is_some());

        let end = h.push(K::Semicolon, ";");
        assert_eq!(
            end.events,
            vec![BuilderEvent::NamespaceNameKnown("App\\Models".to_string())]
        );
        assert_eq!(end.products.len(), 1);
        assert!(h.stack.is_empty());
    }

    #[test]
    fn test_import_inside_namespace_body() {
        use TokenKind as K;
        let mut h = Harness::new();
        let products = h.run(&[
            (K::Namespace, "namespace"),
            (K::Identifier, "App"),
            (K::OpenCurly, "{"),
            (K::Use, "use"),
            (K::NameQualified, "Lib\\Thing"),
            (K::Semicolon, ";"),
            (K::CloseCurly, "}"),
        ]);

        assert_eq!(products.len(), 2);
        assert!(matches!(products[0], Product::NamespaceImport(_)));
        assert!(matches!(products[1], Product::NamespaceDeclaration(_)));
    }

    #[test]
    fn test_trait_use_is_rejected() {
        use TokenKind as K;
        let mut h = Harness::new();
        h.push(K::Class, "class");
        h.push(K::Identifier, "A");
        h.push(K::OpenCurly, "{");
        let step = h.push(K::Use, "use");
        assert_eq!(step.discarded, Some(DiscardReason::Rejected));
        assert!(h.stack.is_empty());
    }

    #[test]
    fn test_closure_inside_function_body() {
        use TokenKind as K;
        let mut h = Harness::new();
        let products = h.run(&[
            (K::Function, "function"),
            (K::Identifier, "outer"),
            (K::OpenParen, "("),
            (K::CloseParen, ")"),
            (K::OpenCurly, "{"),
            (K::Variable, "$f"),
            (K::Equals, "="),
            (K::Function, "function"),
            (K::OpenParen, "("),
            (K::CloseParen, ")"),
            (K::Use, "use"),
            (K::OpenParen, "("),
            (K::Variable, "$x"),
            (K::CloseParen, ")"),
            (K::OpenCurly, "{"),
            (K::CloseCurly, "}"),
            (K::Semicolon, ";"),
            (K::CloseCurly, "}"),
        ]);

        let kinds: Vec<FunctionKind> = products
            .iter()
            .filter_map(|p| match p {
                Product::FunctionSignature(sig) => Some(sig.kind),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![FunctionKind::Anonymous, FunctionKind::Named]);
        assert!(h.stack.is_empty());
    }

    #[test]
    fn test_blocked_opener_is_ignored() {
        let mut stack = BuilderStack::new();
        let token = Token::new(TokenKind::Function, "function", 1, 0);
        let step = stack.step(&token, LevelState::default(), false);
        assert!(step.opened.is_none());
        assert!(stack.is_empty());
        assert_eq!(stack.candidate_len(), 0);
    }
}
