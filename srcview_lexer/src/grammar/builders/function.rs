//! Function signature builder shared by named functions, closures and arrow
//! functions
//!
//! `Init` waits for the name and the parameter list, `Params` collects
//! parameters, `PostParams` collects the closure use clause and return types,
//! and `Closed` waits for the body's closing brace.

use super::{Builder, BuilderState, CategoryHint, Feed, Verdict};
use crate::classifier::Category;
use crate::grammar::products::{CompoundStatement, FunctionKind, FunctionSignature, Parameter};
use crate::scanner::LevelState;
use crate::tokens::{Token, TokenKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FunctionPhase {
    #[default]
    Init,
    Params,
    PostParams,
    Closed,
}

/// Tokens that may spell (part of) a type
fn is_type_token(kind: TokenKind) -> bool {
    kind.is_name()
        || matches!(
            kind,
            TokenKind::NsSeparator | TokenKind::Array | TokenKind::Callable | TokenKind::Static
        )
}

/// Collects `?`-prefixed, `|`-separated type lists.
#[derive(Debug, Clone, Default)]
struct TypeCollector {
    current: String,
    nullable: bool,
}

impl TypeCollector {
    fn push(&mut self, text: &str) {
        if self.current.is_empty() && self.nullable {
            self.current.push('?');
            self.nullable = false;
        }
        self.current.push_str(text);
    }

    fn flush_into(&mut self, types: &mut Vec<String>) {
        if !self.current.is_empty() {
            types.push(std::mem::take(&mut self.current));
        }
        self.nullable = false;
    }

    fn is_empty(&self) -> bool {
        self.current.is_empty() && !self.nullable
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionBuilder {
    state: BuilderState,
    phase: FunctionPhase,
    signature: FunctionSignature,

    // Params
    param_depth: i32,
    param_unified: i32,
    draft: Parameter,
    types: TypeCollector,
    default_text: Option<String>,
    attribute_marker: bool,
    skip_square: Option<i32>,

    // PostParams
    in_return_types: bool,

    body_open: Option<(i32, Token)>,
}

impl FunctionBuilder {
    /// Never inside an import declaration (`use function ...`).
    pub fn verify(_levels: &LevelState, active: Option<&Builder>, _buffer: &[Token]) -> Verdict {
        match active {
            Some(Builder::Import(_)) => Verdict::No,
            _ => Verdict::Yes,
        }
    }

    pub fn new(arrow: bool) -> Self {
        let mut builder = Self::default();
        builder.signature.kind = if arrow {
            FunctionKind::Arrow
        } else {
            FunctionKind::Anonymous
        };
        builder
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn phase(&self) -> FunctionPhase {
        self.phase
    }

    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    pub fn into_signature(self) -> FunctionSignature {
        self.signature
    }

    /// Parameter types before the variable, or return types after `:`
    pub fn is_accumulating_types(&self) -> bool {
        match self.phase {
            FunctionPhase::Params => {
                self.default_text.is_none() && self.skip_square.is_none() && self.draft.name.is_empty()
            }
            FunctionPhase::PostParams => self.in_return_types,
            _ => false,
        }
    }

    fn finish(&mut self) -> Feed {
        self.state = BuilderState::Finished;
        self.phase = FunctionPhase::Closed;
        self.signature.use_string = self.signature.use_string.trim().to_string();
        Feed::done()
    }

    pub fn feed(&mut self, token: &Token, levels: &LevelState) -> Feed {
        if self.state == BuilderState::Finished {
            return Feed::default();
        }
        self.state = BuilderState::Building;

        match self.phase {
            FunctionPhase::Init => self.feed_init(token, levels),
            FunctionPhase::Params => self.feed_params(token, levels),
            FunctionPhase::PostParams => self.feed_post_params(token, levels),
            FunctionPhase::Closed => self.feed_body(token, levels),
        }
    }

    fn feed_init(&mut self, token: &Token, levels: &LevelState) -> Feed {
        match token.kind {
            TokenKind::Ampersand => {
                self.signature.has_reference = true;
                Feed::default()
            }
            TokenKind::OpenParen => {
                self.phase = FunctionPhase::Params;
                self.param_depth = levels.parens;
                self.param_unified = levels.unified;
                Feed::default()
            }
            // Methods may be named after reserved words.
            kind if self.signature.name.is_none()
                && self.signature.kind != FunctionKind::Arrow
                && (kind == TokenKind::Identifier || kind.is_keyword()) =>
            {
                self.signature.name = Some(token.text.clone());
                self.signature.kind = FunctionKind::Named;
                Feed::hinted(CategoryHint::category(Category::FunctionName))
            }
            _ => Feed::default(),
        }
    }

    fn finish_parameter(&mut self) {
        self.types.flush_into(&mut self.draft.types);
        let mut parameter = std::mem::take(&mut self.draft);
        if let Some(default) = self.default_text.take() {
            let default = default.trim();
            if !default.is_empty() {
                parameter.default = Some(default.to_string());
            }
        }
        self.types = TypeCollector::default();

        if !parameter.name.is_empty() || !parameter.types.is_empty() {
            self.signature.parameters.push(parameter);
        }
    }

    fn feed_params(&mut self, token: &Token, levels: &LevelState) -> Feed {
        // Attributes on parameters are skipped whole.
        if let Some(depth) = self.skip_square {
            if token.kind == TokenKind::CloseSquare && levels.square == depth {
                self.skip_square = None;
            }
            return Feed::default();
        }
        match token.kind {
            TokenKind::AttributeMarker => {
                self.attribute_marker = true;
                return Feed::default();
            }
            TokenKind::OpenSquare if self.attribute_marker => {
                self.attribute_marker = false;
                self.skip_square = Some(levels.square);
                return Feed::default();
            }
            TokenKind::Attribute => {
                self.skip_square = Some(levels.square);
                return Feed::default();
            }
            _ => self.attribute_marker = false,
        }

        if token.kind == TokenKind::CloseParen && levels.parens == self.param_depth {
            self.finish_parameter();
            self.phase = FunctionPhase::PostParams;
            return Feed::default();
        }

        let at_list_level = levels.unified == self.param_unified;

        if let Some(default) = self.default_text.as_mut() {
            if token.kind == TokenKind::Comma && at_list_level {
                self.finish_parameter();
            } else {
                default.push_str(&token.text);
            }
            return Feed::default();
        }

        match token.kind {
            TokenKind::Question => self.types.nullable = true,
            TokenKind::Pipe => self.types.flush_into(&mut self.draft.types),
            TokenKind::Ampersand => {
                self.draft.by_reference = true;
                self.signature.has_reference = true;
            }
            TokenKind::Ellipsis => self.draft.variadic = true,
            TokenKind::Variable => {
                self.types.flush_into(&mut self.draft.types);
                self.draft.name = token.text.clone();
            }
            TokenKind::Equals => self.default_text = Some(String::new()),
            TokenKind::Comma if at_list_level => self.finish_parameter(),
            kind if is_type_token(kind) && self.draft.name.is_empty() => self.types.push(&token.text),
            // Visibility and readonly modifiers of promoted parameters, trivia
            _ => {}
        }
        Feed::default()
    }

    fn feed_post_params(&mut self, token: &Token, levels: &LevelState) -> Feed {
        match token.kind {
            TokenKind::DoubleArrow | TokenKind::Semicolon => {
                self.types.flush_into(&mut self.signature.return_types);
                self.finish()
            }
            TokenKind::OpenCurly => {
                self.types.flush_into(&mut self.signature.return_types);
                self.body_open = Some((levels.curly, token.clone()));
                self.phase = FunctionPhase::Closed;
                Feed::default()
            }
            TokenKind::Colon => {
                self.in_return_types = true;
                Feed::default()
            }
            _ if self.in_return_types => {
                match token.kind {
                    TokenKind::Question => self.types.nullable = true,
                    TokenKind::Pipe => self.types.flush_into(&mut self.signature.return_types),
                    kind if is_type_token(kind) => self.types.push(&token.text),
                    _ => {}
                }
                Feed::default()
            }
            _ => {
                self.signature.use_string.push_str(&token.text);
                Feed::default()
            }
        }
    }

    fn feed_body(&mut self, token: &Token, levels: &LevelState) -> Feed {
        let Some((depth, open_token)) = &self.body_open else {
            return Feed::default();
        };
        if token.kind != TokenKind::CloseCurly || levels.curly != *depth {
            return Feed::default();
        }

        self.signature.body = Some(CompoundStatement {
            open_depth: *depth,
            open_token: open_token.clone(),
            close_token: token.clone(),
        });
        self.finish()
    }

    #[cfg(test)]
    fn has_pending_types(&self) -> bool {
        !self.types.is_empty()
    }
}
