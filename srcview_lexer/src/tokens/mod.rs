//! Token system for the srcview lexer
//!
//! Tokens arrive from an external primitive lexer as `{kind, text, line,
//! offset}` records. This module provides the token model and the cache the
//! scanner reads them through.
//!
//! ## Key Components
//!
//! - **[`TokenKind`]** - Closed set of lexer token names plus the atom-only
//!   kinds (`LINE_BREAK`, `CAST_TYPE`, `ATTRIBUTE_MARKER`) introduced by
//!   atomization
//! - **[`Token`]** - One immutable token with its line and byte offset
//! - **[`TokenCache`]** - Yielded history plus a lookahead queue, atomizing
//!   lazily as tokens are pulled
//! - **[`TokenWindow`]** - Lookbehind / lookahead access used by the
//!   classifier and the builder stack
//!
//! ## Position invariant
//!
//! Two consecutive tokens are adjacent when the second starts at the byte
//! right after the first one ends. Atomization preserves this for every split,
//! so offsets in the refined stream can be mapped straight back to the source.

pub mod cache;
pub mod token;

pub use cache::{TokenCache, TokenWindow};
pub use token::{BracketFamily, BracketRole, Token, TokenKind};

pub use crate::utils::{Position, Span};
