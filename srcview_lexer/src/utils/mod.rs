//! Shared primitive types used across the lexer layers.

pub mod span;

pub use span::{count_line_breaks, Position, Span};
