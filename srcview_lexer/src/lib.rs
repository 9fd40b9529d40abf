//! Incremental re-tokenizer and language-feature recognizer
//!
//! Consumes raw tokens from an external primitive lexer, splits composite
//! tokens into position-exact atoms, tracks bracket nesting, recognizes
//! namespace declarations, imports and function signatures, resolves names
//! against the active imports, and assigns a category to every token.

// Internal modules
pub mod classifier;
pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod scanner;
pub mod symbols;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use classifier::{Category, Tag};
pub use grammar::Product;
pub use pipeline::{PipelineError, PipelineOutput, PipelineResult};
pub use scanner::{ScanError, ScanOptions, ScannedToken, Scanner};
pub use symbols::{ImportTables, SymbolKind};
pub use tokens::{Token, TokenKind};
