//! Products of finished feature builders
//!
//! A product is produced exactly once, when its builder finishes, and is never
//! mutated afterwards. In-progress snapshots of the same types are available
//! from an active builder.

use crate::symbols::SymbolKind;
use crate::tokens::Token;
use serde::{Deserialize, Serialize};

/// Brace-delimited block anchored at a curly depth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundStatement {
    pub open_depth: i32,
    pub open_token: Token,
    pub close_token: Token,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDeclaration {
    /// Empty for the global namespace block `namespace { ... }`
    pub name: String,
    pub body: Option<CompoundStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEntry {
    pub kind: SymbolKind,
    /// Full name, including the group prefix for grouped entries
    pub name: String,
    pub alias: Option<String>,
}

impl ImportEntry {
    pub fn new(kind: SymbolKind, name: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            alias,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceImport {
    pub entries: Vec<ImportEntry>,
    pub group_prefix: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    Named,
    /// Closure (`function (...) use (...) { ... }`)
    #[default]
    Anonymous,
    /// Arrow function (`fn (...) => expr`)
    Arrow,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Declared types in order; nullable types keep their `?` prefix
    pub types: Vec<String>,
    pub name: String,
    /// Raw default expression, trimmed
    pub default: Option<String>,
    pub by_reference: bool,
    pub variadic: bool,
}

impl Parameter {
    pub fn is_union(&self) -> bool {
        self.types.len() > 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub kind: FunctionKind,
    pub name: Option<String>,
    pub has_reference: bool,
    pub parameters: Vec<Parameter>,
    pub return_types: Vec<String>,
    /// Raw text between the parameter list and the body or return types
    pub use_string: String,
    pub body: Option<CompoundStatement>,
}

/// Tagged union over everything a builder can produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "feature", rename_all = "snake_case")]
pub enum Product {
    NamespaceDeclaration(NamespaceDeclaration),
    NamespaceImport(NamespaceImport),
    FunctionSignature(FunctionSignature),
}

impl Product {
    pub fn feature_name(&self) -> &'static str {
        match self {
            Product::NamespaceDeclaration(_) => "namespace_declaration",
            Product::NamespaceImport(_) => "namespace_import",
            Product::FunctionSignature(_) => "function_signature",
        }
    }

    pub fn body(&self) -> Option<&CompoundStatement> {
        match self {
            Product::NamespaceDeclaration(ns) => ns.body.as_ref(),
            Product::FunctionSignature(func) => func.body.as_ref(),
            Product::NamespaceImport(_) => None,
        }
    }
}
