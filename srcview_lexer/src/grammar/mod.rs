//! Language feature recognition over the refined token stream

pub mod builders;
pub mod products;
pub mod stack;

pub use builders::{
    candidates_for, Builder, BuilderEvent, BuilderState, BuilderVariant, CategoryHint, Feed,
    FeedOutcome, FunctionBuilder, FunctionPhase, ImportBuilder, NamespaceBuilder, Verdict,
};
pub use products::{
    CompoundStatement, FunctionKind, FunctionSignature, ImportEntry, NamespaceDeclaration,
    NamespaceImport, Parameter, Product,
};
pub use stack::{BuilderStack, DiscardReason, StackStep};
