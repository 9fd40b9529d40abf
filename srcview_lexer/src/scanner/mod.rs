//! Single-pass scanner
//!
//! Pulls one atomic token at a time and, for each, moves the level counters,
//! offers the token to the builder stack, applies namespace and import events
//! to the import tables, and classifies it. Stopping iteration early is the
//! only form of cancellation.

pub mod levels;

use serde::{Deserialize, Serialize};

use crate::classifier::{Category, Classifier, ClassifyContext, Tag};
use crate::config::compile_time::file_processing::MAX_TOKEN_COUNT;
use crate::config::runtime::TokenizerPreferences;
use crate::grammar::{Builder, BuilderEvent, BuilderStack, Product, StackStep};
use crate::lexical::{AtomizeError, Atomizer};
use crate::logging::codes;
use crate::symbols::{apply_import, ImportTables, SymbolKind};
use crate::tokens::{Token, TokenCache, TokenKind, TokenWindow};
use crate::{log_debug, log_error, log_info, log_success};

pub use levels::{LevelState, LevelTracker};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ScanError {
    #[error("Token {index} could not be atomized: {source}")]
    Atomize {
        index: usize,
        #[source]
        source: AtomizeError,
    },

    #[error("Token stream exceeds {limit} tokens")]
    TooManyTokens { limit: usize },
}

impl ScanError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            ScanError::Atomize { source, .. } => source.error_code(),
            ScanError::TooManyTokens { .. } => codes::file_processing::TOO_MANY_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub atomize: bool,
    pub preserve_whitespace: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            atomize: true,
            preserve_whitespace: true,
        }
    }
}

impl From<&TokenizerPreferences> for ScanOptions {
    fn from(prefs: &TokenizerPreferences) -> Self {
        Self {
            atomize: prefs.atomize,
            preserve_whitespace: prefs.preserve_comment_whitespace,
        }
    }
}

/// Counters gathered over one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMetrics {
    pub tokens_yielded: usize,
    pub raw_tokens: usize,
    pub atoms_produced: usize,
    pub builders_opened: usize,
    pub builders_finished: usize,
    pub candidates_discarded: usize,
    pub namespaces_entered: usize,
    pub imports_registered: usize,
    pub classifier_cache_hits: usize,
}

/// One classified atomic token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedToken {
    pub index: usize,
    #[serde(flatten)]
    pub token: Token,
    pub category: Category,
    pub tags: Vec<Tag>,
}

/// Mutable state shared by every stage of the pass
#[derive(Debug, Default)]
pub struct ScannerState {
    pub levels: LevelTracker,
    pub stack: BuilderStack,
    pub tables: ImportTables,
    pub products: Vec<Product>,
    pub metrics: ScanMetrics,
}

impl ScannerState {
    fn apply(&mut self, step: StackStep) {
        if step.opened.is_some() {
            self.metrics.builders_opened += 1;
        }
        if step.discarded.is_some() {
            self.metrics.candidates_discarded += 1;
        }

        for event in step.events {
            match event {
                BuilderEvent::NamespaceNameKnown(name) => {
                    self.tables.flush(&name);
                    self.metrics.namespaces_entered += 1;
                    log_success!(codes::success::NAMESPACE_ENTERED, "Namespace entered",
                        "namespace" => self.tables.namespace().unwrap_or("(global)")
                    );
                }
            }
        }

        for product in step.products {
            self.metrics.builders_finished += 1;
            if let Product::NamespaceImport(import) = &product {
                self.metrics.imports_registered += apply_import(&mut self.tables, import);
            }
            log_debug!("Feature recognized", "feature" => product.feature_name());
            self.products.push(product);
        }
    }
}

pub struct Scanner<I: Iterator<Item = Token>> {
    cache: TokenCache<I>,
    classifier: Classifier,
    state: ScannerState,
    halted: bool,
    finished: bool,
}

impl<I: Iterator<Item = Token>> Scanner<I> {
    pub fn new(source: I, options: ScanOptions) -> Self {
        let cache = if options.atomize {
            TokenCache::with_atomizer(source, Atomizer::new(options.preserve_whitespace))
        } else {
            TokenCache::new(source)
        };
        Self {
            cache,
            classifier: Classifier::new(),
            state: ScannerState::default(),
            halted: false,
            finished: false,
        }
    }

    /// Advance and classify the next atomic token.
    ///
    /// After an error the scanner is halted and yields nothing further.
    pub fn next_token(&mut self) -> Result<Option<ScannedToken>, ScanError> {
        if self.halted || self.finished {
            return Ok(None);
        }

        let index = match self.cache.advance() {
            Ok(Some(index)) => index,
            Ok(None) => {
                self.finish();
                return Ok(None);
            }
            Err(source) => {
                let index = self.cache.history().len();
                return Err(self.halt(ScanError::Atomize { index, source }));
            }
        };

        if index >= MAX_TOKEN_COUNT {
            return Err(self.halt(ScanError::TooManyTokens {
                limit: MAX_TOKEN_COUNT,
            }));
        }

        let Some(token) = self.cache.get(index).cloned() else {
            return Ok(None);
        };

        self.state.levels.advance(&token);
        let levels = self.state.levels.state();

        let may_open = !self
            .cache
            .previous_significant()
            .is_some_and(|t| matches!(t.kind, TokenKind::DoubleColon | TokenKind::Case));
        let step = self.state.stack.step(&token, levels, may_open);
        let hint = step.hint;
        self.state.apply(step);

        let type_mode = self
            .state
            .stack
            .active()
            .is_some_and(Builder::is_accumulating_types);
        let ctx = ClassifyContext {
            hint,
            levels,
            type_mode,
            tables: &self.state.tables,
        };
        let classification = self.classifier.classify(index, &token, &mut self.cache, &ctx);

        self.state.metrics.tokens_yielded += 1;
        Ok(Some(ScannedToken {
            index,
            token,
            category: classification.category,
            tags: classification.tags,
        }))
    }

    /// Drain the stream
    pub fn scan_all(&mut self) -> Result<Vec<ScannedToken>, ScanError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn halt(&mut self, error: ScanError) -> ScanError {
        self.halted = true;
        log_error!(error.error_code(), "Scan halted",
            "error" => &error,
            "tokens_yielded" => self.state.metrics.tokens_yielded
        );
        error
    }

    fn finish(&mut self) {
        self.finished = true;
        self.state.levels.settle();

        let levels = self.state.levels.state();
        if !levels.is_balanced() {
            log_info!("Scan ended with unbalanced brackets",
                "parens" => levels.parens,
                "curly" => levels.curly,
                "square" => levels.square
            );
        }
        if let Some(active) = self.state.stack.active() {
            log_debug!("Scan ended with unfinished builders",
                "innermost" => active.variant().as_str(),
                "depth" => self.state.stack.depth()
            );
        }

        log_success!(codes::success::SCAN_COMPLETE, "Scan complete",
            "tokens" => self.state.metrics.tokens_yielded,
            "features" => self.state.products.len()
        );
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Active namespace, `None` for the global namespace
    pub fn namespace(&self) -> Option<&str> {
        self.state.tables.namespace()
    }

    pub fn tables(&self) -> &ImportTables {
        &self.state.tables
    }

    pub fn levels(&self) -> LevelState {
        self.state.levels.state()
    }

    /// Innermost builder still in progress
    pub fn active_builder(&self) -> Option<&Builder> {
        self.state.stack.active()
    }

    /// In-progress product of the innermost builder
    pub fn active_product(&self) -> Option<Product> {
        self.active_builder().map(Builder::snapshot)
    }

    /// Finished products in completion order
    pub fn products(&self) -> &[Product] {
        &self.state.products
    }

    pub fn resolve(&self, name: &str, kind: SymbolKind) -> String {
        self.state.tables.resolve(name, kind)
    }

    pub fn metrics(&self) -> ScanMetrics {
        ScanMetrics {
            raw_tokens: self.cache.raw_pulled(),
            atoms_produced: self.cache.atoms_produced(),
            classifier_cache_hits: self.classifier.cache_hits(),
            ..self.state.metrics.clone()
        }
    }

    pub fn into_parts(self) -> (Vec<Product>, ImportTables, ScanMetrics) {
        let metrics = self.metrics();
        (self.state.products, self.state.tables, metrics)
    }
}

impl<I: Iterator<Item = Token>> Iterator for Scanner<I> {
    type Item = Result<ScannedToken, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
