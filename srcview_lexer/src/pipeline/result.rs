use crate::file_processor::FileMetadata;
use crate::grammar::Product;
use crate::scanner::{ScanMetrics, ScannedToken};
use crate::symbols::ImportTables;
use std::time::Duration;

/// Everything one pass over a token stream produced
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub tokens: Vec<ScannedToken>,
    /// Recognized features in completion order
    pub products: Vec<Product>,
    /// Namespace active at end of input
    pub namespace: Option<String>,
    pub tables: ImportTables,
    pub metrics: ScanMetrics,
    pub file_metadata: Option<FileMetadata>,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Source text reassembled from the classified tokens
    pub fn source_text(&self) -> String {
        self.tokens.iter().map(|t| t.token.text.as_str()).collect()
    }

    pub fn log_success(&self, file_path: &str) {
        crate::log_success!(
            crate::logging::codes::success::FILE_PROCESSING_SUCCESS,
            "Token stream classified",
            "file" => file_path,
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0),
            "tokens" => self.token_count(),
            "features" => self.products.len(),
            "namespace" => self.namespace.as_deref().unwrap_or("(global)")
        );
    }
}
