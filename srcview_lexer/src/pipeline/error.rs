use crate::file_processor::FileProcessorError;
use crate::logging::codes;
use crate::scanner::ScanError;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Output serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            PipelineError::FileProcessing(error) => error.error_code(),
            PipelineError::Scan(error) => error.error_code(),
            PipelineError::Serialization(_) => codes::output::SERIALIZATION_FAILED,
            PipelineError::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }
}
