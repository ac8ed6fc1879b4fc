//! Error types for syllabo

use thiserror::Error;

/// Result type alias using SyllaboError
pub type Result<T> = std::result::Result<T, SyllaboError>;

/// Error type alias for convenience
pub type Error = SyllaboError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_INPUT: i32 = 3;
    pub const EXTRACTION_FAILED: i32 = 4;
    pub const GENERATION_FAILED: i32 = 5;
    pub const ENCODING_FAILED: i32 = 6;
}

/// Failure categories surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    /// Malformed reference, unsupported extension, unknown material type
    Validation,
    /// Document could not be read or yielded no text
    Extraction,
    /// Model unreachable, timed out, or produced empty/invalid output
    Generation,
    /// Binary writer failure
    Encoding,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Extraction => "extraction",
            Self::Generation => "generation",
            Self::Encoding => "encoding",
        };
        f.write_str(name)
    }
}

/// Main error type for syllabo
#[derive(Debug, Error)]
pub enum SyllaboError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Request aborted")]
    Aborted,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Empty output from model: {0}")]
    EmptyOutput(String),

    #[error("Invalid analysis: {0}")]
    InvalidAnalysis(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl SyllaboError {
    /// I/O failure while writing an encoded artifact
    pub fn write_failed(part: &str, e: std::io::Error) -> Self {
        Self::Encoding(format!("Failed to write {}: {}", part, e))
    }

    /// Map this error onto the caller-facing failure taxonomy
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_) | Self::UnsupportedFormat(_) | Self::Config(_) => {
                ErrorCategory::Validation
            }
            Self::Extraction(_) | Self::Io(_) => ErrorCategory::Extraction,
            Self::Encoding(_) | Self::Zip(_) | Self::Pdf(_) => ErrorCategory::Encoding,
            Self::Timeout { .. }
            | Self::Aborted
            | Self::Llm(_)
            | Self::EmptyOutput(_)
            | Self::InvalidAnalysis(_)
            | Self::Serialization(_)
            | Self::Yaml(_)
            | Self::Http(_)
            | Self::Other(_) => ErrorCategory::Generation,
        }
    }

    /// Whether this failure came from a timeout or abort
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Aborted)
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Other(_) | Self::Yaml(_) => exit_codes::GENERAL_ERROR,
            _ => match self.category() {
                ErrorCategory::Validation => exit_codes::INVALID_INPUT,
                ErrorCategory::Extraction => exit_codes::EXTRACTION_FAILED,
                ErrorCategory::Generation => exit_codes::GENERATION_FAILED,
                ErrorCategory::Encoding => exit_codes::ENCODING_FAILED,
            },
        }
    }
}
