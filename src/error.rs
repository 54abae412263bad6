use std::io;
use thiserror::Error;

/// Custom result type alias for the application
pub type Result<T> = std::result::Result<T, InsightError>;

/// Guidance returned when no extraction strategy produced readable text.
pub const EXTRACTION_FAILURE_GUIDANCE: &str = "Could not extract readable text from this PDF. \
The file may be image-based (a scanned document), password-protected, corrupted, \
or may not contain any selectable text. Try exporting it again with a text layer, \
or upload a Markdown or plain text version instead.";

/// Errors that can occur while fetching, extracting or analyzing content
#[derive(Debug, Error)]
pub enum InsightError {
    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 payloads that do not decode
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// PDF parsing errors from the local parser
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Missing or malformed configuration, e.g. an absent API key
    #[error("Config error: {0}")]
    Config(String),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// The repository URL does not match `github.com/{owner}/{repo}`
    #[error("Invalid GitHub URL")]
    InvalidGitHubUrl(String),

    /// Uploaded file has a type we cannot analyze
    #[error("Unsupported file type: {0}. Please upload a PDF, Markdown (.md), or plain text (.txt) file.")]
    UnsupportedFileType(String),

    /// Uploaded file has no content
    #[error("The uploaded file is empty")]
    EmptyDocument,

    /// GitHub API specific errors
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// API rate limit exceeded errors
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Non-success status from a hosted API
    #[error("{service} request failed with HTTP {status}: {message}")]
    Upstream {
        /// Which hosted service answered
        service: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Language model errors (empty candidates, blocked prompts, ...)
    #[error("LLM error: {0}")]
    LLM(String),

    /// Parsing errors
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Every PDF extraction strategy failed
    #[error("{}", EXTRACTION_FAILURE_GUIDANCE)]
    ExtractionFailed {
        /// One entry per strategy: `"<strategy>: <reason>"`
        attempts: Vec<String>,
    },
}

impl InsightError {
    /// Creates a new validation error with the specified message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an upstream error for the given service and status
    pub fn upstream(service: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            status,
            message: message.into(),
        }
    }

    /// Errors caused by the caller's input; the server answers these with 400
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidGitHubUrl(_)
                | Self::UnsupportedFileType(_)
                | Self::EmptyDocument
                | Self::ExtractionFailed { .. }
        )
    }

    /// Checks if this error comes from missing or invalid configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
