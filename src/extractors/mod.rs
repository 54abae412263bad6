use crate::agents::GeminiClient;
use crate::config::Config;
use crate::error::{InsightError, Result};
use crate::validation::validate_content;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Module for the hosted document reader strategy
pub mod reader;
/// Module for the Gemini vision transcription strategy
pub mod vision;
/// Module for local page-by-page PDF parsing
pub mod local;

pub use local::LocalPdfExtractor;
pub use reader::ReaderExtractor;
pub use vision::VisionExtractor;

/// A file received from the client
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Raw file contents
    pub bytes: Bytes,
    /// Media type declared by the client, possibly empty
    pub content_type: String,
    /// Original filename
    pub filename: String,
}

/// Kinds of documents the service analyzes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// PDF, routed through the extraction chain
    Pdf,
    /// Markdown, read directly
    Markdown,
    /// Plain text, read directly
    PlainText,
}

/// Which strategy produced the extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMethod {
    /// Hosted document reader
    Reader,
    /// Gemini transcription of the PDF
    Vision,
    /// Local lopdf parsing
    LocalParser,
    /// Non-PDF input read as UTF-8
    Direct,
}

/// Text produced for one uploaded document
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// The extracted text
    pub text: String,
    /// Strategy that produced it
    pub method: ExtractionMethod,
}

impl UploadedDocument {
    /// Creates a new uploaded document
    pub fn new(
        bytes: impl Into<Bytes>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }

    /// Detects the document kind from the declared type and filename suffix
    pub fn kind(&self) -> Result<DocumentKind> {
        DocumentKind::detect(&self.content_type, &self.filename)
    }
}

impl DocumentKind {
    /// Classifies a declared media type / filename pair
    ///
    /// Anything that is neither PDF, Markdown nor plain text is rejected with
    /// an error naming the declared type.
    pub fn detect(content_type: &str, filename: &str) -> Result<Self> {
        let declared = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        let name = filename.to_lowercase();

        if declared == mime::APPLICATION_PDF.essence_str() || name.ends_with(".pdf") {
            Ok(Self::Pdf)
        } else if declared == "text/markdown" || name.ends_with(".md") {
            Ok(Self::Markdown)
        } else if declared == mime::TEXT_PLAIN.essence_str() || name.ends_with(".txt") {
            Ok(Self::PlainText)
        } else if declared.is_empty() {
            Err(InsightError::UnsupportedFileType("unknown".to_string()))
        } else {
            Err(InsightError::UnsupportedFileType(content_type.trim().to_string()))
        }
    }
}

impl ExtractionMethod {
    /// Short label used in logs and responses
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Vision => "vision",
            Self::LocalParser => "local-parser",
            Self::Direct => "direct",
        }
    }
}

/// One way of turning PDF bytes into plain text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Returns the name of the strategy
    fn name(&self) -> &'static str;
    /// Returns the method reported when this strategy wins
    fn method(&self) -> ExtractionMethod;
    /// Makes a single attempt at extracting text
    async fn extract(&self, document: &UploadedDocument) -> Result<String>;
}

/// Ordered list of extraction strategies, tried until one yields valid content
pub struct ExtractionChain {
    extractors: Vec<Box<dyn TextExtractor>>,
}

impl ExtractionChain {
    /// Creates a chain from strategies in priority order
    pub fn new(extractors: Vec<Box<dyn TextExtractor>>) -> Self {
        Self { extractors }
    }

    /// Builds the standard chain: reader (if configured), vision, local parser
    pub fn from_config(config: &Config, client: reqwest::Client, gemini: Arc<GeminiClient>) -> Self {
        let min_chars = config.limits.min_extracted_chars;
        let mut extractors: Vec<Box<dyn TextExtractor>> = Vec::new();

        match &config.api_keys.reader_api_key {
            Some(key) => extractors.push(Box::new(ReaderExtractor::new(
                client,
                config.endpoints.reader_api_base.clone(),
                key.clone(),
                min_chars,
            ))),
            None => info!("Document reader API key not configured, skipping reader strategy"),
        }
        extractors.push(Box::new(VisionExtractor::new(gemini, min_chars)));
        extractors.push(Box::new(LocalPdfExtractor::new(min_chars)));

        Self::new(extractors)
    }

    /// Names of the registered strategies, in order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Tries each strategy once, returning the first validated result
    pub async fn extract(&self, document: &UploadedDocument) -> Result<ExtractionResult> {
        let mut attempts = Vec::with_capacity(self.extractors.len());

        for extractor in &self.extractors {
            info!("Trying {} extraction for {}", extractor.name(), document.filename);

            match extractor.extract(document).await {
                Ok(text) => {
                    let verdict = validate_content(&text);
                    if verdict.is_accepted() {
                        info!(
                            "{} extraction succeeded for {} ({} characters)",
                            extractor.name(),
                            document.filename,
                            text.chars().count()
                        );
                        return Ok(ExtractionResult {
                            text,
                            method: extractor.method(),
                        });
                    }
                    warn!(
                        "{} extraction produced unusable content: {}",
                        extractor.name(),
                        verdict.reason()
                    );
                    attempts.push(format!("{}: {}", extractor.name(), verdict.reason()));
                }
                Err(e) => {
                    warn!("{} extraction failed: {}", extractor.name(), e);
                    attempts.push(format!("{}: {}", extractor.name(), e));
                }
            }
        }

        warn!(
            "All extraction strategies failed for {}: {}",
            document.filename,
            attempts.join("; ")
        );
        Err(InsightError::ExtractionFailed { attempts })
    }
}

/// Reads a non-PDF document directly as UTF-8
pub fn read_direct(document: &UploadedDocument) -> Result<ExtractionResult> {
    let text = String::from_utf8_lossy(&document.bytes).into_owned();
    if text.trim().is_empty() {
        return Err(InsightError::EmptyDocument);
    }
    Ok(ExtractionResult {
        text,
        method: ExtractionMethod::Direct,
    })
}

/// Fails when the trimmed text is shorter than `min_chars`
pub(crate) fn require_min_length(strategy: &str, text: String, min_chars: usize) -> Result<String> {
    let len = text.trim().chars().count();
    if len < min_chars {
        return Err(InsightError::Parse(format!(
            "{} returned only {} characters (minimum {})",
            strategy, len, min_chars
        )));
    }
    Ok(text)
}
