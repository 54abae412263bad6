use super::{require_min_length, ExtractionMethod, TextExtractor, UploadedDocument};
use crate::error::{InsightError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use lopdf::Document;
use tracing::debug;

/// Parses the PDF locally with lopdf, one page at a time
pub struct LocalPdfExtractor {
    min_chars: usize,
}

impl LocalPdfExtractor {
    /// Creates a new local parser strategy
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }
}

/// Extracts text from every page, in page order, as `--- Page N ---` blocks
///
/// Pages whose text cannot be decoded are skipped.
pub fn extract_pages(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes).map_err(|e| InsightError::Pdf(format!("failed to parse PDF: {}", e)))?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(InsightError::Pdf("PDF has no pages".into()));
    }

    let mut blocks = Vec::with_capacity(pages.len());
    for &number in pages.keys() {
        match doc.extract_text(&[number]) {
            Ok(text) if !text.trim().is_empty() => {
                blocks.push(format!("--- Page {} ---\n{}", number, text.trim()));
            }
            Ok(_) => debug!("Page {} has no extractable text", number),
            Err(e) => debug!("Skipping page {}: {}", number, e),
        }
    }
    Ok(blocks.join("\n\n"))
}

#[async_trait]
impl TextExtractor for LocalPdfExtractor {
    fn name(&self) -> &'static str {
        "local parser"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::LocalParser
    }

    async fn extract(&self, document: &UploadedDocument) -> Result<String> {
        let bytes: Bytes = document.bytes.clone();
        let text = tokio::task::spawn_blocking(move || extract_pages(&bytes))
            .await
            .map_err(|e| InsightError::Pdf(format!("PDF parsing task failed: {}", e)))??;
        require_min_length(self.name(), text, self.min_chars)
    }
}
