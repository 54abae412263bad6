use super::{require_min_length, ExtractionMethod, TextExtractor, UploadedDocument};
use crate::agents::GeminiClient;
use crate::error::Result;
use crate::prompts::PDF_TRANSCRIPTION;
use async_trait::async_trait;
use std::sync::Arc;

/// Asks the Gemini vision model to transcribe the PDF
pub struct VisionExtractor {
    gemini: Arc<GeminiClient>,
    min_chars: usize,
}

impl VisionExtractor {
    /// Creates a new vision strategy
    pub fn new(gemini: Arc<GeminiClient>, min_chars: usize) -> Self {
        Self { gemini, min_chars }
    }
}

#[async_trait]
impl TextExtractor for VisionExtractor {
    fn name(&self) -> &'static str {
        "vision model"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Vision
    }

    async fn extract(&self, document: &UploadedDocument) -> Result<String> {
        let text = self.gemini.transcribe_pdf(&document.bytes, PDF_TRANSCRIPTION).await?;
        require_min_length(self.name(), text, self.min_chars)
    }
}
