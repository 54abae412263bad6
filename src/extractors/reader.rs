use super::{require_min_length, ExtractionMethod, TextExtractor, UploadedDocument};
use crate::agents::truncate_chars;
use crate::error::{InsightError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Extracts text through the hosted document reader API
pub struct ReaderExtractor {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    min_chars: usize,
}

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    file: String,
    filename: &'a str,
    output: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExtractResponse {
    text: Option<String>,
    pages: Vec<ReaderPage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReaderPage {
    text: String,
}

impl ExtractResponse {
    fn combined_text(self) -> String {
        match self.text {
            Some(text) if !text.trim().is_empty() => text,
            _ => self
                .pages
                .into_iter()
                .map(|p| p.text)
                .filter(|t| !t.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

impl ReaderExtractor {
    /// Creates a new reader strategy
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        min_chars: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            min_chars,
        }
    }
}

#[async_trait]
impl TextExtractor for ReaderExtractor {
    fn name(&self) -> &'static str {
        "document reader"
    }

    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Reader
    }

    async fn extract(&self, document: &UploadedDocument) -> Result<String> {
        let url = format!("{}/v1/extract", self.base_url.trim_end_matches('/'));
        let body = ExtractRequest {
            file: STANDARD.encode(&document.bytes),
            filename: &document.filename,
            output: "text",
        };

        debug!("Sending {} ({} bytes) to document reader", document.filename, document.bytes.len());
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InsightError::upstream(
                "Document reader",
                status.as_u16(),
                truncate_chars(&message, 500),
            ));
        }

        let parsed: ExtractResponse = response.json().await?;
        require_min_length(self.name(), parsed.combined_text(), self.min_chars)
    }
}
