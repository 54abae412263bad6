//! Gemini integration module
//!
//! This module wraps the hosted generative-language API used both for
//! structured analysis and for transcribing PDFs, and defines the analysis
//! result shared by the document and repository paths.

use crate::config::{Config, ModelConfig};
use crate::error::{InsightError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod analysis;
pub mod stats;

pub use analysis::{DocumentAnalyzer, RepositoryAnalyzer};
pub use stats::DocumentStats;

/// Minimum number of features a valid analysis lists
pub const MIN_FEATURES: usize = 3;
/// Minimum number of use cases a valid analysis lists
pub const MIN_USE_CASES: usize = 2;
/// Summary and insights must be longer than this many characters
pub const MIN_NARRATIVE_CHARS: usize = 100;

/// Structured analysis returned to clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Short overview
    pub summary: String,
    /// Key features, in the order the model listed them
    pub features: Vec<String>,
    /// Technologies mentioned or used
    pub technologies: Vec<String>,
    /// Practical use cases
    pub use_cases: Vec<String>,
    /// Narrative insights
    pub insights: String,
}

impl AnalysisResult {
    /// Whether the result meets the length and count thresholds for a model reply
    pub fn meets_minimums(&self) -> bool {
        self.summary.chars().count() > MIN_NARRATIVE_CHARS
            && self.features.len() >= MIN_FEATURES
            && self.use_cases.len() >= MIN_USE_CASES
            && self.insights.chars().count() > MIN_NARRATIVE_CHARS
    }
}

/// Client for the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    config: ModelConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Creates a client against `base_url`; a missing key fails on first use
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        config: ModelConfig,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            config,
        }
    }

    /// Creates a client from the application configuration
    pub fn from_config(config: &Config, client: reqwest::Client) -> Self {
        Self::new(
            client,
            config.endpoints.gemini_api_base.clone(),
            config.api_keys.gemini_api_key.clone(),
            config.model.clone(),
        )
    }

    /// Whether an API key is available
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generates a text reply for a prompt with the analysis model
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        let parts = vec![RequestPart::Text {
            text: prompt.to_string(),
        }];
        self.generate(&self.config.analysis_model, parts).await
    }

    /// Sends a PDF inline with an instruction to the vision model
    pub async fn transcribe_pdf(&self, pdf: &[u8], instruction: &str) -> Result<String> {
        let parts = vec![
            RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: mime::APPLICATION_PDF.to_string(),
                    data: STANDARD.encode(pdf),
                },
            },
            RequestPart::Text {
                text: instruction.to_string(),
            },
        ];
        self.generate(&self.config.vision_model, parts).await
    }

    async fn generate(&self, model: &str, parts: Vec<RequestPart>) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            InsightError::Config(format!(
                "{} is not configured. Set it in the environment or config file.",
                crate::config::GEMINI_API_KEY_VAR
            ))
        })?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );
        let body = GenerateContentRequest {
            contents: vec![RequestContent { parts }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        debug!("Calling Gemini model {}", model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(InsightError::upstream("Gemini", status.as_u16(), truncate_chars(&message, 500)));
        }

        let reply: GenerateContentResponse = response.json().await?;
        if let Some(reason) = reply.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(InsightError::LLM(format!("Prompt blocked by Gemini: {}", reason)));
        }

        let text: String = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(InsightError::LLM("Gemini returned an empty response".into()));
        }
        Ok(text)
    }
}

/// Returns at most `max` characters of `text`, cut on a char boundary
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
