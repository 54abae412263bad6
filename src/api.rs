use crate::agents::{AnalysisResult, DocumentAnalyzer, GeminiClient, RepositoryAnalyzer};
use crate::config::Config;
use crate::error::Result;
use crate::extractors::{read_direct, DocumentKind, ExtractionChain, ExtractionMethod, UploadedDocument};
use crate::github::{parse_github_url, GitHubClient, RepositoryMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Request payload for analyzing a repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRepositoryRequest {
    /// Repository URL, e.g. `https://github.com/owner/repo`
    pub url: String,
}

/// Response for a repository analysis
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRepositoryResponse {
    /// Metadata fetched from GitHub
    pub repo_data: RepositoryMetadata,
    /// Structured analysis
    pub analysis: AnalysisResult,
}

/// Response for a file analysis
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeFileResponse {
    /// Structured analysis
    pub analysis: AnalysisResult,
    /// Which strategy produced the analyzed text
    pub extraction_method: ExtractionMethod,
}

/// Error body returned by the HTTP layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Current status
    pub status: String,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    /// A healthy response stamped with the current time
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "llamainsight".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Runs both analysis flows; shared by the HTTP handlers and the CLI
pub struct InsightService {
    config: Arc<Config>,
    github: GitHubClient,
    gemini: Arc<GeminiClient>,
    chain: ExtractionChain,
}

impl InsightService {
    /// Builds the service and its HTTP clients from configuration
    pub fn new(config: Config) -> Result<Self> {
        let client = config.http_client()?;
        let gemini = Arc::new(GeminiClient::from_config(&config, client.clone()));
        let github = GitHubClient::from_config(&config, client.clone());
        let chain = ExtractionChain::from_config(&config, client, Arc::clone(&gemini));
        info!("Extraction strategies: {}", chain.strategy_names().join(" -> "));

        Ok(Self {
            config: Arc::new(config),
            github,
            gemini,
            chain,
        })
    }

    /// The configuration the service was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetches repository metadata and analyzes it
    pub async fn analyze_repository(&self, url: &str) -> Result<AnalyzeRepositoryResponse> {
        let (owner, repo) = parse_github_url(url)?;
        self.config.gemini_api_key()?;

        let repo_data = self.github.fetch_repository(&owner, &repo).await?;
        let analyzer = RepositoryAnalyzer::new(Arc::clone(&self.gemini), self.config.limits.readme_char_budget);
        let analysis = analyzer.analyze(&repo_data).await?;

        info!("Analyzed repository {}/{}", owner, repo);
        Ok(AnalyzeRepositoryResponse { repo_data, analysis })
    }

    /// Extracts text from an uploaded document and analyzes it
    pub async fn analyze_file(&self, document: &UploadedDocument) -> Result<AnalyzeFileResponse> {
        if document.bytes.is_empty() {
            return Err(crate::error::InsightError::EmptyDocument);
        }
        let kind = document.kind()?;
        self.config.gemini_api_key()?;

        let extracted = match kind {
            DocumentKind::Pdf => self.chain.extract(document).await?,
            DocumentKind::Markdown | DocumentKind::PlainText => read_direct(document)?,
        };

        let analyzer = DocumentAnalyzer::new(Arc::clone(&self.gemini), self.config.limits.document_char_budget);
        let analysis = analyzer.analyze(&extracted.text).await?;

        info!(
            "Analyzed {} ({:?}) using {} extraction",
            document.filename,
            kind,
            extracted.method.label()
        );
        Ok(AnalyzeFileResponse {
            analysis,
            extraction_method: extracted.method,
        })
    }
}
