mod env_manager;

use crate::error::{InsightError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub use env_manager::{get_env_value, ApiKeys, GEMINI_API_KEY_VAR, GITHUB_TOKEN_VAR, READER_API_KEY_VAR};

/// Main configuration struct for the application
///
/// Credentials are read once at startup and handed to each component at
/// construction time; nothing reads the environment after that.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API keys for the hosted services
    #[serde(default)]
    pub api_keys: ApiKeys,
    /// Base URLs of the hosted services
    #[serde(default)]
    pub endpoints: Endpoints,
    /// Model selection and generation settings
    #[serde(default)]
    pub model: ModelConfig,
    /// Character budgets and thresholds used while analyzing
    #[serde(default)]
    pub limits: AnalysisLimits,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Base URLs for the external APIs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// GitHub REST API
    pub github_api_base: String,
    /// Gemini generative-language API
    pub gemini_api_base: String,
    /// Hosted document reader API
    pub reader_api_base: String,
}

/// Settings for the generative-language model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model used for structured analysis
    pub analysis_model: String,
    /// Model used for PDF transcription
    pub vision_model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens in a model reply
    pub max_output_tokens: u32,
    /// Outbound request timeout; `None` keeps the HTTP client default
    pub request_timeout_secs: Option<u64>,
}

/// Budgets and thresholds for extraction and analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisLimits {
    /// Characters of document text embedded in the analysis prompt
    pub document_char_budget: usize,
    /// Characters of README embedded in the repository prompt
    pub readme_char_budget: usize,
    /// Number of contributors requested from GitHub
    pub contributor_limit: usize,
    /// Minimum trimmed length of text returned by an extraction strategy
    pub min_extracted_chars: usize,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind: String,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github_api_base: "https://api.github.com".to_string(),
            gemini_api_base: "https://generativelanguage.googleapis.com".to_string(),
            reader_api_base: "https://api.docreader.io".to_string(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            analysis_model: "gemini-1.5-flash".to_string(),
            vision_model: "gemini-1.5-flash".to_string(),
            temperature: 0.4,
            max_output_tokens: 2048,
            request_timeout_secs: None,
        }
    }
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            document_char_budget: 8000,
            readme_char_budget: 2000,
            contributor_limit: 10,
            min_extracted_chars: 100,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Builds the default configuration with credentials taken from the environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.api_keys = ApiKeys::from_env();
        config
    }

    /// Loads configuration from the default config file location
    ///
    /// If the config file doesn't exist, the defaults are used. Environment
    /// credentials override whatever the file contains.
    pub fn load() -> Result<Self> {
        let path = dirs::config_dir().map(|dir| dir.join("llamainsight").join("config.toml"));

        match path {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::from_env()),
        }
    }

    /// Loads configuration from an explicit TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            InsightError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_toml(&content)?;
        config.api_keys.apply_env_overrides();
        Ok(config)
    }

    /// Parses configuration from TOML text without consulting the environment
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)
            .map_err(|e| InsightError::Config(format!("Failed to parse config file: {}", e)))?;
        config.api_keys.normalize();
        Ok(config)
    }

    /// Checks that endpoints parse as URLs and limits are usable
    pub fn validate(&self) -> Result<()> {
        for (name, base) in [
            ("endpoints.github_api_base", &self.endpoints.github_api_base),
            ("endpoints.gemini_api_base", &self.endpoints.gemini_api_base),
            ("endpoints.reader_api_base", &self.endpoints.reader_api_base),
        ] {
            Url::parse(base)
                .map_err(|e| InsightError::Config(format!("{} is not a valid URL: {}", name, e)))?;
        }

        if self.limits.document_char_budget == 0 {
            return Err(InsightError::Config("limits.document_char_budget must be > 0".into()));
        }
        if self.limits.readme_char_budget == 0 {
            return Err(InsightError::Config("limits.readme_char_budget must be > 0".into()));
        }
        if self.limits.contributor_limit == 0 {
            return Err(InsightError::Config("limits.contributor_limit must be > 0".into()));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(InsightError::Config("server.max_upload_bytes must be > 0".into()));
        }
        Ok(())
    }

    /// Retrieves the Gemini API key, which every analysis path requires
    pub fn gemini_api_key(&self) -> Result<&str> {
        self.api_keys.gemini_api_key.as_deref().ok_or_else(|| {
            InsightError::Config(format!(
                "{} is not configured. Set it in the environment or config file.",
                GEMINI_API_KEY_VAR
            ))
        })
    }

    /// Request timeout for outbound calls, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.model.request_timeout_secs.map(Duration::from_secs)
    }

    /// Builds an HTTP client honoring the configured timeout
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            "llamainsight/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = self.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}
