use serde::{Deserialize, Serialize};

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Environment variable holding the hosted document reader API key
pub const READER_API_KEY_VAR: &str = "DOC_READER_API_KEY";
/// Environment variable holding the GitHub token
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Stores API keys for the hosted services
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Gemini key, required for every analysis path
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    /// Hosted reader key; without it the reader strategy is skipped
    #[serde(default)]
    pub reader_api_key: Option<String>,
    /// GitHub token for the elevated rate limit
    #[serde(default)]
    pub github_token: Option<String>,
}

impl ApiKeys {
    /// Reads all keys from the environment
    pub fn from_env() -> Self {
        Self {
            gemini_api_key: get_env_value(GEMINI_API_KEY_VAR),
            reader_api_key: get_env_value(READER_API_KEY_VAR),
            github_token: get_env_value(GITHUB_TOKEN_VAR),
        }
    }

    /// Replaces keys with environment values where those are set
    pub fn apply_env_overrides(&mut self) {
        let env = Self::from_env();
        self.merge(env);
    }

    /// Takes every key present in `other`, keeping ours otherwise
    pub fn merge(&mut self, other: ApiKeys) {
        if other.gemini_api_key.is_some() {
            self.gemini_api_key = other.gemini_api_key;
        }
        if other.reader_api_key.is_some() {
            self.reader_api_key = other.reader_api_key;
        }
        if other.github_token.is_some() {
            self.github_token = other.github_token;
        }
    }

    /// Blank values from a config file count as absent
    pub fn normalize(&mut self) {
        for key in [
            &mut self.gemini_api_key,
            &mut self.reader_api_key,
            &mut self.github_token,
        ] {
            if key.as_deref().map(str::trim).map_or(false, str::is_empty) {
                *key = None;
            }
        }
    }
}

/// Returns the variable's value, treating empty strings as unset
pub fn get_env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
