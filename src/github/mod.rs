//! GitHub repository metadata
//!
//! Fetches repository info, top contributors, the language byte mapping and
//! the README through the GitHub REST API and merges them into one
//! [`RepositoryMetadata`].

use crate::config::Config;
use crate::error::{InsightError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};
use url::Url;

/// Language label used when GitHub reports none
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// A contributor as listed by GitHub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    /// GitHub handle
    pub login: String,
    /// Commit count attributed to the handle
    pub contributions: u64,
    /// Avatar image URL
    #[serde(default)]
    pub avatar_url: String,
}

/// Merged metadata for one repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMetadata {
    /// Repository name without the owner
    pub name: String,
    /// Description, empty when unset
    pub description: String,
    /// Stargazer count
    pub stars: u64,
    /// Fork count
    pub forks: u64,
    /// Primary language, or `"Unknown"`
    pub language: String,
    /// Creation time
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    pub updated_at: Option<DateTime<Utc>>,
    /// Topic labels, empty when unset
    pub topics: Vec<String>,
    /// In upstream order (contributions descending)
    pub contributors: Vec<Contributor>,
    /// Language name to byte count
    pub languages: BTreeMap<String, u64>,
    /// Decoded README, empty when unavailable
    pub readme: String,
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    name: String,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    language: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    topics: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ContributorEntry {
    login: Option<String>,
    #[serde(default)]
    contributions: u64,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReadmeEntry {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

/// Splits a repository URL into `(owner, repo)`
///
/// Accepts `https://github.com/{owner}/{repo}` with or without a scheme or
/// `www.`; a trailing `.git` and any further path, query or fragment are
/// dropped.
pub fn parse_github_url(input: &str) -> Result<(String, String)> {
    let trimmed = input.trim();
    let invalid = || InsightError::InvalidGitHubUrl(trimmed.to_string());

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let parsed = Url::parse(&with_scheme).map_err(|_| invalid())?;

    match parsed.host_str() {
        Some("github.com") | Some("www.github.com") => {}
        _ => return Err(invalid()),
    }

    let mut segments = parsed.path_segments().ok_or_else(invalid)?.filter(|s| !s.is_empty());
    let owner = segments.next().ok_or_else(invalid)?;
    let repo = segments.next().ok_or_else(invalid)?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return Err(invalid());
    }

    Ok((owner.to_string(), repo.to_string()))
}

/// Client for the GitHub REST API
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    contributor_limit: usize,
}

impl GitHubClient {
    /// Creates a client against `base_url`, listing at most `contributor_limit` contributors
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        token: Option<String>,
        contributor_limit: usize,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token,
            contributor_limit,
        }
    }

    /// Creates a client from the application configuration
    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new(
            client,
            config.endpoints.github_api_base.clone(),
            config.api_keys.github_token.clone(),
            config.limits.contributor_limit,
        )
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}/repos/{}", self.base_url.trim_end_matches('/'), path);
        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {}", token));
        }
        request
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let response = self.get(path).send().await?;
        let response = check_status(response, what).await?;
        Ok(response.json::<T>().await?)
    }

    /// Like `get_json`, but 204 No Content or an empty body yields `T::default()`
    ///
    /// GitHub answers the contributor listing of an empty repository with 204.
    async fn get_json_or_default<T>(&self, path: &str, what: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let response = self.get(path).send().await?;
        let response = check_status(response, what).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(T::default());
        }
        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetches and merges all metadata for `owner/repo`
    pub async fn fetch_repository(&self, owner: &str, repo: &str) -> Result<RepositoryMetadata> {
        info!("Fetching GitHub metadata for {}/{}", owner, repo);
        let base = format!("{}/{}", owner, repo);
        let contributors_path = format!("{}/contributors?per_page={}", base, self.contributor_limit);
        let languages_path = format!("{}/languages", base);

        let (info, contributors, languages) = tokio::try_join!(
            self.get_json::<RepoInfo>(&base, "repository"),
            self.get_json_or_default::<Vec<ContributorEntry>>(&contributors_path, "contributors"),
            self.get_json_or_default::<BTreeMap<String, u64>>(&languages_path, "languages"),
        )?;

        let readme = match self.fetch_readme(&base).await {
            Ok(readme) => readme,
            Err(e) => {
                warn!("README unavailable for {}: {}", base, e);
                String::new()
            }
        };

        Ok(RepositoryMetadata {
            name: info.name,
            description: info.description.unwrap_or_default(),
            stars: info.stargazers_count,
            forks: info.forks_count,
            language: info
                .language
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
            created_at: info.created_at,
            updated_at: info.updated_at,
            topics: info.topics.unwrap_or_default(),
            contributors: contributors
                .into_iter()
                .filter_map(|c| {
                    Some(Contributor {
                        login: c.login?,
                        contributions: c.contributions,
                        avatar_url: c.avatar_url.unwrap_or_default(),
                    })
                })
                .take(self.contributor_limit)
                .collect(),
            languages,
            readme,
        })
    }

    async fn fetch_readme(&self, base: &str) -> Result<String> {
        let entry: ReadmeEntry = self.get_json(&format!("{}/readme", base), "README").await?;
        if let Some(encoding) = entry.encoding.as_deref() {
            if encoding != "base64" {
                return Err(InsightError::Parse(format!("unexpected README encoding {}", encoding)));
            }
        }
        let compact: String = entry.content.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD.decode(compact)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Err(InsightError::RateLimitExceeded(format!(
            "GitHub refused the {} request ({}): {}",
            what,
            status,
            crate::agents::truncate_chars(&body, 200)
        ))),
        _ => Err(InsightError::GitHubApi(format!("Failed to fetch {}: {}", what, status))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("https://github.com/rust-lang/cargo", "rust-lang", "cargo" ; "plain")]
    #[test_case("https://github.com/rust-lang/cargo.git", "rust-lang", "cargo" ; "dot git")]
    #[test_case("https://github.com/rust-lang/cargo/tree/master/src?x=1#top", "rust-lang", "cargo" ; "deep path")]
    #[test_case("github.com/rust-lang/cargo", "rust-lang", "cargo" ; "no scheme")]
    #[test_case("http://www.github.com/rust-lang/cargo/", "rust-lang", "cargo" ; "www and slash")]
    fn test_parse_github_url(input: &str, owner: &str, repo: &str) {
        assert_eq!(parse_github_url(input).unwrap(), (owner.to_string(), repo.to_string()));
    }

    #[test_case("https://gitlab.com/o/r" ; "other host")]
    #[test_case("https://github.com/only-owner" ; "missing repo")]
    #[test_case("not a url at all" ; "garbage")]
    #[test_case("" ; "empty")]
    fn test_parse_github_url_rejects(input: &str) {
        let err = parse_github_url(input).unwrap_err();
        assert_eq!(err.to_string(), "Invalid GitHub URL");
    }

    fn client(server: &mockito::ServerGuard, token: Option<&str>) -> GitHubClient {
        GitHubClient::new(Client::new(), server.url(), token.map(str::to_string), 10)
    }

    #[tokio::test]
    async fn test_fetch_repository_merges_calls() {
        let mut server = mockito::Server::new_async().await;
        let info = server
            .mock("GET", "/repos/octo/widgets")
            .match_header("authorization", "token gh-token")
            .with_status(200)
            .with_body(
                r#"{"name":"widgets","description":"Widget kit","stargazers_count":42,"forks_count":7,
                    "language":"Rust","created_at":"2020-01-02T03:04:05Z","updated_at":"2024-05-06T07:08:09Z",
                    "topics":["gui","widgets"]}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/repos/octo/widgets/contributors")
            .match_query(mockito::Matcher::UrlEncoded("per_page".into(), "10".into()))
            .with_status(200)
            .with_body(
                r#"[{"login":"alice","contributions":30,"avatar_url":"https://a"},
                    {"login":"bob","contributions":12,"avatar_url":"https://b"}]"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/repos/octo/widgets/languages")
            .with_status(200)
            .with_body(r#"{"Rust":9000,"Shell":120}"#)
            .create_async()
            .await;
        let readme = STANDARD.encode("# Widgets\n\nA widget kit for terminals.\n");
        let (head, tail) = readme.split_at(12);
        server
            .mock("GET", "/repos/octo/widgets/readme")
            .with_status(200)
            .with_body(serde_json::json!({"content": format!("{}\n{}\n", head, tail), "encoding": "base64"}).to_string())
            .create_async()
            .await;

        let meta = client(&server, Some("gh-token")).fetch_repository("octo", "widgets").await.unwrap();
        info.assert_async().await;

        assert_eq!(meta.name, "widgets");
        assert_eq!(meta.stars, 42);
        assert_eq!(meta.forks, 7);
        assert_eq!(meta.language, "Rust");
        assert_eq!(meta.topics, vec!["gui", "widgets"]);
        assert_eq!(meta.contributors.len(), 2);
        assert_eq!(meta.contributors[0].login, "alice");
        assert_eq!(meta.languages.get("Shell"), Some(&120));
        assert_eq!(meta.readme, "# Widgets\n\nA widget kit for terminals.\n");
        assert_eq!(meta.created_at.unwrap().to_rfc3339(), "2020-01-02T03:04:05+00:00");
    }

    #[tokio::test]
    async fn test_defaults_and_missing_readme() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/octo/bare")
            .with_status(200)
            .with_body(r#"{"name":"bare","description":null,"stargazers_count":0,"forks_count":0,"language":null}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/octo/bare/contributors")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        server
            .mock("GET", "/repos/octo/bare/languages")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        server
            .mock("GET", "/repos/octo/bare/readme")
            .with_status(404)
            .create_async()
            .await;

        let meta = client(&server, None).fetch_repository("octo", "bare").await.unwrap();
        assert_eq!(meta.description, "");
        assert_eq!(meta.language, UNKNOWN_LANGUAGE);
        assert!(meta.topics.is_empty());
        assert!(meta.contributors.is_empty());
        assert_eq!(meta.readme, "");
    }

    #[tokio::test]
    async fn test_empty_repository_no_content_keeps_metadata() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/octo/empty")
            .with_status(200)
            .with_body(r#"{"name":"empty","description":"Nothing yet","stargazers_count":1,"forks_count":0,"language":null}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/octo/empty/contributors")
            .match_query(mockito::Matcher::Any)
            .with_status(204)
            .create_async()
            .await;
        server
            .mock("GET", "/repos/octo/empty/languages")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;
        server
            .mock("GET", "/repos/octo/empty/readme")
            .with_status(404)
            .create_async()
            .await;

        let meta = client(&server, None).fetch_repository("octo", "empty").await.unwrap();
        assert_eq!(meta.name, "empty");
        assert_eq!(meta.description, "Nothing yet");
        assert_eq!(meta.stars, 1);
        assert!(meta.contributors.is_empty());
        assert!(meta.languages.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(403)
            .with_body("API rate limit exceeded")
            .create_async()
            .await;

        let err = client(&server, None).fetch_repository("octo", "widgets").await.unwrap_err();
        assert!(matches!(err, InsightError::RateLimitExceeded(_)));
    }

    #[tokio::test]
    async fn test_not_found_is_github_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let err = client(&server, None).fetch_repository("octo", "missing").await.unwrap_err();
        assert!(matches!(err, InsightError::GitHubApi(_)));
    }
}
