//! Analysis of documents and repositories with the generative-language model
//!
//! Both analyzers build a prompt, ask Gemini for a JSON object and decode it.
//! The document path falls back to a deterministic analysis built from
//! [`DocumentStats`] whenever the model fails or replies with something too
//! thin; the repository path degrades to a stub built from the raw reply.

use super::stats::DocumentStats;
use super::{truncate_chars, AnalysisResult, GeminiClient, MIN_FEATURES, MIN_USE_CASES};
use crate::error::Result;
use crate::github::RepositoryMetadata;
use crate::prompts::{self, ANALYSIS_JSON_SHAPE};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Characters of raw model text kept in a degraded repository analysis
const DEGRADED_SUMMARY_CHARS: usize = 200;

/// Lenient mirror of [`AnalysisResult`] for decoding model replies
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ModelAnalysis {
    summary: String,
    features: Vec<String>,
    technologies: Vec<String>,
    #[serde(alias = "use_cases")]
    use_cases: Vec<String>,
    insights: String,
}

impl From<ModelAnalysis> for AnalysisResult {
    fn from(m: ModelAnalysis) -> Self {
        Self {
            summary: m.summary.trim().to_string(),
            features: clean_list(m.features),
            technologies: clean_list(m.technologies),
            use_cases: clean_list(m.use_cases),
            insights: m.insights.trim().to_string(),
        }
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Returns the substring from the first `{` to the last `}`, if any
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Decodes the first JSON object in a model reply
pub fn parse_analysis(reply: &str) -> Option<AnalysisResult> {
    let json = extract_json_object(reply)?;
    match serde_json::from_str::<ModelAnalysis>(json) {
        Ok(parsed) => Some(parsed.into()),
        Err(e) => {
            warn!("Model reply is not valid analysis JSON: {}", e);
            None
        }
    }
}

/// Decodes a model reply and keeps it only if it meets the minimum lengths and counts
pub fn parse_document_analysis(reply: &str) -> Option<AnalysisResult> {
    parse_analysis(reply).filter(|a| {
        let ok = a.meets_minimums();
        if !ok {
            warn!(
                "Model analysis below minimums (summary {} chars, {} features, {} use cases, insights {} chars)",
                a.summary.chars().count(),
                a.features.len(),
                a.use_cases.len(),
                a.insights.chars().count()
            );
        }
        ok
    })
}

/// Builds the document analysis prompt from text and statistics
pub fn build_document_prompt(text: &str, stats: &DocumentStats, char_budget: usize) -> String {
    let excerpt = truncate_chars(text, char_budget);
    let document = if excerpt.len() < text.len() {
        format!(
            "{}\n\n[Document truncated to the first {} of {} characters]",
            excerpt, char_budget, stats.char_count
        )
    } else {
        excerpt.to_string()
    };

    let stats_block = format!(
        "- Word count: {}\n- Sentence count: {}\n- Paragraph count: {}\n- Contains code: {}\n- Contains markdown: {}\n- Technical terms: {}\n- Frequent topics: {}",
        stats.word_count,
        stats.sentence_count,
        stats.paragraph_count,
        yes_no(stats.has_code),
        yes_no(stats.has_markdown),
        join_or_none(&stats.technical_terms),
        join_or_none(&stats.topics),
    );

    prompts::render(
        prompts::DOCUMENT_ANALYSIS,
        &[
            ("shape", ANALYSIS_JSON_SHAPE),
            ("stats", &stats_block),
            ("document", &document),
        ],
    )
}

/// Builds the repository analysis prompt from fetched metadata
pub fn build_repository_prompt(metadata: &RepositoryMetadata, readme_budget: usize) -> String {
    let description = if metadata.description.is_empty() {
        "No description provided"
    } else {
        metadata.description.as_str()
    };
    let readme = if metadata.readme.trim().is_empty() {
        "No README available"
    } else {
        truncate_chars(&metadata.readme, readme_budget)
    };

    prompts::render(
        prompts::REPOSITORY_ANALYSIS,
        &[
            ("shape", ANALYSIS_JSON_SHAPE),
            ("language", &metadata.language),
            ("topics", &join_or_none(&metadata.topics)),
            ("name", &metadata.name),
            ("description", description),
            ("readme", readme),
        ],
    )
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// Builds a complete analysis from statistics alone
///
/// The result always meets [`AnalysisResult::meets_minimums`].
pub fn fallback_document_analysis(stats: &DocumentStats) -> AnalysisResult {
    let topic_phrase = if stats.topics.is_empty() {
        "general subject matter".to_string()
    } else {
        stats.topics.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
    };

    let mut format_notes = Vec::new();
    if stats.has_markdown {
        format_notes.push("uses Markdown formatting for structure");
    }
    if stats.has_code {
        format_notes.push("includes code snippets or technical examples");
    }
    let format_sentence = if format_notes.is_empty() {
        "It is written as continuous prose without code or Markdown markup.".to_string()
    } else {
        format!("It {}.", format_notes.join(" and "))
    };

    let summary = format!(
        "This document contains {} words across {} sentences and {} paragraphs. \
         Its most prominent topics are {}. {}",
        stats.word_count, stats.sentence_count, stats.paragraph_count, topic_phrase, format_sentence
    );

    let mut features: Vec<String> = stats
        .topics
        .iter()
        .take(5)
        .map(|t| format!("Discussion of {}", t))
        .collect();
    let generic_features = [
        format!("Structured content organized into {} paragraphs", stats.paragraph_count),
        format!("Approximately {} words of written material", stats.word_count),
        "Information suitable for reference and review".to_string(),
    ];
    for feature in generic_features {
        if features.len() >= MIN_FEATURES.max(5) {
            break;
        }
        features.push(feature);
    }
    if stats.has_code {
        features.push("Code examples and technical snippets".to_string());
    }

    let mut technologies: Vec<String> = stats.technical_terms.iter().take(8).cloned().collect();
    if stats.has_markdown {
        technologies.push("Markdown".to_string());
    }
    if technologies.is_empty() {
        technologies.push("Plain text document".to_string());
    }

    let mut use_cases = vec![
        format!("Reference material for readers interested in {}", topic_phrase),
        "Background reading before a deeper review of the subject".to_string(),
    ];
    if stats.has_code {
        use_cases.push("Technical guidance for developers implementing similar solutions".to_string());
    }
    if stats.has_technical_terms {
        use_cases.push("Input for technical evaluation or architecture discussions".to_string());
    }
    debug_assert!(use_cases.len() >= MIN_USE_CASES);

    let density = if stats.sentence_count > 0 {
        stats.word_count as f64 / stats.sentence_count as f64
    } else {
        stats.word_count as f64
    };
    let insights = format!(
        "The document averages about {:.1} words per sentence, which suggests {} writing. \
         {} This analysis was generated from document statistics because a detailed AI \
         analysis was not available, so it reflects structure and vocabulary rather than meaning.",
        density,
        if density > 25.0 { "dense, detailed" } else { "accessible, concise" },
        if stats.has_technical_terms {
            format!(
                "Technical vocabulary such as {} indicates a technical audience.",
                stats.technical_terms.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
            )
        } else {
            "The vocabulary is largely non-technical, indicating a general audience.".to_string()
        }
    );

    AnalysisResult {
        summary,
        features,
        technologies,
        use_cases,
        insights,
    }
}

/// Builds the degraded result used when a repository reply cannot be decoded
pub fn degraded_repository_analysis(raw_reply: &str, metadata: &RepositoryMetadata) -> AnalysisResult {
    let excerpt = truncate_chars(raw_reply.trim(), DEGRADED_SUMMARY_CHARS).trim();
    let summary = if excerpt.is_empty() {
        format!("{}: the AI analysis could not be parsed.", metadata.name)
    } else {
        excerpt.to_string()
    };
    let technologies = if metadata.language == crate::github::UNKNOWN_LANGUAGE {
        Vec::new()
    } else {
        vec![metadata.language.clone()]
    };

    AnalysisResult {
        summary,
        features: vec!["Unable to parse detailed features from the AI response".to_string()],
        technologies,
        use_cases: vec!["Unable to parse use cases from the AI response".to_string()],
        insights: "The AI response could not be parsed into structured data. Try the analysis again.".to_string(),
    }
}

/// Analyzes extracted document text
#[derive(Clone)]
pub struct DocumentAnalyzer {
    gemini: Arc<GeminiClient>,
    char_budget: usize,
}

impl DocumentAnalyzer {
    /// Creates a new document analyzer
    pub fn new(gemini: Arc<GeminiClient>, char_budget: usize) -> Self {
        Self { gemini, char_budget }
    }

    /// Produces a structured analysis, falling back to statistics on model failure
    ///
    /// Only configuration errors (a missing API key) are returned; upstream
    /// and parse failures yield the deterministic fallback.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult> {
        let stats = DocumentStats::compute(text);
        let prompt = build_document_prompt(text, &stats, self.char_budget);

        match self.gemini.generate_text(&prompt).await {
            Ok(reply) => match parse_document_analysis(&reply) {
                Some(analysis) => {
                    info!("Document analysis generated by model");
                    Ok(analysis)
                }
                None => {
                    warn!("Falling back to statistical document analysis");
                    Ok(fallback_document_analysis(&stats))
                }
            },
            Err(e) if e.is_config_error() => Err(e),
            Err(e) => {
                warn!("Document analysis model call failed: {}; using fallback", e);
                Ok(fallback_document_analysis(&stats))
            }
        }
    }
}

/// Analyzes fetched repository metadata
#[derive(Clone)]
pub struct RepositoryAnalyzer {
    gemini: Arc<GeminiClient>,
    readme_budget: usize,
}

impl RepositoryAnalyzer {
    /// Creates a new repository analyzer
    pub fn new(gemini: Arc<GeminiClient>, readme_budget: usize) -> Self {
        Self { gemini, readme_budget }
    }

    /// Produces a structured analysis; model-call failures propagate
    pub async fn analyze(&self, metadata: &RepositoryMetadata) -> Result<AnalysisResult> {
        let prompt = build_repository_prompt(metadata, self.readme_budget);
        let reply = self.gemini.generate_text(&prompt).await?;

        let parsed = parse_analysis(&reply).filter(|a| !a.summary.is_empty() && !a.insights.is_empty());
        Ok(parsed.unwrap_or_else(|| {
            warn!("Repository analysis reply for {} could not be parsed", metadata.name);
            degraded_repository_analysis(&reply, metadata)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::github::Contributor;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    const DOCUMENT: &str = "# Deployment Guide\n\nThis guide explains how the team deploys the \
        billing service to Kubernetes. Each release is built in CI, pushed to the registry and \
        rolled out gradually.\n\nThe rollout watches latency and error rates. If either crosses \
        the threshold, the deployment is paused and the previous version is restored.";

    fn metadata() -> RepositoryMetadata {
        RepositoryMetadata {
            name: "widgets".into(),
            description: "Widget toolkit".into(),
            stars: 10,
            forks: 2,
            language: "Rust".into(),
            created_at: None,
            updated_at: None,
            topics: vec!["gui".into()],
            contributors: vec![Contributor {
                login: "octo".into(),
                contributions: 5,
                avatar_url: String::new(),
            }],
            languages: BTreeMap::new(),
            readme: "# Widgets\n".repeat(500),
        }
    }

    fn valid_reply() -> String {
        let long = "A sufficiently long narrative sentence that keeps going for quite a while. ".repeat(2);
        serde_json::json!({
            "summary": long,
            "features": ["one", "two", "three"],
            "technologies": ["Kubernetes"],
            "useCases": ["first", "second"],
            "insights": long,
        })
        .to_string()
    }

    async fn gemini_replying(server: &mut mockito::ServerGuard, text: &str) -> Arc<GeminiClient> {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        });
        server
            .mock("POST", mockito::Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;
        Arc::new(GeminiClient::new(
            reqwest::Client::new(),
            server.url(),
            Some("key".into()),
            ModelConfig::default(),
        ))
    }

    #[test]
    fn test_extract_json_object() {
        assert_eq!(extract_json_object("noise {\"a\": {\"b\": 1}} tail"), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json_object("```json\n{}\n```"), Some("{}"));
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_parse_document_analysis_accepts_valid_reply() {
        let reply = format!("Here you go:\n```json\n{}\n```", valid_reply());
        let analysis = parse_document_analysis(&reply).unwrap();
        assert_eq!(analysis.features, vec!["one", "two", "three"]);
        assert_eq!(analysis.use_cases, vec!["first", "second"]);
    }

    #[test]
    fn test_parse_document_analysis_rejects_short_summary() {
        let long = "x".repeat(150);
        let reply = serde_json::json!({
            "summary": "Short.",
            "features": ["one", "two", "three"],
            "useCases": ["first", "second"],
            "insights": long,
        })
        .to_string();
        let parsed = parse_analysis(&reply).unwrap();
        assert_eq!(parsed.summary, "Short.");
        assert!(parsed.technologies.is_empty());
        assert!(parse_document_analysis(&reply).is_none());
    }

    #[test]
    fn test_parse_document_analysis_rejects_few_features() {
        let reply = valid_reply().replace(r#"["one","two","three"]"#, r#"["one"]"#);
        assert!(parse_document_analysis(&reply).is_none());
    }

    #[test]
    fn test_fallback_meets_minimums_for_any_stats() {
        for text in ["", "word", DOCUMENT, "```\nfn main() {}\n```"] {
            let stats = DocumentStats::compute(text);
            let analysis = fallback_document_analysis(&stats);
            assert!(analysis.meets_minimums(), "fallback too thin for {:?}", text);
            assert!(!analysis.technologies.is_empty());
        }
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let stats = DocumentStats::compute(DOCUMENT);
        assert_eq!(fallback_document_analysis(&stats), fallback_document_analysis(&stats));
    }

    #[test]
    fn test_document_prompt_truncates() {
        let text = "é".repeat(9000);
        let stats = DocumentStats::compute(&text);
        let prompt = build_document_prompt(&text, &stats, 8000);
        assert!(prompt.contains(&"é".repeat(8000)));
        assert!(!prompt.contains(&"é".repeat(8001)));
        assert!(prompt.contains("truncated to the first 8000 of 9000 characters"));
        assert!(prompt.contains("Word count: 1"));
    }

    #[test]
    fn test_repository_prompt_truncates_readme() {
        let meta = metadata();
        let prompt = build_repository_prompt(&meta, 2000);
        assert!(prompt.contains("Repository: widgets"));
        assert!(prompt.contains("Primary language: Rust"));
        assert!(prompt.contains("Topics: gui"));
        assert_eq!(prompt.matches("# Widgets").count(), 200);
    }

    #[test]
    fn test_repository_prompt_keeps_braces_in_description() {
        let mut meta = metadata();
        meta.description = "Renders {readme} and {name} literally".into();
        meta.readme = "Real readme body".into();
        let prompt = build_repository_prompt(&meta, 2000);
        assert!(prompt.contains("Renders {readme} and {name} literally"));
        assert_eq!(prompt.matches("Real readme body").count(), 1);
    }

    #[test]
    fn test_degraded_repository_analysis() {
        let meta = metadata();
        let raw = "x".repeat(500);
        let analysis = degraded_repository_analysis(&raw, &meta);
        assert_eq!(analysis.summary.len(), 200);
        assert_eq!(analysis.technologies, vec!["Rust"]);
        assert!(!analysis.insights.is_empty());

        let empty = degraded_repository_analysis("   ", &meta);
        assert!(empty.summary.contains("widgets"));
    }

    #[tokio::test]
    async fn test_document_analyzer_uses_fallback_for_short_summary() {
        let mut server = mockito::Server::new_async().await;
        let reply = r#"{"summary":"Too short","features":["a","b","c"],"technologies":[],"useCases":["x","y"],"insights":"Also too short"}"#;
        let gemini = gemini_replying(&mut server, reply).await;

        let analysis = DocumentAnalyzer::new(gemini, 8000).analyze(DOCUMENT).await.unwrap();
        let expected = fallback_document_analysis(&DocumentStats::compute(DOCUMENT));
        assert_eq!(analysis, expected);
        assert!(analysis.meets_minimums());
    }

    #[tokio::test]
    async fn test_document_analyzer_keeps_valid_model_reply() {
        let mut server = mockito::Server::new_async().await;
        let gemini = gemini_replying(&mut server, &valid_reply()).await;

        let analysis = DocumentAnalyzer::new(gemini, 8000).analyze(DOCUMENT).await.unwrap();
        assert_eq!(analysis.technologies, vec!["Kubernetes"]);
    }

    #[tokio::test]
    async fn test_document_analyzer_falls_back_on_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;
        let gemini = Arc::new(GeminiClient::new(
            reqwest::Client::new(),
            server.url(),
            Some("key".into()),
            ModelConfig::default(),
        ));

        let analysis = DocumentAnalyzer::new(gemini, 8000).analyze(DOCUMENT).await.unwrap();
        assert!(analysis.meets_minimums());
    }

    #[tokio::test]
    async fn test_document_analyzer_missing_key_is_fatal() {
        let gemini = Arc::new(GeminiClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            None,
            ModelConfig::default(),
        ));
        let err = DocumentAnalyzer::new(gemini, 8000).analyze(DOCUMENT).await.unwrap_err();
        assert!(err.is_config_error());
    }

    #[tokio::test]
    async fn test_repository_analyzer_degrades_on_empty_object() {
        let mut server = mockito::Server::new_async().await;
        let gemini = gemini_replying(&mut server, r#"Sure: {"note": "x"}"#).await;

        let analysis = RepositoryAnalyzer::new(gemini, 2000).analyze(&metadata()).await.unwrap();
        assert_eq!(analysis.summary, r#"Sure: {"note": "x"}"#);
        assert!(!analysis.insights.is_empty());
        assert!(!analysis.features.is_empty());

        let mut server = mockito::Server::new_async().await;
        let gemini = gemini_replying(&mut server, "{}").await;
        let analysis = RepositoryAnalyzer::new(gemini, 2000).analyze(&metadata()).await.unwrap();
        assert_eq!(analysis.summary, "{}");
        assert!(!analysis.insights.is_empty());
    }

    #[tokio::test]
    async fn test_repository_analyzer_degrades_on_bad_json() {
        let mut server = mockito::Server::new_async().await;
        let gemini = gemini_replying(&mut server, "I cannot produce JSON today, sorry.").await;

        let analysis = RepositoryAnalyzer::new(gemini, 2000).analyze(&metadata()).await.unwrap();
        assert_eq!(analysis.summary, "I cannot produce JSON today, sorry.");
        assert_eq!(analysis.technologies, vec!["Rust"]);
    }
}
