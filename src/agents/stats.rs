//! Cheap statistics and content signals computed from document text.

use crate::validation::{has_vowel, is_numeric, ALNUM_TOKEN, HEX_TOKEN};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Number of topics extracted from a document
pub const MAX_TOPICS: usize = 8;

const TECHNICAL_TERMS: &[&str] = &[
    "algorithm", "api", "architecture", "authentication", "authorization", "backend",
    "bandwidth", "binary", "blockchain", "browser", "cache", "cloud", "cluster", "compiler",
    "container", "cpu", "css", "database", "dataset", "debugging", "deep learning",
    "deployment", "devops", "docker", "encryption", "endpoint", "framework", "frontend",
    "function", "git", "github", "gpu", "graphql", "html", "http", "https", "infrastructure",
    "integration", "interface", "java", "javascript", "json", "kubernetes", "latency",
    "library", "linux", "machine learning", "microservice", "middleware", "mongodb",
    "neural network", "node.js", "nosql", "oauth", "protocol", "python", "react", "redis",
    "repository", "rest", "runtime", "rust", "scalability", "schema", "sdk", "server",
    "serverless", "software", "sql", "tcp", "throughput", "typescript", "variable", "version control",
    "virtual machine", "webhook", "websocket", "xml", "yaml",
];

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "also", "because", "been", "before",
    "being", "below", "between", "both", "could", "does", "doing", "down", "during", "each",
    "even", "every", "from", "further", "have", "having", "here", "however", "into", "just",
    "like", "made", "make", "many", "more", "most", "much", "must", "only", "other", "over",
    "same", "should", "some", "such", "than", "that", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "under", "until", "upon", "very", "were",
    "what", "when", "where", "which", "while", "will", "with", "within", "without", "would",
    "your", "yours",
];

static TECHNICAL_TERMS_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = TECHNICAL_TERMS
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).expect("valid technical terms pattern")
});

static CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)(```|\bfunction\s+\w+\s*\(|\bclass\s+\w+|\bdef\s+\w+\s*\(|^\s*import\s+\S|\b(?:const|let|var)\s+\w+\s*=|=>|#include\s*<|\bpublic\s+static\b|\bfn\s+\w+\s*\()",
    )
    .expect("valid code pattern")
});

static MARKDOWN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)(^#{1,6}\s+\S|\*\*[^*\n]+\*\*|^\s*[-*+]\s+\S|^\s*\d+\.\s+\S|\[[^\]\n]+\]\([^)\n]+\)|```|^>\s)")
        .expect("valid markdown pattern")
});

static PARAGRAPH_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph pattern"));

/// Statistics and signals describing a document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    /// Whitespace-separated words
    pub word_count: usize,
    /// Sentences longer than 10 characters
    pub sentence_count: usize,
    /// Blank-line separated paragraphs
    pub paragraph_count: usize,
    /// Characters in the full document
    pub char_count: usize,
    /// Code-like tokens appear
    pub has_code: bool,
    /// Markdown markers appear
    pub has_markdown: bool,
    /// At least one technical term appears
    pub has_technical_terms: bool,
    /// Distinct technical terms found, lowercased, in order of first appearance
    pub technical_terms: Vec<String>,
    /// Most frequent meaningful words
    pub topics: Vec<String>,
}

impl DocumentStats {
    /// Computes statistics for `text`
    pub fn compute(text: &str) -> Self {
        let technical_terms = find_technical_terms(text);
        Self {
            word_count: text.split_whitespace().count(),
            sentence_count: count_sentences(text),
            paragraph_count: count_paragraphs(text),
            char_count: text.chars().count(),
            has_code: CODE_RE.is_match(text),
            has_markdown: MARKDOWN_RE.is_match(text),
            has_technical_terms: !technical_terms.is_empty(),
            technical_terms,
            topics: extract_topics(text, MAX_TOPICS),
        }
    }
}

fn count_sentences(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| s.trim().chars().count() > 10)
        .count()
}

fn count_paragraphs(text: &str) -> usize {
    PARAGRAPH_BREAK_RE
        .split(text)
        .filter(|p| !p.trim().is_empty())
        .count()
}

fn find_technical_terms(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in TECHNICAL_TERMS_RE.find_iter(text) {
        let term = m.as_str().to_lowercase();
        if !found.contains(&term) {
            found.push(term);
        }
    }
    found
}

fn is_topic_word(word: &str) -> bool {
    let len = word.chars().count();
    (4..=20).contains(&len)
        && !is_numeric(word)
        && !HEX_TOKEN.is_match(word)
        && !ALNUM_TOKEN.is_match(word)
        && has_vowel(word)
        && !STOP_WORDS.contains(&word)
}

/// Returns the `limit` most frequent topic words, ties in first-seen order
pub fn extract_topics(text: &str, limit: usize) -> Vec<String> {
    let lower = text.to_lowercase();
    let cleaned: String = lower
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for word in cleaned.split_whitespace().filter(|w| is_topic_word(w)) {
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }

    // Stable sort keeps first-occurrence order among equal counts.
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.into_iter().take(limit).map(str::to_string).collect()
}
