//! Heuristic checks deciding whether extracted text is readable prose.
//!
//! PDF extractors happily return binary noise, hex dumps or a handful of
//! stray glyphs. [`is_meaningful_content`] rejects those so the extraction
//! chain can move on to the next strategy.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Minimum trimmed length for text to be considered at all.
pub const MIN_CONTENT_CHARS: usize = 100;
/// Share of characters that must be letters, digits, whitespace or punctuation.
pub const MIN_READABLE_RATIO: f64 = 0.70;
/// Share of whitespace-separated words that must look like real words.
pub const MIN_MEANINGFUL_WORD_RATIO: f64 = 0.30;

const COMMON_PUNCTUATION: &str = ".,;:!?'\"()[]{}-_/\\@#$%&*+=<>|~`";

/// Function words whose presence signals English prose.
pub const COMMON_WORDS: &[&str] = &[
    "the", "and", "or", "in", "to", "for", "of", "with", "on", "at", "by", "from", "is", "are",
    "was", "were", "be", "been", "this", "that", "these", "those", "it", "its", "as", "an", "a",
    "but", "not", "can", "will", "has", "have", "had", "which",
];

pub(crate) static HEX_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{8,}$").expect("valid hex pattern"));
pub(crate) static ALNUM_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]{8,}$").expect("valid alnum pattern"));

/// Outcome of [`validate_content`], naming the first check that failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentVerdict {
    /// Every check passed
    Accepted,
    /// Trimmed text shorter than [`MIN_CONTENT_CHARS`]
    TooShort(usize),
    /// Readable character ratio below [`MIN_READABLE_RATIO`]
    LowReadableRatio(f64),
    /// Meaningful word ratio below [`MIN_MEANINGFUL_WORD_RATIO`]
    LowMeaningfulWordRatio(f64),
    /// None of [`COMMON_WORDS`] occurs in the text
    NoCommonWords,
}

impl ContentVerdict {
    /// True only for [`ContentVerdict::Accepted`]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Human readable reason, used in extraction failure logs
    pub fn reason(&self) -> String {
        match self {
            Self::Accepted => "accepted".to_string(),
            Self::TooShort(len) => format!("only {} characters of text", len),
            Self::LowReadableRatio(r) => format!("readable character ratio {:.2}", r),
            Self::LowMeaningfulWordRatio(r) => format!("meaningful word ratio {:.2}", r),
            Self::NoCommonWords => "no common English words".to_string(),
        }
    }
}

/// Returns true when `text` looks like usable natural-language content.
pub fn is_meaningful_content(text: &str) -> bool {
    validate_content(text).is_accepted()
}

/// Runs the four content checks in order and reports the first failure.
pub fn validate_content(text: &str) -> ContentVerdict {
    let trimmed = text.trim();
    let trimmed_len = trimmed.chars().count();
    if trimmed_len < MIN_CONTENT_CHARS {
        debug!(length = trimmed_len, "content rejected: too short");
        return ContentVerdict::TooShort(trimmed_len);
    }

    let total = text.chars().count();
    let readable = text.chars().filter(|c| is_readable_char(*c)).count();
    let readable_ratio = readable as f64 / total as f64;
    if readable_ratio < MIN_READABLE_RATIO {
        debug!(ratio = readable_ratio, "content rejected: unreadable characters");
        return ContentVerdict::LowReadableRatio(readable_ratio);
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let meaningful = words.iter().filter(|w| is_meaningful_word(w)).count();
    let word_ratio = meaningful as f64 / words.len() as f64;
    if word_ratio < MIN_MEANINGFUL_WORD_RATIO {
        debug!(ratio = word_ratio, "content rejected: few meaningful words");
        return ContentVerdict::LowMeaningfulWordRatio(word_ratio);
    }

    // Substring containment, not word match: "a" inside "cat" counts.
    let lower = text.to_lowercase();
    if !COMMON_WORDS.iter().any(|w| lower.contains(w)) {
        debug!("content rejected: no common English words");
        return ContentVerdict::NoCommonWords;
    }

    debug!(
        length = trimmed_len,
        readable_ratio, word_ratio, "content accepted"
    );
    ContentVerdict::Accepted
}

fn is_readable_char(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || COMMON_PUNCTUATION.contains(c)
}

/// A word of 3..=20 characters that is not a hash-like token, has a vowel
/// and is not a bare number.
pub fn is_meaningful_word(word: &str) -> bool {
    let len = word.chars().count();
    (3..=20).contains(&len)
        && !HEX_TOKEN.is_match(word)
        && !ALNUM_TOKEN.is_match(word)
        && has_vowel(word)
        && !is_numeric(word)
}

pub(crate) fn has_vowel(word: &str) -> bool {
    word.chars()
        .any(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
}

pub(crate) fn is_numeric(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const PROSE: &str = "The quarterly report describes how the team improved the \
        onboarding flow and reduced support tickets. It also outlines the plan for the \
        next release, which focuses on reliability and performance for our customers.";

    #[test_case("" ; "empty")]
    #[test_case("   \n\t  " ; "whitespace only")]
    #[test_case("The cat sat on the mat and the dog barked." ; "short sentence")]
    #[test_case(&format!("  {}  ", "the and ".repeat(12).trim()) ; "ninety-five chars padded")]
    fn test_short_text_rejected(text: &str) {
        assert!(!is_meaningful_content(text));
        assert!(matches!(validate_content(text), ContentVerdict::TooShort(_)));
    }

    #[test]
    fn test_repeated_hex_token_rejected() {
        let text = "a1b2c3d4a1b2c3d4 ".repeat(10);
        assert!(text.trim().len() >= 100);
        assert!(!is_meaningful_content(&text));
    }

    #[test]
    fn test_english_paragraph_accepted() {
        assert!(PROSE.len() >= 150);
        assert_eq!(validate_content(PROSE), ContentVerdict::Accepted);
        assert!(is_meaningful_content(PROSE));
    }

    #[test]
    fn test_binary_noise_rejected() {
        let noise: String = (0..400)
            .map(|i| char::from_u32(0x2500 + (i % 120)).unwrap())
            .collect();
        assert!(matches!(
            validate_content(&noise),
            ContentVerdict::LowReadableRatio(_)
        ));
    }

    #[test]
    fn test_numbers_only_rejected() {
        let text = "1234 5678 9012 3456 ".repeat(8);
        assert!(matches!(
            validate_content(&text),
            ContentVerdict::LowMeaningfulWordRatio(_)
        ));
    }

    #[test]
    fn test_without_common_words_rejected() {
        // Meaningful words with no function-word substrings anywhere.
        let text = "Lumpy humdrum vulgus jumps ".repeat(6);
        assert_eq!(validate_content(&text), ContentVerdict::NoCommonWords);
    }

    #[test]
    fn test_common_word_matched_as_substring() {
        let text = "Cats nap daily. Lions roam widely. ".repeat(4);
        let has_whole_common_word = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .any(|w| COMMON_WORDS.contains(&w.as_str()));
        assert!(!has_whole_common_word);
        assert_eq!(validate_content(&text), ContentVerdict::Accepted);
    }

    #[test_case("document", false ; "lowercase eight letters match identifier pattern")]
    #[test_case("Document", true ; "capitalised word")]
    #[test_case("deadbeef", false ; "hex token")]
    #[test_case("12345", false ; "numeric")]
    #[test_case("rhythm", false ; "no vowel")]
    #[test_case("an", false ; "too short")]
    #[test_case("report", true ; "plain word")]
    fn test_meaningful_word(word: &str, expected: bool) {
        assert_eq!(is_meaningful_word(word), expected);
    }
}
