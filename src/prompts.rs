//! Prompt templates sent to the generative-language model.

/// Instruction sent alongside an inline PDF to the vision model.
pub const PDF_TRANSCRIPTION: &str = r#"Transcribe all readable text from every page of this PDF document.
Preserve the reading order, headings and paragraph breaks. Render tables as
plain-text tables with one row per line and columns separated by " | ".
Do not summarize, translate or add commentary; output only the transcribed text."#;

/// JSON shape requested from the model for every analysis.
pub const ANALYSIS_JSON_SHAPE: &str = r#"{
  "summary": "A detailed overview of at least three sentences",
  "features": ["Key feature or topic 1", "Key feature or topic 2", "Key feature or topic 3"],
  "technologies": ["Technology, tool or concept 1", "Technology, tool or concept 2"],
  "useCases": ["Practical use case 1", "Practical use case 2"],
  "insights": "Several sentences of deeper observations, strengths and recommendations"
}"#;

/// Template for document analysis. `{document}` and `{stats}` are substituted.
pub const DOCUMENT_ANALYSIS: &str = r#"You are an expert analyst. Read the document below and produce a structured analysis.

Document content:
"""
{document}
"""

Document statistics:
{stats}

Respond with ONLY a JSON object of exactly this shape, with no markdown fences and no text before or after it:
{shape}

Requirements:
- The summary and the insights must each be more than 100 characters.
- List at least 3 features and at least 2 use cases.
- Base every statement on the document content."#;

/// Template for repository analysis. Placeholders are substituted by name.
pub const REPOSITORY_ANALYSIS: &str = r#"You are an expert software engineer. Analyze this GitHub repository.

Repository: {name}
Description: {description}
Primary language: {language}
Topics: {topics}

README excerpt:
"""
{readme}
"""

Respond with ONLY a JSON object of exactly this shape, with no markdown fences and no text before or after it:
{shape}"#;

/// Fills `{key}` placeholders in `template` with the given values
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let known = after.find('}').and_then(|end| {
            let key = &after[..end];
            values.iter().find(|(k, _)| *k == key).map(|(_, v)| (*v, end))
        });
        match known {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
