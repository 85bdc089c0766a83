//! Default model and prompts for PDF-to-Markdown conversion.
//!
//! Centralising every prompt here keeps [`crate::config::Settings::default`]
//! short and lets tests inspect the defaults without a network round trip.
//! Users override all three values through the persisted settings.

/// Model used when the settings do not name one.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default system prompt, sent as the first text part of the request.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an expert document converter. Your task is to convert the attached PDF document to clean, well-structured Markdown.

Follow these rules precisely:

1. TEXT PRESERVATION
   - Preserve ALL text content completely and accurately
   - Maintain the reading order as a human would read the page

2. STRUCTURE
   - Use # for the document title, ## for major sections, ### for subsections
   - Use - for unordered lists and 1. 2. 3. for ordered lists
   - Use **bold** and *italic* to match the visual emphasis

3. TABLES
   - Convert tables to GFM pipe format

4. FORMULAS
   - Render mathematical expressions using LaTeX: $inline$ and $$display$$

5. WHAT TO IGNORE
   - Page numbers, repeated headers and footers

6. OUTPUT FORMAT
   - Output ONLY the Markdown content
   - Do NOT wrap in ```markdown fences
   - Do NOT add commentary or explanations"#;

/// Default user prompt, sent as the second text part of the request.
pub const DEFAULT_USER_PROMPT: &str =
    "Convert the attached PDF file to Markdown. Return only the Markdown.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_not_empty() {
        assert!(!DEFAULT_MODEL.is_empty());
        assert!(DEFAULT_SYSTEM_PROMPT.contains("Markdown"));
        assert!(DEFAULT_USER_PROMPT.contains("PDF"));
    }
}
