//! Prompt templates
//!
//! Wording is configuration, not code: every template can be overridden from
//! a TOML file (`prompts_file` in the main config). Placeholders are written
//! as `{name}` and substituted by [`render`].

use attrib_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Backend prompt wording for every generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplates {
    /// Placeholders: `{caption}`
    pub title: String,
    /// Placeholders: `{caption}`, `{max_len}`
    pub description: String,
    /// Placeholders: `{terms}`, `{caption}`, `{context}`
    pub keyword_synonyms: String,
    /// Placeholders: `{terms}`, `{caption}`, `{context}`
    pub keyword_themes: String,
    /// Placeholders: `{terms}`, `{caption}`, `{context}`
    pub keyword_context: String,
    /// Placeholders: `{count}`, `{caption}`
    pub keyword_gap_fill: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            title: concat!(
                "Rewrite this caption as a stock photo title of 7 to 12 words. ",
                "Paraphrase it, do not copy it word for word. ",
                "Output only the title on one line, no quotes, no explanations.\n",
                "Caption: {caption}"
            )
            .to_string(),
            description: concat!(
                "You are generating an English description for photo/video metadata. ",
                "Start exactly with this caption, unchanged: {caption}. ",
                "After it, continue in a short list style: 3-5 key themes separated by commas. ",
                "Focus on subject, setting, and commercial use (e.g. pet care, veterinarian, medical). ",
                "Optionally add 1-2 real international or thematic observances ",
                "(e.g. World Dog Day, International Friendship Day), only if they clearly match the caption. ",
                "Do not use generic words like 'holiday' or 'festival'. ",
                "Do not add filler text, do not write full sentences, no introductions, no quotes. ",
                "Forbidden: 'concept for', 'ideal for', 'perfect for', 'showcasing'. ",
                "Output must be only the description on a single line, no comments, no explanations. ",
                "Remove articles 'a', 'the'. ",
                "Max {max_len} characters."
            )
            .to_string(),
            keyword_synonyms: concat!(
                "List synonyms and close variants (1-3 words each) for these stock photo keywords: {terms}.\n",
                "Scene: {caption}{context}\n",
                "Output only lowercase, comma-separated keywords in one line. ",
                "No lists, numbering, markdown, or explanations."
            )
            .to_string(),
            keyword_themes: concat!(
                "List broader thematic categories, moods and concepts for a stock photo showing: {caption}{context}\n",
                "Main subjects: {terms}.\n",
                "Avoid generic terms like photo, image, stock or concept. ",
                "Output only lowercase, comma-separated keywords in one line. ",
                "No lists, numbering, markdown, or explanations."
            )
            .to_string(),
            keyword_context: concat!(
                "List industries, commercial contexts and real observances where this stock photo would be used: ",
                "{caption}{context}\n",
                "Main subjects: {terms}.\n",
                "Do not invent unrelated holidays. ",
                "Output only lowercase, comma-separated keywords in one line. ",
                "No lists, numbering, markdown, or explanations."
            )
            .to_string(),
            keyword_gap_fill: concat!(
                "Generate {count} additional unique related keywords for this topic: {caption}. ",
                "Lowercase, comma-separated, 1-2 words each."
            )
            .to_string(),
        }
    }
}

impl PromptTemplates {
    /// Load templates from TOML; missing keys keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Templates from an optional file, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Substitute `{name}` placeholders
///
/// One left-to-right pass over the template: substituted values are never
/// scanned again, so a caption containing `{terms}` stays literal.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
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
