//! Description generation
//!
//! The returned string is a single ASCII line of at most
//! `pipeline.max_description_len` characters. Calendar enrichment relies on
//! this bound and never pushes past it.

use super::prompts::render;
use super::response_parser::ParseFailure;
use super::GeneratorContext;
use tracing::debug;

/// Generate a capped description; falls back to the (capped) caption
pub async fn generate_description(ctx: &GeneratorContext, caption: &str) -> String {
    let max_len = ctx.pipeline.max_description_len;
    let caption = caption.trim();
    if caption.is_empty() {
        return String::new();
    }

    let max_len_text = max_len.to_string();
    let prompt = render(
        &ctx.prompts.description,
        &[("caption", caption), ("max_len", &max_len_text)],
    );
    let raw = ctx.gateway.generate(prompt).await;

    match clean_description(&raw, max_len) {
        Ok(description) => description,
        Err(e) => {
            debug!("Description unusable ({}), falling back to caption", e);
            fallback_description(caption, max_len)
        }
    }
}

/// The caption flattened to one line and capped
pub fn fallback_description(caption: &str, max_len: usize) -> String {
    let single_line = caption.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_at_word(&single_line, max_len)
}

/// Normalize raw backend text into a description
///
/// Quotes and line breaks are removed, non-ASCII characters discarded,
/// leading articles dropped from each comma-separated segment, and the
/// result capped at a word boundary.
pub fn clean_description(raw: &str, max_len: usize) -> Result<String, ParseFailure> {
    if raw.trim().is_empty() {
        return Err(ParseFailure::Empty);
    }

    let ascii: String = raw
        .chars()
        .filter(|c| c.is_ascii() && !matches!(c, '"' | '`'))
        .map(|c| if c.is_ascii_whitespace() { ' ' } else { c })
        .collect();

    let joined = ascii
        .split(',')
        .map(|segment| strip_leading_articles(segment.trim()))
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join(", ");

    let description = joined.trim_matches(['\'', ' ']).to_string();
    if description.is_empty() {
        return Err(ParseFailure::NoEntries);
    }
    Ok(truncate_at_word(&description, max_len))
}

fn strip_leading_articles(mut segment: &str) -> &str {
    loop {
        let lower = segment.to_ascii_lowercase();
        let skip = if lower.starts_with("a ") {
            2
        } else if lower.starts_with("the ") {
            4
        } else {
            return segment;
        };
        segment = segment[skip..].trim_start();
    }
}

/// Cap `text` at `max_len` characters without splitting a word
pub fn truncate_at_word(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_len).collect();
    let at_boundary = text
        .chars()
        .nth(max_len)
        .is_some_and(|c| c.is_whitespace() || c == ',');

    let kept = if at_boundary {
        cut.as_str()
    } else {
        match cut.rfind([' ', ',']) {
            Some(pos) if pos > 0 => &cut[..pos],
            // One giant word: hard cut is the only option
            _ => cut.as_str(),
        }
    };

    kept.trim_end_matches([',', ' ', ';', '-']).to_string()
}
