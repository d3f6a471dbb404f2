//! Title generation: a short paraphrase of the caption

use super::prompts::render;
use super::response_parser::{first_line, section, ParseFailure};
use super::GeneratorContext;
use tracing::debug;

/// Generate a 7-12 word title; falls back to the caption itself
pub async fn generate_title(ctx: &GeneratorContext, caption: &str) -> String {
    let caption = caption.trim();
    if caption.is_empty() {
        return String::new();
    }

    let prompt = render(&ctx.prompts.title, &[("caption", caption)]);
    let raw = ctx.gateway.generate(prompt).await;

    match parse_title(&raw) {
        Ok(title) => title,
        Err(e) => {
            debug!("Title unusable ({}), falling back to caption", e);
            caption.to_string()
        }
    }
}

/// Labelled `Title:` line if present, else the first line
pub fn parse_title(raw: &str) -> Result<String, ParseFailure> {
    section(raw, "title").or_else(|_| first_line(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title_prefers_label() {
        let raw = "Here you go:\nTitle: \"Playful puppy wearing a festive red hat\"";
        assert_eq!(
            parse_title(raw).unwrap(),
            "Playful puppy wearing a festive red hat"
        );
    }

    #[test]
    fn test_parse_title_first_line() {
        assert_eq!(
            parse_title("'Golden retriever naps on a cozy couch'\nmore text").unwrap(),
            "Golden retriever naps on a cozy couch"
        );
        assert_eq!(parse_title(""), Err(ParseFailure::Empty));
    }
}
