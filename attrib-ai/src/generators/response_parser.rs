//! Parsing of free-form backend text
//!
//! Parsers return a result or a [`ParseFailure`]; callers log the failure at
//! debug level and fall back. Nothing here panics on odd model output.

use thiserror::Error;

/// Entries longer than this are prose, not keywords
const MAX_ENTRY_LEN: usize = 50;

/// Why a response yielded nothing usable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// Backend returned nothing (or only whitespace)
    #[error("empty response")]
    Empty,

    /// Labelled section not present
    #[error("no '{0}' section in response")]
    MissingSection(String),

    /// Text present but no entry survived cleaning
    #[error("no usable entries in response")]
    NoEntries,
}

const QUOTES: &[char] = &['"', '\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

fn strip_quotes(text: &str) -> &str {
    text.trim().trim_matches(QUOTES).trim()
}

/// First non-empty line, with surrounding quotes and whitespace removed
pub fn first_line(raw: &str) -> Result<String, ParseFailure> {
    raw.lines()
        .map(strip_quotes)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or(ParseFailure::Empty)
}

/// Text following `label:` on a labelled line (case-insensitive)
///
/// Markdown emphasis around the label (`**Title:**`) is tolerated. When the
/// labelled line carries no text, the next non-empty line is used.
pub fn section(raw: &str, label: &str) -> Result<String, ParseFailure> {
    if raw.trim().is_empty() {
        return Err(ParseFailure::Empty);
    }

    let prefix = format!("{}:", label.to_lowercase());
    let mut lines = raw.lines();
    while let Some(line) = lines.next() {
        let bare = line.trim().trim_start_matches(['*', '#', '-', ' ']);
        if bare.len() < prefix.len()
            || !bare.is_char_boundary(prefix.len())
            || !bare[..prefix.len()].eq_ignore_ascii_case(&prefix)
        {
            continue;
        }

        let rest = strip_quotes(bare[prefix.len()..].trim_start_matches('*'));
        if !rest.is_empty() {
            return Ok(rest.to_string());
        }
        return lines
            .map(strip_quotes)
            .find(|l| !l.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ParseFailure::MissingSection(label.to_string()));
    }

    Err(ParseFailure::MissingSection(label.to_string()))
}

/// Split a comma/newline separated keyword list and normalize each entry
///
/// Entries are lowercased; list numbering, bullets and markup (`# * | .`) are
/// removed, as is every character other than letters, digits, space, hyphen
/// and apostrophe. Entries over 50 characters are dropped.
pub fn comma_list(raw: &str) -> Result<Vec<String>, ParseFailure> {
    if raw.trim().is_empty() {
        return Err(ParseFailure::Empty);
    }

    let entries: Vec<String> = raw
        .split([',', '\n', '\r', ';'])
        .filter_map(clean_entry)
        .collect();

    if entries.is_empty() {
        Err(ParseFailure::NoEntries)
    } else {
        Ok(entries)
    }
}

fn clean_entry(raw: &str) -> Option<String> {
    let mut entry = raw.trim();

    // "12. word" / "3) word"
    let digits = entry.len() - entry.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 && entry[digits..].starts_with(['.', ')']) {
        entry = &entry[digits + 1..];
    }
    entry = entry.trim_start_matches(['-', '*', '\u{2022}', ' ']);

    let filtered: String = entry
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '|' | '.'))
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '\''))
        .collect();

    let normalized = filtered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(['-', '\''])
        .to_string();

    if normalized.is_empty() || normalized.chars().count() > MAX_ENTRY_LEN {
        None
    } else {
        Some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_strips_quotes() {
        assert_eq!(
            first_line("\n  \"Cozy dog resting on a sofa\"  \nSecond line").unwrap(),
            "Cozy dog resting on a sofa"
        );
        assert_eq!(first_line("   \n "), Err(ParseFailure::Empty));
    }

    #[test]
    fn test_section_finds_label() {
        let raw = "Sure! Here it is.\n**Title:** \"Festive puppy by the tree\"\n";
        assert_eq!(section(raw, "Title").unwrap(), "Festive puppy by the tree");
    }

    #[test]
    fn test_section_value_on_next_line() {
        let raw = "title:\n\n  Sleepy kitten in the sun\n";
        assert_eq!(section(raw, "title").unwrap(), "Sleepy kitten in the sun");
    }

    #[test]
    fn test_section_missing() {
        assert_eq!(
            section("Just a sentence", "title"),
            Err(ParseFailure::MissingSection("title".to_string()))
        );
    }

    #[test]
    fn test_comma_list_cleans_markup_and_numbering() {
        let raw = "1. **Dog**, Puppy!\n- pet care | vet\n2) Santa's hat, ###, golden-retriever.";
        let entries = comma_list(raw).unwrap();
        assert_eq!(
            entries,
            vec!["dog", "puppy", "pet care vet", "santa's hat", "golden-retriever"]
        );
    }

    #[test]
    fn test_comma_list_drops_long_entries() {
        let long = "a".repeat(51);
        let raw = format!("dog, {}, cat", long);
        assert_eq!(comma_list(&raw).unwrap(), vec!["dog", "cat"]);
    }

    #[test]
    fn test_comma_list_failures() {
        assert_eq!(comma_list(""), Err(ParseFailure::Empty));
        assert_eq!(comma_list(" , ### , ..."), Err(ParseFailure::NoEntries));
    }
}
