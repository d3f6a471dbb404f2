//! Calendar enrichment
//!
//! Theme tokens from the description are matched (case-insensitive substring)
//! against observance names, topic by topic. Matches are capped at 5 per
//! topic and 10 overall. The description gains at most one observance, and
//! only when it fits the length budget; keywords gain the observance words.

use crate::datasets::{CalendarDataset, CalendarTopic};
use crate::generators::keywords::append_unique;
use crate::generators::vocabulary::CALENDAR_QUALIFIERS;
use std::collections::HashSet;

/// Matches kept per topic
pub const MAX_MATCHES_PER_TOPIC: usize = 5;

/// Matches kept across all topics
pub const MAX_MATCHES_TOTAL: usize = 10;

/// Tokens shorter than this would match nearly every entry
const MIN_THEME_LEN: usize = 3;

/// Comma-separated description segments, lowercased and trimmed
pub fn extract_themes(description: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    description
        .split(',')
        .map(|segment| segment.trim().to_lowercase())
        .filter(|segment| segment.chars().count() >= MIN_THEME_LEN)
        .filter(|segment| seen.insert(segment.clone()))
        .collect()
}

/// Observances whose name contains any theme, in topic then theme order
pub fn find_related_entries(calendar: &CalendarDataset, themes: &[String]) -> Vec<String> {
    let mut related: Vec<String> = Vec::new();

    for topic in CalendarTopic::ALL {
        let entries = calendar.entries(topic);
        let mut topic_hits: Vec<&String> = Vec::new();

        for theme in themes {
            for entry in entries {
                if entry.to_lowercase().contains(theme.as_str()) && !topic_hits.contains(&entry) {
                    topic_hits.push(entry);
                }
            }
        }
        topic_hits.truncate(MAX_MATCHES_PER_TOPIC);

        for hit in topic_hits {
            if !related.contains(hit) {
                related.push(hit.clone());
            }
        }
    }

    related.truncate(MAX_MATCHES_TOTAL);
    related
}

/// Append the first observance that fits within `max_len` characters
///
/// Returns the description unchanged when none fits.
pub fn enrich_description(description: &str, entries: &[String], max_len: usize) -> String {
    let current_len = description.chars().count();
    entries
        .iter()
        .find(|entry| current_len + 2 + entry.chars().count() <= max_len)
        .map(|entry| format!("{}, {}", description, entry))
        .unwrap_or_else(|| description.to_string())
}

/// Words of an observance name minus calendar qualifiers
pub fn entry_words(entry: &str) -> Vec<String> {
    entry
        .replace('\'', "")
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| !CALENDAR_QUALIFIERS.contains(&word.as_str()))
        .collect()
}

/// Append observance words not already present, then re-cap
pub fn enrich_keywords(keywords: &[String], entries: &[String], max_keywords: usize) -> Vec<String> {
    let mut enriched = keywords.to_vec();
    append_unique(&mut enriched, entries.iter().flat_map(|entry| entry_words(entry)));
    enriched.truncate(max_keywords);
    enriched
}
