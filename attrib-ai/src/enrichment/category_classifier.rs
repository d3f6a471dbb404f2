//! Deterministic category lookup
//!
//! Pure function of (keywords, taxonomy): categories are tried in declared
//! order and a trigger term must be an exact keyword, not a substring.

use crate::datasets::Taxonomy;
use crate::models::UNCATEGORIZED;
use std::collections::HashSet;

/// First matching category name, or [`UNCATEGORIZED`]
pub fn detect_category(keywords: &[String], taxonomy: &Taxonomy) -> String {
    classify(keywords, taxonomy).0
}

/// Primary category plus the next distinct matching category, if any
pub fn classify(keywords: &[String], taxonomy: &Taxonomy) -> (String, Option<String>) {
    let folded: HashSet<String> = keywords.iter().map(|k| k.trim().to_lowercase()).collect();

    let mut hits = taxonomy
        .entries()
        .iter()
        .filter(|entry| entry.terms.iter().any(|term| folded.contains(term)))
        .map(|entry| entry.name.clone());

    match hits.next() {
        Some(primary) => {
            let secondary = hits.find(|name| *name != primary);
            (primary, secondary)
        }
        None => (UNCATEGORIZED.to_string(), None),
    }
}
