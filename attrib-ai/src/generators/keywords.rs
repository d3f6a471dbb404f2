//! Keyword synthesis
//!
//! Candidates are merged from four sources in fixed priority order:
//!
//! 1. Caption base terms, each followed by its priority synonyms
//! 2. Backend-suggested synonyms and variants
//! 3. Backend-suggested broader themes
//! 4. Backend-suggested commercial contexts and observances
//!
//! The merged list is filtered (banned terms, short terms), pruned of exact
//! and near duplicates, topped up with one gap-fill request when short, and
//! capped. Filler terms pad the list only as a last resort.
//!
//! Output invariants: at most `max_keywords` entries, all lowercase, unique
//! case-insensitively, none banned.

use super::prompts::render;
use super::response_parser::comma_list;
use super::vocabulary::{is_acceptable_keyword, is_stopword};
use super::GeneratorContext;
use crate::datasets::SynonymTable;
use attrib_common::config::PipelineConfig;
use std::collections::HashSet;
use tracing::debug;

/// Generate the keyword list for one caption
///
/// `description`, when supplied, is added to the backend prompts as context.
/// No backend failure aborts synthesis; the worst case is a short list padded
/// with filler terms.
pub async fn generate_keywords(
    ctx: &GeneratorContext,
    caption: &str,
    description: Option<&str>,
) -> Vec<String> {
    let limits = &ctx.pipeline;
    let caption = caption.trim();
    let base = base_terms(caption, limits.max_base_terms);

    let mut candidates = expand_with_synonyms(&base, &ctx.datasets.synonyms);

    if !base.is_empty() {
        let terms = base.join(", ");
        let context = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(|d| format!("\nDescription: {}", d))
            .unwrap_or_default();
        let values = [
            ("terms", terms.as_str()),
            ("caption", caption),
            ("context", context.as_str()),
        ];

        // Sequential on purpose: the backend is one shared resource
        for (source, template) in [
            ("synonyms", &ctx.prompts.keyword_synonyms),
            ("themes", &ctx.prompts.keyword_themes),
            ("context", &ctx.prompts.keyword_context),
        ] {
            let raw = ctx.gateway.generate(render(template, &values)).await;
            match comma_list(&raw) {
                Ok(entries) => {
                    debug!("Keyword source '{}' contributed {} candidates", source, entries.len());
                    candidates.extend(entries);
                }
                Err(e) => debug!("Keyword source '{}' unusable: {}", source, e),
            }
        }
    }

    candidates.retain(|term| is_acceptable_keyword(term));
    let mut keywords = prune_near_duplicates(candidates, limits.similarity_threshold);

    if keywords.len() < limits.max_keywords && !caption.is_empty() {
        let missing = limits.max_keywords - keywords.len();
        let count = missing.to_string();
        let prompt = render(
            &ctx.prompts.keyword_gap_fill,
            &[("count", count.as_str()), ("caption", caption)],
        );
        let raw = ctx.gateway.generate(prompt).await;
        match comma_list(&raw) {
            Ok(extra) => append_unique(&mut keywords, extra),
            Err(e) => debug!("Gap-fill response unusable: {}", e),
        }
    }

    keywords.truncate(limits.max_keywords);
    pad_with_filler(&mut keywords, &limits.filler_terms, limits.max_keywords);
    keywords
}

/// Keywords used when synthesis itself is lost: base terms plus filler
pub fn fallback_keywords(caption: &str, limits: &PipelineConfig) -> Vec<String> {
    let mut keywords = Vec::new();
    append_unique(&mut keywords, base_terms(caption, limits.max_base_terms));
    keywords.truncate(limits.max_keywords);
    pad_with_filler(&mut keywords, &limits.filler_terms, limits.max_keywords);
    keywords
}

/// Distinct, lowercase caption tokens in first-seen order
///
/// Stopwords and tokens of two characters or fewer are skipped.
pub fn base_terms(caption: &str, max_terms: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    caption
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|token| token.trim_matches('\''))
        .filter(|token| token.chars().count() > 2 && !is_stopword(token))
        .filter(|token| seen.insert(token.to_string()))
        .take(max_terms)
        .map(str::to_string)
        .collect()
}

/// Each base term followed by its priority synonyms
pub fn expand_with_synonyms(base: &[String], synonyms: &SynonymTable) -> Vec<String> {
    base.iter()
        .flat_map(|term| std::iter::once(term.clone()).chain(synonyms.lookup(term).iter().cloned()))
        .collect()
}

/// Drop exact (case-insensitive) and near duplicates, keeping first occurrences
///
/// A candidate is dropped when its Jaro similarity to any already-kept
/// keyword is strictly greater than `threshold`. A compound that contains a
/// kept keyword as whole words ("christmas tree" next to "christmas"), or is
/// contained by one, is a distinct keyword and never pruned.
pub fn prune_near_duplicates<I>(candidates: I, threshold: f64) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut kept: Vec<String> = Vec::new();
    for candidate in candidates {
        let candidate = candidate.trim().to_lowercase();
        if candidate.is_empty() {
            continue;
        }
        let duplicate = kept
            .iter()
            .any(|k| *k == candidate || is_near_duplicate(k, &candidate, threshold));
        if duplicate {
            continue;
        }
        kept.push(candidate);
    }
    kept
}

fn is_near_duplicate(kept: &str, candidate: &str, threshold: f64) -> bool {
    if contains_phrase(kept, candidate) || contains_phrase(candidate, kept) {
        return false;
    }
    strsim::jaro(kept, candidate) > threshold
}

/// Whether the words of `phrase` appear consecutively in `text`
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let text: Vec<&str> = text.split_whitespace().collect();
    let phrase: Vec<&str> = phrase.split_whitespace().collect();
    !phrase.is_empty()
        && phrase.len() <= text.len()
        && text.windows(phrase.len()).any(|window| window == phrase.as_slice())
}

/// Append acceptable entries not already present (exact, case-insensitive)
pub fn append_unique<I>(keywords: &mut Vec<String>, extra: I)
where
    I: IntoIterator<Item = String>,
{
    let mut present: HashSet<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    for entry in extra {
        let entry = entry.trim().to_lowercase();
        if is_acceptable_keyword(&entry) && present.insert(entry.clone()) {
            keywords.push(entry);
        }
    }
}

/// Pad up to `max` with filler terms, never repeating one
fn pad_with_filler(keywords: &mut Vec<String>, filler_terms: &[String], max: usize) {
    if keywords.len() >= max {
        return;
    }
    let before = keywords.len();
    append_unique(keywords, filler_terms.iter().cloned());
    keywords.truncate(max);
    if keywords.len() > before {
        debug!("Padded keywords with {} filler terms", keywords.len() - before);
    }
}
