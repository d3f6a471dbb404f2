//! Post-generation stages: calendar enrichment and category classification
//!
//! Both run after title, description and keywords exist. Classification reads
//! the enriched keyword list, so observance words can decide the category.

pub mod calendar_enrichment;
pub mod category_classifier;

pub use calendar_enrichment::{
    enrich_description, enrich_keywords, extract_themes, find_related_entries,
};
pub use category_classifier::{classify, detect_category};
