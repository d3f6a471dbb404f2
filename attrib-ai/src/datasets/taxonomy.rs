//! Category taxonomy (category name -> trigger terms)
//!
//! Declaration order matters: the classifier returns the first category with
//! a hit, so earlier entries win ties.

use super::{read_json, DatasetError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One category and the keywords that select it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub name: String,
    pub terms: Vec<String>,
}

impl TaxonomyEntry {
    fn new(name: &str, terms: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Ordered category table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
}

impl Taxonomy {
    /// Build from entries; trigger terms are case-folded
    pub fn new(entries: Vec<TaxonomyEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| TaxonomyEntry {
                name: entry.name,
                terms: entry
                    .terms
                    .into_iter()
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect(),
            })
            .collect();
        Self { entries }
    }

    /// Stock-site style default categories
    pub fn builtin() -> Self {
        Self::new(vec![
            TaxonomyEntry::new(
                "Animals",
                &["cat", "dog", "puppy", "kitten", "animal", "pet", "wildlife"],
            ),
            TaxonomyEntry::new(
                "Medical",
                &["vet", "doctor", "hospital", "clinic", "medicine", "nurse", "healthcare"],
            ),
            TaxonomyEntry::new(
                "Business",
                &["office", "desk", "work", "business", "corporate", "meeting"],
            ),
            TaxonomyEntry::new(
                "Food & Drink",
                &["food", "meal", "drink", "coffee", "tea", "fruit", "vegetable"],
            ),
            TaxonomyEntry::new(
                "Nature",
                &["tree", "forest", "landscape", "mountain", "river", "sea", "sky"],
            ),
            TaxonomyEntry::new(
                "People",
                &["man", "woman", "child", "family", "portrait", "friends"],
            ),
            TaxonomyEntry::new(
                "Technology",
                &["computer", "phone", "laptop", "tech", "ai", "robot"],
            ),
            TaxonomyEntry::new(
                "Holidays",
                &["christmas", "new year", "easter", "halloween", "holiday", "celebration"],
            ),
            TaxonomyEntry::new(
                "Travel",
                &["city", "beach", "tourism", "hotel", "transport", "travel"],
            ),
        ])
    }

    /// Load a JSON array of `{ "name": ..., "terms": [...] }`
    pub fn from_json_file(path: &Path) -> Result<Self, DatasetError> {
        let entries: Vec<TaxonomyEntry> = read_json(path)?;
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_order() {
        let taxonomy = Taxonomy::builtin();
        let names: Vec<&str> = taxonomy.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names[0], "Animals");
        assert_eq!(names[1], "Medical");
        assert_eq!(names.last(), Some(&"Travel"));
    }

    #[test]
    fn test_loaded_terms_are_case_folded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("taxonomy.json");
        std::fs::write(
            &path,
            r#"[{"name": "Sports", "terms": [" Football ", "TENNIS", ""]}]"#,
        )
        .unwrap();

        let taxonomy = Taxonomy::from_json_file(&path).unwrap();
        assert_eq!(taxonomy.entries().len(), 1);
        assert_eq!(taxonomy.entries()[0].terms, vec!["football", "tennis"]);
    }
}
