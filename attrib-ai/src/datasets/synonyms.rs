//! Priority synonyms (term -> preferred variants)

use super::{read_json, DatasetError};
use std::collections::HashMap;
use std::path::Path;

/// Deterministic expansion table consulted before any backend call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymTable {
    map: HashMap<String, Vec<String>>,
}

impl SynonymTable {
    /// Build from a map; keys and values are case-folded
    pub fn new(map: HashMap<String, Vec<String>>) -> Self {
        let map = map
            .into_iter()
            .map(|(term, synonyms)| {
                let synonyms = synonyms
                    .into_iter()
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect();
                (term.trim().to_lowercase(), synonyms)
            })
            .collect();
        Self { map }
    }

    /// Load a JSON object `term -> [synonyms]`
    pub fn from_json_file(path: &Path) -> Result<Self, DatasetError> {
        let map: HashMap<String, Vec<String>> = read_json(path)?;
        Ok(Self::new(map))
    }

    /// Synonyms for a term (empty when unknown)
    pub fn lookup(&self, term: &str) -> &[String] {
        self.map
            .get(&term.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut map = HashMap::new();
        map.insert("Dog".to_string(), vec!["Canine".to_string(), "hound".to_string()]);
        let table = SynonymTable::new(map);

        assert_eq!(table.lookup("DOG"), &["canine".to_string(), "hound".to_string()]);
        assert!(table.lookup("cat").is_empty());
    }
}
