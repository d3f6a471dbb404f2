//! Static lookup tables: taxonomy, calendar observances, priority synonyms
//!
//! Loaded once at startup and shared read-only (`Arc<Datasets>`) by every
//! asset. Each table falls back to a built-in default when its file is not
//! configured.

pub mod calendar;
pub mod synonyms;
pub mod taxonomy;

pub use calendar::{CalendarDataset, CalendarTopic};
pub use synonyms::SynonymTable;
pub use taxonomy::{Taxonomy, TaxonomyEntry};

use attrib_common::config::DatasetConfig;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Dataset loading errors
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Dataset file could not be read
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dataset file is not valid JSON for its table
    #[error("Failed to parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// All static tables consumed by the pipeline
#[derive(Debug, Clone)]
pub struct Datasets {
    pub taxonomy: Taxonomy,
    pub calendar: CalendarDataset,
    pub synonyms: SynonymTable,
}

impl Default for Datasets {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Datasets {
    /// Built-in tables only (no files read)
    pub fn builtin() -> Self {
        Self {
            taxonomy: Taxonomy::builtin(),
            calendar: CalendarDataset::builtin(),
            synonyms: SynonymTable::default(),
        }
    }

    /// Load configured tables, using built-ins for anything unset
    pub fn load(config: &DatasetConfig) -> Result<Self, DatasetError> {
        let taxonomy = match &config.taxonomy {
            Some(path) => Taxonomy::from_json_file(path)?,
            None => Taxonomy::builtin(),
        };
        let calendar = match &config.calendar_dir {
            Some(dir) => CalendarDataset::from_dir(dir)?,
            None => CalendarDataset::builtin(),
        };
        let synonyms = match &config.synonyms {
            Some(path) => SynonymTable::from_json_file(path)?,
            None => SynonymTable::default(),
        };

        info!(
            categories = taxonomy.entries().len(),
            calendar_entries = calendar.len(),
            synonym_terms = synonyms.len(),
            "Datasets loaded"
        );

        Ok(Self {
            taxonomy,
            calendar,
            synonyms,
        })
    }
}

/// Read and deserialize one JSON dataset file
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let content = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_without_files_uses_builtins() {
        let datasets = Datasets::load(&DatasetConfig::default()).unwrap();
        assert_eq!(datasets.taxonomy.entries()[0].name, "Animals");
        assert!(!datasets.calendar.is_empty());
        assert!(datasets.synonyms.is_empty());
    }

    #[test]
    fn test_missing_taxonomy_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = DatasetConfig {
            taxonomy: Some(temp_dir.path().join("missing.json")),
            ..Default::default()
        };
        assert!(matches!(
            Datasets::load(&config),
            Err(DatasetError::Io { .. })
        ));
    }

    #[test]
    fn test_malformed_synonyms_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("synonyms.json");
        std::fs::write(&path, "[\"not\", \"a map\"]").unwrap();
        let config = DatasetConfig {
            synonyms: Some(path),
            ..Default::default()
        };
        assert!(matches!(
            Datasets::load(&config),
            Err(DatasetError::Parse { .. })
        ));
    }
}
