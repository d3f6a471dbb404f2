//! Composed metadata for one asset

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category assigned when no taxonomy entry matches
pub const UNCATEGORIZED: &str = "uncategorized";

/// Flag key marking video assets
pub const FLAG_VIDEO: &str = "video";

/// Metadata record for a single image or video
///
/// Created empty when an asset enters the pipeline and filled by the
/// orchestrator; frozen once handed to the task queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Asset path as submitted
    pub file: String,
    pub title: String,
    /// At most `pipeline.max_description_len` characters
    pub description: String,
    /// At most `pipeline.max_keywords` entries, lowercase, unique
    pub keywords: Vec<String>,
    /// Taxonomy category name or [`UNCATEGORIZED`]
    pub category: String,
    pub secondary_category: Option<String>,
    /// Named booleans such as media-type markers
    pub flags: BTreeMap<String, bool>,
    /// Raw captions in frame order
    pub captions: Vec<String>,
    /// Auxiliary term disambiguations
    pub disambiguations: BTreeMap<String, String>,
}

impl MetadataRecord {
    /// Create an empty record for an asset
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            title: String::new(),
            description: String::new(),
            keywords: Vec::new(),
            category: UNCATEGORIZED.to_string(),
            secondary_category: None,
            flags: BTreeMap::new(),
            captions: Vec::new(),
            disambiguations: BTreeMap::new(),
        }
    }

    /// Whether the asset was processed as a video
    pub fn is_video(&self) -> bool {
        self.flags.get(FLAG_VIDEO).copied().unwrap_or(false)
    }

    /// Render flags the way progress listeners receive them (`video=true`)
    pub fn flags_display(&self) -> String {
        self.flags
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Record fields reported through progressive updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataField {
    Title,
    Description,
    Keywords,
    Category,
    Captions,
    Flags,
}

impl MetadataField {
    pub fn as_str(self) -> &'static str {
        match self {
            MetadataField::Title => "title",
            MetadataField::Description => "description",
            MetadataField::Keywords => "keywords",
            MetadataField::Category => "category",
            MetadataField::Captions => "captions",
            MetadataField::Flags => "flags",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
