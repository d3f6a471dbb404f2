//! Thematic calendar of observances, grouped by topic

use super::{read_json, DatasetError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Fixed list of calendar topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarTopic {
    Animals,
    Health,
    Family,
    Business,
    Environment,
    Food,
    Culture,
    Tech,
    Sports,
    Education,
}

impl CalendarTopic {
    /// All topics in scan order
    pub const ALL: [CalendarTopic; 10] = [
        CalendarTopic::Animals,
        CalendarTopic::Health,
        CalendarTopic::Family,
        CalendarTopic::Business,
        CalendarTopic::Environment,
        CalendarTopic::Food,
        CalendarTopic::Culture,
        CalendarTopic::Tech,
        CalendarTopic::Sports,
        CalendarTopic::Education,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CalendarTopic::Animals => "animals",
            CalendarTopic::Health => "health",
            CalendarTopic::Family => "family",
            CalendarTopic::Business => "business",
            CalendarTopic::Environment => "environment",
            CalendarTopic::Food => "food",
            CalendarTopic::Culture => "culture",
            CalendarTopic::Tech => "tech",
            CalendarTopic::Sports => "sports",
            CalendarTopic::Education => "education",
        }
    }

    fn builtin_entries(self) -> &'static [&'static str] {
        match self {
            CalendarTopic::Animals => &[
                "World Animal Day",
                "International Dog Day",
                "International Cat Day",
                "National Puppy Day",
                "World Wildlife Day",
                "International Horse Day",
                "World Bee Day",
            ],
            CalendarTopic::Health => &[
                "World Health Day",
                "World Heart Day",
                "International Nurses Day",
                "World Veterinary Day",
                "National Doctors Day",
                "World Mental Health Day",
            ],
            CalendarTopic::Family => &[
                "International Day of Families",
                "Mother's Day",
                "Father's Day",
                "Children's Day",
                "Valentine's Day",
                "International Friendship Day",
            ],
            CalendarTopic::Business => &[
                "International Women's Day",
                "Labour Day",
                "Small Business Saturday",
                "World Entrepreneurs Day",
                "Black Friday",
                "Cyber Monday",
            ],
            CalendarTopic::Environment => &[
                "Earth Day",
                "World Environment Day",
                "World Water Day",
                "International Day of Forests",
                "World Oceans Day",
                "Arbor Day",
            ],
            CalendarTopic::Food => &[
                "World Food Day",
                "International Coffee Day",
                "International Tea Day",
                "World Chocolate Day",
                "National Pizza Day",
                "World Vegan Day",
            ],
            CalendarTopic::Culture => &[
                "Christmas",
                "New Year",
                "Easter",
                "Halloween",
                "Thanksgiving",
                "Chinese New Year",
                "Diwali",
            ],
            CalendarTopic::Tech => &[
                "Safer Internet Day",
                "World Telecommunication Day",
                "International Programmers Day",
                "World Computer Literacy Day",
                "World Robotics Day",
            ],
            CalendarTopic::Sports => &[
                "Olympic Day",
                "World Football Day",
                "International Yoga Day",
                "World Bicycle Day",
                "National Sports Day",
            ],
            CalendarTopic::Education => &[
                "World Teachers Day",
                "International Literacy Day",
                "World Book Day",
                "International Day of Education",
                "Back to School",
            ],
        }
    }
}

impl fmt::Display for CalendarTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observance names per topic, in declared order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarDataset {
    topics: HashMap<CalendarTopic, Vec<String>>,
}

impl CalendarDataset {
    pub fn builtin() -> Self {
        let topics = CalendarTopic::ALL
            .iter()
            .map(|&topic| {
                let entries = topic
                    .builtin_entries()
                    .iter()
                    .map(|e| e.to_string())
                    .collect();
                (topic, entries)
            })
            .collect();
        Self { topics }
    }

    /// Load `<dir>/<topic>.json` for every topic
    ///
    /// A missing topic file yields no entries for that topic.
    pub fn from_dir(dir: &Path) -> Result<Self, DatasetError> {
        let mut topics = HashMap::new();
        for topic in CalendarTopic::ALL {
            let path = dir.join(format!("{}.json", topic.as_str()));
            if !path.exists() {
                debug!("No calendar file for topic '{}' at {}", topic, path.display());
                continue;
            }
            let entries: Vec<String> = read_json(&path)?;
            topics.insert(topic, entries);
        }
        Ok(Self { topics })
    }

    /// Replace one topic's entries
    pub fn with_topic(mut self, topic: CalendarTopic, entries: Vec<String>) -> Self {
        self.topics.insert(topic, entries);
        self
    }

    pub fn entries(&self, topic: CalendarTopic) -> &[String] {
        self.topics.get(&topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of entries across topics
    pub fn len(&self) -> usize {
        self.topics.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_topic_order() {
        let names: Vec<&str> = CalendarTopic::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "animals",
                "health",
                "family",
                "business",
                "environment",
                "food",
                "culture",
                "tech",
                "sports",
                "education"
            ]
        );
    }

    #[test]
    fn test_from_dir_skips_missing_topics() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("animals.json"),
            r#"["World Dog Day", "Hug Your Cat Day"]"#,
        )
        .unwrap();

        let calendar = CalendarDataset::from_dir(temp_dir.path()).unwrap();
        assert_eq!(calendar.entries(CalendarTopic::Animals).len(), 2);
        assert!(calendar.entries(CalendarTopic::Food).is_empty());
        assert_eq!(calendar.len(), 2);
    }

    #[test]
    fn test_with_topic_replaces_entries() {
        let calendar = CalendarDataset::default()
            .with_topic(CalendarTopic::Tech, vec!["Robot Day".to_string()]);
        assert_eq!(calendar.entries(CalendarTopic::Tech), &["Robot Day".to_string()]);
    }
}
