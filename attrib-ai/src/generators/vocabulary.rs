//! Fixed word lists used when cleaning keywords

/// Caption words never used as base terms
pub const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "of", "in", "on", "at", "to", "for", "with", "by",
    "from", "into", "onto", "near", "over", "under", "is", "are", "was", "were", "be", "been",
    "being", "has", "have", "had", "this", "that", "these", "those", "there", "their", "its",
    "it", "his", "her", "they", "them", "some", "very", "while", "who", "which", "what",
    "up", "down", "out", "off", "as", "next", "front", "top", "background", "image",
    "picture", "photo", "shows", "showing", "close",
];

/// Generic stock-site words that add no search value
pub const BANNED_TERMS: &[&str] = &[
    "photo",
    "photos",
    "photograph",
    "photography",
    "image",
    "images",
    "picture",
    "pictures",
    "stock",
    "stock photo",
    "concept",
    "royalty free",
    "high quality",
    "background image",
];

/// Calendar-name qualifiers dropped when observance names become keywords
pub const CALENDAR_QUALIFIERS: &[&str] = &["international", "national", "world", "day"];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

pub fn is_banned(term: &str) -> bool {
    BANNED_TERMS.contains(&term.trim().to_lowercase().as_str())
}

/// Keyword passes the banned-term and minimum-length rules
pub fn is_acceptable_keyword(term: &str) -> bool {
    term.chars().count() > 2 && !is_banned(term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptable_keyword() {
        assert!(is_acceptable_keyword("dog"));
        assert!(!is_acceptable_keyword("ox"));
        assert!(!is_acceptable_keyword("Stock"));
        assert!(!is_acceptable_keyword("concept"));
    }
}
