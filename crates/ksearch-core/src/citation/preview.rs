//! Source previews shown for a citation.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::search::Source;

/// Default number of excerpt words shown in a preview.
pub const DEFAULT_EXCERPT_WORD_LIMIT: usize = 50;

/// Keeps the first `limit` space-separated words, appending `...` if anything
/// was cut.
pub fn truncate_words(text: &str, limit: usize) -> Cow<'_, str> {
    let words: Vec<&str> = text.split(' ').collect();
    if words.len() > limit {
        Cow::Owned(format!("{}...", words[..limit].join(" ")))
    } else {
        Cow::Borrowed(text)
    }
}

/// What a preview shows for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePreview {
    pub source_id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Word-truncated excerpt
    pub excerpt: String,
    pub url: String,
    pub truncated: bool,
}

impl SourcePreview {
    pub fn from_source(source: &Source, word_limit: usize) -> Self {
        let excerpt = truncate_words(&source.excerpt, word_limit);
        let truncated = matches!(excerpt, Cow::Owned(_));

        Self {
            source_id: source.id,
            title: source.title.clone(),
            date: source.date.clone(),
            excerpt: excerpt.into_owned(),
            url: source.url.clone(),
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_untouched() {
        assert_eq!(truncate_words("a b c", 3), "a b c");
        assert!(matches!(truncate_words("a b c", 3), Cow::Borrowed(_)));
    }

    #[test]
    fn test_long_text_gets_ellipsis() {
        let text = (1..=60).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let truncated = truncate_words(&text, DEFAULT_EXCERPT_WORD_LIMIT);

        assert!(truncated.ends_with("50..."));
        assert_eq!(truncated.trim_end_matches("...").split(' ').count(), 50);
    }

    #[test]
    fn test_preview_from_source() {
        let source = Source {
            id: 3,
            title: "Bond basics".to_string(),
            url: "https://example.com/bonds".to_string(),
            excerpt: "Bonds are loans".to_string(),
            date: Some("2024-05-01".to_string()),
            kind: Some("article".to_string()),
        };

        let preview = SourcePreview::from_source(&source, 2);
        assert_eq!(preview.source_id, 3);
        assert_eq!(preview.excerpt, "Bonds are...");
        assert!(preview.truncated);
        assert_eq!(preview.date.as_deref(), Some("2024-05-01"));

        let full = SourcePreview::from_source(&source, 50);
        assert_eq!(full.excerpt, "Bonds are loans");
        assert!(!full.truncated);
    }
}
