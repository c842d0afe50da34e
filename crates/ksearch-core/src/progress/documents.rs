//! Document count extraction and placeholder reveal.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::reveal::StaggeredReveal;

/// Delay between consecutive document placeholder reveals.
pub const DOCUMENT_STAGGER: Duration = Duration::from_millis(150);

/// Most placeholders animated for one batch. `count` itself stays exact.
pub const MAX_DOCUMENT_PLACEHOLDERS: usize = 50;

// The count may arrive wrapped in markdown emphasis ("Found **7** documents").
static DOCUMENT_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Found (?:\*\*)?(\d+)(?:\*\*)? documents").expect("document count pattern is valid")
});

/// Extracts N from "Found N documents". `None` if the phrasing differs.
pub fn extract_document_count(detail: &str) -> Option<usize> {
    DOCUMENT_COUNT
        .captures(detail)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Number of documents found, plus one placeholder per document up to
/// [`MAX_DOCUMENT_PLACEHOLDERS`].
///
/// The default value is the unset batch: count 0, not visible.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentBatch {
    count: usize,
    visible: bool,
    placeholders: StaggeredReveal,
}

impl DocumentBatch {
    /// Builds a visible batch from a step detail, see [`extract_document_count`].
    pub fn from_detail(detail: &str) -> Option<Self> {
        extract_document_count(detail).map(Self::with_count)
    }

    pub fn with_count(count: usize) -> Self {
        Self {
            count,
            visible: true,
            placeholders: StaggeredReveal::new(
                count.min(MAX_DOCUMENT_PLACEHOLDERS),
                DOCUMENT_STAGGER,
            ),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn schedule(&self) -> impl Iterator<Item = (usize, Duration)> + '_ {
        self.placeholders.schedule()
    }

    pub fn reveal(&mut self, index: usize) -> bool {
        self.placeholders.reveal(index)
    }

    pub fn visible_placeholders(&self) -> usize {
        self.placeholders.visible_count()
    }

    pub fn view(&self) -> DocumentBatchView {
        DocumentBatchView {
            count: self.count,
            visible: self.visible,
            placeholders_visible: self.visible_placeholders(),
        }
    }
}

/// Serializable state of a [`DocumentBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentBatchView {
    pub count: usize,
    pub visible: bool,
    /// Placeholders revealed so far; always a prefix since delays increase
    /// with the index
    pub placeholders_visible: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_count() {
        let batch = DocumentBatch::from_detail("Found 7 documents").unwrap();
        assert_eq!(batch.count(), 7);
        assert!(batch.is_visible());
        assert_eq!(batch.visible_placeholders(), 0);
    }

    #[test]
    fn test_extracts_emphasized_count() {
        assert_eq!(extract_document_count("Found **12** documents"), Some(12));
    }

    #[test]
    fn test_unmatched_detail_leaves_batch_unset() {
        assert!(DocumentBatch::from_detail("no documents today").is_none());

        let unset = DocumentBatch::default();
        assert_eq!(unset.count(), 0);
        assert!(!unset.is_visible());
    }

    #[test]
    fn test_placeholders_stagger_by_150ms() {
        let batch = DocumentBatch::with_count(3);
        let delays: Vec<_> = batch.schedule().map(|(_, d)| d).collect();
        assert_eq!(
            delays,
            vec![
                Duration::ZERO,
                Duration::from_millis(150),
                Duration::from_millis(300)
            ]
        );
    }

    #[test]
    fn test_huge_count_caps_placeholders() {
        let batch = DocumentBatch::from_detail("Found 20000000 documents").unwrap();
        assert_eq!(batch.count(), 20_000_000);
        assert_eq!(batch.schedule().count(), MAX_DOCUMENT_PLACEHOLDERS);

        let last = batch.schedule().last().map(|(_, delay)| delay);
        assert_eq!(
            last,
            Some(DOCUMENT_STAGGER * (MAX_DOCUMENT_PLACEHOLDERS as u32 - 1))
        );
        assert_eq!(batch.view().count, 20_000_000);
    }

    #[test]
    fn test_zero_documents_is_a_visible_empty_batch() {
        let batch = DocumentBatch::from_detail("Found 0 documents").unwrap();
        assert!(batch.is_visible());
        assert_eq!(batch.schedule().count(), 0);
    }
}
