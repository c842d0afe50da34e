//! Sub-query list extraction and reveal.
//!
//! The server renders the sub-query list with single-quoted items, e.g.
//! `['1. What is X', '2. What is Y']`. Extraction repairs the quoting by
//! replacing every `'` with `"` and parsing the result as a JSON array of
//! strings. That breaks whenever an item contains an apostrophe; such lists are
//! simply not shown.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::reveal::StaggeredReveal;

/// Delay between consecutive sub-query reveals.
pub const SUB_QUERY_STAGGER: Duration = Duration::from_millis(500);

static ORDINAL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*").expect("ordinal prefix pattern is valid"));

/// One sub-query as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubQuery {
    pub text: String,
    pub visible: bool,
}

/// Best-effort extraction of the sub-query texts from a step detail.
///
/// Returns `None` when the detail cannot be parsed; this is an expected
/// outcome, not an error.
pub fn extract_sub_queries(detail: &str) -> Option<Vec<String>> {
    let normalized = detail.replace('\'', "\"");

    match serde_json::from_str::<Vec<String>>(normalized.trim()) {
        Ok(items) => Some(
            items
                .iter()
                .map(|item| ORDINAL_PREFIX.replace(item, "").into_owned())
                .collect(),
        ),
        Err(err) => {
            tracing::debug!(error = %err, "sub-query list not parseable; skipping");
            None
        }
    }
}

/// Sub-queries of one session with their staggered visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubQueryReveal {
    texts: Vec<String>,
    reveal: StaggeredReveal,
}

impl SubQueryReveal {
    pub fn new(texts: Vec<String>) -> Self {
        let reveal = StaggeredReveal::new(texts.len(), SUB_QUERY_STAGGER);
        Self { texts, reveal }
    }

    /// Parses `detail`, see [`extract_sub_queries`].
    pub fn from_detail(detail: &str) -> Option<Self> {
        extract_sub_queries(detail).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn schedule(&self) -> impl Iterator<Item = (usize, Duration)> + '_ {
        self.reveal.schedule()
    }

    pub fn reveal(&mut self, index: usize) -> bool {
        self.reveal.reveal(index)
    }

    pub fn items(&self) -> Vec<SubQuery> {
        self.texts
            .iter()
            .enumerate()
            .map(|(index, text)| SubQuery {
                text: text.clone(),
                visible: self.reveal.is_visible(index),
            })
            .collect()
    }
}
