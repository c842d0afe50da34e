//! Partitioning of generated text into literal spans and citations.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::preview::{DEFAULT_EXCERPT_WORD_LIMIT, SourcePreview};
use crate::search::Source;

static CITATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)\]").expect("citation marker pattern is valid"));

/// One piece of a resolved text.
///
/// Segments borrow from the input text and, concatenated in order, reproduce
/// it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment<'t> {
    /// Plain text, including any `[n]` marker whose id has no source
    Literal { text: &'t str },
    /// A `[n]` marker bound to the source with id `n`
    Citation { source_id: i64, marker: &'t str },
}

impl<'t> Segment<'t> {
    /// The original text of this segment.
    pub fn text(&self) -> &'t str {
        match self {
            Segment::Literal { text } => text,
            Segment::Citation { marker, .. } => marker,
        }
    }

    pub fn source_id(&self) -> Option<i64> {
        match self {
            Segment::Citation { source_id, .. } => Some(*source_id),
            Segment::Literal { .. } => None,
        }
    }
}

/// Binds `[n]` markers to the sources of one result.
///
/// Resolution is a pure function of the marker id and the source list; the
/// sources are only ever read.
#[derive(Debug, Clone, Copy)]
pub struct CitationResolver<'s> {
    sources: &'s [Source],
    word_limit: usize,
}

impl<'s> CitationResolver<'s> {
    pub fn new(sources: &'s [Source]) -> Self {
        Self {
            sources,
            word_limit: DEFAULT_EXCERPT_WORD_LIMIT,
        }
    }

    /// Overrides the excerpt word limit used by [`Self::preview`].
    pub fn with_word_limit(mut self, word_limit: usize) -> Self {
        self.word_limit = word_limit;
        self
    }

    pub fn sources(&self) -> &'s [Source] {
        self.sources
    }

    pub fn word_limit(&self) -> usize {
        self.word_limit
    }

    pub fn source(&self, id: i64) -> Option<&'s Source> {
        self.sources.iter().find(|source| source.id == id)
    }

    /// Splits `text` into an ordered, exhaustive list of segments.
    ///
    /// Markers referencing an unknown id stay part of the surrounding literal
    /// text. Literal segments are never empty and never adjacent.
    pub fn resolve<'t>(&self, text: &'t str) -> Vec<Segment<'t>> {
        let mut segments = Vec::new();
        let mut literal_start = 0;

        for caps in CITATION_MARKER.captures_iter(text) {
            let (Some(marker), Some(digits)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(source_id) = digits
                .as_str()
                .parse::<i64>()
                .ok()
                .filter(|id| self.source(*id).is_some())
            else {
                continue;
            };

            if marker.start() > literal_start {
                segments.push(Segment::Literal {
                    text: &text[literal_start..marker.start()],
                });
            }
            segments.push(Segment::Citation {
                source_id,
                marker: marker.as_str(),
            });
            literal_start = marker.end();
        }

        if literal_start < text.len() {
            segments.push(Segment::Literal {
                text: &text[literal_start..],
            });
        }

        segments
    }

    /// Builds the preview of a source, or `None` for an unknown id.
    pub fn preview(&self, source_id: i64) -> Option<SourcePreview> {
        self.source(source_id)
            .map(|source| SourcePreview::from_source(source, self.word_limit))
    }
}
