//! Citation linking for generated answers.
//!
//! `resolver` partitions answer/reasoning text into literal spans and `[n]`
//! citations bound to a source id. `preview` builds the word-truncated source
//! preview, and `interaction` provides the hover and click strategies that
//! decide when a preview is on screen.

pub mod interaction;
pub mod preview;
pub mod resolver;

pub use interaction::{
    ActivePreview, Anchor, CitationInteraction, ClickPreview, Gesture, HoverPreview,
    InteractionMode,
};
pub use preview::{DEFAULT_EXCERPT_WORD_LIMIT, SourcePreview, truncate_words};
pub use resolver::{CitationResolver, Segment};
