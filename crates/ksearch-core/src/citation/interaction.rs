//! Hover and click disclosure of citation previews.
//!
//! Both strategies build previews through the same [`CitationResolver`], so
//! they only differ in which gestures open and dismiss a preview.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::preview::SourcePreview;
use super::resolver::CitationResolver;
use crate::error::KsearchError;

/// Where the pointer was when a hover preview opened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

/// User gesture on a citation marker or a source list entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    PointerEnter { source_id: i64, anchor: Anchor },
    PointerLeave,
    Click { source_id: i64 },
    /// Explicit close button
    Close,
}

/// The preview currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePreview {
    pub preview: SourcePreview,
    /// Set for hover previews, which float next to the pointer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
}

/// Which disclosure strategy the view uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    Hover,
    #[default]
    Click,
}

impl InteractionMode {
    /// Creates a fresh strategy for this mode.
    pub fn strategy(self) -> Box<dyn CitationInteraction> {
        match self {
            InteractionMode::Hover => Box::new(HoverPreview::default()),
            InteractionMode::Click => Box::new(ClickPreview::default()),
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionMode::Hover => f.write_str("hover"),
            InteractionMode::Click => f.write_str("click"),
        }
    }
}

impl FromStr for InteractionMode {
    type Err = KsearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hover" => Ok(InteractionMode::Hover),
            "click" => Ok(InteractionMode::Click),
            other => Err(KsearchError::config(format!(
                "unknown citation mode '{other}' (expected 'hover' or 'click')"
            ))),
        }
    }
}

/// Presentation strategy for citation previews.
pub trait CitationInteraction: Send {
    fn mode(&self) -> InteractionMode;

    /// Applies a gesture. Returns true if the visible preview changed.
    ///
    /// Gestures the strategy does not react to are ignored.
    fn handle(&mut self, gesture: Gesture, resolver: &CitationResolver<'_>) -> bool;

    fn active(&self) -> Option<&ActivePreview>;

    /// Drops any open preview, e.g. when a new result replaces the old one.
    fn clear(&mut self);
}

/// Transient preview: opens on pointer-enter, closes on pointer-leave.
#[derive(Debug, Default)]
pub struct HoverPreview {
    active: Option<ActivePreview>,
}

impl CitationInteraction for HoverPreview {
    fn mode(&self) -> InteractionMode {
        InteractionMode::Hover
    }

    fn handle(&mut self, gesture: Gesture, resolver: &CitationResolver<'_>) -> bool {
        match gesture {
            Gesture::PointerEnter { source_id, anchor } => match resolver.preview(source_id) {
                Some(preview) => {
                    self.active = Some(ActivePreview {
                        preview,
                        anchor: Some(anchor),
                    });
                    true
                }
                None => false,
            },
            Gesture::PointerLeave => self.active.take().is_some(),
            Gesture::Click { .. } | Gesture::Close => false,
        }
    }

    fn active(&self) -> Option<&ActivePreview> {
        self.active.as_ref()
    }

    fn clear(&mut self) {
        self.active = None;
    }
}

/// Persistent preview: a click toggles it, a click on another citation
/// switches to it, and the close gesture dismisses it.
#[derive(Debug, Default)]
pub struct ClickPreview {
    active: Option<ActivePreview>,
}

impl CitationInteraction for ClickPreview {
    fn mode(&self) -> InteractionMode {
        InteractionMode::Click
    }

    fn handle(&mut self, gesture: Gesture, resolver: &CitationResolver<'_>) -> bool {
        match gesture {
            Gesture::Click { source_id } => {
                let is_open = self
                    .active
                    .as_ref()
                    .is_some_and(|active| active.preview.source_id == source_id);
                if is_open {
                    self.active = None;
                    return true;
                }
                match resolver.preview(source_id) {
                    Some(preview) => {
                        self.active = Some(ActivePreview {
                            preview,
                            anchor: None,
                        });
                        true
                    }
                    None => false,
                }
            }
            Gesture::Close => self.active.take().is_some(),
            Gesture::PointerEnter { .. } | Gesture::PointerLeave => false,
        }
    }

    fn active(&self) -> Option<&ActivePreview> {
        self.active.as_ref()
    }

    fn clear(&mut self) {
        self.active = None;
    }
}
