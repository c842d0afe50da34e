//! Terminal rendering of progress snapshots, answers, and previews.

use colored::{ColoredString, Colorize};
use ksearch_core::citation::{ActivePreview, Anchor, CitationResolver, Segment};
use ksearch_core::progress::{Phase, PhaseStatus, ProgressSnapshot};
use ksearch_core::search::{SearchResult, Source};
use ksearch_core::session::SessionState;
use std::fmt;

/// One incremental line of progress output.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressLine {
    Phase { phase: Phase, status: PhaseStatus },
    Step { label: String, detail: Option<String> },
    SubQuery(String),
    DocumentsFound(usize),
    Placeholder { index: usize, count: usize },
    Cancelled,
    Failed(String),
}

impl fmt::Display for ProgressLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressLine::Phase { phase, status } => match status {
                PhaseStatus::Complete => write!(f, "✓ {}", phase.title()),
                _ => write!(f, "▶ {}", phase.title()),
            },
            ProgressLine::Step {
                label,
                detail: Some(detail),
            } => write!(f, "  · {label}: {detail}"),
            ProgressLine::Step { label, detail: None } => write!(f, "  · {label}"),
            ProgressLine::SubQuery(text) => write!(f, "    ↳ {text}"),
            ProgressLine::DocumentsFound(count) => write!(f, "  Found {count} documents"),
            ProgressLine::Placeholder { index, count } => {
                write!(f, "    [document {}/{}]", index + 1, count)
            }
            ProgressLine::Cancelled => f.write_str("Search cancelled"),
            ProgressLine::Failed(message) => f.write_str(message),
        }
    }
}

impl ProgressLine {
    pub fn paint(&self) -> ColoredString {
        let text = self.to_string();
        match self {
            ProgressLine::Phase {
                status: PhaseStatus::Complete,
                ..
            } => text.bright_green(),
            ProgressLine::Phase { .. } => text.bright_yellow().bold(),
            ProgressLine::Step { .. } => text.bright_black(),
            ProgressLine::SubQuery(_) => text.cyan(),
            ProgressLine::DocumentsFound(_) | ProgressLine::Placeholder { .. } => text.blue(),
            ProgressLine::Cancelled => text.yellow(),
            ProgressLine::Failed(_) => text.red(),
        }
    }
}

/// Tracks what has already been printed for a session and emits only the
/// new parts of each snapshot.
#[derive(Debug, Default)]
pub struct ProgressRenderer {
    steps: usize,
    phases: Vec<(Phase, PhaseStatus)>,
    sub_queries: usize,
    documents_announced: bool,
    placeholders: usize,
    state: SessionState,
}

impl ProgressRenderer {
    pub fn update(&mut self, snapshot: &ProgressSnapshot) -> Vec<ProgressLine> {
        let mut lines = Vec::new();

        if snapshot.state == SessionState::Cancelled {
            if self.state != SessionState::Cancelled {
                lines.push(ProgressLine::Cancelled);
            }
            *self = Self {
                state: SessionState::Cancelled,
                ..Self::default()
            };
            return lines;
        }

        for view in &snapshot.phases {
            let known = self
                .phases
                .iter()
                .find(|(phase, _)| *phase == view.phase)
                .map(|(_, status)| *status)
                .unwrap_or(PhaseStatus::Pending);
            if view.status != known {
                self.phases.retain(|(phase, _)| *phase != view.phase);
                self.phases.push((view.phase, view.status));
                if view.status != PhaseStatus::Pending {
                    lines.push(ProgressLine::Phase {
                        phase: view.phase,
                        status: view.status,
                    });
                }
            }
        }

        for step in snapshot.steps.iter().skip(self.steps) {
            lines.push(ProgressLine::Step {
                label: step.phase_label.clone(),
                detail: step.detail.clone(),
            });
        }
        self.steps = self.steps.max(snapshot.steps.len());

        let visible: Vec<&str> = snapshot
            .sub_queries
            .iter()
            .filter(|query| query.visible)
            .map(|query| query.text.as_str())
            .collect();
        for text in visible.iter().skip(self.sub_queries) {
            lines.push(ProgressLine::SubQuery(text.to_string()));
        }
        self.sub_queries = self.sub_queries.max(visible.len());

        let documents = snapshot.documents;
        if documents.visible {
            if !self.documents_announced {
                self.documents_announced = true;
                lines.push(ProgressLine::DocumentsFound(documents.count));
            }
            for index in self.placeholders..documents.placeholders_visible {
                lines.push(ProgressLine::Placeholder {
                    index,
                    count: documents.count,
                });
            }
            self.placeholders = self.placeholders.max(documents.placeholders_visible);
        }

        if snapshot.state == SessionState::Error && self.state != SessionState::Error {
            let message = snapshot.error.clone().unwrap_or_default();
            lines.push(ProgressLine::Failed(message));
        }
        self.state = snapshot.state;

        lines
    }
}

/// Renders text with resolved citation markers highlighted.
pub fn render_text(text: &str, resolver: &CitationResolver<'_>) -> String {
    resolver
        .resolve(text)
        .iter()
        .map(|segment| match segment {
            Segment::Literal { text } => text.to_string(),
            Segment::Citation { marker, .. } => marker.bright_cyan().bold().to_string(),
        })
        .collect()
}

pub fn render_sources(sources: &[Source]) -> Vec<String> {
    sources
        .iter()
        .map(|source| {
            let mut line = format!("[{}] {}", source.id, source.title);
            if let Some(date) = &source.date {
                line.push_str(&format!(" ({date})"));
            }
            line
        })
        .collect()
}

pub fn render_preview(active: &ActivePreview) -> Vec<String> {
    let preview = &active.preview;
    let mut lines = vec![format!("[{}] {}", preview.source_id, preview.title)];
    if let Some(date) = &preview.date {
        lines.push(date.clone());
    }
    lines.push(preview.excerpt.clone());
    lines.push(preview.url.clone());
    lines
}

/// Position of the first `[id]` marker, as column and line. Looks in the
/// answer first and falls back to the reasoning text.
pub fn marker_anchor(result: &SearchResult, source_id: i64) -> Anchor {
    find_marker(&result.answer_text, source_id)
        .or_else(|| find_marker(&result.reasoning_text, source_id))
        .unwrap_or(Anchor { x: 0.0, y: 0.0 })
}

fn find_marker(text: &str, source_id: i64) -> Option<Anchor> {
    let marker = format!("[{source_id}]");
    text.lines().enumerate().find_map(|(row, line)| {
        line.find(&marker).map(|col| Anchor {
            x: line[..col].chars().count() as f32,
            y: row as f32,
        })
    })
}
