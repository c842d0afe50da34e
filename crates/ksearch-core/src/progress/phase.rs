//! Step classification.
//!
//! The server reports progress with free-text step labels. This module is the
//! only place that inspects those labels; everything downstream works with
//! [`Phase`] and [`StepClassification`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stream::LogEntry;

/// Label fragments emitted by the server. Matching is by case-sensitive
/// substring.
pub mod labels {
    pub const BREAKING_DOWN_QUERY: &str = "Breaking down query";
    pub const QUERY_BREAKDOWN_COMPLETE: &str = "Query breakdown complete";
    pub const SUB_QUERIES: &str = "Sub-queries";
    pub const SEARCHING_DOCUMENTS: &str = "Searching for relevant documents";
    pub const SEARCH_COMPLETE: &str = "Search complete";
    pub const GENERATING_ANSWER: &str = "Generating comprehensive answer";
    pub const ANSWER_COMPLETE: &str = "Answer generation complete";
}

/// Coarse pipeline stage, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    QueryBreakdown,
    DocumentSearch,
    AnswerGeneration,
}

impl Phase {
    pub const ALL: [Phase; 3] = [
        Phase::QueryBreakdown,
        Phase::DocumentSearch,
        Phase::AnswerGeneration,
    ];

    /// Heading shown for the phase.
    pub fn title(self) -> &'static str {
        match self {
            Phase::QueryBreakdown => "Analyzing Your Question",
            Phase::DocumentSearch => "Finding Relevant Information",
            Phase::AnswerGeneration => "Generating Answer",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Display status of a phase within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Pending,
    Active,
    Complete,
}

/// Derived feature a step carries in its detail field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationTrigger {
    /// Detail holds the sub-query list
    SubQueries,
    /// Detail holds "Found N documents"
    DocumentCount,
}

/// What a single log entry means for the progress view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepClassification {
    /// `None` for steps outside the known vocabulary
    pub phase: Option<Phase>,
    /// The step marks `phase` as finished
    pub completes: bool,
    pub trigger: Option<DerivationTrigger>,
}

impl StepClassification {
    const OTHER: StepClassification = StepClassification {
        phase: None,
        completes: false,
        trigger: None,
    };

    fn active(phase: Phase) -> Self {
        Self {
            phase: Some(phase),
            completes: false,
            trigger: None,
        }
    }

    fn complete(phase: Phase) -> Self {
        Self {
            phase: Some(phase),
            completes: true,
            trigger: None,
        }
    }

    fn with_trigger(mut self, trigger: DerivationTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn is_other(&self) -> bool {
        self.phase.is_none()
    }
}

/// Classifies a log entry by its label.
///
/// Completion fragments are checked before activation fragments.
pub fn classify(entry: &LogEntry) -> StepClassification {
    classify_label(&entry.phase_label)
}

/// Classifies a raw step label.
pub fn classify_label(label: &str) -> StepClassification {
    use labels::*;

    if label.contains(QUERY_BREAKDOWN_COMPLETE) {
        StepClassification::complete(Phase::QueryBreakdown)
    } else if label.contains(SEARCH_COMPLETE) {
        StepClassification::complete(Phase::DocumentSearch)
            .with_trigger(DerivationTrigger::DocumentCount)
    } else if label.contains(ANSWER_COMPLETE) {
        StepClassification::complete(Phase::AnswerGeneration)
    } else if label.contains(BREAKING_DOWN_QUERY) {
        StepClassification::active(Phase::QueryBreakdown)
    } else if label.contains(SUB_QUERIES) {
        StepClassification::active(Phase::QueryBreakdown)
            .with_trigger(DerivationTrigger::SubQueries)
    } else if label.contains(SEARCHING_DOCUMENTS) {
        StepClassification::active(Phase::DocumentSearch)
    } else if label.contains(GENERATING_ANSWER) {
        StepClassification::active(Phase::AnswerGeneration)
    } else {
        StepClassification::OTHER
    }
}
