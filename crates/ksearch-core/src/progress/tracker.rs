//! Aggregation of classified steps into the progress view of one session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::documents::{DocumentBatch, DocumentBatchView};
use super::phase::{DerivationTrigger, Phase, PhaseStatus, classify};
use super::reveal::{RevealTarget, RevealTimer};
use super::sub_query::{SubQuery, SubQueryReveal};
use crate::session::{SessionId, SessionState};
use crate::stream::{LogEntry, StreamMessage};

/// One received step, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub phase_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: String,
    /// Classified phase; `None` for labels outside the known vocabulary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
}

/// Pure progress state of one session.
///
/// `apply` never schedules anything itself: it returns the reveal timers the
/// caller must arm, and the caller feeds fired timers back through `reveal`.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    steps: Vec<ProcessStep>,
    current_phase: Option<Phase>,
    completed: BTreeSet<Phase>,
    sub_queries: Option<SubQueryReveal>,
    sub_queries_derived: bool,
    documents: DocumentBatch,
    documents_derived: bool,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one decoded stream message.
    ///
    /// # Returns
    /// The reveal timers triggered by this message (empty for most steps).
    pub fn apply(&mut self, message: StreamMessage) -> Vec<RevealTimer> {
        match message {
            StreamMessage::Keepalive => Vec::new(),
            StreamMessage::Log(entry) => self.apply_entry(entry),
        }
    }

    fn apply_entry(&mut self, entry: LogEntry) -> Vec<RevealTimer> {
        let class = classify(&entry);

        if let Some(phase) = class.phase {
            if class.completes {
                self.completed.insert(phase);
            }
            // The pointer only moves forward in pipeline order.
            if self.current_phase.is_none_or(|current| phase >= current) {
                self.current_phase = Some(phase);
            }
        }

        let timers = match (class.trigger, entry.detail.as_deref()) {
            (Some(DerivationTrigger::SubQueries), Some(detail)) => self.derive_sub_queries(detail),
            (Some(DerivationTrigger::DocumentCount), Some(detail)) => self.derive_documents(detail),
            _ => Vec::new(),
        };

        self.steps.push(ProcessStep {
            phase_label: entry.phase_label,
            detail: entry.detail,
            timestamp: entry.timestamp,
            phase: class.phase,
        });

        timers
    }

    fn derive_sub_queries(&mut self, detail: &str) -> Vec<RevealTimer> {
        if self.sub_queries_derived {
            return Vec::new();
        }
        // The first announcing step consumes the derivation even if its list
        // cannot be parsed.
        self.sub_queries_derived = true;

        let Some(reveal) = SubQueryReveal::from_detail(detail) else {
            return Vec::new();
        };
        let timers = reveal
            .schedule()
            .map(|(index, delay)| RevealTimer {
                target: RevealTarget::SubQuery(index),
                delay,
            })
            .collect();
        self.sub_queries = Some(reveal);
        timers
    }

    fn derive_documents(&mut self, detail: &str) -> Vec<RevealTimer> {
        if self.documents_derived {
            return Vec::new();
        }
        let Some(batch) = DocumentBatch::from_detail(detail) else {
            return Vec::new();
        };
        self.documents_derived = true;

        let timers = batch
            .schedule()
            .map(|(index, delay)| RevealTimer {
                target: RevealTarget::Document(index),
                delay,
            })
            .collect();
        self.documents = batch;
        timers
    }

    /// Applies a fired reveal timer. Returns true if something became visible.
    pub fn reveal(&mut self, target: RevealTarget) -> bool {
        match target {
            RevealTarget::SubQuery(index) => self
                .sub_queries
                .as_mut()
                .is_some_and(|queries| queries.reveal(index)),
            RevealTarget::Document(index) => self.documents.reveal(index),
        }
    }

    /// Clears the step log and all derived state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn steps(&self) -> &[ProcessStep] {
        &self.steps
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.current_phase
    }

    pub fn phase_status(&self, phase: Phase) -> PhaseStatus {
        if self.completed.contains(&phase) {
            PhaseStatus::Complete
        } else if self.current_phase == Some(phase) {
            PhaseStatus::Active
        } else {
            PhaseStatus::Pending
        }
    }

    pub fn sub_queries(&self) -> Vec<SubQuery> {
        self.sub_queries
            .as_ref()
            .map(SubQueryReveal::items)
            .unwrap_or_default()
    }

    pub fn documents(&self) -> &DocumentBatch {
        &self.documents
    }

    /// Builds the renderable view of this tracker.
    pub fn snapshot(
        &self,
        session_id: Option<SessionId>,
        state: SessionState,
        error: Option<String>,
    ) -> ProgressSnapshot {
        ProgressSnapshot {
            session_id,
            state,
            steps: self.steps.clone(),
            current_phase: self.current_phase,
            phases: Phase::ALL
                .iter()
                .map(|phase| PhaseView {
                    phase: *phase,
                    status: self.phase_status(*phase),
                })
                .collect(),
            sub_queries: self.sub_queries(),
            documents: self.documents.view(),
            error,
        }
    }
}

/// Status of one phase inside a [`ProgressSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseView {
    pub phase: Phase,
    pub status: PhaseStatus,
}

/// Renderable state of one progress session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProgressSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub state: SessionState,
    pub steps: Vec<ProcessStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<Phase>,
    pub phases: Vec<PhaseView>,
    pub sub_queries: Vec<SubQuery>,
    pub documents: DocumentBatchView,
    /// User-facing message when `state` is `Error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProgressSnapshot {
    pub fn phase_status(&self, phase: Phase) -> PhaseStatus {
        self.phases
            .iter()
            .find(|view| view.phase == phase)
            .map(|view| view.status)
            .unwrap_or(PhaseStatus::Pending)
    }
}
