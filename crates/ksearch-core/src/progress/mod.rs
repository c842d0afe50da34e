//! Live progress reconstruction.
//!
//! Turns the decoded progress stream of one session into a deterministic view:
//!
//! - `phase`: label classification into the closed [`Phase`] vocabulary
//! - `sub_query`: best-effort sub-query list extraction, revealed 500ms apart
//! - `documents`: document count extraction, placeholders revealed 150ms apart
//! - `reveal`: the staggered visibility both animators share
//! - `tracker`: the aggregate step log, phase pointer, and snapshot
//!
//! Everything here is synchronous. Timers and cancellation belong to the
//! session driver in the application layer.

pub mod documents;
pub mod phase;
pub mod reveal;
pub mod sub_query;
pub mod tracker;

pub use documents::{
    DocumentBatch, DocumentBatchView, MAX_DOCUMENT_PLACEHOLDERS, extract_document_count,
};
pub use phase::{DerivationTrigger, Phase, PhaseStatus, StepClassification, classify};
pub use reveal::{RevealTarget, RevealTimer, StaggeredReveal};
pub use sub_query::{SubQuery, SubQueryReveal, extract_sub_queries};
pub use tracker::{PhaseView, ProcessStep, ProgressSnapshot, ProgressTracker};
