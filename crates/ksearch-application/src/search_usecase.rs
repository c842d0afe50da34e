//! Search use case.
//!
//! Coordinates the `/search` round trip with the progress session scoped to
//! it. At most one progress session is live at a time; starting a search
//! cancels the previous one before the new stream is opened.

use crate::progress_session::ProgressSession;
use ksearch_core::progress::ProgressSnapshot;
use ksearch_core::search::{FeedbackRequest, FeedbackScore, SearchBackend, SearchResult};
use ksearch_core::session::SessionId;
use ksearch_core::stream::ProgressStream;
use ksearch_core::{KsearchError, Result};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

/// Shown when feedback is attempted on a result the server gave no run id.
pub const FEEDBACK_UNAVAILABLE_MESSAGE: &str = "Feedback is not available for this answer";

/// A submitted search whose progress is live.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    pub query: String,
    pub session_id: SessionId,
    /// Progress snapshots of this search's session
    pub progress: watch::Receiver<ProgressSnapshot>,
}

/// Use case for submitting searches and rating their answers.
///
/// # Thread Safety
///
/// The live session sits behind a `tokio::sync::Mutex`, so concurrent
/// submissions are serialized and never leave two streams open.
pub struct SearchUseCase {
    backend: Arc<dyn SearchBackend>,
    stream: Arc<dyn ProgressStream>,
    active: Mutex<Option<ProgressSession>>,
}

impl SearchUseCase {
    pub fn new(backend: Arc<dyn SearchBackend>, stream: Arc<dyn ProgressStream>) -> Self {
        Self {
            backend,
            stream,
            active: Mutex::new(None),
        }
    }

    /// Starts a search: cancels any live session, mints a session id, and
    /// opens its progress stream.
    ///
    /// # Errors
    ///
    /// Returns `KsearchError::InvalidInput` for a blank query.
    pub async fn begin(&self, query: &str) -> Result<SearchTicket> {
        let query = query.trim();
        if query.is_empty() {
            return Err(KsearchError::invalid_input("Query must not be empty"));
        }

        let mut active = self.active.lock().await;
        if let Some(mut previous) = active.take() {
            tracing::info!(session_id = %previous.session_id(), "Cancelling previous search");
            previous.cancel();
            previous.closed().await;
        }

        let session_id = SessionId::generate();
        let session = ProgressSession::open(self.stream.clone(), session_id.clone());
        let progress = session.subscribe();
        *active = Some(session);

        Ok(SearchTicket {
            query: query.to_string(),
            session_id,
            progress,
        })
    }

    /// Sends the search request for `ticket` and settles its session.
    ///
    /// On success the session completes; on failure it is torn down and the
    /// error is returned as a user-facing message. A ticket superseded by a
    /// newer search leaves the current session untouched.
    pub async fn run(&self, ticket: &SearchTicket) -> std::result::Result<SearchResult, String> {
        let outcome = self
            .backend
            .search(&ticket.query, &ticket.session_id)
            .await;

        let active = self.active.lock().await;
        match active.as_ref() {
            Some(session) if session.session_id() == &ticket.session_id => match &outcome {
                Ok(_) => session.complete(),
                Err(_) => session.cancel(),
            },
            _ => {
                tracing::debug!(
                    session_id = %ticket.session_id,
                    "Search response for a superseded session"
                );
            }
        }

        outcome.map_err(|err| {
            tracing::warn!(session_id = %ticket.session_id, "Search failed: {}", err);
            err.user_message()
        })
    }

    /// Convenience for `begin` followed by `run`.
    pub async fn search(&self, query: &str) -> std::result::Result<SearchResult, String> {
        let ticket = self.begin(query).await.map_err(|err| err.user_message())?;
        self.run(&ticket).await
    }

    /// Cancels the live session, if any.
    pub async fn cancel_active(&self) {
        if let Some(mut session) = self.active.lock().await.take() {
            session.cancel();
            session.closed().await;
        }
    }

    /// Returns true if `session_id` belongs to the most recent search.
    pub async fn is_current(&self, session_id: &SessionId) -> bool {
        self.active
            .lock()
            .await
            .as_ref()
            .is_some_and(|session| session.session_id() == session_id)
    }

    /// Latest snapshot of the live session.
    pub async fn progress(&self) -> Option<ProgressSnapshot> {
        self.active.lock().await.as_ref().map(ProgressSession::snapshot)
    }

    /// Rates `result`. Refused locally when the result carries no run id.
    pub async fn submit_feedback(
        &self,
        result: &SearchResult,
        score: FeedbackScore,
        comment: Option<String>,
    ) -> std::result::Result<(), String> {
        if !result.accepts_feedback() {
            return Err(FEEDBACK_UNAVAILABLE_MESSAGE.to_string());
        }

        let feedback = FeedbackRequest::new(result.run_id.clone(), score, comment);
        self.backend
            .submit_feedback(&feedback)
            .await
            .map_err(|err| {
                tracing::warn!(run_id = %result.run_id, "Feedback failed: {}", err);
                err.user_message()
            })
    }
}
