//! Search service trait definition.

use async_trait::async_trait;

use crate::error::Result;
use crate::search::{FeedbackRequest, SearchResult};
use crate::session::SessionId;

/// Request/response side of the remote search service.
///
/// Both calls are single-shot: implementations must not retry.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Issues a search whose progress is reported on the stream scoped to
    /// `session_id`.
    ///
    /// # Returns
    /// The answer with its sources, or `KsearchError::Http` carrying the
    /// server's error text for a non-success status.
    async fn search(&self, query: &str, session_id: &SessionId) -> Result<SearchResult>;

    /// Submits a rating for a previous result.
    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<()>;
}
