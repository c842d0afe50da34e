//! Progress stream trait definition.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::session::SessionId;

/// Raw event payloads of one open stream connection.
///
/// Each `Ok` item is the data field of one server-sent event. An `Err` item
/// is a transport fault and ends the session. Dropping the stream releases
/// the connection.
pub type EventPayloadStream = BoxStream<'static, Result<String>>;

/// Opens the server-sent progress stream of a search session.
#[async_trait]
pub trait ProgressStream: Send + Sync {
    /// Connects to the stream scoped to `session_id`.
    ///
    /// # Errors
    /// Returns `KsearchError::Transport` if the connection cannot be
    /// established.
    async fn open(&self, session_id: &SessionId) -> Result<EventPayloadStream>;
}
