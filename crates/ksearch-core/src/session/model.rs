//! Search session identity and lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of one search submission.
///
/// The same id scopes the `/search` request and the `/stream` connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Mints a fresh id (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of one progress session.
///
/// ```text
/// Idle -> Connecting -> Streaming -> { Completed | Error | Cancelled }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    /// Session id minted, stream being opened
    Connecting,
    /// At least one stream message received
    Streaming,
    /// The companion search request resolved
    Completed,
    /// The stream transport failed
    Error,
    /// Superseded by a new search or torn down by the view
    Cancelled,
}

impl SessionState {
    /// Returns true once the session can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Error | SessionState::Cancelled
        )
    }

    /// Returns true if `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (Idle, Connecting) => true,
            (Idle, Cancelled) => true,
            (Connecting, Streaming | Error | Cancelled | Completed) => true,
            (Streaming, Completed | Error | Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Streaming => "streaming",
            SessionState::Completed => "completed",
            SessionState::Error => "error",
            SessionState::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}
