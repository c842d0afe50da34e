//! Decoding of progress stream event payloads.

use serde::{Deserialize, Serialize};

use crate::error::{KsearchError, Result};

/// One progress message emitted by the server for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Free-text label of the pipeline step (e.g., "Search complete")
    pub phase_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Server-side time of the step, passed through verbatim
    pub timestamp: String,
}

/// A decoded stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    /// Connection heartbeat with no content
    Keepalive,
    Log(LogEntry),
}

impl StreamMessage {
    /// Decodes the data field of one server-sent event.
    ///
    /// # Errors
    /// Returns `KsearchError::MalformedMessage` if the payload is not JSON, has
    /// an unknown `type`, or lacks a required field. Callers are expected to
    /// drop the message and keep the session alive.
    pub fn decode(payload: &str) -> Result<Self> {
        let wire: WireMessage = serde_json::from_str(payload.trim())
            .map_err(|err| KsearchError::malformed(format!("{err}: {}", preview(payload))))?;

        Ok(match wire {
            WireMessage::Keepalive => StreamMessage::Keepalive,
            WireMessage::Log {
                step,
                details,
                timestamp,
            } => StreamMessage::Log(LogEntry {
                phase_label: step,
                detail: details,
                timestamp,
            }),
        })
    }

    pub fn is_keepalive(&self) -> bool {
        matches!(self, StreamMessage::Keepalive)
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireMessage {
    Keepalive,
    Log {
        step: String,
        #[serde(default)]
        details: Option<String>,
        timestamp: String,
    },
}

fn preview(payload: &str) -> String {
    const MAX: usize = 80;
    if payload.chars().count() <= MAX {
        payload.to_string()
    } else {
        let cut: String = payload.chars().take(MAX).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_keepalive() {
        let message = StreamMessage::decode(r#"{"type": "keepalive"}"#).unwrap();
        assert!(message.is_keepalive());
    }

    #[test]
    fn test_decode_log_with_details() {
        let message = StreamMessage::decode(
            r#"{"type": "log", "step": "Search complete", "details": "Found 7 documents", "timestamp": "10:00:01"}"#,
        )
        .unwrap();

        assert_eq!(
            message,
            StreamMessage::Log(LogEntry {
                phase_label: "Search complete".to_string(),
                detail: Some("Found 7 documents".to_string()),
                timestamp: "10:00:01".to_string(),
            })
        );
    }

    #[test]
    fn test_decode_log_with_null_details() {
        let message = StreamMessage::decode(
            r#"{"type": "log", "step": "Searching for relevant documents...", "details": null, "timestamp": "10:00:00"}"#,
        )
        .unwrap();

        match message {
            StreamMessage::Log(entry) => assert!(entry.detail.is_none()),
            other => panic!("expected log entry, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_payload_is_malformed() {
        let err = StreamMessage::decode(r#"{"type": "log", "step": "Sear"#).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        let err = StreamMessage::decode(r#"{"type": "log", "step": "Search complete"}"#)
            .unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let err = StreamMessage::decode(r#"{"type": "done"}"#).unwrap_err();
        assert!(err.is_malformed());
        assert!(StreamMessage::decode("[1, 2]").unwrap_err().is_malformed());
    }
}
