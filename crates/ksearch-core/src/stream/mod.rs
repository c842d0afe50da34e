//! Progress stream protocol.
//!
//! - `message`: decoding of event payloads into `StreamMessage`
//! - `service`: the `ProgressStream` connection trait

pub mod message;
pub mod service;

pub use message::{LogEntry, StreamMessage};
pub use service::{EventPayloadStream, ProgressStream};
