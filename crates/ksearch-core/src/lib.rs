//! Domain layer of the ksearch client.
//!
//! Holds the models of the remote knowledge search contract, the progress
//! stream decoder and tracker, the citation resolver, and the service traits
//! implemented by `ksearch-interaction`.

pub mod citation;
pub mod error;
pub mod progress;
pub mod search;
pub mod session;
pub mod stream;

// Re-export common error type
pub use error::{KsearchError, Result};
