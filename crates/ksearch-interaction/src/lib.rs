//! Network side of the ksearch client.
//!
//! Implements the `ksearch-core` service traits against the search service:
//! [`HttpSearchBackend`] for `POST /search` and `POST /feedback`, and
//! [`SseProgressStream`] for the `GET /stream` server-sent progress events.
//! [`ClientConfig`] supplies the endpoint and tuning knobs for both.

pub mod config;
pub mod event_stream;
pub mod search_client;

pub use config::{ClientConfig, config_path, load_client_config_from};
pub use event_stream::SseProgressStream;
pub use search_client::{DEFAULT_SEARCH_ERROR, HttpSearchBackend};
