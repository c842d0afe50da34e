//! Application layer for ksearch.
//!
//! This crate provides the use cases that drive a search end to end: the
//! live progress session bound to one stream connection, and the search use
//! case that pairs it with the `/search` and `/feedback` round trips.

pub mod progress_session;
pub mod search_usecase;

pub use progress_session::{CONNECTION_LOST_MESSAGE, ProgressSession};
pub use search_usecase::{FEEDBACK_UNAVAILABLE_MESSAGE, SearchTicket, SearchUseCase};
