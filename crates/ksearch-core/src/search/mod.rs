//! Search request/response domain.
//!
//! This module provides the answer and source models returned by the remote
//! knowledge search service, the wire types of its HTTP contract, and the
//! `SearchBackend` trait implemented by the interaction layer.

pub mod model;
pub mod service;

pub use model::{
    DEFAULT_FEEDBACK_KEY, FeedbackRequest, FeedbackScore, SearchErrorResponse, SearchRequest,
    SearchResponse, SearchResult, Source,
};
pub use service::SearchBackend;
