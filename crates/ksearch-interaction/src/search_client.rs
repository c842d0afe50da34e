//! HTTP implementation of [`SearchBackend`].
//!
//! `POST /search` carries the query and the session id that ties it to the
//! progress stream; `POST /feedback` rates a finished run.

use async_trait::async_trait;
use ksearch_core::search::{
    FeedbackRequest, SearchBackend, SearchErrorResponse, SearchRequest, SearchResponse,
    SearchResult,
};
use ksearch_core::session::SessionId;
use ksearch_core::{KsearchError, Result};
use reqwest::{Client, StatusCode};

use crate::config::ClientConfig;

/// Shown when a failed search carries no usable message.
pub const DEFAULT_SEARCH_ERROR: &str = "An error occurred while searching";

/// Search service client over HTTP.
#[derive(Clone)]
pub struct HttpSearchBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpSearchBackend {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Uses an existing client (shared connection pool, custom TLS, ...).
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, query: &str, session_id: &SessionId) -> Result<SearchResult> {
        let url = self.config.endpoint("/search");
        let request = SearchRequest {
            query: query.to_string(),
            session_id: session_id.as_str().to_string(),
        };

        tracing::debug!(session_id = %session_id, "POST {}", url);

        let mut builder = self.client.post(&url).json(&request);
        if let Some(timeout) = self.config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| KsearchError::transport(format!("Search request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Search request rejected");
            return Err(map_search_error(status, &body));
        }

        let payload: SearchResponse = response.json().await.map_err(|err| {
            KsearchError::Serialization {
                format: "JSON".to_string(),
                message: format!("Failed to parse search response: {err}"),
            }
        })?;

        Ok(payload.into_result(query))
    }

    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<()> {
        let url = self.config.endpoint("/feedback");
        let feedback = feedback.clone().with_key(self.config.feedback_key.clone());

        tracing::debug!(run_id = %feedback.run_id, score = feedback.score, "POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(&feedback)
            .send()
            .await
            .map_err(|err| KsearchError::transport(format!("Feedback request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_search_error(status, &body));
        }

        Ok(())
    }
}

/// Builds the error for a non-success response.
///
/// The message is the body's `error` field, else the raw body, else
/// [`DEFAULT_SEARCH_ERROR`].
fn map_search_error(status: StatusCode, body: &str) -> KsearchError {
    let message = serde_json::from_str::<SearchErrorResponse>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
        .or_else(|| {
            let raw = body.trim();
            (!raw.is_empty()).then(|| raw.to_string())
        })
        .unwrap_or_else(|| DEFAULT_SEARCH_ERROR.to_string());

    KsearchError::http(status.as_u16(), message)
}
