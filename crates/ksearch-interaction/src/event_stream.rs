//! Server-sent events implementation of [`ProgressStream`].

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use ksearch_core::session::SessionId;
use ksearch_core::stream::{EventPayloadStream, ProgressStream};
use ksearch_core::{KsearchError, Result};
use reqwest::Client;
use reqwest::header::ACCEPT;

use crate::config::ClientConfig;

/// Opens `GET /stream?id=<session_id>` and yields each event's data field.
///
/// No request timeout is applied; the stream stays open for as long as the
/// search runs.
#[derive(Clone)]
pub struct SseProgressStream {
    client: Client,
    config: ClientConfig,
}

impl SseProgressStream {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ProgressStream for SseProgressStream {
    async fn open(&self, session_id: &SessionId) -> Result<EventPayloadStream> {
        let url = self.config.endpoint("/stream");
        tracing::debug!(session_id = %session_id, "Opening progress stream {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("id", session_id.as_str())])
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|err| KsearchError::transport(format!("Stream connection failed: {err}")))?;

        if !response.status().is_success() {
            return Err(KsearchError::transport(format!(
                "Stream rejected with HTTP {}",
                response.status().as_u16()
            )));
        }

        let events = response
            .bytes_stream()
            .eventsource()
            .map(|event| match event {
                Ok(event) => Ok(event.data),
                Err(err) => Err(KsearchError::transport(format!("Stream interrupted: {err}"))),
            });

        Ok(events.boxed())
    }
}
