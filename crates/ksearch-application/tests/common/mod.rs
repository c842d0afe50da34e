#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc;
use ksearch_core::progress::ProgressSnapshot;
use ksearch_core::search::{FeedbackRequest, SearchBackend, SearchResult, Source};
use ksearch_core::session::SessionId;
use ksearch_core::stream::{EventPayloadStream, ProgressStream};
use ksearch_core::{KsearchError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

pub type EventSender = mpsc::UnboundedSender<Result<String>>;

struct Connection {
    sender: EventSender,
    receiver: Option<mpsc::UnboundedReceiver<Result<String>>>,
}

/// Counts drops of the stream it is moved into.
struct ReleaseGuard(Arc<AtomicUsize>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory progress stream. Tests push events per session id.
#[derive(Default)]
pub struct FakeProgressStream {
    connections: Mutex<HashMap<SessionId, Connection>>,
    opened: AtomicUsize,
    released: Arc<AtomicUsize>,
}

impl FakeProgressStream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sender feeding the stream of `session_id`, whether or not it is open yet.
    pub fn sender(&self, session_id: &SessionId) -> EventSender {
        let mut connections = self.connections.lock().unwrap();
        connections
            .entry(session_id.clone())
            .or_insert_with(Self::connection)
            .sender
            .clone()
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn connection() -> Connection {
        let (sender, receiver) = mpsc::unbounded();
        Connection {
            sender,
            receiver: Some(receiver),
        }
    }
}

#[async_trait]
impl ProgressStream for FakeProgressStream {
    async fn open(&self, session_id: &SessionId) -> Result<EventPayloadStream> {
        let receiver = {
            let mut connections = self.connections.lock().unwrap();
            connections
                .entry(session_id.clone())
                .or_insert_with(Self::connection)
                .receiver
                .take()
                .ok_or_else(|| KsearchError::transport("stream already open"))?
        };
        self.opened.fetch_add(1, Ordering::SeqCst);

        let guard = ReleaseGuard(self.released.clone());
        Ok(receiver
            .map(move |event| {
                let _ = &guard;
                event
            })
            .boxed())
    }
}

/// Search backend answering every query with a canned result or error.
pub struct FakeSearchBackend {
    response: std::result::Result<SearchResult, KsearchError>,
    pub searches: Mutex<Vec<(String, SessionId)>>,
    pub feedback: Mutex<Vec<FeedbackRequest>>,
}

impl FakeSearchBackend {
    pub fn answering(result: SearchResult) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(result),
            searches: Mutex::new(Vec::new()),
            feedback: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(err: KsearchError) -> Arc<Self> {
        Arc::new(Self {
            response: Err(err),
            searches: Mutex::new(Vec::new()),
            feedback: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SearchBackend for FakeSearchBackend {
    async fn search(&self, query: &str, session_id: &SessionId) -> Result<SearchResult> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), session_id.clone()));
        self.response.clone()
    }

    async fn submit_feedback(&self, feedback: &FeedbackRequest) -> Result<()> {
        self.feedback.lock().unwrap().push(feedback.clone());
        Ok(())
    }
}

pub fn sample_result(run_id: &str) -> SearchResult {
    SearchResult {
        query: "What are the fees?".to_string(),
        answer_text: "Fees are low [1].".to_string(),
        reasoning_text: String::new(),
        sources: vec![Source {
            id: 1,
            title: "Fee guide".to_string(),
            url: "https://example.com/fees".to_string(),
            excerpt: "Fees are low.".to_string(),
            date: None,
            kind: None,
        }],
        run_id: run_id.to_string(),
    }
}

pub fn log_event(step: &str, details: Option<&str>) -> String {
    let mut event = serde_json::json!({
        "type": "log",
        "step": step,
        "timestamp": "2024-05-01T10:00:00Z",
    });
    if let Some(details) = details {
        event["details"] = serde_json::Value::String(details.to_string());
    }
    event.to_string()
}

pub fn keepalive_event() -> String {
    r#"{"type":"keepalive"}"#.to_string()
}

/// Waits for a snapshot matching `predicate`, failing after five (virtual)
/// seconds.
pub async fn wait_for<F>(
    progress: &mut watch::Receiver<ProgressSnapshot>,
    predicate: F,
) -> ProgressSnapshot
where
    F: FnMut(&ProgressSnapshot) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), progress.wait_for(predicate))
        .await
        .expect("timed out waiting for snapshot")
        .expect("session dropped its snapshot channel")
        .clone()
}
