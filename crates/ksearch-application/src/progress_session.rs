//! Live progress session driver.
//!
//! A [`ProgressSession`] owns exactly one progress stream connection. A single
//! driver task reads the stream, feeds the [`ProgressTracker`], and publishes
//! a [`ProgressSnapshot`] after every change. Reveal timers run as separate
//! tasks that report back to the driver, so the tracker has one writer.

use futures::StreamExt;
use ksearch_core::progress::{ProgressSnapshot, ProgressTracker, RevealTarget, RevealTimer};
use ksearch_core::session::{SessionId, SessionState};
use ksearch_core::stream::{EventPayloadStream, ProgressStream, StreamMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Message surfaced when the progress stream fails.
pub const CONNECTION_LOST_MESSAGE: &str = "Connection lost. Please try again.";

enum Control {
    Complete,
}

/// Handle to one live progress session.
///
/// Dropping the handle cancels the session.
pub struct ProgressSession {
    session_id: SessionId,
    cancel: CancellationToken,
    control: mpsc::UnboundedSender<Control>,
    snapshots: watch::Receiver<ProgressSnapshot>,
    driver: Option<JoinHandle<()>>,
}

impl ProgressSession {
    /// Connects to the progress stream of `session_id` and starts tracking.
    ///
    /// Must be called within a tokio runtime. The session starts in
    /// `Connecting`; the connection is opened by the driver task.
    pub fn open(stream: Arc<dyn ProgressStream>, session_id: SessionId) -> Self {
        let cancel = CancellationToken::new();
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(ProgressSnapshot {
            session_id: Some(session_id.clone()),
            state: SessionState::Connecting,
            ..ProgressSnapshot::default()
        });
        let (reveal_tx, reveal_rx) = mpsc::unbounded_channel();

        let driver = SessionDriver {
            session_id: session_id.clone(),
            tracker: ProgressTracker::new(),
            state: SessionState::Connecting,
            error: None,
            snapshots: snapshot_tx,
            timers: cancel.child_token(),
            reveal_tx,
        };

        tracing::info!(session_id = %session_id, "Progress session opened");
        let handle = tokio::spawn(driver.run(stream, cancel.clone(), control_rx, reveal_rx));

        Self {
            session_id,
            cancel,
            control: control_tx,
            snapshots: snapshot_rx,
            driver: Some(handle),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.snapshots.borrow().state
    }

    /// Returns the latest published snapshot.
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribes to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.snapshots.clone()
    }

    /// Tears the session down: releases the connection, cancels pending
    /// reveals, and clears the progress log. No-op once terminal.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Marks the session completed because the search response arrived.
    /// No-op once terminal.
    pub fn complete(&self) {
        let _ = self.control.send(Control::Complete);
    }

    /// Waits until the driver has released the connection.
    pub async fn closed(&mut self) {
        if let Some(driver) = self.driver.take() {
            if let Err(err) = driver.await {
                tracing::error!(session_id = %self.session_id, "Progress driver failed: {}", err);
            }
        }
    }
}

impl Drop for ProgressSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for ProgressSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSession")
            .field("session_id", &self.session_id)
            .field("state", &self.state())
            .finish()
    }
}

/// State owned by the driver task.
struct SessionDriver {
    session_id: SessionId,
    tracker: ProgressTracker,
    state: SessionState,
    error: Option<String>,
    snapshots: watch::Sender<ProgressSnapshot>,
    /// Child of the session token; cancelling it stops every pending reveal
    timers: CancellationToken,
    reveal_tx: mpsc::UnboundedSender<RevealTarget>,
}

impl SessionDriver {
    async fn run(
        mut self,
        stream: Arc<dyn ProgressStream>,
        cancel: CancellationToken,
        mut control: mpsc::UnboundedReceiver<Control>,
        mut reveals: mpsc::UnboundedReceiver<RevealTarget>,
    ) {
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.finish_cancelled();
                return;
            }
            Some(Control::Complete) = control.recv() => {
                self.transition(SessionState::Completed);
                self.publish();
                return;
            }
            opened = stream.open(&self.session_id) => opened,
        };

        let mut events: EventPayloadStream = match opened {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    "Progress stream failed to open: {}",
                    err
                );
                self.fail();
                return;
            }
        };

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.finish_cancelled();
                    break;
                }
                command = control.recv() => {
                    match command {
                        Some(Control::Complete) => {
                            self.timers.cancel();
                            self.transition(SessionState::Completed);
                            self.publish();
                        }
                        // Handle gone without an explicit cancel
                        None => self.finish_cancelled(),
                    }
                    break;
                }
                Some(target) = reveals.recv() => {
                    if self.tracker.reveal(target) {
                        self.publish();
                    }
                }
                event = events.next() => match event {
                    Some(Ok(payload)) => self.on_payload(&payload),
                    Some(Err(err)) => {
                        tracing::warn!(
                            session_id = %self.session_id,
                            "Progress stream fault: {}",
                            err
                        );
                        self.fail();
                        break;
                    }
                    None => {
                        tracing::warn!(
                            session_id = %self.session_id,
                            "Progress stream ended before completion"
                        );
                        self.fail();
                        break;
                    }
                },
            }
        }

        drop(events);
        tracing::info!(
            session_id = %self.session_id,
            state = %self.state,
            "Progress stream released"
        );
    }

    fn on_payload(&mut self, payload: &str) {
        if self.state == SessionState::Connecting {
            self.transition(SessionState::Streaming);
        }

        match StreamMessage::decode(payload) {
            Ok(message) => {
                let timers = self.tracker.apply(message);
                self.schedule(timers);
            }
            Err(err) => {
                tracing::warn!(session_id = %self.session_id, "Dropping stream message: {}", err);
            }
        }
        self.publish();
    }

    /// Applies zero-delay reveals inline and spawns a timer task for the rest.
    fn schedule(&mut self, timers: Vec<RevealTimer>) {
        for timer in timers {
            if timer.delay.is_zero() {
                self.tracker.reveal(timer.target);
                continue;
            }

            let token = self.timers.clone();
            let reveal_tx = self.reveal_tx.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(timer.delay) => {
                        let _ = reveal_tx.send(timer.target);
                    }
                }
            });
        }
    }

    fn fail(&mut self) {
        self.timers.cancel();
        self.error = Some(CONNECTION_LOST_MESSAGE.to_string());
        self.transition(SessionState::Error);
        self.publish();
    }

    fn finish_cancelled(&mut self) {
        self.timers.cancel();
        self.tracker.reset();
        self.error = None;
        self.transition(SessionState::Cancelled);
        self.publish();
    }

    fn transition(&mut self, next: SessionState) {
        if self.state.can_transition_to(next) {
            tracing::debug!(session_id = %self.session_id, "{} -> {}", self.state, next);
            self.state = next;
        } else {
            tracing::debug!(session_id = %self.session_id, "Ignoring {} -> {}", self.state, next);
        }
    }

    fn publish(&self) {
        let snapshot = self.tracker.snapshot(
            Some(self.session_id.clone()),
            self.state,
            self.error.clone(),
        );
        self.snapshots.send_replace(snapshot);
    }
}
