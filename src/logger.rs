//! Buffered event logger.
//!
//! Serving calls hand pre-serialized events to [`EventLogger`]; the cost to
//! the caller is one bounded-channel `try_send`. A forwarding task drains
//! the buffer into the sink, so transmission never blocks the decision
//! path. Losing telemetry must not break serving: enqueue failure is
//! reported to the caller's status but the computed result still stands.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::status::{ApiError, ApiResult, ErrorCallback, ErrorCode};

/// Destination for serialized events (an external telemetry backend).
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn enqueue(&self, event: Vec<u8>) -> ApiResult<()>;
}

/// Buffers events in a bounded channel and forwards them to a [`LogSink`]
/// on a background task. Sink failures are routed to the error callback.
pub struct EventLogger {
    tx: Option<mpsc::Sender<Vec<u8>>>,
    worker: Option<JoinHandle<()>>,
}

impl EventLogger {
    /// Spawn the forwarding task. `capacity` bounds the number of buffered
    /// events; beyond it `append_*` fails with queue overflow.
    pub fn new(sink: Arc<dyn LogSink>, capacity: usize, on_error: ErrorCallback) -> Self {
        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(capacity.max(1));
        let worker = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = sink.enqueue(event).await {
                    warn!(code = e.value(), "event sink rejected payload: {e}");
                    (on_error)(&e);
                }
            }
            debug!("event logger drained and stopped");
        });
        Self { tx: Some(tx), worker: Some(worker) }
    }

    /// Hand a serialized ranking event to the sink buffer.
    pub fn append_ranking(&self, event: Vec<u8>) -> ApiResult<()> {
        self.append(event)
    }

    /// Hand a serialized outcome event to the sink buffer.
    pub fn append_outcome(&self, event: Vec<u8>) -> ApiResult<()> {
        self.append(event)
    }

    fn append(&self, event: Vec<u8>) -> ApiResult<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| ApiError::new(ErrorCode::NotInitialized, "event logger stopped"))?;
        tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ApiError::new(
                ErrorCode::BackgroundQueueOverflow,
                "event buffer at capacity; payload dropped",
            ),
            mpsc::error::TrySendError::Closed(_) => {
                ApiError::new(ErrorCode::BackgroundQueueOverflow, "event buffer closed")
            }
        })
    }

    /// Close the buffer and wait for already-enqueued events to drain.
    pub async fn shutdown(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
    }
}
