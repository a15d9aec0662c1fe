//! Background model refresh.
//!
//! A single periodic task polls the transport for fresh model data and
//! hands successful downloads to the update callback. Fetch failures go to
//! the error callback and the loop simply waits for the next interval;
//! retry is by schedule, not immediate. One task means cycles can never
//! overlap: a slow cycle defers the next tick instead of stacking.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::ModelData;
use crate::status::{ApiError, ApiResult, ErrorCallback, ErrorCode};
use crate::transport::TransportCapability;

/// Invoked with each successfully downloaded model snapshot. Performs the
/// model update and flips the readiness flag on first success. Runs on the
/// refresh task.
pub type UpdateCallback = Arc<dyn Fn(&ModelData) -> ApiResult<()> + Send + Sync>;

/// Observable state of the refresh loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// Constructed, not started.
    Idle,
    /// Waiting for the next tick or fetching.
    Polling,
    /// Handing downloaded data to the model capability.
    Updating,
    /// Stopped after an explicit shutdown.
    Stopped,
}

/// Periodic model refresh manager.
pub struct ModelRefresher {
    transport: Arc<dyn TransportCapability>,
    interval: Duration,
    on_update: UpdateCallback,
    on_error: ErrorCallback,
    state: Arc<RwLock<RefreshState>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ModelRefresher {
    pub fn new(
        transport: Arc<dyn TransportCapability>,
        interval: Duration,
        on_update: UpdateCallback,
        on_error: ErrorCallback,
    ) -> Self {
        Self {
            transport,
            interval,
            on_update,
            on_error,
            state: Arc::new(RwLock::new(RefreshState::Idle)),
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    pub fn state(&self) -> RefreshState {
        *self.state.read()
    }

    /// Start the periodic loop. The first fetch runs immediately; later
    /// cycles run every `interval`.
    pub fn start(&mut self) -> ApiResult<()> {
        if self.task.is_some() {
            return Err(ApiError::new(
                ErrorCode::BackgroundTaskStart,
                "refresh task already started",
            ));
        }

        let transport = self.transport.clone();
        let on_update = self.on_update.clone();
        let on_error = self.on_error.clone();
        let state = self.state.clone();
        let cancel = self.cancel.clone();
        let interval = self.interval;

        *state.write() = RefreshState::Polling;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // A cycle that outlives its interval defers the next tick
            // rather than running ticks back to back.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut refresh_count: u32 = 0;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                match transport.fetch().await {
                    Ok(bytes) => {
                        *state.write() = RefreshState::Updating;
                        refresh_count += 1;
                        let data = ModelData::new(bytes, refresh_count);
                        debug!(refresh_count, size = data.len(), "model data downloaded");
                        if let Err(e) = (on_update)(&data) {
                            warn!(code = e.value(), "model update rejected: {e}");
                            (on_error)(&e);
                        }
                        *state.write() = RefreshState::Polling;
                    }
                    Err(e) => {
                        debug!(code = e.value(), "model fetch failed: {e}");
                        (on_error)(&e);
                    }
                }
            }
            *state.write() = RefreshState::Stopped;
            debug!("model refresh task stopped");
        }));
        Ok(())
    }

    /// Signal the loop to stop and wait for the in-flight cycle to drain.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::noop_error_callback;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingTransport {
        fetches: AtomicU32,
    }

    #[async_trait]
    impl TransportCapability for CountingTransport {
        async fn fetch(&self) -> ApiResult<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0u8; 4])
        }
    }

    #[tokio::test]
    async fn test_first_fetch_runs_immediately() {
        let transport = Arc::new(CountingTransport { fetches: AtomicU32::new(0) });
        let seen = Arc::new(AtomicU32::new(0));
        let seen_cb = seen.clone();
        let on_update: UpdateCallback = Arc::new(move |data| {
            seen_cb.store(data.refresh_count(), Ordering::SeqCst);
            Ok(())
        });

        let mut refresher = ModelRefresher::new(
            transport.clone(),
            Duration::from_secs(3600),
            on_update,
            noop_error_callback(),
        );
        assert_eq!(refresher.state(), RefreshState::Idle);
        refresher.start().unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(transport.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        refresher.stop().await;
        assert_eq!(refresher.state(), RefreshState::Stopped);
    }

    #[tokio::test]
    async fn test_double_start_fails() {
        let transport = Arc::new(CountingTransport { fetches: AtomicU32::new(0) });
        let on_update: UpdateCallback = Arc::new(|_| Ok(()));
        let mut refresher = ModelRefresher::new(
            transport,
            Duration::from_secs(3600),
            on_update,
            noop_error_callback(),
        );
        refresher.start().unwrap();
        let err = refresher.start().unwrap_err();
        assert_eq!(err.code(), ErrorCode::BackgroundTaskStart);
        refresher.stop().await;
    }
}
