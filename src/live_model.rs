//! The `LiveModel` façade.
//!
//! Orchestrates the exploration engine, the model and transport
//! capabilities, the background refresh loop, and the event logger behind
//! three operations: `init`, `choose_rank`, `report_outcome`.
//!
//! Until the first background model update lands, `choose_rank` serves
//! cold-start epsilon-greedy rankings; afterwards it delegates to the model
//! capability. The readiness flip is one-way and the model swap is atomic
//! to concurrent rankings.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::config::LiveModelConfig;
use crate::events;
use crate::explore;
use crate::factory::{ModelFactory, TransportFactory};
use crate::logger::{EventLogger, LogSink};
use crate::model::{
    default_model_factory, ModelCapability, ModelRefresher, UpdateCallback, NO_MODEL_SENTINEL,
};
use crate::response::RankingResponse;
use crate::status::{noop_error_callback, ApiError, ApiResult, ErrorCallback, ErrorCode};
use crate::transport::{default_transport_factory, TransportCapability};

/// Client handle for the decision service runtime.
///
/// Owns its implementation state exclusively; move-only by design.
pub struct LiveModel {
    config: LiveModelConfig,
    error_cb: ErrorCallback,
    model_factory: ModelFactory,
    transport_factory: TransportFactory,
    sink: Arc<dyn LogSink>,
    logger: Option<EventLogger>,
    model: Option<Arc<dyn ModelCapability>>,
    refresher: Option<ModelRefresher>,
    model_ready: Arc<AtomicBool>,
    epsilon: f32,
    initialized: bool,
}

impl LiveModel {
    /// Create an uninitialized instance with the default factories and a
    /// no-op error callback. Call [`init`](Self::init) before serving.
    pub fn new(config: LiveModelConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            config,
            error_cb: noop_error_callback(),
            model_factory: default_model_factory(),
            transport_factory: default_transport_factory(),
            sink,
            logger: None,
            model: None,
            refresher: None,
            model_ready: Arc::new(AtomicBool::new(false)),
            epsilon: 0.0,
            initialized: false,
        }
    }

    /// Register a callback for errors raised on background tasks. Invoked
    /// from those tasks only; must be panic-free and thread-safe.
    pub fn with_error_callback(mut self, callback: ErrorCallback) -> Self {
        self.error_cb = callback;
        self
    }

    /// Replace the model factory (advanced extension point).
    pub fn with_model_factory(mut self, factory: ModelFactory) -> Self {
        self.model_factory = factory;
        self
    }

    /// Replace the transport factory (advanced extension point).
    pub fn with_transport_factory(mut self, factory: TransportFactory) -> Self {
        self.transport_factory = factory;
        self
    }

    /// Initialize the runtime, in strict order: event logger, model
    /// capability, transport capability, background refresh, exploration
    /// epsilon. Stops at the first failure and leaves the instance
    /// unusable; serving calls then fail with `NotInitialized`.
    pub async fn init(&mut self) -> ApiResult<()> {
        if self.initialized {
            return Ok(());
        }

        let logger = EventLogger::new(
            self.sink.clone(),
            self.config.logger_capacity,
            self.error_cb.clone(),
        );

        let model: Arc<dyn ModelCapability> =
            Arc::from(self.model_factory.create(&self.config.model_backend, &self.config)?);

        let transport: Arc<dyn TransportCapability> = Arc::from(
            self.transport_factory.create(&self.config.transport_backend, &self.config)?,
        );

        let ready = self.model_ready.clone();
        let update_model = model.clone();
        let on_update: UpdateCallback = Arc::new(move |data| {
            update_model.update(data)?;
            // One-way flip, first successful update only.
            ready.store(true, Ordering::Release);
            Ok(())
        });
        let mut refresher = ModelRefresher::new(
            transport,
            self.config.refresh_interval,
            on_update,
            self.error_cb.clone(),
        );
        refresher.start()?;

        self.epsilon = self.config.initial_epsilon;
        self.logger = Some(logger);
        self.model = Some(model);
        self.refresher = Some(refresher);
        self.initialized = true;
        info!(
            model_backend = %self.config.model_backend,
            transport_backend = %self.config.transport_backend,
            epsilon = self.epsilon,
            "live model initialized"
        );
        Ok(())
    }

    /// True once the first background model update has landed. Never
    /// reverts to false for the lifetime of this instance.
    pub fn is_model_ready(&self) -> bool {
        self.model_ready.load(Ordering::Acquire)
    }

    /// Choose an action for `context`, writing the ranking into `response`.
    ///
    /// `event_id` identifies this interaction for later outcome
    /// attribution; pass `None` to have one generated and stamped into the
    /// response. When the ranking succeeded but the event could not be
    /// enqueued, `response` is still fully populated and the returned error
    /// carries `BackgroundQueueOverflow`.
    pub fn choose_rank(
        &self,
        event_id: Option<&str>,
        context: &str,
        response: &mut RankingResponse,
    ) -> ApiResult<()> {
        response.reset();
        let (logger, model) = self.serving_state()?;
        if let Some(id) = event_id {
            check_non_empty(id, "event id")?;
        }
        check_non_empty(context, "context")?;

        let event_id: String = match event_id {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };

        let ranked = if self.is_model_ready() {
            model.rank(&event_id, context)?
        } else {
            let mut r = explore::explore_only(&event_id, context, self.epsilon)?;
            r.set_model_id(NO_MODEL_SENTINEL);
            r
        };
        *response = ranked;
        response.set_event_id(&event_id);
        debug!(
            event_id = %event_id,
            chosen = response.chosen_action_id(),
            model_id = %response.model_id(),
            "ranking produced"
        );

        let payload = events::serialize_ranking(&event_id, context, response)?;
        logger.append_ranking(payload)
    }

    /// Report the outcome observed for a prior interaction.
    pub fn report_outcome(&self, event_id: &str, outcome: &str) -> ApiResult<()> {
        let (logger, _) = self.serving_state()?;
        check_non_empty(event_id, "event id")?;
        check_non_empty(outcome, "outcome")?;

        let payload = events::serialize_outcome(event_id, outcome)?;
        logger.append_outcome(payload)
    }

    /// Report a numeric reward for a prior interaction.
    pub fn report_outcome_reward(&self, event_id: &str, reward: f32) -> ApiResult<()> {
        self.report_outcome(event_id, &events::reward_to_outcome(reward))
    }

    /// Stop the background refresh loop (waiting for the in-flight cycle
    /// to drain) and flush the event buffer.
    pub async fn shutdown(&mut self) {
        if let Some(mut refresher) = self.refresher.take() {
            refresher.stop().await;
        }
        if let Some(mut logger) = self.logger.take() {
            logger.shutdown().await;
        }
        self.model = None;
        self.initialized = false;
        info!("live model shut down");
    }

    fn serving_state(&self) -> ApiResult<(&EventLogger, &Arc<dyn ModelCapability>)> {
        match (self.initialized, &self.logger, &self.model) {
            (true, Some(logger), Some(model)) => Ok((logger, model)),
            _ => Err(ApiError::new(
                ErrorCode::NotInitialized,
                "call init() before choose_rank/report_outcome",
            )),
        }
    }
}

fn check_non_empty(value: &str, what: &str) -> ApiResult<()> {
    if value.is_empty() {
        return Err(ApiError::new(ErrorCode::InvalidArgument, format!("{what} must not be empty")));
    }
    Ok(())
}
