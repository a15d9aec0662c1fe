//! decision-core
//!
//! Client-side runtime of an online decision service: given a context it
//! returns a ranked action distribution, records the decision for later
//! reward attribution, and periodically pulls fresh model data in the
//! background, hot-swapping the active model without blocking concurrent
//! requests.
//!
//! # Usage
//!
//! - (1) Build a [`LiveModel`] from a [`LiveModelConfig`] and a logging
//!   sink, then `init()`.
//! - (2) `choose_rank()` to pick an action from the context's action set.
//! - (3) `report_outcome()` to attribute the observed reward to that
//!   decision.
//!
//! Before the first background model update lands, rankings come from a
//! cold-start epsilon-greedy distribution; afterwards they come from the
//! active model. Sampling is a deterministic function of the event id and
//! the distribution, so logged decisions support offline counterfactual
//! evaluation.
//!
//! Model and transport backends are pluggable through string-keyed
//! factories ([`factory::ObjectFactory`]); the built-ins are the `"local"`
//! model and the `"remote-blob"` transport. Errors on background tasks are
//! delivered through a registered callback, never through a serving call's
//! return value.

pub mod config;
pub mod events;
pub mod explore;
pub mod factory;
pub mod live_model;
pub mod logger;
pub mod model;
pub mod response;
pub mod status;
pub mod telemetry;
pub mod transport;

pub use config::LiveModelConfig;
pub use live_model::LiveModel;
pub use logger::LogSink;
pub use response::{ActionProb, RankingResponse};
pub use status::{ApiError, ApiResult, ErrorCallback, ErrorCode};
