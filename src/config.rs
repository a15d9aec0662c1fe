//! Runtime configuration with environment-variable loading.
//!
//! All values can be loaded from `DECISION_CORE_*` environment variables
//! with sensible defaults. Invalid values fall back to defaults without
//! crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `DECISION_CORE_EPSILON` | 0.2 | Cold-start exploration epsilon |
//! | `DECISION_CORE_REFRESH_INTERVAL` | 300 | Model refresh interval (secs) |
//! | `DECISION_CORE_MODEL_BACKEND` | local | Model factory key |
//! | `DECISION_CORE_TRANSPORT_BACKEND` | remote-blob | Transport factory key |
//! | `DECISION_CORE_MODEL_URI` | (unset) | Model blob URI for the default transport |
//! | `DECISION_CORE_LOGGER_CAPACITY` | 256 | Max buffered events before enqueue fails |

use std::time::Duration;

use crate::model::LOCAL_MODEL;
use crate::transport::REMOTE_BLOB;

/// Configuration consumed by [`crate::LiveModel`] and the capability
/// factories. Construct directly, via `Default`, or via [`load`].
#[derive(Debug, Clone)]
pub struct LiveModelConfig {
    /// Epsilon used for cold-start epsilon-greedy exploration.
    pub initial_epsilon: f32,
    /// Interval between background model refresh cycles.
    pub refresh_interval: Duration,
    /// Key resolved against the model factory.
    pub model_backend: String,
    /// Key resolved against the transport factory.
    pub transport_backend: String,
    /// Model blob location for the default transport (`file://` URI or
    /// bare path). Host transports may interpret other schemes.
    pub model_uri: Option<String>,
    /// Event buffer capacity; `append_*` fails with queue overflow beyond it.
    pub logger_capacity: usize,
}

impl Default for LiveModelConfig {
    fn default() -> Self {
        Self {
            initial_epsilon: 0.2,
            refresh_interval: Duration::from_secs(300),
            model_backend: LOCAL_MODEL.to_string(),
            transport_backend: REMOTE_BLOB.to_string(),
            model_uri: None,
            logger_capacity: 256,
        }
    }
}

/// Parse an `f32` env var, returning `default` on missing or invalid.
fn parse_f32(key: &str, default: f32) -> f32 {
    match std::env::var(key) {
        Ok(val) => val.parse::<f32>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> LiveModelConfig {
    let epsilon = parse_f32("DECISION_CORE_EPSILON", 0.2).clamp(0.0, 1.0);
    let refresh_secs = parse_u64("DECISION_CORE_REFRESH_INTERVAL", 300).max(1);
    let logger_capacity = parse_usize("DECISION_CORE_LOGGER_CAPACITY", 256).max(1);

    let model_backend =
        std::env::var("DECISION_CORE_MODEL_BACKEND").unwrap_or_else(|_| LOCAL_MODEL.to_string());
    let transport_backend = std::env::var("DECISION_CORE_TRANSPORT_BACKEND")
        .unwrap_or_else(|_| REMOTE_BLOB.to_string());
    let model_uri = std::env::var("DECISION_CORE_MODEL_URI").ok().filter(|s| !s.is_empty());

    LiveModelConfig {
        initial_epsilon: epsilon,
        refresh_interval: Duration::from_secs(refresh_secs),
        model_backend,
        transport_backend,
        model_uri,
        logger_capacity,
    }
}
