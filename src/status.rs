//! Error codes and rich status reporting.
//!
//! Every public operation returns [`ApiResult`]. The numeric values of
//! [`ErrorCode`] are stable across versions so hosts can switch on them
//! at FFI or telemetry boundaries without string matching.

use std::sync::Arc;

use thiserror::Error;

/// Stable numeric error taxonomy.
///
/// Serving-path failures (invalid arguments, not initialized, exploration
/// errors) are returned to the caller; transport failures only ever reach
/// the registered error callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// Null or empty identifier, context, or outcome argument.
    InvalidArgument = 1,
    /// The event queue was at capacity; the payload was not enqueued.
    /// Non-fatal: the computed ranking or outcome still stands.
    BackgroundQueueOverflow = 2,
    /// Generic transport-layer failure (reserved for host transports).
    HttpGeneric = 3,
    /// Transport returned a bad status code (reserved for host transports).
    HttpBadStatusCode = 4,
    /// The context describes no actions to rank.
    ActionNotFound = 5,
    /// The background refresh task could not be started.
    BackgroundTaskStart = 6,
    /// A serving call was made before a successful `init`.
    NotInitialized = 7,
    /// A factory constructor reported failure; the underlying error is
    /// attached as the source.
    CreateFnFailed = 9,
    /// The requested key is not registered with the factory.
    TypeNotRegistered = 10,
    /// No model URI was configured for the transport backend.
    UriNotProvided = 11,
    /// Last-Modified header missing from the model source response.
    LastModifiedNotFound = 12,
    /// Last-Modified header could not be parsed as a date-time.
    LastModifiedInvalid = 13,
    /// Content length missing, zero, or inconsistent with the payload.
    BadContentLength = 14,
    /// The model fetch itself failed (I/O, connectivity).
    TransportFetchFailed = 15,
    /// Sampling or distribution generation failed (degenerate pdf).
    ExplorationError = 16,
    /// The context payload could not be parsed.
    ContextParse = 17,
    /// The model capability rejected a model data payload.
    ModelUpdateFailed = 18,
    /// The model capability failed to produce a ranking.
    ModelRankFailed = 19,
    /// An event payload could not be serialized.
    EventSerialization = 20,
}

impl ErrorCode {
    /// Numeric value of this code. Success is 0 and is represented by `Ok`.
    pub fn value(self) -> i32 {
        self as i32
    }
}

/// Rich status for a failed operation: a stable code, a human-readable
/// message, and optionally the underlying error that caused it.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), source: None }
    }

    /// Wrap an underlying error without swallowing it.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Numeric return code, matching `code().value()`.
    pub fn value(&self) -> i32 {
        self.code.value()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Callback for errors raised on background tasks (model refresh, event
/// forwarding). Invoked from those tasks, never from a serving call; must
/// be safe to call concurrently with serving calls and must not panic.
pub type ErrorCallback = Arc<dyn Fn(&ApiError) + Send + Sync>;

/// An error callback that discards everything. Background failures are
/// still logged via `tracing` at their source.
pub fn noop_error_callback() -> ErrorCallback {
    Arc::new(|_| {})
}
