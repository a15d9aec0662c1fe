//! String-keyed capability factories.
//!
//! The two pluggable extension points (model backends and transport
//! backends) are resolved through an [`ObjectFactory`]: a registry mapping
//! a key to a constructor. Registries are explicit values threaded through
//! to whoever constructs capabilities, not process-wide singletons.
//! Registration happens at startup; `create` is read-only afterwards.

use std::collections::HashMap;

use crate::config::LiveModelConfig;
use crate::model::ModelCapability;
use crate::status::{ApiError, ApiResult, ErrorCode};
use crate::transport::TransportCapability;

/// Constructor registered under a factory key. Receives the runtime
/// configuration so backends can read their own settings.
pub type Constructor<T> =
    Box<dyn Fn(&LiveModelConfig) -> ApiResult<Box<T>> + Send + Sync>;

/// Registry mapping a string key to a capability constructor.
pub struct ObjectFactory<T: ?Sized> {
    constructors: HashMap<String, Constructor<T>>,
}

/// Factory for model capabilities.
pub type ModelFactory = ObjectFactory<dyn ModelCapability>;

/// Factory for transport capabilities.
pub type TransportFactory = ObjectFactory<dyn TransportCapability>;

impl<T: ?Sized> ObjectFactory<T> {
    pub fn new() -> Self {
        Self { constructors: HashMap::new() }
    }

    /// Associate `key` with a constructor, replacing any previous entry.
    pub fn register(&mut self, key: impl Into<String>, constructor: Constructor<T>) {
        self.constructors.insert(key.into(), constructor);
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// Look up `key` and invoke its constructor.
    ///
    /// Fails with `TypeNotRegistered` for an unknown key and with
    /// `CreateFnFailed` (the constructor's error attached as source) when
    /// construction itself fails.
    pub fn create(&self, key: &str, config: &LiveModelConfig) -> ApiResult<Box<T>> {
        let constructor = self.constructors.get(key).ok_or_else(|| {
            ApiError::new(
                ErrorCode::TypeNotRegistered,
                format!("type not registered with factory: '{key}'"),
            )
        })?;
        constructor(config).map_err(|e| {
            ApiError::with_source(
                ErrorCode::CreateFnFailed,
                format!("create function failed for '{key}': {e}"),
                e,
            )
        })
    }
}

impl<T: ?Sized> Default for ObjectFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}
