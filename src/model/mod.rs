//! Model capabilities: data container, the model trait, and the default
//! backend factory.

mod local;
mod refresh;

pub use local::LocalModel;
pub use refresh::{ModelRefresher, RefreshState, UpdateCallback};

use crate::factory::{ModelFactory, ObjectFactory};
use crate::response::RankingResponse;
use crate::status::ApiResult;

/// Factory key of the built-in in-process model backend.
pub const LOCAL_MODEL: &str = "local";

/// Model id reported before the first model update lands.
pub const NO_MODEL_SENTINEL: &str = "N/A";

/// One downloaded model snapshot: an opaque byte buffer plus a counter
/// incremented on each successful download.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    data: Vec<u8>,
    refresh_count: u32,
}

impl ModelData {
    pub fn new(data: Vec<u8>, refresh_count: u32) -> Self {
        Self { data, refresh_count }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Strictly increasing across the lifetime of one refresh manager.
    pub fn refresh_count(&self) -> u32 {
        self.refresh_count
    }
}

/// A decision model: ingests downloaded model data and produces rankings.
///
/// `update` is called from the background refresh path while `rank` is
/// called concurrently from serving calls; implementations must make the
/// update appear atomic to readers (e.g. swap one snapshot value under a
/// lock) so a ranking never observes a partially-applied model.
pub trait ModelCapability: Send + Sync {
    /// Replace internal state from a downloaded model snapshot.
    fn update(&self, data: &ModelData) -> ApiResult<()>;

    /// Rank the actions in `context`, sampling deterministically by `seed`.
    fn rank(&self, seed: &str, context: &str) -> ApiResult<RankingResponse>;
}

/// Model factory with the built-in backends registered.
pub fn default_model_factory() -> ModelFactory {
    let mut factory: ModelFactory = ObjectFactory::new();
    factory.register(LOCAL_MODEL, Box::new(|_config| Ok(Box::new(LocalModel::new()) as _)));
    factory
}
