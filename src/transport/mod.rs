//! Transport capabilities: fetching model data from a remote source.

mod blob;

pub use blob::BlobTransport;

use async_trait::async_trait;

use crate::factory::{ObjectFactory, TransportFactory};
use crate::status::ApiResult;

/// Factory key of the built-in blob transport.
pub const REMOTE_BLOB: &str = "remote-blob";

/// Fetches the current model data bytes. Concrete implementations are
/// storage or HTTP clients outside this crate's scope; hosts register them
/// through the transport factory.
#[async_trait]
pub trait TransportCapability: Send + Sync {
    async fn fetch(&self) -> ApiResult<Vec<u8>>;
}

impl std::fmt::Debug for dyn TransportCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TransportCapability")
    }
}

/// Transport factory with the built-in backends registered.
pub fn default_transport_factory() -> TransportFactory {
    let mut factory: TransportFactory = ObjectFactory::new();
    factory.register(
        REMOTE_BLOB,
        Box::new(|config| BlobTransport::from_config(config).map(|t| Box::new(t) as _)),
    );
    factory
}
