//! Built-in blob transport.
//!
//! Resolves the configured model URI to a local filesystem path (`file://`
//! URI or bare path) and reads the blob from disk. Remote schemes require
//! a host-registered transport; the HTTP-oriented error codes in the
//! taxonomy exist for those implementations.

use std::path::PathBuf;

use async_trait::async_trait;

use super::TransportCapability;
use crate::config::LiveModelConfig;
use crate::status::{ApiError, ApiResult, ErrorCode};

/// Reads model blobs from the local filesystem.
pub struct BlobTransport {
    path: PathBuf,
}

impl BlobTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Build from the configured `model_uri`. Fails with `UriNotProvided`
    /// when no URI is configured and with `InvalidArgument` for schemes
    /// this transport cannot serve.
    pub fn from_config(config: &LiveModelConfig) -> ApiResult<Self> {
        let uri = config.model_uri.as_deref().ok_or_else(|| {
            ApiError::new(ErrorCode::UriNotProvided, "model_uri not set in configuration")
        })?;
        Ok(Self::new(resolve_uri(uri)?))
    }
}

fn resolve_uri(uri: &str) -> ApiResult<PathBuf> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if uri.contains("://") {
        return Err(ApiError::new(
            ErrorCode::InvalidArgument,
            format!("unsupported blob uri scheme in '{uri}'; register a custom transport"),
        ));
    }
    Ok(PathBuf::from(uri))
}

#[async_trait]
impl TransportCapability for BlobTransport {
    async fn fetch(&self) -> ApiResult<Vec<u8>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            ApiError::with_source(
                ErrorCode::TransportFetchFailed,
                format!("failed to read model blob at {}", self.path.display()),
                e,
            )
        })?;
        if bytes.is_empty() {
            return Err(ApiError::new(
                ErrorCode::BadContentLength,
                format!("model blob at {} is empty", self.path.display()),
            ));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_resolve_file_uri() {
        assert_eq!(resolve_uri("file:///tmp/m.bin").unwrap(), PathBuf::from("/tmp/m.bin"));
        assert_eq!(resolve_uri("/tmp/m.bin").unwrap(), PathBuf::from("/tmp/m.bin"));
    }

    #[test]
    fn test_remote_scheme_rejected() {
        let err = resolve_uri("https://example.com/m.bin").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn test_fetch_reads_blob() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1, 2, 3, 4]).unwrap();
        file.flush().unwrap();

        let transport = BlobTransport::new(file.path());
        assert_eq!(transport.fetch().await.unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_fetch_missing_blob_fails() {
        let transport = BlobTransport::new("/nonexistent/model.bin");
        let err = transport.fetch().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::TransportFetchFailed);
    }

    #[tokio::test]
    async fn test_fetch_empty_blob_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let transport = BlobTransport::new(file.path());
        let err = transport.fetch().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadContentLength);
    }
}
