//! Asset Preloading
//!
//! Every texture a board can show is loaded before the board is built.
//! How textures are fetched is up to the embedding renderer.

use async_trait::async_trait;
use tracing::debug;

/// Asset loading failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed to load asset {path}: {reason}")]
pub struct AssetError {
    /// Path that failed
    pub path: String,
    /// Loader-specific reason
    pub reason: String,
}

/// Loads textures ahead of the first board build.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Load every path. Completes once all of them are ready.
    async fn load_all(&self, paths: &[String]) -> Result<(), AssetError>;
}

/// Loader for headless sessions; nothing needs fetching.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAssetLoader;

#[async_trait]
impl AssetLoader for NoopAssetLoader {
    async fn load_all(&self, paths: &[String]) -> Result<(), AssetError> {
        debug!(count = paths.len(), "Skipping asset preload");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::weapon::{asset_paths, default_catalog, BACK_TEXTURE_PATH};

    #[tokio::test]
    async fn test_noop_loader_accepts_catalog() {
        let paths = asset_paths(&default_catalog());
        assert_eq!(paths.last().map(String::as_str), Some(BACK_TEXTURE_PATH));
        assert!(NoopAssetLoader.load_all(&paths).await.is_ok());
    }

    #[test]
    fn test_error_message() {
        let err = AssetError {
            path: "assets/awp.png".into(),
            reason: "not found".into(),
        };
        assert_eq!(err.to_string(), "Failed to load asset assets/awp.png: not found");
    }
}
