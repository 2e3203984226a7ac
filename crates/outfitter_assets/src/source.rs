use std::sync::Arc;
use std::time::Duration;

use outfitter_scene::{Prefab, SharedPrefab};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::errors::{AssetError, Result};
use crate::io::{AssetReader, AssetReaderVariant};
use crate::loaders::GltfLoader;

/// Where the wardrobe gets its models and metadata from.
///
/// URIs are relative, percent-encoded paths such as `WEARABLES/Hats/Helmet%20Green.glb`.
pub trait AssetSource: Send + Sync {
    /// Fetches and parses a model.
    fn load_prefab(&self, uri: &str) -> impl std::future::Future<Output = Result<SharedPrefab>> + Send;

    /// Fetches raw bytes (metadata JSON and the like).
    fn read_bytes(&self, uri: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

// ============================================================================
// Asset Server
// ============================================================================

/// Reader-backed source that parses glTF and caches prefabs by URI.
pub struct AssetServer<R: AssetReader = AssetReaderVariant> {
    reader: R,
    prefabs: RwLock<FxHashMap<String, SharedPrefab>>,
}

impl AssetServer<AssetReaderVariant> {
    /// Builds a server for a local directory or an `http(s)://` root.
    pub fn from_source(root: &str) -> Result<Self> {
        Ok(Self::new(AssetReaderVariant::from_source(root)?))
    }
}

impl<R: AssetReader> AssetServer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            prefabs: RwLock::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub fn reader(&self) -> &R {
        &self.reader
    }

    #[must_use]
    pub fn cached_prefabs(&self) -> usize {
        self.prefabs.read().len()
    }

    pub fn clear_cache(&self) {
        self.prefabs.write().clear();
    }
}

impl<R: AssetReader> AssetSource for AssetServer<R> {
    async fn load_prefab(&self, uri: &str) -> Result<SharedPrefab> {
        let cached = self.prefabs.read().get(uri).cloned();
        if let Some(prefab) = cached {
            log::debug!("Prefab cache hit: {uri}");
            return Ok(prefab);
        }

        let bytes = self.reader.read_bytes(uri).await?;
        let prefab = Arc::new(GltfLoader::load_from_slice(&bytes, uri)?);
        self.prefabs.write().insert(uri.to_string(), Arc::clone(&prefab));
        Ok(prefab)
    }

    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        self.reader.read_bytes(uri).await
    }
}

// ============================================================================
// In-memory source
// ============================================================================

/// Source backed by prefabs and files registered up front.
///
/// Used for procedurally built models and in tests. An optional artificial
/// latency is applied to every request.
#[derive(Default)]
pub struct MemoryAssetSource {
    prefabs: RwLock<FxHashMap<String, SharedPrefab>>,
    files: RwLock<FxHashMap<String, Vec<u8>>>,
    latency: Duration,
}

impl MemoryAssetSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn insert_prefab(&self, uri: &str, prefab: Prefab) {
        self.prefabs.write().insert(uri.to_string(), Arc::new(prefab));
    }

    pub fn insert_bytes(&self, uri: &str, bytes: impl Into<Vec<u8>>) {
        self.files.write().insert(uri.to_string(), bytes.into());
    }

    pub fn remove(&self, uri: &str) {
        self.prefabs.write().remove(uri);
        self.files.write().remove(uri);
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl AssetSource for MemoryAssetSource {
    async fn load_prefab(&self, uri: &str) -> Result<SharedPrefab> {
        self.delay().await;

        let prefab = self.prefabs.read().get(uri).cloned();
        if let Some(prefab) = prefab {
            return Ok(prefab);
        }

        // Raw glTF registered as bytes.
        let bytes = self.files.read().get(uri).cloned();
        match bytes {
            Some(bytes) => Ok(Arc::new(GltfLoader::load_from_slice(&bytes, uri)?)),
            None => Err(AssetError::NotFound(uri.to_string())),
        }
    }

    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        self.delay().await;

        let bytes = self.files.read().get(uri).cloned();
        bytes.ok_or_else(|| AssetError::NotFound(uri.to_string()))
    }
}
