//! Supabase Storage access for slide imagery.
//!
//! All report assets live in the public `astro-forecasts` bucket and are
//! fetched read-only over HTTP. A moka cache in front keeps hot slides
//! (intro pages, month images) from being re-downloaded per report.

use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const BUCKET: &str = "astro-forecasts";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("GET {path} failed with status {status}")]
    Http { path: String, status: u16 },
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Read-only object fetch, keyed by bucket-relative path. Implemented by
/// `SupabaseStorage` in production and by in-memory stubs in tests.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Fetch an absolute URL (forecast catalog rows carry full URLs).
    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, StorageError>;
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
}

impl SupabaseConfig {
    pub fn from_env() -> Result<Self, String> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| "SUPABASE_URL must be set".to_string())?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
        })
    }
}

pub struct SupabaseStorage {
    base_url: String,
    client: reqwest::Client,
}

impl SupabaseStorage {
    pub fn new(config: SupabaseConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: format!("{}/storage/v1/object/public/{}", config.url, BUCKET),
            client,
        }
    }

    pub fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl AssetStore for SupabaseStorage {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let url = self.object_url(path);
        let response = self.client.get(&url).send().await?;
        match response.status().as_u16() {
            200 => Ok(response.bytes().await?.to_vec()),
            404 => Err(StorageError::NotFound(path.to_string())),
            status => Err(StorageError::Http {
                path: path.to_string(),
                status,
            }),
        }
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, StorageError> {
        let response = self.client.get(url).send().await?;
        match response.status().as_u16() {
            200 => Ok(response.bytes().await?.to_vec()),
            404 => Err(StorageError::NotFound(url.to_string())),
            status => Err(StorageError::Http {
                path: url.to_string(),
                status,
            }),
        }
    }
}

/// Caching decorator over any `AssetStore`.
pub struct CachedStore {
    inner: Arc<dyn AssetStore>,
    cache: Cache<String, Arc<Vec<u8>>>,
}

impl CachedStore {
    pub fn new(inner: Arc<dyn AssetStore>) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(30 * 60))
            .max_capacity(256)
            .build();
        Self { inner, cache }
    }
}

#[async_trait]
impl AssetStore for CachedStore {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        if let Some(bytes) = self.cache.get(path).await {
            log::debug!("asset cache hit: {}", path);
            return Ok(bytes.as_ref().clone());
        }
        let bytes = self.inner.fetch(path).await?;
        self.cache
            .insert(path.to_string(), Arc::new(bytes.clone()))
            .await;
        Ok(bytes)
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, StorageError> {
        // Catalog URLs are report-specific, not worth caching.
        self.inner.fetch_url(url).await
    }
}
