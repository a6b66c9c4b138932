//! Cache-owning bundle orchestrator
//!
//! `Bundler<B>` wraps any [`Backend`] with the same get → produce → put
//! protocol. Backends only turn source text into a [`Bundle`]; they never
//! touch the cache. A backend whose output depends on more than the source
//! text and its options (scanned files, for example) contributes that extra
//! input through [`Backend::key_material`] so it becomes part of the key.

mod output;
pub mod request;

pub use output::Bundle;
pub use request::{BundleRequest, ResolvedSource};

use crate::cache::{compute_key, CacheKey, CacheStore};
use crate::error::BundleResult;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// A strategy turning source text (plus optional file context) into a bundle.
///
/// `produce` must be a pure function of `(source, path, options, extra)`:
/// same inputs, same output, and no side effects the caller can observe.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Options that influence the output. All of them land in the cache key.
    type Options: Serialize + Send + Sync;

    /// Stable backend identifier, part of the cache key
    fn name(&self) -> &'static str;

    /// Current options
    fn options(&self) -> &Self::Options;

    /// Additional inputs that affect the output beyond source and options
    async fn key_material(
        &self,
        _source: &str,
        _path: Option<&Path>,
    ) -> BundleResult<Option<Value>> {
        Ok(None)
    }

    /// Build the bundle. `extra` is whatever `key_material` returned.
    async fn produce(
        &self,
        source: &str,
        path: Option<&Path>,
        extra: Option<&Value>,
    ) -> BundleResult<Bundle>;
}

/// Options every bundler understands, independent of the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BundlerOptions {
    /// Skip cache reads. Results are still written, so a disabled run
    /// refreshes the entry a later cached run will read.
    pub disable_cache: bool,
}

/// Generic orchestrator pairing a backend with a cache
pub struct Bundler<B> {
    backend: B,
    cache: CacheStore,
    options: BundlerOptions,
}

impl<B: Backend> Bundler<B> {
    /// Create a bundler with caching enabled
    pub fn new(backend: B, cache: CacheStore) -> Self {
        Self {
            backend,
            cache,
            options: BundlerOptions::default(),
        }
    }

    /// Replace the bundler-level options
    pub fn with_options(mut self, options: BundlerOptions) -> Self {
        self.options = options;
        self
    }

    /// The wrapped backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The cache this bundler reads and writes
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Bundle the resource at `url`.
    ///
    /// `file:` URLs are read from disk; anything else is fetched over HTTP
    /// and bundled as literal source.
    pub async fn from_url(&self, url: &str) -> BundleResult<Bundle> {
        if let Ok(parsed) = Url::parse(url) {
            if parsed.scheme() == "file" {
                if let Ok(path) = parsed.to_file_path() {
                    return self.from_file(&path).await;
                }
            }
        }

        let source = crate::net::fetch_text(url).await?;
        self.from_src(&source, None).await
    }

    /// Bundle a file on disk
    pub async fn from_file(&self, path: impl AsRef<Path>) -> BundleResult<Bundle> {
        let path = path.as_ref();
        let source = request::read_source(path).await?;
        self.from_src(&source, Some(path)).await
    }

    /// Bundle any request kind
    pub async fn from_request(&self, request: &BundleRequest) -> BundleResult<Bundle> {
        let resolved = request.resolve().await?;
        self.from_src(&resolved.text, resolved.path.as_deref()).await
    }

    /// Bundle source text, consulting the cache first
    pub async fn from_src(&self, source: &str, path: Option<&Path>) -> BundleResult<Bundle> {
        let extra = self.backend.key_material(source, path).await?;
        let key = self.cache_key(source, path, extra.clone())?;

        if self.options.disable_cache {
            debug!("Cache disabled for {} build", self.backend.name());
        } else if let Some(bundle) = self.cache.get(&key).await? {
            return Ok(bundle);
        }

        info!(
            "Bundling with {}: {}",
            self.backend.name(),
            path.map(|p| p.display().to_string())
                .unwrap_or_else(|| "<inline>".to_string())
        );
        let bundle = self.backend.produce(source, path, extra.as_ref()).await?;
        self.cache.put(&key, bundle).await
    }

    /// Compute the cache key for a request without building it
    pub fn cache_key(
        &self,
        source: &str,
        path: Option<&Path>,
        extra: Option<Value>,
    ) -> BundleResult<String> {
        let key = CacheKey::new(
            self.backend.name(),
            source,
            path,
            self.backend.options(),
            extra,
        )?;
        compute_key(&key)
    }
}
