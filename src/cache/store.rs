//! On-disk bundle store
//!
//! One JSON file per key. A missing file is a cache miss; every other read
//! failure is reported, so permission and disk faults are never mistaken
//! for misses.

use crate::bundler::Bundle;
use crate::cache::dir::resolve_cache_directory;
use crate::error::{BundleError, BundleResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Content-addressed bundle cache rooted at one directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Open the process-wide cache for `app_name`
    pub fn for_app(app_name: &str) -> BundleResult<Self> {
        Ok(Self {
            dir: resolve_cache_directory(app_name)?,
        })
    }

    /// Open a cache rooted at an explicit directory, creating it if missing
    pub fn with_dir(dir: impl Into<PathBuf>) -> BundleResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            BundleError::cache_io(format!("creating cache directory {}", dir.display()), e)
        })?;
        Ok(Self { dir })
    }

    /// Cache directory
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Look up a cached bundle by key
    pub async fn get(&self, key: &str) -> BundleResult<Option<Bundle>> {
        let path = self.entry_path(key);

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Cache miss: {}", key);
                return Ok(None);
            }
            Err(e) => {
                return Err(BundleError::cache_io(
                    format!("reading cache entry {}", path.display()),
                    e,
                ))
            }
        };

        let bundle: Bundle = serde_json::from_str(&content)?;
        debug!("Cache hit: {}", key);
        Ok(Some(bundle))
    }

    /// Persist `bundle` under `key` and hand it back unchanged
    pub async fn put(&self, key: &str, bundle: Bundle) -> BundleResult<Bundle> {
        let path = self.entry_path(key);
        let content = serde_json::to_string(&bundle)?;

        // Write beside the entry and rename so readers never see a partial file
        let staging = self
            .dir
            .join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4().simple()));
        fs::write(&staging, content).await.map_err(|e| {
            BundleError::cache_io(format!("writing cache entry {}", staging.display()), e)
        })?;

        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(BundleError::cache_io(
                format!("committing cache entry {}", path.display()),
                e,
            ));
        }

        debug!("Cached bundle {} ({} bytes)", key, bundle.source_code.len());
        Ok(bundle)
    }

    /// Number of committed entries
    pub async fn entry_count(&self) -> BundleResult<usize> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(BundleError::cache_io("reading cache directory", e)),
        };

        let mut count = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BundleError::cache_io("reading cache entry", e))?
        {
            let committed = !entry.file_name().to_string_lossy().starts_with('.');
            if committed && entry.path().is_file() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Remove every entry, returning how many were deleted
    pub async fn clear(&self) -> BundleResult<usize> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(BundleError::cache_io("reading cache directory", e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BundleError::cache_io("reading cache entry", e))?
        {
            let path = entry.path();
            if path.is_file() {
                fs::remove_file(&path).await.map_err(|e| {
                    BundleError::cache_io(format!("removing cache entry {}", path.display()), e)
                })?;
                removed += 1;
            }
        }

        debug!("Cleared {} cache entries from {}", removed, self.dir.display());
        Ok(removed)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}
