//! Temporary config overrides with guaranteed restore
//!
//! A `ConfigOverlay` holds the path's lock and the file's original bytes.
//! Restoring is explicit on the happy path and automatic on drop, so an
//! early return, error or panic still puts the file back and releases the
//! lock.

use crate::error::{BundleError, BundleResult};
use crate::project::guard::{ConfigLease, ConfigLockRegistry};
use crate::project::merge::deep_merge;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// A config file currently carrying merged overrides
#[derive(Debug)]
pub struct ConfigOverlay {
    path: PathBuf,
    original: Option<Vec<u8>>,
    // Fields drop after Drop::drop returns, so the lock outlives the restore
    _lease: ConfigLease,
}

impl ConfigOverlay {
    /// Lock `path`, merge `overrides` into it and write the result
    pub async fn apply(
        registry: &ConfigLockRegistry,
        path: &Path,
        overrides: &Value,
    ) -> BundleResult<Self> {
        let lease = registry.acquire(path).await;

        let original = fs::read(path)
            .await
            .map_err(|e| BundleError::read(path, e))?;

        let mut merged = parse_config(path, &original)?;
        deep_merge(&mut merged, overrides);
        let mut content = serde_json::to_string_pretty(&merged)?;
        content.push('\n');

        let overlay = Self {
            path: path.to_path_buf(),
            original: Some(original),
            _lease: lease,
        };

        // A failed write drops `overlay`, which restores the original bytes
        fs::write(path, content)
            .await
            .map_err(|e| BundleError::io(format!("writing config {}", path.display()), e))?;

        debug!("Applied config overrides to {}", path.display());
        Ok(overlay)
    }

    /// Put the original bytes back and release the lock
    pub async fn restore(mut self) -> BundleResult<()> {
        if let Some(original) = self.original.take() {
            if let Err(e) = fs::write(&self.path, &original).await {
                // Leave it for Drop to retry
                self.original = Some(original);
                return Err(BundleError::io(
                    format!("restoring config {}", self.path.display()),
                    e,
                ));
            }
            debug!("Restored config {}", self.path.display());
        }
        Ok(())
    }
}

impl Drop for ConfigOverlay {
    fn drop(&mut self) {
        if let Some(original) = self.original.take() {
            if let Err(e) = std::fs::write(&self.path, &original) {
                warn!("Failed to restore config {}: {}", self.path.display(), e);
            } else {
                debug!("Restored config {} on drop", self.path.display());
            }
        }
    }
}

/// Run `build` with `overrides` merged into the config at `path`.
///
/// The file reads back byte-identical afterwards whether `build` succeeds or
/// fails; a build error takes precedence over a restore error.
pub async fn with_overrides<F, Fut, T>(
    registry: &ConfigLockRegistry,
    path: &Path,
    overrides: &Value,
    build: F,
) -> BundleResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = BundleResult<T>>,
{
    let overlay = ConfigOverlay::apply(registry, path, overrides).await?;
    let result = build().await;
    let restored = overlay.restore().await;

    let value = result?;
    restored?;
    Ok(value)
}

fn parse_config(path: &Path, bytes: &[u8]) -> BundleResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(bytes).map_err(|e| BundleError::ConfigInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
