//! Per-path config locks
//!
//! One async mutex per distinct config file. The registry only keeps weak
//! references, so a lock lives exactly as long as someone holds or waits
//! on it; dead entries are pruned on every acquire.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

static GLOBAL: OnceLock<Arc<ConfigLockRegistry>> = OnceLock::new();

/// Registry handing out one lock per config path
#[derive(Debug, Default)]
pub struct ConfigLockRegistry {
    locks: Mutex<HashMap<PathBuf, Weak<AsyncMutex<()>>>>,
}

/// Exclusive hold on one config path, released on drop
#[derive(Debug)]
pub struct ConfigLease {
    path: PathBuf,
    _guard: OwnedMutexGuard<()>,
}

impl ConfigLease {
    /// Normalized path this lease covers
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ConfigLease {
    fn drop(&mut self) {
        debug!("Released config lock: {}", self.path.display());
    }
}

impl ConfigLockRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry shared by every script bundler by default
    pub fn global() -> Arc<ConfigLockRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ConfigLockRegistry::new())))
    }

    /// Wait for exclusive access to `path`
    pub async fn acquire(&self, path: &Path) -> ConfigLease {
        let path = normalize(path);
        let lock = self.lock_for(&path);

        debug!("Waiting for config lock: {}", path.display());
        let guard = lock.lock_owned().await;
        debug!("Acquired config lock: {}", path.display());

        ConfigLease {
            path,
            _guard: guard,
        }
    }

    /// Number of paths with a live lock (held or awaited)
    pub fn tracked(&self) -> usize {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|_, weak| weak.strong_count() > 0);
        locks.len()
    }

    fn lock_for(&self, path: &Path) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|_, weak| weak.strong_count() > 0);

        if let Some(lock) = locks.get(path).and_then(Weak::upgrade) {
            return lock;
        }

        let lock = Arc::new(AsyncMutex::new(()));
        locks.insert(path.to_path_buf(), Arc::downgrade(&lock));
        lock
    }
}

/// Map different spellings of the same file onto one key
fn normalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn same_path_is_exclusive() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("deno.json");
        std::fs::write(&config, "{}").unwrap();
        let registry = ConfigLockRegistry::new();

        let lease = registry.acquire(&config).await;
        let second = tokio::time::timeout(Duration::from_millis(50), registry.acquire(&config));
        assert!(second.await.is_err(), "second acquire must wait");

        drop(lease);
        let second = tokio::time::timeout(Duration::from_secs(1), registry.acquire(&config));
        assert!(second.await.is_ok());
    }

    #[tokio::test]
    async fn different_paths_do_not_block() {
        let temp = TempDir::new().unwrap();
        let registry = ConfigLockRegistry::new();

        let a_path = temp.path().join("a.json");
        let b_path = temp.path().join("b.json");

        let _a = registry.acquire(&a_path).await;
        let b = tokio::time::timeout(Duration::from_millis(200), registry.acquire(&b_path));
        assert!(b.await.is_ok());
    }

    #[tokio::test]
    async fn equivalent_spellings_share_a_lock() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("sub")).unwrap();
        let config = temp.path().join("deno.json");
        std::fs::write(&config, "{}").unwrap();
        let registry = ConfigLockRegistry::new();

        let lease = registry.acquire(&config).await;
        let alias = temp.path().join("sub").join("..").join("deno.json");
        assert_eq!(lease.path(), normalize(&alias));
        let second = tokio::time::timeout(Duration::from_millis(50), registry.acquire(&alias));
        assert!(second.await.is_err());
    }

    #[tokio::test]
    async fn released_locks_are_reclaimed() {
        let temp = TempDir::new().unwrap();
        let registry = ConfigLockRegistry::new();

        {
            let _a = registry.acquire(&temp.path().join("a.json")).await;
            let _b = registry.acquire(&temp.path().join("b.json")).await;
            assert_eq!(registry.tracked(), 2);
        }

        assert_eq!(registry.tracked(), 0);
    }
}
