//! Cache directory resolution
//!
//! Picks the platform-conventional cache root, appends the application
//! name, creates the directory and memoizes the result for the lifetime of
//! the process.

use crate::error::{BundleError, BundleResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing::debug;

/// Last-resort cache root on Windows when no environment hint is present
const WINDOWS_FALLBACK_ROOT: &str = r"C:\Windows\Temp";

/// Last-resort cache root on Unix-like systems
const UNIX_FALLBACK_ROOT: &str = "/tmp";

static RESOLVED: OnceLock<Mutex<HashMap<String, PathBuf>>> = OnceLock::new();

/// Platform family that decides the cache-root convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFamily {
    /// XDG-style: `$XDG_CACHE_HOME`, `~/.cache`, `/tmp`
    Unix,
    /// `%LOCALAPPDATA%`, `%USERPROFILE%\AppData\Local`, `%TEMP%`
    Windows,
}

impl PlatformFamily {
    /// Detect the current platform family
    pub fn detect() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }
}

/// Compute the cache directory for `app_name` without touching the disk.
///
/// `var` looks up environment variables; empty values count as unset.
/// `home` is only consulted on Unix.
pub fn cache_dir_for(
    family: PlatformFamily,
    app_name: &str,
    var: impl Fn(&str) -> Option<String>,
    home: Option<PathBuf>,
) -> PathBuf {
    let lookup = |name: &str| var(name).filter(|v| !v.is_empty()).map(PathBuf::from);

    let root = match family {
        PlatformFamily::Unix => lookup("XDG_CACHE_HOME")
            .or_else(|| home.map(|h| h.join(".cache")))
            .unwrap_or_else(|| PathBuf::from(UNIX_FALLBACK_ROOT)),
        PlatformFamily::Windows => lookup("LOCALAPPDATA")
            .or_else(|| lookup("USERPROFILE").map(|p| p.join("AppData").join("Local")))
            .or_else(|| lookup("TEMP"))
            .unwrap_or_else(|| PathBuf::from(WINDOWS_FALLBACK_ROOT)),
    };

    root.join(app_name)
}

/// Resolve (and create) the process-wide cache directory for `app_name`.
///
/// The first successful call per app name wins; later calls return the
/// memoized path even if the environment changed in between.
pub fn resolve_cache_directory(app_name: &str) -> BundleResult<PathBuf> {
    let resolved = RESOLVED.get_or_init(|| Mutex::new(HashMap::new()));
    let mut resolved = resolved.lock().unwrap_or_else(|e| e.into_inner());

    if let Some(dir) = resolved.get(app_name) {
        return Ok(dir.clone());
    }

    let dir = cache_dir_for(
        PlatformFamily::detect(),
        app_name,
        |name| std::env::var(name).ok(),
        dirs::home_dir(),
    );

    std::fs::create_dir_all(&dir).map_err(|e| {
        BundleError::cache_io(format!("creating cache directory {}", dir.display()), e)
    })?;

    debug!("Resolved cache directory: {}", dir.display());
    resolved.insert(app_name.to_string(), dir.clone());
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn unix_prefers_xdg_cache_home() {
        let dir = cache_dir_for(
            PlatformFamily::Unix,
            "app",
            env(&[("XDG_CACHE_HOME", "/xdg")]),
            Some(PathBuf::from("/home/u")),
        );
        assert_eq!(dir, PathBuf::from("/xdg/app"));
    }

    #[test]
    fn unix_falls_back_to_home_then_tmp() {
        let dir = cache_dir_for(
            PlatformFamily::Unix,
            "app",
            env(&[("XDG_CACHE_HOME", "")]),
            Some(PathBuf::from("/home/u")),
        );
        assert_eq!(dir, PathBuf::from("/home/u/.cache/app"));

        let dir = cache_dir_for(PlatformFamily::Unix, "app", env(&[]), None);
        assert_eq!(dir, PathBuf::from("/tmp/app"));
    }

    #[test]
    fn windows_resolution_order() {
        let dir = cache_dir_for(
            PlatformFamily::Windows,
            "app",
            env(&[("LOCALAPPDATA", "L"), ("USERPROFILE", "U"), ("TEMP", "T")]),
            None,
        );
        assert_eq!(dir, PathBuf::from("L").join("app"));

        let dir = cache_dir_for(
            PlatformFamily::Windows,
            "app",
            env(&[("USERPROFILE", "U"), ("TEMP", "T")]),
            None,
        );
        assert_eq!(dir, PathBuf::from("U").join("AppData").join("Local").join("app"));

        let dir = cache_dir_for(PlatformFamily::Windows, "app", env(&[("TEMP", "T")]), None);
        assert_eq!(dir, PathBuf::from("T").join("app"));

        let dir = cache_dir_for(PlatformFamily::Windows, "app", env(&[]), None);
        assert_eq!(dir, PathBuf::from(WINDOWS_FALLBACK_ROOT).join("app"));
    }

    #[test]
    #[serial]
    fn resolve_creates_and_memoizes() {
        if PlatformFamily::detect() != PlatformFamily::Unix {
            return;
        }
        let temp = TempDir::new().unwrap();
        let previous = std::env::var_os("XDG_CACHE_HOME");
        std::env::set_var("XDG_CACHE_HOME", temp.path());

        let first = resolve_cache_directory("bundlekit-dir-test").unwrap();
        assert!(first.is_dir());
        assert_eq!(first, temp.path().join("bundlekit-dir-test"));

        std::env::set_var("XDG_CACHE_HOME", "/somewhere/else");
        let second = resolve_cache_directory("bundlekit-dir-test").unwrap();
        assert_eq!(first, second);

        match previous {
            Some(v) => std::env::set_var("XDG_CACHE_HOME", v),
            None => std::env::remove_var("XDG_CACHE_HOME"),
        }
    }
}
