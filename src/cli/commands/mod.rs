//! CLI command implementations

pub mod cache;
pub mod config;
pub mod css;
pub mod script;
pub mod style;

pub use cache::execute as cache;
pub use config::execute as config;
pub use css::execute as css;
pub use script::execute as script;
pub use style::execute as style;

use crate::bundler::{Bundle, BundlerOptions};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{BundleError, BundleResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Open the cache the configuration points at
pub(crate) fn open_cache(config: &Config) -> BundleResult<CacheStore> {
    match &config.cache.dir {
        Some(dir) => CacheStore::with_dir(dir),
        None => CacheStore::for_app(&config.cache.app_name),
    }
}

/// Bundler-level options from config and the `--no-cache` flag
pub(crate) fn bundler_options(config: &Config, no_cache: bool) -> BundlerOptions {
    BundlerOptions {
        disable_cache: no_cache || config.cache.disable,
    }
}

pub(crate) fn current_dir() -> BundleResult<PathBuf> {
    std::env::current_dir().map_err(|e| BundleError::io("getting current directory", e))
}

/// Write the bundle to `output`, or to stdout
pub(crate) async fn emit(bundle: &Bundle, output: Option<&Path>) -> BundleResult<()> {
    match output {
        Some(path) => {
            fs::write(path, &bundle.source_code)
                .await
                .map_err(|e| BundleError::io(format!("writing {}", path.display()), e))?;
            if let Some(map) = &bundle.source_map {
                let mut map_path = path.as_os_str().to_owned();
                map_path.push(".map");
                fs::write(&map_path, map)
                    .await
                    .map_err(|e| BundleError::io(format!("writing {}.map", path.display()), e))?;
            }
            info!("Wrote {}", path.display());
        }
        None => print!("{}", bundle.source_code),
    }
    Ok(())
}
