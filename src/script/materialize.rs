//! Entry-point materialization
//!
//! Bundler tooling resolves imports and project settings relative to the
//! entry file, so inline source is written to a temporary file inside the
//! project directory. The file lives exactly as long as the `EntryPoint`.

use crate::error::{BundleError, BundleResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Prefix shared by every temporary entry file
pub const ENTRY_PREFIX: &str = ".bundlekit-entry-";

/// The file a script engine is pointed at
#[derive(Debug)]
pub struct EntryPoint {
    path: PathBuf,
    // Removed from disk on drop
    temp: Option<NamedTempFile>,
}

impl EntryPoint {
    /// Use a real script file as-is
    pub fn existing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temp: None,
        }
    }

    /// Write `source` to a uniquely named file in `dir`
    pub fn materialize(source: &str, dir: &Path, extension: &str) -> BundleResult<Self> {
        let suffix = format!(".{}", extension.trim_start_matches('.'));
        let mut temp = tempfile::Builder::new()
            .prefix(ENTRY_PREFIX)
            .suffix(&suffix)
            .tempfile_in(dir)
            .map_err(|e| {
                BundleError::io(format!("creating entry file in {}", dir.display()), e)
            })?;

        temp.write_all(source.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|e| BundleError::io("writing entry file", e))?;

        let path = temp.path().to_path_buf();
        debug!("Materialized entry: {}", path.display());
        Ok(Self {
            path,
            temp: Some(temp),
        })
    }

    /// Choose between the caller's file and a temporary one.
    ///
    /// A request is materialized when it has no path, or when its path is
    /// the shared project config rather than a standalone script.
    pub fn prepare(
        source: &str,
        path: Option<&Path>,
        config_path: Option<&Path>,
        dir: &Path,
        extension: &str,
    ) -> BundleResult<Self> {
        match path {
            Some(path) if !config_path.is_some_and(|config| same_file(path, config)) => {
                Ok(Self::existing(path))
            }
            _ => Self::materialize(source, dir, extension),
        }
    }

    /// Path handed to the engine
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this entry is a temporary file
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
