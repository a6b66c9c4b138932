//! Bundle requests and their resolution to source text

use crate::error::{BundleError, BundleResult};
use std::path::{Path, PathBuf};

/// What a caller asks to have bundled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleRequest {
    /// Literal source text
    Literal(String),

    /// A file on disk
    File(PathBuf),

    /// Source of a zero-argument callback, e.g. `async () => { ... }`
    Callback(String),
}

/// A request reduced to the inputs the cache key is computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub text: String,
    pub path: Option<PathBuf>,
}

impl BundleRequest {
    /// Read files and wrap callbacks so the request becomes plain source text
    pub async fn resolve(&self) -> BundleResult<ResolvedSource> {
        match self {
            Self::Literal(text) => Ok(ResolvedSource {
                text: text.clone(),
                path: None,
            }),
            Self::File(path) => Ok(ResolvedSource {
                text: read_source(path).await?,
                path: Some(path.clone()),
            }),
            Self::Callback(source) => Ok(ResolvedSource {
                text: wrap_callback(source),
                path: None,
            }),
        }
    }
}

/// Read a source file, mapping a missing file to `NotFound`
pub async fn read_source(path: &Path) -> BundleResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| BundleError::read(path, e))
}

/// Whether callback source text declares an async function
pub fn is_async_callback(source: &str) -> bool {
    let trimmed = source.trim_start();
    trimmed
        .strip_prefix("async")
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_whitespace() || c == '('))
}

/// Turn callback source into an immediately-invoked expression statement.
///
/// Async callbacks are awaited at module top level.
pub fn wrap_callback(source: &str) -> String {
    let body = source.trim();
    if is_async_callback(body) {
        format!("await ({})();\n", body)
    } else {
        format!("({})();\n", body)
    }
}
