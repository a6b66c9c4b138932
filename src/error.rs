//! Error types for bundlekit
//!
//! All modules use `BundleResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bundlekit operations
pub type BundleResult<T> = Result<T, BundleError>;

/// All errors that can occur while bundling
#[derive(Error, Debug)]
pub enum BundleError {
    // Input errors
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid stylesheet specifier: {0}")]
    InvalidSpecifier(String),

    // Remote errors
    #[error("Failed to fetch {url}: {reason}")]
    Network { url: String, reason: String },

    // Backend errors
    #[error("{backend} bundling failed:\n{diagnostics}")]
    Bundle {
        backend: String,
        diagnostics: String,
    },

    // Cache errors
    #[error("Cache IO error: {context}")]
    CacheIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BundleError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a cache IO error with context
    pub fn cache_io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::CacheIo {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a backend failure carrying the tool's diagnostic output
    pub fn backend(backend: impl Into<String>, diagnostics: impl Into<String>) -> Self {
        Self::Bundle {
            backend: backend.into(),
            diagnostics: diagnostics.into(),
        }
    }

    /// Create a network error
    pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Map a read error on `path` to `NotFound` or a contextual IO error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::io(format!("reading {}", path.display()), source)
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandFailed { .. } => {
                Some("Check that the bundler executable is installed and on PATH")
            }
            Self::InvalidSpecifier(_) => {
                Some("Use a relative path (./x.css) or an npm:/jsr:/https: specifier")
            }
            Self::CacheIo { .. } => Some("Run: bundlekit cache clear"),
            _ => None,
        }
    }
}
