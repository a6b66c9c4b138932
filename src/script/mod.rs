//! Script bundling
//!
//! `ScriptBundler` adapts any [`ScriptEngine`] to the [`Backend`] contract.
//! Around each engine run it:
//!
//! 1. materializes inline source as a temporary entry file in the project
//!    directory,
//! 2. merges config overrides into the shared project config under its lock,
//! 3. runs the engine against the entry file,
//! 4. restores the config and removes the temporary entry, on every path.
//!
//! Two engines ship with the crate:
//! - [`SubprocessEngine`]: drives esbuild through an external JS runtime
//! - [`EmbeddedEngine`]: calls an in-process [`LibraryBundler`]

pub mod embedded;
pub mod materialize;
pub mod subprocess;

pub use embedded::{EmbeddedEngine, EmbeddedOptions, LibraryBundler, OutputChunk};
pub use materialize::EntryPoint;
pub use subprocess::{SubprocessEngine, SubprocessOptions};

use crate::bundler::request::wrap_callback;
use crate::bundler::{Backend, Bundle, Bundler};
use crate::error::BundleResult;
use crate::project::{with_overrides, ConfigLockRegistry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Something that bundles a script entry file inside a project
#[async_trait]
pub trait ScriptEngine: Send + Sync {
    /// Engine-specific options; part of the cache key
    type Options: Serialize + Send + Sync;

    /// Stable engine identifier
    fn name(&self) -> &'static str;

    /// Bundle `entry`, resolving project context from `project_dir`
    async fn bundle_entry(
        &self,
        entry: &Path,
        project_dir: &Path,
        options: &Self::Options,
    ) -> BundleResult<Bundle>;
}

/// Project-level options shared by every script engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptOptions {
    /// Directory the engine runs in and temporary entries are written to
    pub project_dir: PathBuf,

    /// Shared project config consulted by the engine (e.g. `deno.json`)
    pub config_path: Option<PathBuf>,

    /// Overrides merged into the project config for the build's duration
    pub config_overrides: Option<Value>,

    /// Extension for materialized entry files
    pub entry_extension: String,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            config_path: None,
            config_overrides: None,
            entry_extension: "ts".to_string(),
        }
    }
}

/// Full option set of a script bundler, as it enters the cache key
#[derive(Debug, Clone, Serialize)]
pub struct ScriptBundlerOptions<O> {
    pub project: ScriptOptions,
    pub engine: O,
}

/// [`Backend`] wrapping a script engine with entry materialization and
/// project-config mutation
pub struct ScriptBundler<E: ScriptEngine> {
    engine: E,
    options: ScriptBundlerOptions<E::Options>,
    locks: Arc<ConfigLockRegistry>,
}

impl<E: ScriptEngine> ScriptBundler<E> {
    /// Create a script bundler. `locks` is usually
    /// [`ConfigLockRegistry::global`]; builds only exclude each other when
    /// they share a registry.
    pub fn new(
        engine: E,
        project: ScriptOptions,
        engine_options: E::Options,
        locks: Arc<ConfigLockRegistry>,
    ) -> Self {
        Self {
            engine,
            options: ScriptBundlerOptions {
                project,
                engine: engine_options,
            },
            locks,
        }
    }

    /// The wrapped engine
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

#[async_trait]
impl<E: ScriptEngine> Backend for ScriptBundler<E> {
    type Options = ScriptBundlerOptions<E::Options>;

    fn name(&self) -> &'static str {
        self.engine.name()
    }

    fn options(&self) -> &Self::Options {
        &self.options
    }

    async fn produce(
        &self,
        source: &str,
        path: Option<&Path>,
        _extra: Option<&Value>,
    ) -> BundleResult<Bundle> {
        let project = &self.options.project;
        let entry = EntryPoint::prepare(
            source,
            path,
            project.config_path.as_deref(),
            &project.project_dir,
            &project.entry_extension,
        )?;

        let engine = &self.engine;
        let engine_options = &self.options.engine;
        let entry_path = entry.path();
        let project_dir = project.project_dir.as_path();
        let run = move || engine.bundle_entry(entry_path, project_dir, engine_options);

        let result = match (&project.config_path, &project.config_overrides) {
            (Some(config), Some(overrides)) => {
                with_overrides(&self.locks, config, overrides, run).await
            }
            _ => run().await,
        };

        // Temporary entry is removed here, after the config is restored
        drop(entry);
        result
    }
}

impl<E: ScriptEngine> Bundler<ScriptBundler<E>> {
    /// Bundle a zero-argument callback given as source text.
    ///
    /// The callback is invoked immediately (and awaited when it is async)
    /// at module top level.
    pub async fn from_function(&self, callback: &str) -> BundleResult<Bundle> {
        self.from_src(&wrap_callback(callback), None).await
    }
}
