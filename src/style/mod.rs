//! Stylesheet bundling
//!
//! Two backends, both thin orchestration over external compilers:
//!
//! - [`UtilityStyleBackend`]: scans the project for class-name candidates,
//!   inlines `@import`s, compiles utility classes and optionally post-processes
//!   the result.
//! - [`DirectStyleBackend`]: hands a stylesheet straight to a
//!   [`StyleTransformer`], bundling its import chain when it lives on disk.

pub mod direct;
pub mod loader;
pub mod scan;
pub mod transform;
pub mod utility;

pub use direct::{DirectStyleBackend, DirectStyleOptions};
pub use loader::{inline_imports, RegistryLoader, SheetBase, StylesheetLoader};
pub use scan::{scan_candidates, ScanEntry, ScanSource};
pub use transform::LightningCssCli;
pub use utility::{TailwindCli, UtilityCompiler, UtilityStyleBackend, UtilityStyleOptions};

use crate::bundler::Bundle;
use crate::error::BundleResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a transformer works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformInput {
    /// Stylesheet text; relative references resolve against `base_dir`
    Code { code: String, base_dir: PathBuf },
    /// Stylesheet on disk
    File(PathBuf),
}

/// Transformer settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// Follow and inline `@import`s
    pub bundle: bool,
    pub minify: bool,
    /// Browserslist query (e.g. `">= 0.25%"`)
    pub targets: Option<String>,
}

/// A CSS transformer/minifier
#[async_trait]
pub trait StyleTransformer: Send + Sync {
    /// Stable transformer identifier
    fn name(&self) -> &'static str;

    /// Transform `input` according to `settings`
    async fn transform(
        &self,
        input: TransformInput,
        settings: &TransformSettings,
    ) -> BundleResult<Bundle>;
}
