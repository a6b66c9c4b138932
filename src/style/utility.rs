//! Utility-class stylesheet backend
//!
//! Output depends on which class names the project uses, so the scanned
//! candidate set is contributed as key material: adding a class anywhere
//! under the scan root produces a new cache entry.

use crate::bundler::{Backend, Bundle};
use crate::error::{BundleError, BundleResult};
use crate::process::run_tool;
use crate::style::loader::{
    inline_file_imports, inline_imports_except, SheetBase, StylesheetLoader,
};
use crate::style::scan::{scan_candidates, ScanSource};
use crate::style::{StyleTransformer, TransformInput, TransformSettings};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;

/// Compiles a utility-first stylesheet against a candidate set
#[async_trait]
pub trait UtilityCompiler: Send + Sync {
    /// Stable compiler identifier
    fn name(&self) -> &'static str;

    /// Compile `css`, emitting rules for `candidates` only
    async fn compile(
        &self,
        css: &str,
        candidates: &[String],
        base_dir: &Path,
    ) -> BundleResult<String>;
}

/// [`UtilityCompiler`] running the Tailwind CSS CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailwindCli {
    program: String,
}

impl Default for TailwindCli {
    fn default() -> Self {
        Self::new("tailwindcss")
    }
}

impl TailwindCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Compiler input: the stylesheet plus a `@source` pointing at the
    /// candidate list
    pub fn compiler_input(css: &str, candidates_file: &Path) -> BundleResult<String> {
        let source = serde_json::to_string(&candidates_file.to_string_lossy())?;
        Ok(format!("{}\n@source {};\n", css.trim_end(), source))
    }
}

fn scratch_file(
    dir: &Path,
    prefix: &str,
    suffix: &str,
    content: &str,
) -> BundleResult<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(suffix)
        .tempfile_in(dir)
        .map_err(|e| BundleError::io(format!("creating scratch file in {}", dir.display()), e))?;
    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| BundleError::io("writing scratch file", e))?;
    Ok(file)
}

#[async_trait]
impl UtilityCompiler for TailwindCli {
    fn name(&self) -> &'static str {
        "tailwindcss"
    }

    async fn compile(
        &self,
        css: &str,
        candidates: &[String],
        base_dir: &Path,
    ) -> BundleResult<String> {
        // Both files live in base_dir so package imports resolve from the project
        let list = scratch_file(
            base_dir,
            ".bundlekit-candidates-",
            ".txt",
            &candidates.join("\n"),
        )?;
        let input = Self::compiler_input(css, list.path())?;
        let input = scratch_file(base_dir, ".bundlekit-utility-", ".css", &input)?;

        let args = vec![
            "--input".to_string(),
            input.path().to_string_lossy().into_owned(),
        ];
        run_tool(self.name(), &self.program, &args, base_dir).await
    }
}

/// Options of the utility backend; all of them land in the cache key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilityStyleOptions {
    /// Directory inline stylesheets resolve relative imports against
    pub base_dir: PathBuf,

    /// Where class-name candidates come from
    pub scan: ScanSource,

    pub minify: bool,

    /// Browserslist query for the post-processing step
    pub targets: Option<String>,

    /// Import specifiers left for the compiler to resolve
    pub keep_imports: Vec<String>,
}

impl Default for UtilityStyleOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            scan: ScanSource::directory("."),
            minify: false,
            targets: None,
            keep_imports: vec!["tailwindcss".to_string()],
        }
    }
}

impl UtilityStyleOptions {
    /// Whether the compiled output needs a transformer pass
    pub fn needs_transform(&self) -> bool {
        self.minify || self.targets.is_some()
    }
}

/// Scans for candidates, inlines imports, compiles, then optionally
/// minifies/lowers
pub struct UtilityStyleBackend {
    options: UtilityStyleOptions,
    loader: Arc<dyn StylesheetLoader>,
    compiler: Arc<dyn UtilityCompiler>,
    transformer: Option<Arc<dyn StyleTransformer>>,
}

impl UtilityStyleBackend {
    pub fn new(
        options: UtilityStyleOptions,
        loader: Arc<dyn StylesheetLoader>,
        compiler: Arc<dyn UtilityCompiler>,
    ) -> Self {
        Self {
            options,
            loader,
            compiler,
            transformer: None,
        }
    }

    /// Post-process compiled output (required for `minify`/`targets`)
    pub fn with_transformer(mut self, transformer: Arc<dyn StyleTransformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    fn base_dir(&self, path: Option<&Path>) -> PathBuf {
        path.and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| self.options.base_dir.clone())
    }
}

fn candidates_from(extra: &Value) -> Option<Vec<String>> {
    serde_json::from_value(extra.get("candidates")?.clone()).ok()
}

#[async_trait]
impl Backend for UtilityStyleBackend {
    type Options = UtilityStyleOptions;

    fn name(&self) -> &'static str {
        "utility-css"
    }

    fn options(&self) -> &UtilityStyleOptions {
        &self.options
    }

    async fn key_material(
        &self,
        _source: &str,
        _path: Option<&Path>,
    ) -> BundleResult<Option<Value>> {
        let candidates = scan_candidates(&self.options.scan).await?;
        debug!("Found {} utility candidates", candidates.len());
        Ok(Some(json!({ "candidates": candidates })))
    }

    async fn produce(
        &self,
        source: &str,
        path: Option<&Path>,
        extra: Option<&Value>,
    ) -> BundleResult<Bundle> {
        let candidates = match extra.and_then(candidates_from) {
            Some(candidates) => candidates,
            None => scan_candidates(&self.options.scan).await?,
        };

        let base_dir = self.base_dir(path);
        let base = SheetBase::Dir(base_dir.clone());
        let keep = &self.options.keep_imports;
        let css = match path {
            Some(path) => {
                inline_file_imports(source, path, &base, self.loader.as_ref(), keep).await?
            }
            None => inline_imports_except(source, &base, self.loader.as_ref(), keep).await?,
        };

        let compiled = self.compiler.compile(&css, &candidates, &base_dir).await?;

        if !self.options.needs_transform() {
            return Ok(Bundle::new(compiled));
        }

        let transformer = self.transformer.as_ref().ok_or_else(|| {
            BundleError::backend(
                self.name(),
                "minify or targets requested but no transformer is configured",
            )
        })?;
        let settings = TransformSettings {
            bundle: false,
            minify: self.options.minify,
            targets: self.options.targets.clone(),
        };
        transformer
            .transform(
                TransformInput::Code {
                    code: compiled,
                    base_dir,
                },
                &settings,
            )
            .await
    }
}
