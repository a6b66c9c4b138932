//! esbuild through an external JavaScript runtime
//!
//! Writes a small driver program next to the entry, runs it with the
//! configured runtime from the project directory and takes whatever the
//! driver prints on stdout as the bundled code.

use crate::bundler::Bundle;
use crate::error::{BundleError, BundleResult};
use crate::process::run_tool;
use crate::project::merge::deep_merge;
use crate::script::ScriptEngine;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Prefix of the driver program written for each build
pub const DRIVER_PREFIX: &str = ".bundlekit-driver-";

/// Options for the subprocess engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubprocessOptions {
    /// Runtime executable (e.g. `deno`, `node`)
    pub program: String,

    /// Arguments placed before the driver path
    pub args: Vec<String>,

    /// Import specifier for esbuild inside the driver
    pub esbuild_module: String,

    /// esbuild build options merged over the defaults
    pub build: Value,
}

impl Default for SubprocessOptions {
    fn default() -> Self {
        Self {
            program: "deno".to_string(),
            args: vec![
                "run".to_string(),
                "--allow-all".to_string(),
                "--quiet".to_string(),
            ],
            esbuild_module: "npm:esbuild@0.24.2".to_string(),
            build: json!({}),
        }
    }
}

/// Script engine that shells out to a JS runtime running esbuild
#[derive(Debug, Default, Clone, Copy)]
pub struct SubprocessEngine;

impl SubprocessEngine {
    /// Create a new subprocess engine
    pub fn new() -> Self {
        Self
    }
}

/// Merge caller options between the defaults and the fixed fields.
///
/// The entry, browser platform and in-memory output always win.
pub fn build_options(entry: &Path, user: &Value) -> Value {
    let mut options = json!({
        "bundle": true,
        "format": "esm",
    });
    deep_merge(&mut options, user);
    deep_merge(
        &mut options,
        &json!({
            "entryPoints": [entry.to_string_lossy()],
            "platform": "browser",
            "write": false,
        }),
    );
    options
}

/// Render the driver program for one build
pub fn driver_source(esbuild_module: &str, options: &Value) -> BundleResult<String> {
    let module = serde_json::to_string(esbuild_module)?;
    let options = serde_json::to_string(options)?;

    Ok(format!(
        r#"import * as esbuild from {module};
const options = {options};
const result = await esbuild.build(options);
const output = result.outputFiles.find((f) => !f.path.endsWith(".map")) ?? result.outputFiles[0];
if (globalThis.Deno) {{
  await Deno.stdout.write(output.contents);
}} else {{
  await new Promise((resolve) => process.stdout.write(output.text, resolve));
}}
await esbuild.stop?.();
"#
    ))
}

#[async_trait]
impl ScriptEngine for SubprocessEngine {
    type Options = SubprocessOptions;

    fn name(&self) -> &'static str {
        "esbuild"
    }

    async fn bundle_entry(
        &self,
        entry: &Path,
        project_dir: &Path,
        options: &SubprocessOptions,
    ) -> BundleResult<Bundle> {
        let build = build_options(entry, &options.build);
        let source = driver_source(&options.esbuild_module, &build)?;

        // Removed on drop, whichever way the run ends
        let mut driver = tempfile::Builder::new()
            .prefix(DRIVER_PREFIX)
            .suffix(".mjs")
            .tempfile_in(project_dir)
            .map_err(|e| {
                BundleError::io(format!("creating driver in {}", project_dir.display()), e)
            })?;
        driver
            .write_all(source.as_bytes())
            .and_then(|_| driver.flush())
            .map_err(|e| BundleError::io("writing driver", e))?;
        debug!("Wrote esbuild driver: {}", driver.path().display());

        let mut args = options.args.clone();
        args.push(driver.path().to_string_lossy().into_owned());

        let code = run_tool(self.name(), &options.program, &args, project_dir).await?;
        Ok(Bundle::new(code))
    }
}
