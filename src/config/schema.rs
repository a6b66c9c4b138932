//! Configuration schema for bundlekit
//!
//! Global configuration is stored at `~/.config/bundlekit/config.toml`;
//! a project-local `.bundlekit.toml` is layered on top.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Result cache settings
    pub cache: CacheConfig,

    /// Script bundling settings
    pub script: ScriptConfig,

    /// Stylesheet settings
    pub style: StyleConfig,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Subdirectory under the platform cache root
    pub app_name: String,

    /// Explicit cache directory, bypassing platform resolution
    pub dir: Option<PathBuf>,

    /// Skip cache reads (results are still written)
    pub disable: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            app_name: "bundlekit".to_string(),
            dir: None,
            disable: false,
        }
    }
}

/// Script bundling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// JavaScript runtime running the esbuild driver
    pub program: String,

    /// Runtime arguments placed before the driver path
    pub args: Vec<String>,

    /// esbuild import specifier used by the driver
    pub esbuild_module: String,

    /// Project directory (defaults to the current directory)
    pub project_dir: Option<PathBuf>,

    /// Project config file, relative to the project directory
    pub config_file: Option<PathBuf>,

    /// Overrides merged into the project config during a build
    pub config_overrides: Option<Value>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            program: "deno".to_string(),
            args: vec![
                "run".to_string(),
                "--allow-all".to_string(),
                "--quiet".to_string(),
            ],
            esbuild_module: "npm:esbuild@0.24.2".to_string(),
            project_dir: None,
            config_file: None,
            config_overrides: None,
        }
    }
}

/// Stylesheet configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Tailwind CSS CLI executable
    pub tailwind_program: String,

    /// Lightning CSS CLI executable
    pub lightningcss_program: String,

    /// Browserslist query
    pub targets: Option<String>,

    /// Minify output
    pub minify: bool,

    /// Root scanned for class-name candidates (defaults to the current directory)
    pub scan_root: Option<PathBuf>,

    /// File extensions scanned for candidates
    pub scan_extensions: Vec<String>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            tailwind_program: "tailwindcss".to_string(),
            lightningcss_program: "lightningcss".to_string(),
            targets: None,
            minify: false,
            scan_root: None,
            scan_extensions: crate::style::scan::default_extensions(),
        }
    }
}
