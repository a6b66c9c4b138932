//! CLI argument definitions using clap derive

use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// bundlekit - cached script and stylesheet bundling
///
/// Drives external bundlers (esbuild, Tailwind CSS, Lightning CSS) and
/// caches their output on disk, keyed by everything that affects it.
#[derive(Parser, Debug)]
#[command(name = "bundlekit")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "BUNDLEKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .bundlekit.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bundle a script with esbuild
    Script(ScriptArgs),

    /// Build a utility-class stylesheet
    Style(StyleArgs),

    /// Transform or bundle a plain stylesheet
    Css(CssArgs),

    /// Manage the result cache
    Cache(CacheArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for the script command
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["input", "eval", "url"])))]
pub struct ScriptArgs {
    /// Entry file to bundle
    pub input: Option<PathBuf>,

    /// Bundle inline source instead of a file
    #[arg(short, long)]
    pub eval: Option<String>,

    /// Bundle a remote module
    #[arg(long)]
    pub url: Option<String>,

    /// Treat --eval source as a zero-argument function and invoke it
    #[arg(long, requires = "eval", conflicts_with_all = ["input", "url"])]
    pub call: bool,

    /// Project directory (default: from config, then current directory)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip cache reads
    #[arg(long)]
    pub no_cache: bool,
}

/// Arguments for the style command
#[derive(Parser, Debug)]
pub struct StyleArgs {
    /// Input stylesheet
    pub input: PathBuf,

    /// Directory scanned for class names (default: from config, then current directory)
    #[arg(short, long)]
    pub scan: Option<PathBuf>,

    /// Browserslist query for the output
    #[arg(short, long)]
    pub targets: Option<String>,

    /// Minify output
    #[arg(short, long)]
    pub minify: bool,

    /// Write output here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip cache reads
    #[arg(long)]
    pub no_cache: bool,
}

/// Arguments for the css command
#[derive(Parser, Debug)]
pub struct CssArgs {
    /// Input stylesheet; its imports are bundled
    pub input: PathBuf,

    /// Browserslist query for the output
    #[arg(short, long)]
    pub targets: Option<String>,

    /// Minify output
    #[arg(short, long)]
    pub minify: bool,

    /// Write output here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip cache reads
    #[arg(long)]
    pub no_cache: bool,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show the cache directory
    Path,

    /// Remove all cached bundles
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}
