//! bundlekit - cached bundling orchestration
//!
//! Wraps external script and stylesheet bundlers behind one cache-aware
//! [`bundler::Bundler`], with scoped temporary entries and serialized,
//! self-restoring edits to shared project config files.

pub mod bundler;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod helpers;
pub mod net;
pub(crate) mod process;
pub mod project;
pub mod script;
pub mod style;

pub use error::{BundleError, BundleResult};
